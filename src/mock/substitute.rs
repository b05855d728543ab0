#![allow(clippy::must_use_candidate)]

//! The mock object.
//!
//! A [`Mock`] is a cheap, cloneable handle. Clones share identity, state and
//! call history.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::assertions::matcher::Matcher;
use crate::call::{Call, MockCall, Value};
use crate::error::{Error, Result};
use crate::spec::{Member, Spec};

use super::builder::MockBuilder;
use super::recorder::{CallRecord, CallRecorder, Outcome};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockId(u64);

impl MockId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which protocol surface a mock offers.
///
/// `Magic` mocks answer the protocol hooks (`len`, `items`, `contains`,
/// `truthy`, `to_str`) with defaults. `Plain` mocks reject them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flavor {
    /// No protocol hooks.
    #[default]
    Plain,
    /// Protocol hooks preconfigured.
    Magic,
}

/// A function computing a call's result.
pub type CallFn = Arc<dyn Fn(&Call) -> Result<Value> + Send + Sync>;

/// What happens when a mock is called, before its return value is
/// considered.
#[derive(Clone)]
pub enum SideEffect {
    /// Fail every call with [`Error::Raised`].
    Raise(String),
    /// Return the next value per call, then fail with
    /// [`Error::SideEffectExhausted`].
    Sequence(VecDeque<Value>),
    /// Compute the result from the call.
    Function(CallFn),
}

impl SideEffect {
    /// Fail every call with `message`.
    pub fn raise(message: impl Into<String>) -> Self {
        Self::Raise(message.into())
    }

    /// Return `values` one per call.
    pub fn sequence<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }

    /// Compute each result with `f`.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }
}

impl fmt::Debug for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise(message) => f.debug_tuple("Raise").field(message).finish(),
            Self::Sequence(values) => f.debug_tuple("Sequence").field(values).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Everything needed to create a mock.
#[derive(Default)]
pub(super) struct Config {
    pub(super) name: Option<String>,
    pub(super) flavor: Flavor,
    pub(super) class_name: Option<String>,
    pub(super) callable: bool,
    pub(super) spec: Option<Spec>,
    pub(super) spec_set: bool,
    pub(super) autospec: bool,
    pub(super) return_value: Option<Value>,
    pub(super) side_effect: Option<SideEffect>,
    pub(super) wraps: Option<CallFn>,
}

struct Parent {
    inner: Weak<Inner>,
    segment: String,
}

pub(super) struct Inner {
    id: MockId,
    path: Option<String>,
    pub(super) flavor: Flavor,
    class_name: Option<String>,
    callable: bool,
    spec: Option<Spec>,
    spec_set: bool,
    autospec: bool,
    parent: Option<Parent>,
    recorder: CallRecorder,
    pub(super) state: Mutex<State>,
}

#[derive(Default)]
pub(super) struct State {
    pub(super) children: BTreeMap<String, Mock>,
    pub(super) attributes: BTreeMap<String, Value>,
    pub(super) deleted: BTreeSet<String>,
    return_value: Option<Value>,
    side_effect: Option<SideEffect>,
    wraps: Option<CallFn>,
    mock_calls: Vec<MockCall>,
}

enum Action {
    Return(Value),
    Raise(String),
    Exhausted,
    Invoke(CallFn),
    Default,
}

/// A test double.
///
/// A mock is either callable or not, optionally restricted to the members
/// of a [`Spec`], and records every call made to it.
///
/// ```rust
/// use testkit_double::call;
/// use testkit_double::mock::Mock;
///
/// let mock = Mock::new();
/// let result = mock.call(call!(3, 2, 1)).unwrap();
///
/// mock.assert_called_once_with(&call!(3, 2, 1)).unwrap();
///
/// // The default return value is itself a mock, the same one every call.
/// assert_eq!(result, mock.return_value());
/// ```
#[derive(Clone)]
pub struct Mock {
    pub(super) inner: Arc<Inner>,
}

impl Mock {
    /// A callable mock.
    pub fn new() -> Self {
        MockBuilder::new().build()
    }

    /// A mock that fails every call with [`Error::NotCallable`].
    pub fn non_callable() -> Self {
        MockBuilder::new().non_callable().build()
    }

    /// A callable mock with protocol hooks.
    pub fn magic() -> Self {
        MockBuilder::new().magic().build()
    }

    /// A non-callable mock with protocol hooks.
    pub fn non_callable_magic() -> Self {
        MockBuilder::new().magic().non_callable().build()
    }

    /// Start configuring a mock.
    pub fn builder() -> MockBuilder {
        MockBuilder::new()
    }

    pub(super) fn from_config(config: Config, parent: Option<(&Mock, &str)>) -> Self {
        let path = match parent {
            Some((parent, segment)) => {
                let base = parent.inner.path.as_deref().unwrap_or("mock");
                if segment.starts_with('(') {
                    Some(format!("{base}{segment}"))
                } else {
                    Some(format!("{base}.{segment}"))
                }
            }
            None => config.name,
        };
        let recorder = CallRecorder::named(path.as_deref().unwrap_or("mock"));

        let mock = Self {
            inner: Arc::new(Inner {
                id: MockId::next(),
                path,
                flavor: config.flavor,
                class_name: config.class_name,
                callable: config.callable,
                spec: config.spec,
                spec_set: config.spec_set,
                autospec: config.autospec,
                parent: parent.map(|(parent, segment)| Parent {
                    inner: Arc::downgrade(&parent.inner),
                    segment: segment.to_string(),
                }),
                recorder,
                state: Mutex::new(State {
                    return_value: config.return_value,
                    side_effect: config.side_effect,
                    wraps: config.wraps,
                    ..State::default()
                }),
            }),
        };
        trace!(%mock, "created mock");
        mock
    }

    /// Create a child attached to this mock under `segment`.
    ///
    /// Children share the parent's flavor and class label.
    pub(super) fn spawn_child(
        &self,
        segment: &str,
        callable: bool,
        spec: Option<Spec>,
        return_value: Option<Value>,
    ) -> Mock {
        let spec_set = self.inner.spec_set && spec.is_some();
        let config = Config {
            flavor: self.inner.flavor,
            class_name: self.inner.class_name.clone(),
            callable,
            spec,
            spec_set,
            autospec: self.inner.autospec,
            return_value,
            ..Config::default()
        };
        Self::from_config(config, Some((self, segment)))
    }

    /// The mock's identity.
    pub fn id(&self) -> MockId {
        self.inner.id
    }

    /// Dotted name, if the mock was named or is a child.
    pub fn name(&self) -> Option<&str> {
        self.inner.path.as_deref()
    }

    /// Kind name used in representations and errors: the class label if one
    /// was given, otherwise `Mock`, `NonCallableMock`, `MagicMock` or
    /// `NonCallableMagicMock`.
    pub fn kind_name(&self) -> &str {
        if let Some(label) = &self.inner.class_name {
            return label;
        }
        match (self.inner.callable, self.inner.flavor) {
            (true, Flavor::Plain) => "Mock",
            (false, Flavor::Plain) => "NonCallableMock",
            (true, Flavor::Magic) => "MagicMock",
            (false, Flavor::Magic) => "NonCallableMagicMock",
        }
    }

    /// Whether invoking the mock is allowed.
    pub fn is_callable(&self) -> bool {
        self.inner.callable
    }

    /// The mock's flavor.
    pub fn flavor(&self) -> Flavor {
        self.inner.flavor
    }

    /// The capability set the mock is restricted to, if any.
    pub fn spec(&self) -> Option<&Spec> {
        self.inner.spec.as_ref()
    }

    /// Whether setting undeclared members is rejected too.
    pub fn is_spec_set(&self) -> bool {
        self.inner.spec_set
    }

    /// The call history of this mock.
    pub fn recorder(&self) -> &CallRecorder {
        &self.inner.recorder
    }

    pub(super) fn spec_allows(&self, name: &str) -> bool {
        self.inner.spec.as_ref().map_or(true, |spec| spec.declares(name))
    }

    fn undeclared(&self, name: &str) -> Error {
        Error::UndeclaredMember {
            mock: self.to_string(),
            member: name.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Invocation
    // -------------------------------------------------------------------------

    /// Invoke the mock.
    ///
    /// The result is, in order of precedence: the side effect, the
    /// explicitly set return value, the wrapped function, and finally the
    /// default return value mock.
    ///
    /// # Errors
    ///
    /// - [`Error::NotCallable`] for a non-callable mock; nothing is recorded.
    /// - [`Error::Raised`] or [`Error::SideEffectExhausted`] from the side
    ///   effect, or whatever a side effect or wrapped function returns. The
    ///   call is recorded in these cases.
    pub fn call(&self, call: Call) -> Result<Value> {
        if !self.inner.callable {
            return Err(Error::NotCallable {
                mock: self.kind_name().to_string(),
            });
        }

        self.propagate(&call);

        let action = {
            let mut state = self.inner.state.lock();
            let return_value = state.return_value.clone();
            let wraps = state.wraps.clone();
            match &mut state.side_effect {
                Some(SideEffect::Raise(message)) => Action::Raise(message.clone()),
                Some(SideEffect::Sequence(values)) => {
                    values.pop_front().map_or(Action::Exhausted, Action::Return)
                }
                Some(SideEffect::Function(f)) => Action::Invoke(Arc::clone(f)),
                None => match (return_value, wraps) {
                    (Some(value), _) => Action::Return(value),
                    (None, Some(f)) => Action::Invoke(f),
                    (None, None) => Action::Default,
                },
            }
        };

        let result = match action {
            Action::Return(value) => Ok(value),
            Action::Raise(message) => Err(Error::Raised(message)),
            Action::Exhausted => Err(Error::SideEffectExhausted {
                mock: self.to_string(),
            }),
            Action::Invoke(f) => f(&call),
            Action::Default => Ok(self.return_value()),
        };

        let outcome = match &result {
            Ok(value) => Outcome::Returned(value.clone()),
            Err(Error::Raised(message)) => Outcome::Raised(message.clone()),
            Err(err) => Outcome::Raised(err.to_string()),
        };
        self.inner.recorder.record(call, outcome);
        result
    }

    /// Invoke the mock with no arguments.
    ///
    /// # Errors
    ///
    /// See [`Mock::call`].
    pub fn call0(&self) -> Result<Value> {
        self.call(Call::new())
    }

    /// Invoke the member `name`.
    ///
    /// # Errors
    ///
    /// Fails if the member is undeclared or the call fails.
    pub fn call_method(&self, name: &str, call: Call) -> Result<Value> {
        self.child(name)?.call(call)
    }

    /// Add `call` to the `mock_calls` of this mock and every ancestor.
    fn propagate(&self, call: &Call) {
        let mut record = MockCall::new("", call.clone());
        let mut node = Arc::clone(&self.inner);
        loop {
            node.state.lock().mock_calls.push(record.clone());
            let Some(parent) = &node.parent else { break };
            let Some(next) = parent.inner.upgrade() else {
                break;
            };
            record = record.prefixed(&parent.segment);
            node = next;
        }
    }

    // -------------------------------------------------------------------------
    // Return value and side effects
    // -------------------------------------------------------------------------

    /// The value the next default call returns.
    ///
    /// Unless set explicitly this is a child mock, created on first use and
    /// stable afterwards. A mock with a class spec returns a mock of the
    /// class's instance spec.
    pub fn return_value(&self) -> Value {
        if let Some(value) = self.inner.state.lock().return_value.clone() {
            return value;
        }
        let child = match self.inner.spec.as_ref().and_then(Spec::instance) {
            Some(instance) => self.spawn_child("()", instance.is_callable(), Some(instance), None),
            None => self.spawn_child("()", true, None, None),
        };
        self.inner
            .state
            .lock()
            .return_value
            .get_or_insert(Value::Mock(child))
            .clone()
    }

    /// Set the value every default call returns.
    pub fn set_return_value(&self, value: impl Into<Value>) {
        self.inner.state.lock().return_value = Some(value.into());
    }

    /// Replace the side effect. `None` removes it.
    pub fn set_side_effect(&self, side_effect: Option<SideEffect>) {
        self.inner.state.lock().side_effect = side_effect;
    }

    /// Pass calls through to `f` while no return value is set.
    pub fn set_wraps<F>(&self, f: F)
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        self.inner.state.lock().wraps = Some(Arc::new(f));
    }

    // -------------------------------------------------------------------------
    // Members
    // -------------------------------------------------------------------------

    /// The child mock for `name`.
    ///
    /// An explicitly assigned mock attribute wins. Otherwise the child is
    /// created on first access and the same mock is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndeclaredMember`] if the mock has a spec that does
    /// not declare `name`, or if the member was deleted.
    pub fn child(&self, name: &str) -> Result<Mock> {
        let mut state = self.inner.state.lock();
        if let Some(Value::Mock(mock)) = state.attributes.get(name) {
            return Ok(mock.clone());
        }
        if let Some(child) = state.children.get(name) {
            return Ok(child.clone());
        }
        if state.deleted.contains(name) || !self.spec_allows(name) {
            return Err(self.undeclared(name));
        }
        let child = self.new_member(name);
        state.children.insert(name.to_string(), child.clone());
        Ok(child)
    }

    fn new_member(&self, name: &str) -> Mock {
        let declared = self
            .inner
            .spec
            .as_ref()
            .filter(|_| self.inner.autospec)
            .and_then(|spec| spec.member(name));
        match declared {
            Some(Member::Attribute) => self.spawn_child(name, false, None, None),
            Some(Member::Nested(spec)) => {
                self.spawn_child(name, spec.is_callable(), Some(spec.clone()), None)
            }
            Some(Member::Method) | None => {
                self.spawn_child(name, true, None, self.hook_default(name))
            }
        }
    }

    /// The member `name`: an explicitly set attribute, or the child mock.
    ///
    /// # Errors
    ///
    /// See [`Mock::child`].
    pub fn attr(&self, name: &str) -> Result<Value> {
        let explicit = self.inner.state.lock().attributes.get(name).cloned();
        match explicit {
            Some(value) => Ok(value),
            None => self.child(name).map(Value::Mock),
        }
    }

    /// Set the member `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndeclaredMember`] for an undeclared name when the
    /// mock was built with `spec_set`.
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.inner.spec_set && !self.spec_allows(name) {
            return Err(self.undeclared(name));
        }
        let mut state = self.inner.state.lock();
        state.deleted.remove(name);
        state.attributes.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Delete the member `name`. Later access fails until it is set again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndeclaredMember`] if the member is already deleted
    /// or not allowed by the spec.
    pub fn del_attr(&self, name: &str) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.deleted.contains(name) {
            return Err(self.undeclared(name));
        }
        let had_attribute = state.attributes.remove(name).is_some();
        if !had_attribute && !self.spec_allows(name) {
            return Err(self.undeclared(name));
        }
        state.children.remove(name);
        state.deleted.insert(name.to_string());
        Ok(())
    }

    /// Whether [`Mock::attr`] would succeed for `name`.
    ///
    /// Explicitly set attributes count even when the spec does not declare
    /// them, so this can be `true` while [`Mock::child`] fails.
    pub fn has_member(&self, name: &str) -> bool {
        let state = self.inner.state.lock();
        state.attributes.contains_key(name)
            || (!state.deleted.contains(name) && self.spec_allows(name))
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    /// Calls to this mock and all its descendants, oldest first.
    pub fn mock_calls(&self) -> Vec<MockCall> {
        self.inner.state.lock().mock_calls.clone()
    }

    /// Calls to member mocks only: no calls to this mock and no calls to
    /// return values.
    pub fn method_calls(&self) -> Vec<MockCall> {
        self.inner
            .state
            .lock()
            .mock_calls
            .iter()
            .filter(|c| !c.path.is_empty() && !c.path.contains('('))
            .cloned()
            .collect()
    }

    /// Clear the history of this mock and its descendants. Configuration is
    /// kept.
    pub fn reset_mock(&self) {
        let mut visited = HashSet::new();
        self.reset_visit(&mut visited);
    }

    fn reset_visit(&self, visited: &mut HashSet<MockId>) {
        if !visited.insert(self.id()) {
            return;
        }
        self.inner.recorder.reset();
        let descendants: Vec<Mock> = {
            let mut state = self.inner.state.lock();
            state.mock_calls.clear();
            let returned = state.return_value.as_ref().and_then(Value::as_mock).cloned();
            state.children.values().cloned().chain(returned).collect()
        };
        for mock in descendants {
            mock.reset_visit(visited);
        }
    }

    /// Number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.inner.recorder.call_count()
    }

    /// Whether this mock was called.
    pub fn called(&self) -> bool {
        self.inner.recorder.was_called()
    }

    /// Arguments of the most recent call.
    pub fn call_args(&self) -> Option<Call> {
        self.inner.recorder.call_args()
    }

    /// Arguments of every call, oldest first.
    pub fn call_args_list(&self) -> Vec<Call> {
        self.inner.recorder.call_args_list()
    }

    /// Full records of every call.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.recorder.calls()
    }

    /// See [`CallRecorder::assert_called`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if the mock was not called.
    pub fn assert_called(&self) -> Result<()> {
        self.inner.recorder.assert_called()
    }

    /// See [`CallRecorder::assert_not_called`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if the mock was called.
    pub fn assert_not_called(&self) -> Result<()> {
        self.inner.recorder.assert_not_called()
    }

    /// See [`CallRecorder::assert_called_once`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] unless called exactly once.
    pub fn assert_called_once(&self) -> Result<()> {
        self.inner.recorder.assert_called_once()
    }

    /// See [`CallRecorder::assert_called_with`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if the last call differs.
    pub fn assert_called_with(&self, expected: &Call) -> Result<()> {
        self.inner.recorder.assert_called_with(expected)
    }

    /// See [`CallRecorder::assert_called_once_with`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] unless exactly one call equal to
    /// `expected` was made.
    pub fn assert_called_once_with(&self, expected: &Call) -> Result<()> {
        self.inner.recorder.assert_called_once_with(expected)
    }

    /// See [`CallRecorder::assert_any_call`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if no call equals `expected`.
    pub fn assert_any_call(&self, expected: &Call) -> Result<()> {
        self.inner.recorder.assert_any_call(expected)
    }

    /// See [`CallRecorder::assert_has_calls`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if the calls are not found.
    pub fn assert_has_calls(&self, expected: &[Call], any_order: bool) -> Result<()> {
        self.inner.recorder.assert_has_calls(expected, any_order)
    }

    /// See [`CallRecorder::assert_called_once_matching`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] unless exactly one matching call
    /// was made.
    pub fn assert_called_once_matching(&self, matcher: &dyn Matcher<Call>) -> Result<()> {
        self.inner.recorder.assert_called_once_matching(matcher)
    }
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.kind_name())?;
        if let Some(spec) = &self.inner.spec {
            write!(f, " spec='{}'", spec.name())?;
        }
        if let Some(path) = &self.inner.path {
            write!(f, " name='{path}'")?;
        }
        write!(f, " id='{}'>", self.inner.id)
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("id", &self.inner.id)
            .field("kind", &self.kind_name())
            .field("name", &self.inner.path)
            .field("call_count", &self.call_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    #[test]
    fn test_non_callable_rejects_calls() {
        for mock in [Mock::non_callable(), Mock::non_callable_magic()] {
            let err = mock.call0().unwrap_err();
            assert!(matches!(err, Error::NotCallable { .. }));
            assert_eq!(mock.call_count(), 0);
            assert!(mock.to_string().contains(mock.kind_name()));
        }
    }

    #[test]
    fn test_call_records_and_returns_stable_child() {
        let mock = Mock::new();

        let first = mock.call(call!(1)).unwrap();
        let second = mock.call(call!(2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.call_args(), Some(call!(2)));
        assert_eq!(first.as_mock().unwrap().name(), Some("mock()"));
    }

    #[test]
    fn test_explicit_return_value() {
        let mock = Mock::new();
        mock.set_return_value(5);

        assert_eq!(mock.call0().unwrap(), Value::from(5));
        assert_eq!(
            mock.calls()[0].outcome,
            Outcome::Returned(Value::from(5))
        );
    }

    #[test]
    fn test_side_effect_raise_is_recorded() {
        let mock = Mock::new();
        mock.set_side_effect(Some(SideEffect::raise("boom")));

        assert_eq!(mock.call0().unwrap_err(), Error::raised("boom"));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].outcome, Outcome::Raised("boom".to_string()));
    }

    #[test]
    fn test_side_effect_sequence() {
        let mock = Mock::new();
        mock.set_side_effect(Some(SideEffect::sequence([1, 2])));

        assert_eq!(mock.call0().unwrap(), Value::from(1));
        assert_eq!(mock.call0().unwrap(), Value::from(2));
        assert!(matches!(
            mock.call0().unwrap_err(),
            Error::SideEffectExhausted { .. }
        ));
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn test_side_effect_function_wins_over_return_value() {
        let mock = Mock::new();
        mock.set_return_value(0);
        mock.set_side_effect(Some(SideEffect::function(|call: &Call| {
            Ok(Value::from(call.args().len() as i64))
        })));

        assert_eq!(mock.call(call!(1, 2, 3)).unwrap(), Value::from(3));

        mock.set_side_effect(None);
        assert_eq!(mock.call(call!(1, 2, 3)).unwrap(), Value::from(0));
    }

    #[test]
    fn test_wraps_until_return_value_is_set() {
        let mock = Mock::new();
        mock.set_wraps(|call: &Call| {
            let total: i64 = call.args().iter().filter_map(Value::as_int).sum();
            Ok(Value::from(total))
        });

        assert_eq!(mock.call(call!(2, 3)).unwrap(), Value::from(5));

        mock.set_return_value("fixed");
        assert_eq!(mock.call(call!(2, 3)).unwrap(), Value::from("fixed"));
    }

    #[test]
    fn test_children_are_stable() {
        let mock = Mock::new();
        let a = mock.child("foo").unwrap();
        let b = mock.child("foo").unwrap();

        assert_eq!(a.id(), b.id());
        assert_eq!(a.name(), Some("mock.foo"));
        assert_ne!(a.id(), mock.child("bar").unwrap().id());
    }

    #[test]
    fn test_children_inherit_flavor_and_label() {
        let parent = Mock::builder().class_name("MockSub").non_callable().build();
        let child = parent.child("one").unwrap();

        assert_eq!(child.kind_name(), "MockSub");
        assert!(child.is_callable());

        let magic = Mock::non_callable_magic();
        assert_eq!(magic.child("two").unwrap().kind_name(), "MagicMock");
    }

    #[test]
    fn test_spec_restricts_members() {
        let mock = Mock::builder()
            .spec(Spec::object("Conn").method("send"))
            .build();

        assert!(mock.child("send").is_ok());
        assert!(mock.has_member("send"));
        assert!(!mock.has_member("recv"));

        let err = mock.child("recv").unwrap_err();
        assert!(matches!(err, Error::UndeclaredMember { ref member, .. } if member == "recv"));
    }

    #[test]
    fn test_spec_set_rejects_undeclared_assignment() {
        let spec = Spec::object("Conn").attribute("timeout");

        let loose = Mock::builder().spec(spec.clone()).build();
        assert!(loose.set_attr("retries", 3).is_ok());
        assert_eq!(loose.attr("retries").unwrap(), Value::from(3));
        assert!(loose.has_member("retries"));
        assert!(loose.child("retries").is_err());
        assert!(!loose.has_member("backoff"));

        let strict = Mock::builder().spec_set(spec).build();
        assert!(strict.set_attr("timeout", 30).is_ok());
        assert!(matches!(
            strict.set_attr("retries", 3),
            Err(Error::UndeclaredMember { .. })
        ));
    }

    #[test]
    fn test_del_attr() {
        let mock = Mock::new();
        mock.child("foo").unwrap();

        mock.del_attr("foo").unwrap();
        assert!(!mock.has_member("foo"));
        assert!(mock.child("foo").is_err());
        assert!(mock.del_attr("foo").is_err());

        mock.set_attr("foo", 1).unwrap();
        assert_eq!(mock.attr("foo").unwrap(), Value::from(1));
    }

    #[test]
    fn test_assigned_mock_attribute_is_returned_as_child() {
        let mock = Mock::new();
        let replacement = Mock::non_callable();
        mock.set_attr("db", &replacement).unwrap();

        assert_eq!(mock.child("db").unwrap().id(), replacement.id());
    }

    #[test]
    fn test_mock_calls_propagate_to_ancestors() {
        let mock = Mock::new();
        mock.call(call!(1)).unwrap();
        mock.call_method("foo", call!(3, 2, 1)).unwrap();
        mock.child("foo")
            .unwrap()
            .call_method("bar", call!())
            .unwrap();
        mock.call0()
            .unwrap()
            .into_mock()
            .unwrap()
            .call(call!("x"))
            .unwrap();

        let paths: Vec<String> = mock.mock_calls().iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec!["", "foo", "foo.bar", "", "()"]);

        let methods: Vec<String> = mock
            .method_calls()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(methods, vec!["call.foo(3, 2, 1)", "call.foo.bar()"]);
    }

    #[test]
    fn test_reset_mock_is_recursive_and_keeps_config() {
        let mock = Mock::new();
        mock.set_return_value(7);
        mock.call0().unwrap();
        mock.call_method("foo", call!()).unwrap();

        mock.reset_mock();

        assert_eq!(mock.call_count(), 0);
        assert!(mock.mock_calls().is_empty());
        assert_eq!(mock.child("foo").unwrap().call_count(), 0);
        assert_eq!(mock.call0().unwrap(), Value::from(7));
    }

    #[test]
    fn test_reset_mock_survives_cycles() {
        let mock = Mock::new();
        mock.set_return_value(&mock);
        mock.call0().unwrap();

        mock.reset_mock();
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_display() {
        let named = Mock::builder().name("db").build();
        assert!(named.to_string().starts_with("<Mock name='db' id='"));

        let specced = Mock::builder().spec(Spec::object("X")).build();
        assert!(specced.to_string().starts_with("<NonCallableMock spec='X' id='"));
    }
}
