//! Named slots that can be patched.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::call::{Call, Value};
use crate::error::{Error, Result};
use crate::spec::Spec;

/// The value held by a slot, and the shape it was declared with.
#[derive(Clone, Debug)]
pub(super) struct Slot {
    pub(super) value: Value,
    pub(super) spec: Option<Spec>,
}

#[derive(Default)]
struct State {
    slots: BTreeMap<String, Slot>,
    patched: BTreeSet<String>,
}

/// A shared table of named values, the container that patches act on.
///
/// Code under test looks its collaborators up in a namespace; tests swap
/// them out with [`begin`](super::begin) or [`Patch`](super::Patch).
/// Clones share the same table.
///
/// ```rust
/// use testkit_double::call;
/// use testkit_double::patch::Namespace;
///
/// let ns = Namespace::new("app");
/// ns.define("retries", 3);
///
/// assert_eq!(ns.get("retries"), Some(3.into()));
/// assert!(ns.call("retries", call!()).is_err());
/// ```
#[derive(Clone)]
pub struct Namespace {
    name: Arc<str>,
    state: Arc<Mutex<State>>,
}

impl Namespace {
    /// An empty namespace.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// The namespace's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `name` to `value` with no declared shape.
    pub fn define(&self, name: &str, value: impl Into<Value>) {
        self.insert(name, value.into(), None);
    }

    /// Bind `name` to `value`, declaring its shape as `spec`.
    pub fn define_with_spec(&self, name: &str, value: impl Into<Value>, spec: Spec) {
        self.insert(name, value.into(), Some(spec));
    }

    fn insert(&self, name: &str, value: Value, spec: Option<Spec>) {
        self.state
            .lock()
            .slots
            .insert(name.to_string(), Slot { value, spec });
    }

    /// The current value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.state.lock().slots.get(name).map(|s| s.value.clone())
    }

    /// The declared shape of `name`.
    #[must_use]
    pub fn spec_of(&self, name: &str) -> Option<Spec> {
        self.state.lock().slots.get(name).and_then(|s| s.spec.clone())
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().slots.contains_key(name)
    }

    /// Bound names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.state.lock().slots.keys().cloned().collect()
    }

    /// Whether `name` is currently patched.
    #[must_use]
    pub fn is_patched(&self, name: &str) -> bool {
        self.state.lock().patched.contains(name)
    }

    /// Look up `name` and invoke it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSlot`] if `name` is unbound, and otherwise
    /// whatever invoking the value returns.
    pub fn call(&self, name: &str, call: Call) -> Result<Value> {
        let value = self.get(name).ok_or_else(|| self.unknown(name))?;
        value.call(call)
    }

    pub(super) fn unknown(&self, name: &str) -> Error {
        Error::UnknownSlot {
            container: self.name.to_string(),
            member: name.to_string(),
        }
    }

    /// Swap `replacement` into `name`, marking it patched.
    ///
    /// Returns the previous slot, or `None` if the slot was created.
    pub(super) fn swap_in(
        &self,
        name: &str,
        replacement: Value,
        create: bool,
    ) -> Result<Option<Slot>> {
        let mut state = self.state.lock();
        if state.patched.contains(name) {
            return Err(Error::Conflict {
                container: self.name.to_string(),
                member: name.to_string(),
            });
        }
        let spec = match state.slots.get(name) {
            Some(slot) => slot.spec.clone(),
            None if create => None,
            None => return Err(self.unknown(name)),
        };
        state.patched.insert(name.to_string());
        Ok(state.slots.insert(
            name.to_string(),
            Slot {
                value: replacement,
                spec,
            },
        ))
    }

    /// Put `original` back into `name` and clear the patch mark.
    pub(super) fn restore(&self, name: &str, original: Option<Slot>) {
        let mut state = self.state.lock();
        match original {
            Some(slot) => {
                state.slots.insert(name.to_string(), slot);
            }
            None => {
                state.slots.remove(name);
            }
        }
        state.patched.remove(name);
    }

    pub(super) fn same_as(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("slots", &state.slots.keys().collect::<Vec<_>>())
            .field("patched", &state.patched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Mock;

    #[test]
    fn test_define_and_get() {
        let ns = Namespace::new("app");
        ns.define("name", "svc");
        ns.define_with_spec("X", (), Spec::class("X"));

        assert_eq!(ns.get("name"), Some(Value::from("svc")));
        assert!(ns.spec_of("name").is_none());
        assert_eq!(ns.spec_of("X").map(|s| s.name().to_string()), Some("X".to_string()));
        assert_eq!(ns.names(), vec!["X".to_string(), "name".to_string()]);
        assert!(ns.get("missing").is_none());
    }

    #[test]
    fn test_clones_share_slots() {
        let ns = Namespace::new("app");
        let view = ns.clone();

        ns.define("flag", true);

        assert!(view.contains("flag"));
        assert!(ns.same_as(&view));
        assert!(!ns.same_as(&Namespace::new("app")));
    }

    #[test]
    fn test_call_resolves_slot() {
        let ns = Namespace::new("app");
        let handler = Mock::new();
        handler.set_return_value(1);
        ns.define("handler", &handler);

        assert_eq!(ns.call("handler", Call::new()).unwrap(), Value::from(1));
        assert!(matches!(
            ns.call("other", Call::new()),
            Err(Error::UnknownSlot { .. })
        ));
    }

    #[test]
    fn test_swap_and_restore() {
        let ns = Namespace::new("app");
        ns.define_with_spec("db", "real", Spec::object("Db"));

        let original = ns.swap_in("db", Value::from("fake"), false).unwrap();
        assert!(ns.is_patched("db"));
        assert_eq!(ns.get("db"), Some(Value::from("fake")));
        // The declared shape survives the swap.
        assert!(ns.spec_of("db").is_some());

        assert!(matches!(
            ns.swap_in("db", Value::None, false),
            Err(Error::Conflict { .. })
        ));

        ns.restore("db", original);
        assert!(!ns.is_patched("db"));
        assert_eq!(ns.get("db"), Some(Value::from("real")));
    }

    #[test]
    fn test_swap_missing_slot() {
        let ns = Namespace::new("app");

        assert!(matches!(
            ns.swap_in("cache", Value::None, false),
            Err(Error::UnknownSlot { .. })
        ));

        let original = ns.swap_in("cache", Value::from(1), true).unwrap();
        assert!(original.is_none());
        ns.restore("cache", original);
        assert!(!ns.contains("cache"));
    }
}
