#![allow(clippy::must_use_candidate)]

//! Custom matcher system for flexible call assertions.
//!
//! This module provides a flexible matcher system for recorded arguments:
//!
//! - [`Matcher`] trait for custom matchers
//! - Built-in matchers: [`eq`], [`gt`], [`lt`], [`contains_str`], [`of_kind`], etc.
//! - Combinators: [`all_of`], [`any_of`], [`not`]
//! - [`CallMatcher`] to match a whole [`Call`]
//!
//! # Example
//!
//! ```rust
//! use testkit_double::call;
//! use testkit_double::call::Value;
//! use testkit_double::assertions::matcher::{anything, eq, gt, CallMatcher, Matcher};
//!
//! let m = CallMatcher::new()
//!     .arg(gt(Value::from(0)))
//!     .arg(anything())
//!     .kwarg("mode", eq(Value::from("fast")));
//!
//! assert!(m.matches(&call!(5, "x"; mode = "fast")));
//! assert!(!m.matches(&call!(-1, "x"; mode = "fast")));
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::call::{Call, Value};

/// A matcher for testing values.
///
/// Matchers can be combined using [`all_of`], [`any_of`], and [`not`].
///
/// # Implementing Custom Matchers
///
/// ```rust
/// use testkit_double::assertions::matcher::Matcher;
/// use testkit_double::call::Value;
///
/// struct IsEven;
///
/// impl Matcher<Value> for IsEven {
///     fn matches(&self, value: &Value) -> bool {
///         value.as_int().is_some_and(|i| i % 2 == 0)
///     }
///
///     fn describe(&self) -> String {
///         "is even".to_string()
///     }
///
///     fn describe_mismatch(&self, value: &Value) -> String {
///         format!("{value} is not even")
///     }
/// }
///
/// assert!(IsEven.matches(&Value::from(4)));
/// assert!(!IsEven.matches(&Value::from(3)));
/// ```
pub trait Matcher<T: ?Sized> {
    /// Check if the value matches.
    fn matches(&self, value: &T) -> bool;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;

    /// Describe why a value didn't match.
    fn describe_mismatch(&self, value: &T) -> String;
}

/// Assert that a value matches a matcher.
///
/// # Panics
///
/// Panics with a descriptive message if the value doesn't match.
///
/// # Example
///
/// ```rust
/// use testkit_double::{assert_that, assertions::matcher::of_kind};
/// use testkit_double::call::Value;
///
/// assert_that!(Value::from("id-7"), of_kind("str"));
/// ```
#[macro_export]
macro_rules! assert_that {
    ($value:expr, $matcher:expr) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::assertions::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}",
                $crate::assertions::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::assertions::matcher::Matcher::describe(matcher),
                value
            );
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::assertions::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}\n  message: {}",
                $crate::assertions::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::assertions::matcher::Matcher::describe(matcher),
                value,
                format_args!($($arg)+)
            );
        }
    }};
}

// =============================================================================
// Built-in Matchers
// =============================================================================

/// Create an equality matcher.
///
/// Mocks compare by identity, other values by content.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, eq};
/// use testkit_double::call::Value;
///
/// let m = eq(Value::from("eu"));
/// assert!(m.matches(&Value::from("eu")));
/// assert!(!m.matches(&Value::from("us")));
/// ```
pub fn eq<T: PartialEq + Debug>(expected: T) -> EqMatcher<T> {
    EqMatcher { expected }
}

/// Matcher for equality.
pub struct EqMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value == &self.expected
    }

    fn describe(&self) -> String {
        format!("equals {:?}", self.expected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not equal {:?}", value, self.expected)
    }
}

/// Create a greater-than matcher. Values of different kinds never match.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, gt};
/// use testkit_double::call::Value;
///
/// assert!(gt(Value::from(0)).matches(&Value::from(250)));
/// assert!(!gt(Value::from(0)).matches(&Value::from("250")));
/// ```
pub fn gt<T: PartialOrd + Debug>(threshold: T) -> GtMatcher<T> {
    GtMatcher { threshold }
}

/// Matcher for greater-than comparison.
pub struct GtMatcher<T> {
    threshold: T,
}

impl<T: PartialOrd + Debug> Matcher<T> for GtMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value > &self.threshold
    }

    fn describe(&self) -> String {
        format!("is greater than {:?}", self.threshold)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} is not greater than {:?}", value, self.threshold)
    }
}

/// Create a less-than matcher.
pub fn lt<T: PartialOrd + Debug>(threshold: T) -> LtMatcher<T> {
    LtMatcher { threshold }
}

/// Matcher for less-than comparison.
pub struct LtMatcher<T> {
    threshold: T,
}

impl<T: PartialOrd + Debug> Matcher<T> for LtMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value < &self.threshold
    }

    fn describe(&self) -> String {
        format!("is less than {:?}", self.threshold)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} is not less than {:?}", value, self.threshold)
    }
}

/// Create a substring matcher for string values.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, contains_str};
/// use testkit_double::call::Value;
///
/// let m = contains_str("world");
/// assert!(m.matches(&Value::from("hello world")));
/// assert!(!m.matches(&Value::from(3)));
/// ```
pub fn contains_str(substring: &str) -> ContainsStrMatcher {
    ContainsStrMatcher {
        substring: substring.to_string(),
    }
}

/// Matcher for string contains.
pub struct ContainsStrMatcher {
    substring: String,
}

impl Matcher<Value> for ContainsStrMatcher {
    fn matches(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| s.contains(&self.substring))
    }

    fn describe(&self) -> String {
        format!("contains {:?}", self.substring)
    }

    fn describe_mismatch(&self, value: &Value) -> String {
        format!("{value} does not contain {:?}", self.substring)
    }
}

impl Matcher<str> for ContainsStrMatcher {
    fn matches(&self, value: &str) -> bool {
        value.contains(&self.substring)
    }

    fn describe(&self) -> String {
        format!("contains {:?}", self.substring)
    }

    fn describe_mismatch(&self, value: &str) -> String {
        format!("{:?} does not contain {:?}", value, self.substring)
    }
}

/// Match values of a given kind (`"int"`, `"str"`, `"MagicMock"`, ...).
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, of_kind};
/// use testkit_double::call::Value;
///
/// assert!(of_kind("int").matches(&Value::from(1)));
/// assert!(!of_kind("int").matches(&Value::from("1")));
/// ```
pub fn of_kind(kind: &str) -> KindMatcher {
    KindMatcher {
        kind: kind.to_string(),
    }
}

/// Matcher for a value's kind.
pub struct KindMatcher {
    kind: String,
}

impl Matcher<Value> for KindMatcher {
    fn matches(&self, value: &Value) -> bool {
        value.kind() == self.kind
    }

    fn describe(&self) -> String {
        format!("is of kind {}", self.kind)
    }

    fn describe_mismatch(&self, value: &Value) -> String {
        format!("{value} is of kind {}, not {}", value.kind(), self.kind)
    }
}

/// Create a matcher that matches anything.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, anything};
/// use testkit_double::call::Value;
/// use testkit_double::mock::Mock;
///
/// assert!(anything().matches(&Value::None));
/// assert!(anything().matches(&Value::from(Mock::new())));
/// ```
pub fn anything<T>() -> AnythingMatcher<T> {
    AnythingMatcher {
        _phantom: std::marker::PhantomData,
    }
}

/// Matcher that always matches.
pub struct AnythingMatcher<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Debug> Matcher<T> for AnythingMatcher<T> {
    fn matches(&self, _value: &T) -> bool {
        true
    }

    fn describe(&self) -> String {
        "anything".to_string()
    }

    fn describe_mismatch(&self, _value: &T) -> String {
        "(always matches)".to_string()
    }
}

/// Create a matcher from a predicate function.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, satisfies};
/// use testkit_double::call::Value;
///
/// let m = satisfies(|v: &Value| v.as_int().is_some_and(|i| i % 2 == 0), "is even");
/// assert!(m.matches(&Value::from(4)));
/// assert!(!m.matches(&Value::from(3)));
/// ```
pub fn satisfies<T, F>(predicate: F, description: &str) -> PredicateMatcher<T, F>
where
    F: Fn(&T) -> bool,
{
    PredicateMatcher {
        predicate,
        description: description.to_string(),
        _phantom: std::marker::PhantomData,
    }
}

/// Matcher using a custom predicate.
pub struct PredicateMatcher<T, F> {
    predicate: F,
    description: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Debug, F: Fn(&T) -> bool> Matcher<T> for PredicateMatcher<T, F> {
    fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not satisfy: {}", value, self.description)
    }
}

// =============================================================================
// Combinators
// =============================================================================

/// Create a matcher that requires all matchers to match.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, all_of, gt};
/// use testkit_double::call::Value;
///
/// let m = all_of(vec![gt(Value::from(0)), gt(Value::from(5))]);
/// assert!(m.matches(&Value::from(10)));
/// assert!(!m.matches(&Value::from(3)));
/// ```
pub fn all_of<T, M>(matchers: Vec<M>) -> AllOfMatcher<T>
where
    T: Debug,
    M: Matcher<T> + 'static,
{
    AllOfMatcher {
        matchers: matchers
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Matcher<T>>)
            .collect(),
    }
}

/// Matcher that requires every inner matcher to match.
pub struct AllOfMatcher<T: ?Sized> {
    matchers: Vec<Box<dyn Matcher<T>>>,
}

impl<T: Debug> Matcher<T> for AllOfMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        self.matchers.iter().all(|m| m.matches(value))
    }

    fn describe(&self) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("all of [{}]", descriptions.join(", "))
    }

    fn describe_mismatch(&self, value: &T) -> String {
        self.matchers
            .iter()
            .find(|m| !m.matches(value))
            .map_or_else(|| "(all matched)".to_string(), |m| m.describe_mismatch(value))
    }
}

/// Create a matcher that matches when any matcher matches.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, any_of, eq};
/// use testkit_double::call::Value;
///
/// let m = any_of(vec![eq(Value::from("GET")), eq(Value::from("HEAD"))]);
/// assert!(m.matches(&Value::from("HEAD")));
/// assert!(!m.matches(&Value::from("POST")));
/// ```
pub fn any_of<T>(matchers: Vec<impl Matcher<T> + 'static>) -> AnyOfMatcher<T>
where
    T: Debug,
{
    AnyOfMatcher {
        matchers: matchers
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Matcher<T>>)
            .collect(),
    }
}

/// Matcher that requires at least one inner matcher to match.
pub struct AnyOfMatcher<T: ?Sized> {
    matchers: Vec<Box<dyn Matcher<T>>>,
}

impl<T: Debug> Matcher<T> for AnyOfMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        self.matchers.iter().any(|m| m.matches(value))
    }

    fn describe(&self) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("any of [{}]", descriptions.join(", "))
    }

    fn describe_mismatch(&self, value: &T) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("{:?} matched none of [{}]", value, descriptions.join(", "))
    }
}

/// Create a negating matcher.
///
/// ```rust
/// use testkit_double::assertions::matcher::{Matcher, not, eq};
/// use testkit_double::call::Value;
///
/// let m = not(eq(Value::None));
/// assert!(m.matches(&Value::from(1)));
/// assert!(!m.matches(&Value::None));
/// ```
pub fn not<T, M: Matcher<T> + 'static>(matcher: M) -> NotMatcher<T> {
    NotMatcher {
        inner: Box::new(matcher),
    }
}

/// Matcher that negates another matcher.
pub struct NotMatcher<T: ?Sized> {
    inner: Box<dyn Matcher<T>>,
}

impl<T: Debug> Matcher<T> for NotMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        !self.inner.matches(value)
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} matched {}", value, self.inner.describe())
    }
}

impl<T: ?Sized> Matcher<T> for Box<dyn Matcher<T>> {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        (**self).describe_mismatch(value)
    }
}

// =============================================================================
// Call matching
// =============================================================================

/// Matches a whole [`Call`]: one matcher per positional argument and one per
/// keyword argument. Argument counts and keyword names must line up exactly.
#[derive(Default)]
pub struct CallMatcher {
    args: Vec<Box<dyn Matcher<Value>>>,
    kwargs: BTreeMap<String, Box<dyn Matcher<Value>>>,
}

impl CallMatcher {
    /// A matcher for a call with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect the next positional argument to match `matcher`.
    #[must_use]
    pub fn arg(mut self, matcher: impl Matcher<Value> + 'static) -> Self {
        self.args.push(Box::new(matcher));
        self
    }

    /// Expect keyword argument `name` to match `matcher`.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, matcher: impl Matcher<Value> + 'static) -> Self {
        self.kwargs.insert(name.into(), Box::new(matcher));
        self
    }
}

impl Matcher<Call> for CallMatcher {
    fn matches(&self, value: &Call) -> bool {
        value.args().len() == self.args.len()
            && value.kwargs().len() == self.kwargs.len()
            && self.args.iter().zip(value.args()).all(|(m, v)| m.matches(v))
            && self.kwargs.iter().all(|(name, m)| {
                value.kwargs().get(name).is_some_and(|v| m.matches(v))
            })
    }

    fn describe(&self) -> String {
        let positional = self.args.iter().map(|m| m.describe());
        let keyword = self
            .kwargs
            .iter()
            .map(|(name, m)| format!("{name}={}", m.describe()));
        let parts: Vec<String> = positional.chain(keyword).collect();
        format!("call({})", parts.join(", "))
    }

    fn describe_mismatch(&self, value: &Call) -> String {
        if value.args().len() != self.args.len() {
            return format!(
                "{value} has {} positional arguments, expected {}",
                value.args().len(),
                self.args.len()
            );
        }
        for (i, (m, v)) in self.args.iter().zip(value.args()).enumerate() {
            if !m.matches(v) {
                return format!("{value}: argument {i}: {}", m.describe_mismatch(v));
            }
        }
        for (name, m) in &self.kwargs {
            match value.kwargs().get(name) {
                None => return format!("{value} is missing keyword argument {name}"),
                Some(v) if !m.matches(v) => {
                    return format!("{value}: argument {name}: {}", m.describe_mismatch(v));
                }
                Some(_) => {}
            }
        }
        format!("{value} has unexpected keyword arguments")
    }
}
