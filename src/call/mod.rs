//! Call arguments and call records.
//!
//! A [`Call`] is the argument list of one invocation: positional arguments
//! plus keyword arguments. The [`call!`](crate::call!) macro builds one:
//!
//! ```rust
//! use testkit_double::call;
//!
//! let c = call!(3, 2, 1; verbose = true);
//! assert_eq!(c.to_string(), "call(3, 2, 1, verbose=True)");
//! ```

mod value;

use std::collections::BTreeMap;
use std::fmt;

pub use value::Value;

/// The arguments of a single invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Call {
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl Call {
    /// An empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Positional arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Keyword arguments, ordered by name.
    #[must_use]
    pub fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    /// Whether the call has no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    fn fmt_args(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positional = self.args.iter().map(ToString::to_string);
        let keyword = self.kwargs.iter().map(|(k, v)| format!("{k}={v}"));
        let parts: Vec<String> = positional.chain(keyword).collect();
        write!(f, "({})", parts.join(", "))
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("call")?;
        self.fmt_args(f)
    }
}

/// Build a [`Call`] from positional and keyword arguments.
///
/// Keyword arguments follow a `;`.
///
/// ```rust
/// use testkit_double::call;
///
/// assert!(call!().is_empty());
/// assert_eq!(call!(1, "a").args().len(), 2);
/// assert_eq!(call!(; retries = 3).kwargs().len(), 1);
/// ```
#[macro_export]
macro_rules! call {
    () => {
        $crate::call::Call::new()
    };
    ($($arg:expr),* ; $($key:ident = $value:expr),+ $(,)?) => {
        $crate::call::Call::new()
            $(.arg($arg))*
            $(.kwarg(stringify!($key), $value))+
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::call::Call::new()$(.arg($arg))+
    };
}

/// A call made on a mock or one of its descendants.
///
/// `path` is relative to the mock whose [`mock_calls`](crate::mock::Mock::mock_calls)
/// produced the record: empty for the mock itself, `foo.bar` for a member
/// chain, and `()` for a return value.
#[derive(Clone, Debug, PartialEq)]
pub struct MockCall {
    /// Dotted path of the mock that was invoked.
    pub path: String,
    /// The arguments of the invocation.
    pub call: Call,
}

impl MockCall {
    /// Create a record for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>, call: Call) -> Self {
        Self {
            path: path.into(),
            call,
        }
    }

    pub(crate) fn prefixed(&self, prefix: &str) -> Self {
        let path = match (prefix.is_empty(), self.path.is_empty()) {
            (true, _) => self.path.clone(),
            (false, true) => prefix.to_string(),
            (false, false) if self.path.starts_with('(') => format!("{prefix}{}", self.path),
            (false, false) => format!("{prefix}.{}", self.path),
        };
        Self {
            path,
            call: self.call.clone(),
        }
    }
}

impl fmt::Display for MockCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("call")?;
        if !self.path.is_empty() {
            if !self.path.starts_with('(') {
                f.write_str(".")?;
            }
            f.write_str(&self.path)?;
        }
        self.call.fmt_args(f)
    }
}
