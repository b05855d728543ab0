//! Protocol hooks for [`Flavor::Magic`] mocks.
//!
//! Each hook is a child mock stored under a dunder name (`__len__`,
//! `__iter__`, ...), created with a default return value. Hooks are
//! recorded like any other call and can be reconfigured through
//! [`Mock::child`]:
//!
//! ```rust
//! use testkit_double::mock::Mock;
//!
//! let mock = Mock::magic();
//! assert_eq!(mock.len().unwrap(), 0);
//!
//! mock.child("__len__").unwrap().set_return_value(3);
//! assert_eq!(mock.len().unwrap(), 3);
//! ```

use crate::call::{Call, Value};
use crate::error::{Error, Result};

use super::substitute::{Flavor, Mock};

const LEN: &str = "__len__";
const BOOL: &str = "__bool__";
const ITER: &str = "__iter__";
const CONTAINS: &str = "__contains__";
const STR: &str = "__str__";

impl Mock {
    /// Length of the mock. Defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProtocol`] for plain mocks and
    /// [`Error::BadProtocolValue`] if the hook returns anything but a
    /// non-negative int.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> Result<usize> {
        let value = self.hook(LEN)?.call(Call::new())?;
        value
            .as_int()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| bad_value(LEN, "non-negative int", &value))
    }

    /// Truthiness of the mock. Defaults to `true`.
    ///
    /// # Errors
    ///
    /// See [`Mock::len`].
    pub fn truthy(&self) -> Result<bool> {
        let value = self.hook(BOOL)?.call(Call::new())?;
        value.as_bool().ok_or_else(|| bad_value(BOOL, "bool", &value))
    }

    /// Items yielded by iterating the mock. Defaults to nothing.
    ///
    /// # Errors
    ///
    /// See [`Mock::len`].
    pub fn items(&self) -> Result<Vec<Value>> {
        let value = self.hook(ITER)?.call(Call::new())?;
        match value {
            Value::List(items) => Ok(items),
            other => Err(bad_value(ITER, "list", &other)),
        }
    }

    /// Membership test. Defaults to `false`.
    ///
    /// # Errors
    ///
    /// See [`Mock::len`].
    pub fn contains(&self, item: impl Into<Value>) -> Result<bool> {
        let call = Call::new().arg(item);
        let value = self.hook(CONTAINS)?.call(call)?;
        value.as_bool().ok_or_else(|| bad_value(CONTAINS, "bool", &value))
    }

    /// String form of the mock. Defaults to its representation.
    ///
    /// # Errors
    ///
    /// See [`Mock::len`].
    pub fn to_str(&self) -> Result<String> {
        let value = self.hook(STR)?.call(Call::new())?;
        match value {
            Value::Str(s) => Ok(s),
            other => Err(bad_value(STR, "str", &other)),
        }
    }

    fn hook(&self, hook: &str) -> Result<Mock> {
        let unsupported = || Error::UnsupportedProtocol {
            mock: self.to_string(),
            hook: hook.to_string(),
        };
        if self.inner.flavor != Flavor::Magic {
            return Err(unsupported());
        }
        self.child(hook).map_err(|_| unsupported())
    }

    /// Default return value of the hook `name`, for magic mocks.
    pub(super) fn hook_default(&self, name: &str) -> Option<Value> {
        if self.inner.flavor != Flavor::Magic {
            return None;
        }
        match name {
            LEN => Some(Value::Int(0)),
            BOOL => Some(Value::Bool(true)),
            ITER => Some(Value::List(Vec::new())),
            CONTAINS => Some(Value::Bool(false)),
            STR => Some(Value::Str(self.to_string())),
            _ => None,
        }
    }
}

fn bad_value(hook: &str, expected: &str, found: &Value) -> Error {
    Error::BadProtocolValue {
        hook: hook.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;
    use crate::spec::Spec;

    #[test]
    fn test_defaults() {
        let mock = Mock::magic();

        assert_eq!(mock.len().unwrap(), 0);
        assert!(mock.truthy().unwrap());
        assert!(mock.items().unwrap().is_empty());
        assert!(!mock.contains(1).unwrap());
        assert_eq!(mock.to_str().unwrap(), mock.to_string());
    }

    #[test]
    fn test_hooks_are_recorded() {
        let mock = Mock::non_callable_magic();
        mock.contains("x").unwrap();

        let hook = mock.child("__contains__").unwrap();
        hook.assert_called_once_with(&call!("x")).unwrap();
        assert_eq!(mock.mock_calls()[0].to_string(), "call.__contains__('x')");
    }

    #[test]
    fn test_configured_hooks() {
        let mock = Mock::magic();
        mock.child("__iter__")
            .unwrap()
            .set_return_value(vec![1, 2, 3]);
        mock.child("__len__").unwrap().set_return_value(-1);

        assert_eq!(
            mock.items().unwrap(),
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );
        assert!(matches!(
            mock.len().unwrap_err(),
            Error::BadProtocolValue { .. }
        ));
    }

    #[test]
    fn test_plain_mocks_reject_hooks() {
        let mock = Mock::new();
        assert!(matches!(
            mock.len().unwrap_err(),
            Error::UnsupportedProtocol { .. }
        ));
    }

    #[test]
    fn test_spec_limits_hooks() {
        let mock = Mock::builder()
            .magic()
            .spec(Spec::object("Sized").method("__len__"))
            .build();

        assert_eq!(mock.len().unwrap(), 0);
        assert!(matches!(
            mock.items().unwrap_err(),
            Error::UnsupportedProtocol { .. }
        ));
    }

    #[test]
    fn test_deleted_hook() {
        let mock = Mock::magic();
        mock.del_attr("__bool__").unwrap();
        assert!(mock.truthy().is_err());
    }
}
