//! Mock configuration.

use std::sync::Arc;

use tracing::debug;

use crate::call::{Call, Value};
use crate::error::Result;
use crate::spec::Spec;

use super::substitute::{CallFn, Config, Flavor, Mock, SideEffect};

/// Builder for a [`Mock`].
///
/// Callability defaults to the spec's callability, or `true` without a spec.
///
/// ```rust
/// use testkit_double::call;
/// use testkit_double::mock::{Mock, SideEffect};
/// use testkit_double::spec::Spec;
///
/// let conn = Mock::builder()
///     .name("conn")
///     .magic()
///     .spec(Spec::object("Connection").method("send"))
///     .build();
///
/// assert!(!conn.is_callable());
/// assert!(conn.child("send").is_ok());
/// assert!(conn.child("recv").is_err());
///
/// let flaky = Mock::builder()
///     .side_effect(SideEffect::sequence([1, 2]))
///     .build();
/// assert_eq!(flaky.call(call!()).unwrap(), 1.into());
/// ```
#[derive(Default)]
#[must_use]
pub struct MockBuilder {
    name: Option<String>,
    flavor: Flavor,
    class_name: Option<String>,
    callable: Option<bool>,
    spec: Option<Spec>,
    spec_set: bool,
    autospec: bool,
    return_value: Option<Value>,
    side_effect: Option<SideEffect>,
    wraps: Option<CallFn>,
}

impl MockBuilder {
    /// A builder for a plain, callable mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in representations and assertion messages.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use the [`Flavor::Magic`] flavor.
    pub fn magic(self) -> Self {
        self.flavor(Flavor::Magic)
    }

    /// Set the flavor.
    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Label the mock with a custom kind name. Children inherit the label.
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Make the mock non-callable.
    pub fn non_callable(self) -> Self {
        self.callable(false)
    }

    /// Set callability explicitly, overriding the spec.
    pub fn callable(mut self, callable: bool) -> Self {
        self.callable = Some(callable);
        self
    }

    /// Restrict member access to `spec`.
    pub fn spec(mut self, spec: Spec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Restrict member access and assignment to `spec`.
    pub fn spec_set(mut self, spec: Spec) -> Self {
        self.spec = Some(spec);
        self.spec_set = true;
        self
    }

    /// Build declared members from the spec recursively.
    pub(crate) fn autospec(mut self) -> Self {
        self.autospec = true;
        self
    }

    /// Value every default call returns.
    pub fn return_value(mut self, value: impl Into<Value>) -> Self {
        self.return_value = Some(value.into());
        self
    }

    /// Side effect applied to every call.
    pub fn side_effect(mut self, side_effect: SideEffect) -> Self {
        self.side_effect = Some(side_effect);
        self
    }

    /// Pass calls through to `f` while no return value is set.
    pub fn wraps<F>(mut self, f: F) -> Self
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        self.wraps = Some(Arc::new(f));
        self
    }

    /// Create the mock.
    pub fn build(self) -> Mock {
        let callable = self
            .callable
            .unwrap_or_else(|| self.spec.as_ref().map_or(true, Spec::is_callable));
        let mock = Mock::from_config(
            Config {
                name: self.name,
                flavor: self.flavor,
                class_name: self.class_name,
                callable,
                spec: self.spec,
                spec_set: self.spec_set,
                autospec: self.autospec,
                return_value: self.return_value,
                side_effect: self.side_effect,
                wraps: self.wraps,
            },
            None,
        );
        debug!(%mock, "built mock");
        mock
    }
}
