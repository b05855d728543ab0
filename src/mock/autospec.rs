//! Building mock trees from a spec.

use crate::spec::Spec;

use super::builder::MockBuilder;
use super::substitute::Mock;

/// Create a mock shaped like `spec`, recursively.
///
/// - The mock is callable iff the spec is.
/// - Only declared members can be accessed.
/// - Declared methods are callable children, declared attributes are
///   non-callable children, nested specs are autospecced in turn.
/// - Calling a class spec returns an autospecced instance.
///
/// ```rust
/// use testkit_double::call;
/// use testkit_double::mock::create_autospec;
/// use testkit_double::spec::Spec;
///
/// let class = Spec::class("X").method("run");
/// let mock = create_autospec(&class);
///
/// let instance = mock.call(call!()).unwrap().into_mock().unwrap();
/// assert!(instance.call(call!()).is_err());
/// assert!(instance.call_method("run", call!()).is_ok());
/// assert!(instance.child("missing").is_err());
/// ```
pub fn create_autospec(spec: &Spec) -> Mock {
    autospec_builder(spec).build()
}

/// Like [`create_autospec`], and also reject assignment to undeclared
/// members throughout the tree.
pub fn create_autospec_set(spec: &Spec) -> Mock {
    MockBuilder::new()
        .magic()
        .spec_set(spec.clone())
        .autospec()
        .build()
}

pub(crate) fn autospec_builder(spec: &Spec) -> MockBuilder {
    MockBuilder::new().magic().spec(spec.clone()).autospec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;
    use crate::error::Error;

    #[test]
    fn test_non_callable_instance() {
        let mock = create_autospec(&Spec::class("X").instance().unwrap());
        assert!(matches!(mock.call0(), Err(Error::NotCallable { .. })));
    }

    #[test]
    fn test_class_returns_instance() {
        let mock = create_autospec(&Spec::class("X").attribute("size"));
        let instance = mock.call0().unwrap().into_mock().unwrap();

        mock.assert_called_once_with(&call!()).unwrap();
        assert!(!instance.is_callable());
        assert_eq!(instance.spec().map(Spec::name), Some("X"));

        // Attributes are non-callable.
        let size = instance.child("size").unwrap();
        assert!(matches!(size.call0(), Err(Error::NotCallable { .. })));
    }

    #[test]
    fn test_nested_specs_are_autospecced() {
        let pool = Spec::object("Pool").method("acquire");
        let service = Spec::object("Service").nested("pool", pool);

        let mock = create_autospec(&service);
        let pool = mock.child("pool").unwrap();

        assert!(!pool.is_callable());
        assert!(pool.call_method("acquire", call!()).is_ok());
        assert!(matches!(
            pool.child("release"),
            Err(Error::UndeclaredMember { .. })
        ));

        let paths: Vec<String> = mock.mock_calls().iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec!["pool.acquire"]);
    }

    #[test]
    fn test_function_return_value_is_unrestricted() {
        let mock = create_autospec(&Spec::function("compute"));
        let result = mock.call(call!(1)).unwrap().into_mock().unwrap();

        assert!(result.spec().is_none());
        assert!(result.child("anything").is_ok());
    }

    #[test]
    fn test_autospec_set_propagates() {
        let service = Spec::object("Service").nested("pool", Spec::object("Pool"));
        let mock = create_autospec_set(&service);

        assert!(mock.set_attr("extra", 1).is_err());
        let pool = mock.child("pool").unwrap();
        assert!(pool.is_spec_set());
        assert!(pool.set_attr("extra", 1).is_err());
    }
}
