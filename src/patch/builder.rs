//! Patch configuration.

use crate::call::Value;
use crate::error::{Error, Result};
use crate::mock::{autospec_builder, Mock};
use crate::spec::Spec;

use super::guard::PatchGuard;
use super::namespace::Namespace;

#[derive(Clone, Debug)]
enum SpecSource {
    Explicit(Spec),
    Original,
}

/// Builder for a scoped replacement.
///
/// Without further options the slot is replaced by a fresh magic mock named
/// after the slot.
///
/// ```rust
/// use testkit_double::call;
/// use testkit_double::patch::{Namespace, Patch};
/// use testkit_double::spec::Spec;
///
/// let ns = Namespace::new("app");
/// ns.define_with_spec("Client", "real", Spec::class("Client").method("get"));
///
/// let guard = Patch::object(&ns, "Client").spec_from_original().start().unwrap();
/// let client = guard.mock().unwrap();
///
/// let instance = ns.call("Client", call!()).unwrap().into_mock().unwrap();
/// client.assert_called_once_with(&call!()).unwrap();
/// assert!(instance.child("get").is_ok());
/// assert!(instance.child("post").is_err());
///
/// drop(guard);
/// assert_eq!(ns.get("Client"), Some("real".into()));
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct Patch {
    namespace: Namespace,
    member: String,
    new: Option<Value>,
    spec: Option<SpecSource>,
    spec_set: bool,
    autospec: bool,
    create: bool,
}

impl Patch {
    /// Patch `member` of `namespace`.
    pub fn object(namespace: &Namespace, member: &str) -> Self {
        Self {
            namespace: namespace.clone(),
            member: member.to_string(),
            new: None,
            spec: None,
            spec_set: false,
            autospec: false,
            create: false,
        }
    }

    /// Swap in `value` instead of a generated mock.
    ///
    /// Cannot be combined with spec options.
    pub fn new(mut self, value: impl Into<Value>) -> Self {
        self.new = Some(value.into());
        self
    }

    /// Restrict the generated mock to `spec`.
    ///
    /// A class spec gives a callable mock whose calls return instances of
    /// the class. An instance spec gives a mock that is callable only if the
    /// instance is.
    pub fn spec(mut self, spec: Spec) -> Self {
        self.spec = Some(SpecSource::Explicit(spec));
        self
    }

    /// Restrict the generated mock to the spec declared for the original
    /// value.
    pub fn spec_from_original(mut self) -> Self {
        self.spec = Some(SpecSource::Original);
        self
    }

    /// Also reject assignment to undeclared members. Uses the original's
    /// spec unless one is given.
    pub fn spec_set(mut self, spec_set: bool) -> Self {
        self.spec_set = spec_set;
        self
    }

    /// Build the mock tree recursively from the spec. Uses the original's
    /// spec unless one is given.
    pub fn autospec(mut self) -> Self {
        self.autospec = true;
        self
    }

    /// Allow patching a slot that does not exist. It is removed again when
    /// the patch ends.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Apply the patch.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPatch`] if `new` is combined with spec options.
    /// - [`Error::UnknownSlot`] if the slot does not exist and `create` is
    ///   not set.
    /// - [`Error::MissingSpec`] if the original's spec is requested but was
    ///   never declared.
    /// - [`Error::Conflict`] if the slot is already patched.
    pub fn start(self) -> Result<PatchGuard> {
        let replacement = self.replacement()?;
        PatchGuard::start(&self.namespace, &self.member, replacement, self.create)
    }

    /// Run `f` with the patch applied, then undo it, even if `f` panics.
    ///
    /// # Errors
    ///
    /// See [`Patch::start`].
    pub fn with<T>(self, f: impl FnOnce(&Value) -> T) -> Result<T> {
        let guard = self.start()?;
        Ok(f(guard.replacement()))
    }

    fn replacement(&self) -> Result<Value> {
        let uses_spec = self.spec.is_some() || self.autospec || self.spec_set;
        if let Some(value) = &self.new {
            if uses_spec {
                return Err(Error::InvalidPatch(format!(
                    "cannot use 'new' together with spec options when patching {}.{}",
                    self.namespace.name(),
                    self.member
                )));
            }
            return Ok(value.clone());
        }

        let spec = match &self.spec {
            Some(SpecSource::Explicit(spec)) => Some(spec.clone()),
            Some(SpecSource::Original) => Some(self.original_spec()?),
            None if self.autospec || self.spec_set => Some(self.original_spec()?),
            None => None,
        };

        let mock = match spec {
            Some(spec) if self.autospec => {
                let builder = autospec_builder(&spec).name(self.member.as_str());
                if self.spec_set {
                    builder.spec_set(spec).build()
                } else {
                    builder.build()
                }
            }
            Some(spec) => {
                let builder = Mock::builder().magic().name(self.member.as_str());
                if self.spec_set {
                    builder.spec_set(spec).build()
                } else {
                    builder.spec(spec).build()
                }
            }
            None => Mock::builder().magic().name(self.member.as_str()).build(),
        };
        Ok(Value::Mock(mock))
    }

    fn original_spec(&self) -> Result<Spec> {
        if !self.namespace.contains(&self.member) {
            return Err(self.namespace.unknown(&self.member));
        }
        self.namespace
            .spec_of(&self.member)
            .ok_or_else(|| Error::MissingSpec {
                container: self.namespace.name().to_string(),
                member: self.member.clone(),
            })
    }

    pub(super) fn target(&self) -> (&Namespace, &str) {
        (&self.namespace, &self.member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;
    use crate::mock::Flavor;
    use std::panic::{self, AssertUnwindSafe};

    fn namespace() -> Namespace {
        let ns = Namespace::new("tests");
        let x = Spec::class("X").method("run");
        ns.define_with_spec("X", "real X", x);
        ns.define("Thing", ());
        ns
    }

    #[test]
    fn test_default_replacement_is_named_magic_mock() {
        let ns = namespace();
        let guard = Patch::object(&ns, "Thing").start().unwrap();
        let mock = guard.mock().unwrap();

        assert_eq!(mock.flavor(), Flavor::Magic);
        assert_eq!(mock.name(), Some("Thing"));
        assert!(mock.spec().is_none());
    }

    #[test]
    fn test_spec_from_original_class() {
        let ns = namespace();
        let guard = Patch::object(&ns, "X").spec_from_original().start().unwrap();
        let mock = guard.mock().unwrap().clone();

        let instance = mock.call0().unwrap().into_mock().unwrap();
        mock.assert_called_once_with(&call!()).unwrap();

        assert_eq!(instance.kind_name(), "NonCallableMagicMock");
        assert!(matches!(instance.call0(), Err(Error::NotCallable { .. })));
    }

    #[test]
    fn test_explicit_instance_spec_is_not_callable() {
        let ns = namespace();
        let instance_spec = Spec::class("X").instance().unwrap();
        let guard = Patch::object(&ns, "X").spec(instance_spec).start().unwrap();

        assert!(!guard.mock().unwrap().is_callable());
    }

    #[test]
    fn test_patch_none_with_explicit_spec() {
        let ns = namespace();
        let guard = Patch::object(&ns, "Thing")
            .spec(Spec::object("Thing").attribute("size"))
            .start()
            .unwrap();

        assert_eq!(guard.original(), Some(&Value::None));
        assert!(guard.mock().unwrap().child("size").is_ok());
    }

    #[test]
    fn test_spec_from_original_without_spec() {
        let ns = namespace();
        assert!(matches!(
            Patch::object(&ns, "Thing").spec_from_original().start(),
            Err(Error::MissingSpec { .. })
        ));
        assert!(matches!(
            Patch::object(&ns, "Nope").spec_from_original().start(),
            Err(Error::UnknownSlot { .. })
        ));
    }

    #[test]
    fn test_new_rejects_spec_options() {
        let ns = namespace();
        assert!(matches!(
            Patch::object(&ns, "X").new(1).autospec().start(),
            Err(Error::InvalidPatch(_))
        ));

        let guard = Patch::object(&ns, "X").new(1).start().unwrap();
        assert_eq!(ns.get("X"), Some(Value::from(1)));
        drop(guard);
    }

    #[test]
    fn test_autospec_uses_original_spec() {
        let ns = namespace();
        let guard = Patch::object(&ns, "X").autospec().start().unwrap();
        let instance = guard.mock().unwrap().call0().unwrap().into_mock().unwrap();

        assert!(instance.call_method("run", call!(1)).is_ok());
        assert!(instance.child("stop").is_err());
    }

    #[test]
    fn test_spec_set() {
        let ns = namespace();
        let guard = Patch::object(&ns, "X")
            .spec_from_original()
            .spec_set(true)
            .start()
            .unwrap();
        let mock = guard.mock().unwrap();

        assert!(mock.is_spec_set());
        assert!(mock.set_attr("run", 1).is_ok());
        assert!(mock.set_attr("other", 1).is_err());
    }

    #[test]
    fn test_spec_set_alone_uses_original_spec() {
        let ns = namespace();
        let guard = Patch::object(&ns, "X").spec_set(true).start().unwrap();
        let mock = guard.mock().unwrap();

        assert!(mock.is_spec_set());
        assert_eq!(mock.spec().map(Spec::name), Some("X"));
        assert!(mock.child("foobarbaz").is_err());
        assert!(mock.set_attr("extra", 1).is_err());
        drop(guard);

        assert!(matches!(
            Patch::object(&ns, "Thing").spec_set(true).start(),
            Err(Error::MissingSpec { .. })
        ));
        assert!(!ns.is_patched("Thing"));
    }

    #[test]
    fn test_create() {
        let ns = namespace();
        assert!(Patch::object(&ns, "cache").start().is_err());

        let guard = Patch::object(&ns, "cache").create(true).start().unwrap();
        assert!(ns.contains("cache"));
        assert!(guard.original().is_none());

        drop(guard);
        assert!(!ns.contains("cache"));
    }

    #[test]
    fn test_with_restores_after_closure() {
        let ns = namespace();
        let seen = Patch::object(&ns, "X")
            .new("fake")
            .with(|value| value.clone())
            .unwrap();

        assert_eq!(seen, Value::from("fake"));
        assert_eq!(ns.get("X"), Some(Value::from("real X")));
    }

    #[test]
    fn test_with_restores_on_panic() {
        let ns = namespace();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            Patch::object(&ns, "X").with(|_| panic!("boom"))
        }));

        assert!(result.is_err());
        assert_eq!(ns.get("X"), Some(Value::from("real X")));
    }
}
