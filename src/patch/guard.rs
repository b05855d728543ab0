//! The active binding of a patch.

use std::fmt;

use tracing::debug;

use crate::call::Value;
use crate::error::Result;
use crate::mock::Mock;

use super::namespace::{Namespace, Slot};

/// An active replacement of one slot.
///
/// The original value is restored when the guard is ended or dropped,
/// including when the scope unwinds from a panic.
#[must_use = "the patch is undone as soon as the guard is dropped"]
pub struct PatchGuard {
    namespace: Namespace,
    member: String,
    replacement: Value,
    original: Option<Slot>,
    active: bool,
}

impl PatchGuard {
    pub(super) fn start(
        namespace: &Namespace,
        member: &str,
        replacement: Value,
        create: bool,
    ) -> Result<Self> {
        let original = namespace.swap_in(member, replacement.clone(), create)?;
        debug!(
            container = namespace.name(),
            member,
            replacement = %replacement,
            created = original.is_none(),
            "patch started"
        );
        Ok(Self {
            namespace: namespace.clone(),
            member: member.to_string(),
            replacement,
            original,
            active: true,
        })
    }

    /// The namespace being patched.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The patched slot's name.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The value swapped in.
    pub fn replacement(&self) -> &Value {
        &self.replacement
    }

    /// The value swapped in, if it is a mock.
    pub fn mock(&self) -> Option<&Mock> {
        self.replacement.as_mock()
    }

    /// The value that will be restored. `None` if the slot was created by
    /// the patch and will be removed.
    pub fn original(&self) -> Option<&Value> {
        self.original.as_ref().map(|slot| &slot.value)
    }

    /// Undo the patch now.
    pub fn end(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.namespace.restore(&self.member, self.original.take());
        debug!(
            container = self.namespace.name(),
            member = %self.member,
            panicking = std::thread::panicking(),
            "patch stopped"
        );
    }
}

impl Drop for PatchGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for PatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchGuard")
            .field("container", &self.namespace.name())
            .field("member", &self.member)
            .field("replacement", &self.replacement)
            .field("active", &self.active)
            .finish()
    }
}

/// Replace `member` of `namespace` with `substitute` until the returned
/// guard is ended or dropped.
///
/// # Errors
///
/// - [`Error::Conflict`](crate::Error::Conflict) if the slot is already
///   patched.
/// - [`Error::UnknownSlot`](crate::Error::UnknownSlot) if the slot does not
///   exist.
///
/// # Example
///
/// ```rust
/// use testkit_double::mock::Mock;
/// use testkit_double::patch::{begin, end, Namespace};
///
/// let ns = Namespace::new("app");
/// ns.define("db", "postgres");
///
/// let fake = Mock::new();
/// let guard = begin(&ns, "db", &fake).unwrap();
/// assert_eq!(ns.get("db"), Some((&fake).into()));
///
/// end(guard);
/// assert_eq!(ns.get("db"), Some("postgres".into()));
/// ```
pub fn begin(namespace: &Namespace, member: &str, substitute: impl Into<Value>) -> Result<PatchGuard> {
    PatchGuard::start(namespace, member, substitute.into(), false)
}

/// Undo a patch started with [`begin`].
pub fn end(guard: PatchGuard) {
    guard.end();
}
