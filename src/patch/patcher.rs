//! Managing several patches for one test.

use tracing::{debug, warn};

use crate::call::Value;
use crate::error::{Error, Result};

use super::builder::Patch;
use super::guard::PatchGuard;
use super::namespace::Namespace;

/// Owns the patches started during a test and undoes them, newest first.
///
/// Dropping the patcher stops everything it still holds, so patches never
/// outlive the test that started them.
///
/// ```rust
/// use testkit_double::patch::{Namespace, Patch, Patcher};
///
/// let ns = Namespace::new("app");
/// ns.define("db", "postgres");
/// ns.define("cache", "redis");
///
/// let mut patcher = Patcher::new();
/// let db = patcher.start(Patch::object(&ns, "db")).unwrap();
/// patcher.start(Patch::object(&ns, "cache").new("memory")).unwrap();
///
/// assert_eq!(ns.get("db"), Some(db));
/// assert_eq!(patcher.active(), 2);
///
/// patcher.stop_all();
/// assert_eq!(ns.get("db"), Some("postgres".into()));
/// assert_eq!(ns.get("cache"), Some("redis".into()));
/// ```
#[derive(Debug, Default)]
pub struct Patcher {
    guards: Vec<PatchGuard>,
    strict: bool,
}

impl Patcher {
    /// An empty patcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A patcher whose [`finish`](Patcher::finish) fails if patches are still
    /// active.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            guards: Vec::new(),
            strict: true,
        }
    }

    /// Apply `patch` and keep it active until stopped.
    ///
    /// Returns the value swapped in.
    ///
    /// # Errors
    ///
    /// See [`Patch::start`].
    pub fn start(&mut self, patch: Patch) -> Result<Value> {
        let guard = patch.start()?;
        let replacement = guard.replacement().clone();
        self.guards.push(guard);
        Ok(replacement)
    }

    /// Stop the patch of `member` in `namespace`. Returns `false` if this
    /// patcher holds no such patch.
    pub fn stop(&mut self, namespace: &Namespace, member: &str) -> bool {
        let position = self
            .guards
            .iter()
            .rposition(|g| g.namespace().same_as(namespace) && g.member() == member);
        match position {
            Some(i) => {
                self.guards.remove(i).end();
                true
            }
            None => false,
        }
    }

    /// Stop every patch, newest first.
    pub fn stop_all(&mut self) {
        if !self.guards.is_empty() {
            debug!(count = self.guards.len(), "stopping all patches");
        }
        while let Some(guard) = self.guards.pop() {
            guard.end();
        }
    }

    /// Number of active patches.
    #[must_use]
    pub fn active(&self) -> usize {
        self.guards.len()
    }

    /// Whether this patcher holds a patch of `member` in `namespace`.
    #[must_use]
    pub fn is_active(&self, namespace: &Namespace, member: &str) -> bool {
        self.guards
            .iter()
            .any(|g| g.namespace().same_as(namespace) && g.member() == member)
    }

    /// Stop every patch at the end of a test.
    ///
    /// # Errors
    ///
    /// For a [strict](Patcher::strict) patcher, returns
    /// [`Error::AssertionMismatch`] if any patch was still active. The
    /// patches are stopped either way.
    pub fn finish(mut self) -> Result<()> {
        let leftover: Vec<String> = self
            .guards
            .iter()
            .map(|g| format!("{}.{}", g.namespace().name(), g.member()))
            .collect();
        self.stop_all();

        if self.strict && !leftover.is_empty() {
            warn!(patches = ?leftover, "patches still active at end of test");
            return Err(Error::assertion(format!(
                "{} patch(es) still active at end of test: {}",
                leftover.len(),
                leftover.join(", ")
            )));
        }
        Ok(())
    }

    /// Apply `patch` unless the same slot is already held by this patcher.
    ///
    /// # Errors
    ///
    /// See [`Patch::start`].
    pub fn ensure(&mut self, patch: Patch) -> Result<Value> {
        let (namespace, member) = patch.target();
        if let Some(guard) = self
            .guards
            .iter()
            .find(|g| g.namespace().same_as(namespace) && g.member() == member)
        {
            return Ok(guard.replacement().clone());
        }
        self.start(patch)
    }
}

impl Drop for Patcher {
    fn drop(&mut self) {
        self.stop_all();
    }
}
