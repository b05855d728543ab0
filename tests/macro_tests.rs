//! Integration tests for the `#[testkit_double::test]` macro.

#![cfg(feature = "macros")]
// Patcher is used in function signatures but injected by the macro
#![allow(unused_imports)]

use testkit_double::prelude::*;

fn settings() -> Namespace {
    let ns = Namespace::new("settings");
    ns.define("timeout", 30);
    ns.define("retries", 3);
    ns.define("mode", "prod");
    ns
}

/// Basic test without patcher injection.
#[testkit_double::test]
fn test_basic_sync() {
    assert_eq!(settings().get("mode"), Some(Value::from("prod")));
}

/// Basic async test without patcher injection.
#[testkit_double::test]
async fn test_basic_async() {
    let value = async { 2 + 2 }.await;
    assert_eq!(value, 4);
}

/// Test with Patcher injection.
#[testkit_double::test]
fn test_with_patcher(patcher: Patcher) {
    let ns = settings();
    patcher
        .start(Patch::object(&ns, "timeout").new(1))
        .unwrap();
    assert_eq!(patcher.active(), 1);
}

/// Async test with Patcher injection.
#[testkit_double::test]
async fn test_async_with_patcher(patcher: Patcher) {
    let ns = settings();
    let retries = patcher
        .start(Patch::object(&ns, "retries"))
        .unwrap()
        .into_mock()
        .unwrap();

    let lookup = async { ns.call("retries", call!("db")) };
    lookup.await.unwrap();

    retries.assert_called_once_with(&call!("db")).unwrap();
}

/// `mut` on the injected parameter is accepted.
#[testkit_double::test]
fn test_mut_patcher(mut patcher: Patcher) {
    let ns = settings();
    patcher.start(Patch::object(&ns, "mode").new("test")).unwrap();
    assert!(patcher.stop(&ns, "mode"));
}

/// A strict test that cleans up after itself passes.
#[testkit_double::test(strict = true)]
fn test_strict_clean(patcher: Patcher) {
    let ns = settings();
    patcher.start(Patch::object(&ns, "mode").new("test")).unwrap();
    patcher.stop_all();
}

/// A strict test that leaves patches active fails.
#[testkit_double::test(strict = true)]
#[should_panic(expected = "still active")]
fn test_strict_leftover(patcher: Patcher) {
    let ns = settings();
    patcher.start(Patch::object(&ns, "timeout").new(0)).unwrap();
}

/// Tests returning `Result` keep their return type.
#[testkit_double::test]
fn test_result_return(patcher: Patcher) -> Result<()> {
    let ns = settings();
    let mode = patcher.start(Patch::object(&ns, "mode"))?;
    mode.call(call!())?;
    mode.as_mock()
        .ok_or_else(|| Error::assertion("mode was not mocked"))?
        .assert_called_once()
}

thread_local! {
    static FLAGS: Namespace = {
        let ns = Namespace::new("flags");
        ns.define("beta", 1);
        ns
    };
}

fn flags() -> Namespace {
    FLAGS.with(Namespace::clone)
}

/// Patches a slot and panics. Driven by `test_panic_restores_patches`.
#[testkit_double::test]
#[ignore = "run through test_panic_restores_patches"]
#[should_panic(expected = "boom")]
fn test_panicking_body_with_patch(patcher: Patcher) {
    let ns = flags();
    patcher.start(Patch::object(&ns, "beta").new(0)).unwrap();
    assert_eq!(ns.get("beta"), Some(Value::from(0)));
    panic!("boom");
}

/// Patches are undone even when the test body panics.
#[test]
fn test_panic_restores_patches() {
    let result = std::panic::catch_unwind(test_panicking_body_with_patch);

    assert!(result.is_err());
    let ns = flags();
    assert_eq!(ns.get("beta"), Some(Value::from(1)));
    assert!(!ns.is_patched("beta"));
}
