//! Environment isolation utilities for testing
//!
//! Tests that read process-wide environment variables (`PATH`,
//! `XDG_CONFIG_HOME`, ...) must not interleave with tests that change them.

use std::sync::Mutex;

/// Static mutex to serialize tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the given variables set (`Some`) or removed (`None`)
///
/// The previous values are restored afterwards, even if they were unset.
///
/// # Examples
///
/// ```no_run
/// use linkerd_testkit::with_env_vars;
///
/// with_env_vars(&[("PATH", Some("/tmp/fake-bin")), ("KUBECONFIG", None)], || {
///     // only /tmp/fake-bin is searched for linkerd-* here
/// });
/// ```
pub fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| {
        // Environment variables stay valid after a panic elsewhere
        poisoned.into_inner()
    });

    let originals: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();

    // SAFETY: We hold ENV_LOCK, ensuring no other test is modifying env vars concurrently.
    unsafe {
        for (key, value) in vars {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    let result = f();

    // SAFETY: We still hold ENV_LOCK, ensuring exclusive access to env vars.
    unsafe {
        for (key, value) in originals {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_env_vars_sets_and_restores() {
        let key = "LINKERD_TESTKIT_PROBE";
        let before = std::env::var(key).ok();

        with_env_vars(&[(key, Some("inside"))], || {
            assert_eq!(std::env::var(key).unwrap(), "inside");
        });

        assert_eq!(std::env::var(key).ok(), before);
    }

    #[test]
    fn test_with_env_vars_removes() {
        let key = "LINKERD_TESTKIT_REMOVED";

        with_env_vars(&[(key, None)], || {
            assert!(std::env::var(key).is_err());
        });
    }
}
