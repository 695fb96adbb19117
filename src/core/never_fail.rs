//! Never-fail policy for instrumentation calls.
//!
//! Citation bookkeeping runs inside somebody else's program. A failure while
//! citing, loading references or dumping a report must not take that program
//! down, so these operations go through [`never_fail`], which logs the error
//! and returns `None` instead.
//!
//! Setting `DUECITE_ALLOW_FAIL` turns the policy off: the error is raised as a
//! panic carrying the original message so test suites see it.

use crate::constants::ENV_ALLOW_FAIL;
use std::fmt::Display;

/// Whether `DUECITE_ALLOW_FAIL` asks for errors to be raised.
#[must_use]
pub fn allow_fail() -> bool {
    std::env::var(ENV_ALLOW_FAIL).is_ok_and(|value| raises(&value))
}

fn raises(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "" | "0" | "no" | "false")
}

/// Run `f`, logging and discarding its error.
///
/// `operation` names the call in the warning, e.g. `"Collector::cite"`.
pub fn never_fail<T, E, F>(operation: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    never_fail_with(allow_fail(), operation, f)
}

pub(crate) fn never_fail_with<T, E, F>(raise: bool, operation: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match f() {
        Ok(value) => Some(value),
        Err(e) if raise => panic!("{operation} failed: {e}"),
        Err(e) => {
            tracing::warn!(
                "duecite internal failure while running {}: {}. Citation collection continues",
                operation,
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DueError;
    use serial_test::serial;

    #[test]
    fn test_never_fail_passes_value_through() {
        let value = never_fail_with(false, "answer", || Ok::<_, DueError>(42));
        assert_eq!(value, Some(42));
    }

    #[test]
    fn test_never_fail_swallows_error() {
        let value: Option<u32> = never_fail_with(false, "cite", || Err(DueError::MissingPath));
        assert_eq!(value, None);
    }

    #[test]
    #[should_panic(expected = "cite failed: Citation requires a path")]
    fn test_never_fail_raises_when_allowed() {
        let _: Option<u32> = never_fail_with(true, "cite", || Err(DueError::MissingPath));
    }

    #[test]
    fn test_allow_fail_values() {
        for value in ["1", "yes", "TRUE", "anything"] {
            assert!(raises(value), "value {value:?}");
        }
        for value in ["", "0", " no ", "False"] {
            assert!(!raises(value), "value {value:?}");
        }
    }

    #[test]
    #[serial]
    fn test_allow_fail_reads_environment() {
        let previous = std::env::var(ENV_ALLOW_FAIL).ok();

        // Only values that keep the policy on: other tests rely on it
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var(ENV_ALLOW_FAIL, "no") };
        assert!(!allow_fail());
        // SAFETY: as above
        unsafe { std::env::remove_var(ENV_ALLOW_FAIL) };
        assert!(!allow_fail());

        if let Some(value) = previous {
            // SAFETY: as above
            unsafe { std::env::set_var(ENV_ALLOW_FAIL, value) };
        }
    }
}
