//! Shared value types.

use std::fmt;

/// The result of waiting for a command's response.
///
/// Produced exactly once per response read. `Timeout` is an ordinary
/// outcome, not an error: the caller decides whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseOutcome {
    /// The modem answered `OK`.
    Success,
    /// The modem answered `ERROR`, `+CME ERROR:` or `+CMS ERROR:`.
    Error,
    /// No terminal marker arrived in time.
    Timeout,
}

impl ResponseOutcome {
    pub fn is_success(self) -> bool {
        self == ResponseOutcome::Success
    }
}

impl fmt::Display for ResponseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseOutcome::Success => "OK",
            ResponseOutcome::Error => "ERROR",
            ResponseOutcome::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}
