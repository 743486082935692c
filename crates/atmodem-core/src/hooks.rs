//! Injected capabilities consulted by the response reader.
//!
//! Each hook has an explicit "absent" implementation ([`NullUrcHandler`],
//! [`NoWatchdog`]) so the reader never checks for a missing collaborator.
//! Closures implement the hook traits directly, which keeps one-off hooks in
//! tests and applications short.

/// Interceptor for unsolicited result codes.
///
/// The response reader offers every line that is neither a terminal marker
/// nor an expected payload line to the handler. Returning `true` claims the
/// line: it is consumed as a notification and never reaches the caller's
/// output buffer.
pub trait UrcHandler {
    fn handle(&mut self, line: &[u8]) -> bool;
}

impl<F> UrcHandler for F
where
    F: FnMut(&[u8]) -> bool,
{
    fn handle(&mut self, line: &[u8]) -> bool {
        self(line)
    }
}

/// URC handler that claims nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUrcHandler;

impl UrcHandler for NullUrcHandler {
    fn handle(&mut self, _line: &[u8]) -> bool {
        false
    }
}

/// Liveness signal to the surrounding runtime.
///
/// Reset once for every line read that produced data while waiting for a
/// response, so a modem streaming a long reply does not trip the watchdog.
pub trait Watchdog {
    fn reset(&mut self);
}

impl<F> Watchdog for F
where
    F: FnMut(),
{
    fn reset(&mut self) {
        self()
    }
}

/// Watchdog that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn reset(&mut self) {}
}

/// Modem power state, owned by the board support code.
pub trait PowerSwitch {
    fn is_on(&self) -> bool;
}
