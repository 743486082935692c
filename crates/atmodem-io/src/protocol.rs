//! AT response line vocabulary and classification.
//!
//! Every line the modem sends while a command is outstanding falls into
//! exactly one [`LineClass`]. Rules are tried in a fixed order and the first
//! match wins; all comparisons are case-sensitive literal prefixes:
//!
//! 1. `AT...` -- the modem echoing our command back
//! 2. `OK` -- success, end of response
//! 3. `ERROR`, `+CME ERROR:`, `+CMS ERROR:` -- failure, end of response
//! 4. the expected prefix, when one was given and output is wanted
//! 5. anything the [`UrcHandler`] claims
//! 6. any line at all, when no prefix was given and output is wanted
//! 7. everything else is dropped

use atmodem_core::hooks::UrcHandler;

/// Line terminator sent by the modem. Framing stops on its last byte.
pub const TERMINATOR: &[u8] = b"\r\n";

/// Terminator appended to outgoing commands.
pub const COMMAND_TERMINATOR: u8 = b'\r';

/// Leading bytes of an echoed command.
pub const ECHO_PREFIX: &[u8] = b"AT";

/// Final result code for success.
pub const OK_RESPONSE: &[u8] = b"OK";

/// Final result codes for failure.
pub const ERROR_RESPONSES: &[&[u8]] = &[b"ERROR", b"+CME ERROR:", b"+CMS ERROR:"];

/// How the response reader treats one framed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Echoed command; skipped.
    Echo,
    /// `OK`; the response is complete.
    Success,
    /// An error result code; the response is complete.
    Error,
    /// Response payload. The first `strip` bytes (the matched prefix) are
    /// dropped before the line is appended to the output.
    Payload { strip: usize },
    /// Claimed by the URC handler.
    Urc,
    /// Matched no rule and nobody wanted it.
    Unhandled,
}

impl LineClass {
    /// Whether this line ends the response.
    pub fn is_terminal(self) -> bool {
        matches!(self, LineClass::Success | LineClass::Error)
    }
}

/// Classify `line` against the rules listed in the module docs.
///
/// `prefix` is the expected payload prefix; an empty prefix counts as none.
/// `output_enabled` says whether the caller supplied somewhere to put
/// payload. The URC handler is only consulted for lines that are not
/// terminal and did not match the prefix.
pub fn classify(
    line: &[u8],
    prefix: Option<&[u8]>,
    output_enabled: bool,
    urc_handler: &mut dyn UrcHandler,
) -> LineClass {
    if line.starts_with(ECHO_PREFIX) {
        return LineClass::Echo;
    }

    if line.starts_with(OK_RESPONSE) {
        return LineClass::Success;
    }

    if is_error_response(line) {
        return LineClass::Error;
    }

    let prefix = prefix.filter(|p| !p.is_empty());

    if let Some(p) = prefix {
        if output_enabled && line.starts_with(p) {
            return LineClass::Payload { strip: p.len() };
        }
    }

    if urc_handler.handle(line) {
        return LineClass::Urc;
    }

    if prefix.is_none() && output_enabled {
        return LineClass::Payload { strip: 0 };
    }

    LineClass::Unhandled
}

/// Whether `line` begins with one of the [`ERROR_RESPONSES`].
pub fn is_error_response(line: &[u8]) -> bool {
    ERROR_RESPONSES.iter().any(|marker| line.starts_with(marker))
}

/// Length of `line` with the leading part of [`TERMINATOR`] removed.
///
/// Framing stops on the terminator's last byte and does not store it, so
/// a complete line still ends with every byte before it (for CR LF, the
/// CR). Lines shorter than that remainder are returned untouched.
pub fn strip_terminator(line: &[u8], terminator: &[u8]) -> usize {
    let head = &terminator[..terminator.len().saturating_sub(1)];
    if !head.is_empty() && line.ends_with(head) {
        line.len() - head.len()
    } else {
        line.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmodem_core::hooks::NullUrcHandler;

    /// Claims lines starting with `+UUSORD`.
    fn socket_urcs(line: &[u8]) -> bool {
        line.starts_with(b"+UUSORD")
    }

    fn classify_plain(line: &[u8], prefix: Option<&[u8]>, output: bool) -> LineClass {
        classify(line, prefix, output, &mut NullUrcHandler)
    }

    // -----------------------------------------------------------------------
    // Terminal markers and echo
    // -----------------------------------------------------------------------

    #[test]
    fn echo_is_skipped() {
        assert_eq!(classify_plain(b"AT+CSQ", None, true), LineClass::Echo);
        assert_eq!(classify_plain(b"AT", Some(b"+CSQ: "), true), LineClass::Echo);
    }

    #[test]
    fn ok_is_success() {
        assert_eq!(classify_plain(b"OK", None, true), LineClass::Success);
        assert!(LineClass::Success.is_terminal());
    }

    #[test]
    fn error_markers() {
        assert_eq!(classify_plain(b"ERROR", None, true), LineClass::Error);
        assert_eq!(
            classify_plain(b"+CME ERROR: 10", None, true),
            LineClass::Error
        );
        assert_eq!(
            classify_plain(b"+CMS ERROR: 500", Some(b"+CMS"), true),
            LineClass::Error
        );
        assert!(LineClass::Error.is_terminal());
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify_plain(b"ok", None, false), LineClass::Unhandled);
        assert_eq!(classify_plain(b"at+csq", None, false), LineClass::Unhandled);
        assert_eq!(classify_plain(b"error", None, false), LineClass::Unhandled);
    }

    #[test]
    fn echo_wins_over_everything() {
        // Precedence: an "AT" line is an echo even if it also matches the prefix.
        assert_eq!(classify_plain(b"ATI", Some(b"AT"), true), LineClass::Echo);
    }

    // -----------------------------------------------------------------------
    // Payload and URC precedence
    // -----------------------------------------------------------------------

    #[test]
    fn prefixed_payload_strips_prefix_length() {
        assert_eq!(
            classify_plain(b"+CSQ: 15,99", Some(b"+CSQ: "), true),
            LineClass::Payload { strip: 6 }
        );
    }

    #[test]
    fn prefix_without_output_is_not_payload() {
        assert_eq!(
            classify_plain(b"+CSQ: 15,99", Some(b"+CSQ: "), false),
            LineClass::Unhandled
        );
    }

    #[test]
    fn unprefixed_request_takes_whole_line() {
        assert_eq!(
            classify_plain(b"356938035643809", None, true),
            LineClass::Payload { strip: 0 }
        );
    }

    #[test]
    fn empty_prefix_counts_as_none() {
        assert_eq!(
            classify_plain(b"356938035643809", Some(b""), true),
            LineClass::Payload { strip: 0 }
        );
    }

    #[test]
    fn urc_claimed_before_catch_all_payload() {
        let mut handler = socket_urcs;
        assert_eq!(
            classify(b"+UUSORD: 0,12", None, true, &mut handler),
            LineClass::Urc
        );
    }

    #[test]
    fn prefix_match_is_never_offered_as_urc() {
        let mut offered = 0;
        let mut handler = |_: &[u8]| {
            offered += 1;
            true
        };
        assert_eq!(
            classify(b"+CSQ: 15,99", Some(b"+CSQ: "), true, &mut handler),
            LineClass::Payload { strip: 6 }
        );
        assert_eq!(offered, 0);
    }

    #[test]
    fn terminal_lines_are_never_offered_as_urc() {
        let mut offered = 0;
        let mut handler = |_: &[u8]| {
            offered += 1;
            true
        };
        classify(b"OK", None, true, &mut handler);
        classify(b"+CME ERROR: 3", None, true, &mut handler);
        classify(b"AT+COPS?", None, true, &mut handler);
        assert_eq!(offered, 0);
    }

    #[test]
    fn unclaimed_non_matching_line_is_dropped_when_prefix_requested() {
        // A line that matches neither the prefix nor any URC is silently
        // discarded rather than surfacing as an error.
        let mut handler = socket_urcs;
        assert_eq!(
            classify(b"+CREG: 0,1", Some(b"+CSQ: "), true, &mut handler),
            LineClass::Unhandled
        );
    }

    // -----------------------------------------------------------------------
    // strip_terminator
    // -----------------------------------------------------------------------

    #[test]
    fn strip_trailing_cr() {
        assert_eq!(strip_terminator(b"OK\r", TERMINATOR), 2);
    }

    #[test]
    fn no_cr_no_strip() {
        assert_eq!(strip_terminator(b"OK", TERMINATOR), 2);
    }

    #[test]
    fn empty_line_no_strip() {
        assert_eq!(strip_terminator(b"", TERMINATOR), 0);
    }

    #[test]
    fn lone_cr_strips_to_empty() {
        assert_eq!(strip_terminator(b"\r", TERMINATOR), 0);
    }

    #[test]
    fn only_one_cr_is_stripped() {
        assert_eq!(strip_terminator(b"AT\r\r", TERMINATOR), 3);
    }

    #[test]
    fn single_byte_terminator_never_strips() {
        assert_eq!(strip_terminator(b"FA;", b";"), 3);
    }

    #[test]
    fn three_byte_terminator_boundaries() {
        let term = b"\r\r\n";
        // Shorter than the two-byte head: untouched.
        assert_eq!(strip_terminator(b"\r", term), 1);
        // Exactly the head.
        assert_eq!(strip_terminator(b"\r\r", term), 0);
        assert_eq!(strip_terminator(b"OK\r\r", term), 2);
        // Partial head does not match.
        assert_eq!(strip_terminator(b"OK\n\r", term), 4);
    }
}
