//! atmodem-test-harness: Test utilities and mock streams for atmodem.
//!
//! This crate provides [`MockStream`] for deterministic testing of the
//! response reader without a modem attached, and [`ManualClock`] so that
//! every timeout in a test expires after a known number of polls instead of
//! wall-clock time.

pub mod mock_clock;
pub mod mock_serial;

pub use mock_clock::ManualClock;
pub use mock_serial::MockStream;
