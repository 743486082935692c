// atmodem test application -- CLI tool for sending AT commands to a modem
// on a serial port (or a scripted mock) and printing the classified
// response.
//
// Usage:
//   atmodem-test-app --port /dev/ttyUSB0 --baud 115200 send AT+CSQ --prefix "+CSQ: "
//   atmodem-test-app --port /dev/ttyACM0 send AT+COPS? --prefix "+COPS: " --timeout-ms 5000
//   atmodem-test-app --port /dev/ttyUSB0 send AT+CGMR --urc +CEREG: --urc +UUSORD:
//   atmodem-test-app --mock send ATI
//   atmodem-test-app list
//
// The exit status is non-zero when the modem answers with an error result
// code or does not finish its response in time.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use atmodem::serial::{SerialStream, list_ports};
use atmodem::{ByteStream, Clock, ModemBuilder, ResponseOutcome, SystemClock, terminated};
use atmodem_test_harness::MockStream;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// atmodem test application -- sends AT commands from the command line.
#[derive(Parser)]
#[command(name = "atmodem-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required for `send` unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Answer from a scripted mock modem instead of a real serial port.
    /// Useful for verifying CLI parsing and builder wiring without hardware.
    #[arg(long)]
    mock: bool,

    /// Log every line sent and received (same as RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one AT command and print its response.
    Send {
        /// The command, without the trailing carriage return (e.g. AT+CSQ).
        command: String,

        /// Only lines starting with this prefix are payload; the prefix is
        /// stripped (e.g. "+CSQ: "). Without it every unclaimed line is payload.
        #[arg(long)]
        prefix: Option<String>,

        /// Overall response timeout in milliseconds.
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,

        /// Size of the response buffer in bytes, terminator included.
        #[arg(long, default_value_t = 512)]
        buffer: usize,

        /// Treat lines starting with this prefix as unsolicited result codes
        /// and report them separately. May be given more than once.
        #[arg(long = "urc")]
        urcs: Vec<String>,
    },

    /// List the serial ports present on this host.
    List,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

// ---------------------------------------------------------------------------
// Mock modem
// ---------------------------------------------------------------------------

/// Canned replies for the mock modem, keyed by command.
fn mock_reply(command: &str) -> &'static [u8] {
    match command.to_ascii_uppercase().as_str() {
        "AT" | "ATE0" | "ATE1" => b"OK\r\n",
        "ATI" => b"Manufacturer: u-blox\r\nModel: SARA-R410M-02B\r\nRevision: L0.0.00.00.05.08\r\n\r\nOK\r\n",
        "AT+CGMI" => b"u-blox\r\n\r\nOK\r\n",
        "AT+CGMM" => b"SARA-R410M-02B\r\n\r\nOK\r\n",
        "AT+CSQ" => b"+CSQ: 15,99\r\n\r\nOK\r\n",
        "AT+CREG?" => b"+CEREG: 5\r\n+CREG: 0,5\r\n\r\nOK\r\n",
        "AT+COPS?" => b"+COPS: 0,0,\"Vodafone\",7\r\n\r\nOK\r\n",
        "AT+CPIN?" => b"+CME ERROR: 10\r\n",
        _ => b"ERROR\r\n",
    }
}

fn mock_stream(command: &str) -> MockStream {
    let mut mock = MockStream::new();
    let request = format!("{command}\r");
    mock.expect(request.as_bytes(), mock_reply(command));
    mock
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<ExitCode> {
    let ports = list_ports().context("failed to list serial ports")?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        for port in ports {
            println!("{port}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

struct SendArgs<'a> {
    command: &'a str,
    prefix: Option<&'a str>,
    timeout: Duration,
    buffer: usize,
    urcs: &'a [String],
}

fn cmd_send<S, C>(stream: S, clock: C, args: &SendArgs<'_>) -> Result<ExitCode>
where
    S: ByteStream,
    C: Clock,
{
    let urcs: Vec<Vec<u8>> = args.urcs.iter().map(|u| u.as_bytes().to_vec()).collect();

    let mut modem = ModemBuilder::new()
        .urc_handler(move |line: &[u8]| {
            if urcs.iter().any(|u| line.starts_with(u)) {
                println!("URC: {}", String::from_utf8_lossy(line));
                return true;
            }
            false
        })
        .build(stream, clock)
        .context("failed to build modem reader")?;

    let mut out = vec![0u8; args.buffer];
    let outcome = modem
        .command(args.command, &mut out, args.prefix, args.timeout)
        .with_context(|| format!("failed to send '{}'", args.command))?;

    let payload = terminated(&out);
    if !payload.is_empty() {
        println!("{}", String::from_utf8_lossy(payload));
    }
    println!("{outcome}");

    Ok(if outcome == ResponseOutcome::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let (command, prefix, timeout_ms, buffer, urcs) = match &cli.command {
        Command::List => return cmd_list(),
        Command::Send {
            command,
            prefix,
            timeout_ms,
            buffer,
            urcs,
        } => (command, prefix, *timeout_ms, *buffer, urcs),
    };

    let args = SendArgs {
        command,
        prefix: prefix.as_deref(),
        timeout: Duration::from_millis(timeout_ms),
        buffer,
        urcs,
    };

    if cli.mock {
        return cmd_send(mock_stream(command), SystemClock::new(), &args);
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required unless --mock is used")?;
    let stream = SerialStream::open(port, cli.baud)
        .with_context(|| format!("failed to open serial port {port}"))?;

    cmd_send(stream, SystemClock::new(), &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmodem_test_harness::ManualClock;

    fn send(command: &str, prefix: Option<&str>) -> ExitCode {
        let args = SendArgs {
            command,
            prefix,
            timeout: Duration::from_secs(1),
            buffer: 128,
            urcs: &["+CEREG:".to_string()],
        };
        cmd_send(mock_stream(command), ManualClock::new(), &args).unwrap()
    }

    #[test]
    fn cli_parses_send() {
        let cli = Cli::try_parse_from([
            "atmodem-test-app",
            "--mock",
            "send",
            "AT+CSQ",
            "--prefix",
            "+CSQ: ",
            "--timeout-ms",
            "500",
        ])
        .unwrap();
        assert!(cli.mock);
        match cli.command {
            Command::Send {
                command,
                prefix,
                timeout_ms,
                buffer,
                urcs,
            } => {
                assert_eq!(command, "AT+CSQ");
                assert_eq!(prefix.as_deref(), Some("+CSQ: "));
                assert_eq!(timeout_ms, 500);
                assert_eq!(buffer, 512);
                assert!(urcs.is_empty());
            }
            Command::List => panic!("expected send"),
        }
    }

    #[test]
    fn mock_success_exits_zero() {
        assert_eq!(send("AT+CSQ", Some("+CSQ: ")), ExitCode::SUCCESS);
        assert_eq!(send("AT+CREG?", Some("+CREG: ")), ExitCode::SUCCESS);
    }

    #[test]
    fn mock_error_exits_non_zero() {
        assert_eq!(send("AT+CPIN?", None), ExitCode::FAILURE);
        assert_eq!(send("AT+BOGUS", None), ExitCode::FAILURE);
    }
}
