//! xyrecv-cli — receive XMODEM/YMODEM/YMODEM-G transfers over a serial port.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use xyrecv_core::core::protocol::xymodem::{IoPort, ReadOutcome, StdFileSinkFactory};
use xyrecv_core::core::transport::list_ports;
use xyrecv_core::{
    CliResult, Download, ExitCodes, OverrunPolicy, ReceiverConfig, SerialConfig, SerialParity,
    SerialPort, Session, XyError,
};

/// xyrecv — receive files via XMODEM/YMODEM/YMODEM-G
#[derive(Parser, Debug)]
#[command(
    name = "xyrecv",
    author = "xyrecv contributors",
    version,
    about = "XMODEM/YMODEM receiver for a serial link",
    long_about = None
)]
struct Cli {
    /// Verbose diagnostic output (this crate's own tracing log, separate
    /// from the protocol-level progress line)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    ListPorts,

    /// Receive one or more files over a serial port
    Receive {
        /// Serial port name (e.g., COM3, /dev/ttyUSB0)
        #[arg(short, long)]
        port: String,

        /// Baud rate
        #[arg(short, long, default_value = "115200")]
        baud: u32,

        /// Parity (none, odd, even)
        #[arg(long, default_value = "none")]
        parity: String,

        /// Directory to write received files into (defaults to the
        /// configured output directory, or the current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// What to do when a file's data exceeds its declared length
        #[arg(long, value_enum, default_value = "ignore")]
        overrun: OverrunArg,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OverrunArg {
    Ignore,
    Error,
    Accept,
    Mixed,
}

impl From<OverrunArg> for OverrunPolicy {
    fn from(v: OverrunArg) -> Self {
        match v {
            OverrunArg::Ignore => OverrunPolicy::Ignore,
            OverrunArg::Error => OverrunPolicy::Error,
            OverrunArg::Accept => OverrunPolicy::Accept,
            OverrunArg::Mixed => OverrunPolicy::Mixed,
        }
    }
}

/// Wraps a [`SerialPort`] to also render a progress line on stderr, in the
/// same spirit as the teacher's `TransferProgress::percent()`, and to turn
/// an operator Ctrl-C into the engine's own `XyError::Cancelled` exit
/// rather than killing the process out from under a half-written file.
struct CliPort {
    inner: SerialPort,
    cancelled: Arc<AtomicBool>,
}

impl IoPort for CliPort {
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, XyError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(XyError::Cancelled);
        }
        self.inner.read(timeout)
    }

    fn write(&mut self, byte: u8) -> Result<(), XyError> {
        self.inner.write(byte)
    }

    fn log(&mut self, message: &str) {
        eprintln!("{message}");
        tracing::info!("{message}");
    }

    fn progress(&mut self, bytes_written: u64, declared_total: u64) {
        if declared_total > 0 {
            let pct = (bytes_written * 100 / declared_total).min(100);
            eprint!("\r{pct:3}% ({bytes_written}/{declared_total} bytes)");
        } else {
            eprint!("\r{bytes_written} bytes");
        }
    }

    fn received(&mut self, download: Download) {
        eprintln!();
        eprintln!(
            "received {} ({} bytes)",
            download.name.as_deref().unwrap_or("<unnamed>"),
            download.bytes_written
        );
    }
}

fn run_receive(
    port: String,
    baud: u32,
    parity: String,
    output_dir: Option<PathBuf>,
    overrun: OverrunArg,
) -> CliResult {
    let saved = ReceiverConfig::load().unwrap_or_default();
    let output_dir = output_dir.unwrap_or(saved.output_dir);

    let parity: SerialParity = parity.parse().unwrap_or_default();
    let config = SerialConfig::new(&port, baud).parity(parity);

    let serial = match SerialPort::open(config) {
        Ok(p) => p,
        Err(e) => return CliResult::from(&e),
    };
    tracing::info!(link = %serial.connection_info(), "opened serial port");

    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_flag = cancelled.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
    let mut cli_port = CliPort { inner: serial, cancelled };

    let mut sinks = match StdFileSinkFactory::new(&output_dir) {
        Ok(s) => s,
        Err(e) => return CliResult::Error(ExitCodes::ERROR, e.to_string()),
    };

    let session = Session::new(overrun.into());
    match session.receive_all(&mut cli_port, &mut sinks) {
        Ok(downloads) => {
            CliResult::success_with_message(format!("received {} file(s)", downloads.len()))
        }
        Err(e) => CliResult::from(&e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .try_init();

    let result = match cli.command {
        Commands::ListPorts => match list_ports() {
            Ok(ports) => {
                for p in ports {
                    println!("{}", p.port_name);
                }
                CliResult::success()
            }
            Err(e) => CliResult::Error(ExitCodes::ERROR, e.to_string()),
        },
        Commands::Receive { port, baud, parity, output_dir, overrun } => {
            run_receive(port, baud, parity, output_dir, overrun)
        }
    };

    if let Some(msg) = result.message() {
        if result.is_success() {
            println!("{msg}");
        } else {
            eprintln!("error: {msg}");
        }
    }
    result.to_exit_code()
}
