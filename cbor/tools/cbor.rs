/*!
CBOR Tools - A CLI for decoding CBOR data and checking decoder conformance

# Commands

- `inspect`: Decode CBOR data and display it in various formats (diagnostic, JSON, hex)
- `fixtures`: Write the built-in conformance cases as JSON fixture files
- `verify`: Run fixture files against the decoder

# Examples

```bash
# Inspect a CBOR file (diagnostic notation)
cbor inspect bundle.cbor

# Inspect hex text from stdin as JSON (lossy)
echo 'a163666f6f01' | cbor inspect --hex --format json -

# Inspect every item of a CBOR sequence
cbor inspect --sequence items.cbor

# Generate fixtures, then check them
cbor fixtures -o fixtures/
cbor verify fixtures/TestDecodeSuccess.json fixtures/TestDecodeError.json
```
*/

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cases;
mod fixtures;
mod inspect;
mod io;
mod verify;

/// A CLI tool for working with CBOR data
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for decoding CBOR data and checking decoder conformance",
    long_about = "CBOR Tools provides utilities for working with CBOR (Concise Binary Object Representation) data.\n\n\
                  Features:\n\
                  - Decode CBOR data into human-readable formats\n\
                  - Generate conformance fixtures from the built-in case tables\n\
                  - Verify fixture files against the decoder"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode and display CBOR data in various formats
    Inspect(inspect::Command),

    /// Write conformance fixture files
    Fixtures(fixtures::Command),

    /// Check fixture files against the decoder
    Verify(verify::Command),
}

fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Inspect(args) => args.exec(),
        Commands::Fixtures(args) => args.exec(),
        Commands::Verify(args) => args.exec(),
    }
}
