use clap::Parser;
use std::fs;
use std::io::{self, prelude::*};
use std::path::PathBuf;
use trackproto::parse_listing;

/// Print a captured tracker listing as JSON
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Only print this satellite's record
    #[arg(short = 's', long)]
    satellite: Option<String>,

    /// Pretty-print the JSON output
    #[arg(short = 'p', long)]
    pretty: bool,

    /// Captured tracker stdout to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let opts = Opts::parse();

    let text = fs::read_to_string(&opts.input)?;
    let catalog = parse_listing(&text);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &opts.satellite {
        Some(name) => {
            let rec = catalog
                .get(name)
                .ok_or_else(|| format!("Satellite '{name}' is not in the listing"))?;
            write_json(&mut out, rec, opts.pretty)?;
        }
        None => write_json(&mut out, &catalog, opts.pretty)?,
    }
    writeln!(&mut out)?;

    Ok(())
}

fn write_json<W: Write, T: serde::Serialize>(
    out: W,
    value: &T,
    pretty: bool,
) -> serde_json::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(out, value)
    } else {
        serde_json::to_writer(out, value)
    }
}
