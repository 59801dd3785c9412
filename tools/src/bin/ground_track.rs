use clap::Parser;
use satview_lib::map::{self, AngleUnit};
use std::fs::{self, File};
use std::io::{self, prelude::*, BufWriter};
use std::path::PathBuf;
use trackproto::parse_listing;

/// Write a satellite's trajectory as 'lat lon alt' rows, in degrees.
/// The current position is written when the listing has no trajectory.
///
/// The track is split where it crosses the antimeridian, segments are
/// separated by an empty line.
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Satellite name
    #[arg(short = 's', long)]
    satellite: String,

    /// The listing's angles are in radians
    #[arg(short = 'r', long)]
    radians: bool,

    /// Output file path to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Captured tracker stdout to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let opts = Opts::parse();

    let unit = if opts.radians {
        AngleUnit::Radians
    } else {
        AngleUnit::Degrees
    };

    let catalog = parse_listing(&fs::read_to_string(&opts.input)?);
    let rec = catalog
        .get(&opts.satellite)
        .ok_or_else(|| format!("Satellite '{}' is not in the listing", opts.satellite))?;

    // Without a trajectory the current position is the whole track
    let track: Vec<_> = if rec.trajectory.is_empty() {
        rec.lla.iter().map(|p| unit.to_degrees(*p)).collect()
    } else {
        rec.trajectory.iter().map(|p| unit.to_degrees(*p)).collect()
    };
    if track.is_empty() {
        return Err(format!("Satellite '{}' has no position data", opts.satellite).into());
    }

    let mut output = BufWriter::new(File::create(opts.output)?);
    for (idx, segment) in map::ground_track_segments(&track).iter().enumerate() {
        if idx != 0 {
            writeln!(&mut output)?;
        }
        for p in segment.iter() {
            writeln!(
                &mut output,
                "{} {} {}",
                p.latitude, p.longitude, p.altitude
            )?;
        }
    }
    output.flush()?;

    Ok(())
}
