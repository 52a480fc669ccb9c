// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kirchhoff_mig::io;
use kirchhoff_mig::progress::{ProgressSink, SilentProgress, TextProgress};
use kirchhoff_mig::section::{PreparedSection, RadarSection, ICE_VELOCITY};
use kirchhoff_mig::{KirchhoffMigrator, SearchStrategy};

#[derive(Parser)]
#[command(
    name = "kirchhoff-mig",
    about = "Kirchhoff diffraction-stack migration of a 2D radar section"
)]
struct Cli {
    /// Section as a .mat file with `data`, `travel_time` (us) and `dist` (km)
    #[arg(short = 'i', long, conflicts_with_all = ["data", "travel_time", "dist"])]
    input: Option<PathBuf>,

    /// Section data as .npy, samples x traces
    #[arg(long, requires_all = ["travel_time", "dist"])]
    data: Option<PathBuf>,

    /// Two-way time axis as .npy, in microseconds
    #[arg(long)]
    travel_time: Option<PathBuf>,

    /// Trace positions as .npy, in kilometres
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Propagation velocity in m/s
    #[arg(short = 'v', long, default_value_t = ICE_VELOCITY)]
    velocity: f64,

    /// Aperture cutoff on two-way time in seconds (default: end of the time axis)
    #[arg(long)]
    max_travel_time: Option<f64>,

    /// Depth search: "cursor" (seeded, default) or "full"
    #[arg(long, default_value = "cursor")]
    search: SearchStrategy,

    /// Number of worker threads
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Near-field flag (accepted for compatibility; has no effect)
    #[arg(long)]
    nearfield: bool,

    /// Suppress progress output on stdout
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Debug-level diagnostics on stderr
    #[arg(long)]
    verbose: bool,

    /// Output file path (.npy or .mat)
    #[arg(short = 'o', long, default_value = "migrated.npy")]
    output: PathBuf,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_section(cli: &Cli) -> Result<RadarSection> {
    if let Some(path) = &cli.input {
        return io::load_section_mat(path)
            .with_context(|| format!("failed to load section from {}", path.display()));
    }
    match (&cli.data, &cli.travel_time, &cli.dist) {
        (Some(data), Some(tt), Some(dist)) => io::load_section_npy(data, tt, dist)
            .with_context(|| format!("failed to load section from {}", data.display())),
        _ => bail!("either --input or all of --data, --travel-time and --dist must be given"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let section = load_section(&cli)?;
    info!(
        traces = section.tnum(),
        samples = section.snum(),
        "loaded section"
    );

    let prepared = PreparedSection::from_section(&section, cli.velocity)
        .context("failed to prepare section")?;
    let input = prepared.as_input().context("section is not migratable")?;

    let max_travel_time = cli.max_travel_time.unwrap_or(prepared.max_travel_time());
    let migrator = KirchhoffMigrator::new(cli.velocity, max_travel_time)?
        .with_search(cli.search)
        .with_threads(cli.threads)?
        .with_nearfield(cli.nearfield);

    let mut text = TextProgress::stdout();
    let mut silent = SilentProgress;
    let progress: &mut dyn ProgressSink = if cli.quiet { &mut silent } else { &mut text };
    let image = migrator
        .migrate(&input, Some(progress))
        .context("migration failed")?;

    io::save_image(&image, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "saved migrated image");

    Ok(())
}
