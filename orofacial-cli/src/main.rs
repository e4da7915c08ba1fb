//! Command-line front end for orofacial tracking analysis.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Args, Parser, Subcommand};

use orofacial_algorithms::{
    keep_largest_component, track_frame, DirectionVector, TipConfig, TipLocator, TrackOptions,
};
use orofacial_io::{
    convert_jaw_file, convert_jaw_tree, load_mask_image, save_mask_image, save_tip_overlay,
};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    OrofacialIo(#[from] orofacial_io::Error),

    #[error("{0}")]
    Core(#[from] orofacial_core::Error),
}

/// Offline analysis tools for orofacial tracking experiments.
#[derive(Parser)]
#[command(name = "orofacial")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the tip-locating commands.
#[derive(Args, Debug, Clone)]
struct LocateArgs {
    /// X component of the expected tip direction
    #[arg(long, default_value = "-1.0", allow_negative_numbers = true)]
    hint_x: f64,

    /// Y component of the expected tip direction (positive = down)
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    hint_y: f64,

    /// Skip the distance-percentile prefilter (for wide, bottom-view masks)
    #[arg(long)]
    no_distance_filter: bool,

    /// Truncate the distance cutoff to whole pixels (matches older tracking output)
    #[arg(long)]
    integer_cutoff: bool,

    /// Keep only the largest connected component before locating
    #[arg(long)]
    largest_component: bool,
}

impl LocateArgs {
    fn hint(&self) -> DirectionVector {
        DirectionVector::new(self.hint_x, self.hint_y)
    }

    fn locator(&self) -> TipLocator {
        TipLocator::new(
            TipConfig::default()
                .with_distance_filter(!self.no_distance_filter)
                .with_integer_cutoff(self.integer_cutoff),
        )
    }

    fn track_options(&self) -> TrackOptions {
        TrackOptions::default().with_largest_component(self.largest_component)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the tongue tip in a binary mask image
    Tip {
        /// Mask image (foreground = bright)
        input: PathBuf,

        #[command(flatten)]
        locate: LocateArgs,

        /// Also print the stage that produced the tip
        #[arg(long)]
        detail: bool,

        /// Write the mask with the tip marked to this image
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Track the tongue tip across every frame of an HDF5 tongue archive
    #[cfg(feature = "hdf5")]
    Track {
        /// Tongue archive (.h5)
        input: PathBuf,

        /// Frame height in pixels
        #[arg(long)]
        height: u32,

        /// Frame width in pixels
        #[arg(long)]
        width: u32,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Frames loaded per parallel batch
        #[arg(long, default_value = "256")]
        chunk_size: usize,

        #[command(flatten)]
        locate: LocateArgs,
    },

    /// Convert jaw label JSON exports to CSV
    Jaw {
        /// JSON file, or a directory searched recursively for *.json
        input: PathBuf,

        /// Output CSV (single-file mode; defaults to INPUT with .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep only the largest connected component of a mask image
    Clean {
        /// Mask image
        input: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Tracks one chunk of archive entries, labelled with their video frame
/// numbers. Entries that cannot be expanded into a mask become failed
/// results instead of stopping the run.
#[cfg(feature = "hdf5")]
fn track_archive_chunk(
    archive: &orofacial_io::TongueArchive,
    entries: &[usize],
    (height, width): (u32, u32),
    hint: DirectionVector,
    locator: &TipLocator,
    options: &TrackOptions,
) -> Vec<orofacial_algorithms::FrameResult> {
    use orofacial_algorithms::{track_frames, Error, FrameResult};

    // One slot per entry: `None` for a loaded mask, the load error otherwise.
    let mut slots = Vec::with_capacity(entries.len());
    let mut masks = Vec::with_capacity(entries.len());
    for &entry in entries {
        let frame = archive.frame_number(entry);
        match archive.frame_mask(entry, height, width) {
            Ok(mask) => {
                masks.push((frame, mask));
                slots.push((frame, None));
            }
            Err(e) => {
                log::warn!("frame {frame}: {e}");
                slots.push((frame, Some(e.to_string())));
            }
        }
    }

    let mut tracked = track_frames(masks, hint, locator, options).into_iter();
    slots
        .into_iter()
        .filter_map(|(frame, load_error)| match load_error {
            None => tracked.next(),
            Some(message) => Some(FrameResult {
                frame,
                outcome: Err(Error::InvalidInput(message)),
            }),
        })
        .collect()
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tip {
            input,
            locate,
            detail,
            overlay,
        } => {
            let mask = load_mask_image(&input)?;
            let estimate = track_frame(
                &mask,
                locate.hint(),
                &locate.locator(),
                &locate.track_options(),
            )?;
            if let Some(overlay) = overlay {
                save_tip_overlay(&mask, estimate.tip, &overlay)?;
                log::info!("Wrote overlay to {}", overlay.display());
            }
            if detail {
                println!("{} {} {}", estimate.tip.x, estimate.tip.y, estimate.stage);
            } else {
                println!("{} {}", estimate.tip.x, estimate.tip.y);
            }
        }

        #[cfg(feature = "hdf5")]
        Commands::Track {
            input,
            height,
            width,
            output,
            chunk_size,
            locate,
        } => {
            use orofacial_io::{TipCsvWriter, TongueArchive};

            let start = Instant::now();
            let archive = TongueArchive::open(&input)?;
            let frame_count = archive.frame_count();
            let locator = locate.locator();
            let options = locate.track_options();
            let hint = locate.hint();

            log::info!(
                "Tracking {} frames from {} ({}x{})",
                frame_count,
                input.display(),
                width,
                height
            );

            let mut writer = TipCsvWriter::create(&output)?;
            writer.write_header()?;
            let mut located = 0usize;

            let entries: Vec<usize> = (0..frame_count).collect();
            for chunk in entries.chunks(chunk_size.max(1)) {
                let results =
                    track_archive_chunk(&archive, chunk, (height, width), hint, &locator, &options);
                for result in results {
                    located += usize::from(result.outcome.is_ok());
                    writer.write_result(&result)?;
                }
            }
            writer.flush()?;

            println!(
                "Tracked {} frames in {:.2}s ({} located)",
                frame_count,
                start.elapsed().as_secs_f64(),
                located
            );
            println!("Output: {}", output.display());
        }

        Commands::Jaw { input, output } => {
            let start = Instant::now();
            if input.is_dir() {
                let converted = convert_jaw_tree(&input)?;
                for (path, summary) in &converted {
                    println!(
                        "Converted {} ({} rows, {} skipped)",
                        path.display(),
                        summary.written,
                        summary.skipped
                    );
                }
                println!(
                    "Converted {} files in {:.2}s",
                    converted.len(),
                    start.elapsed().as_secs_f64()
                );
            } else {
                let output = output.unwrap_or_else(|| input.with_extension("csv"));
                let summary = convert_jaw_file(&input, &output)?;
                println!(
                    "Converted {} -> {} ({} rows, {} skipped)",
                    input.display(),
                    output.display(),
                    summary.written,
                    summary.skipped
                );
            }
        }

        Commands::Clean { input, output } => {
            let mask = load_mask_image(&input)?;
            let cleaned = keep_largest_component(&mask);
            save_mask_image(&cleaned, &output)?;
            println!(
                "Kept {} of {} foreground pixels",
                cleaned.foreground_count(),
                mask.foreground_count()
            );
        }
    }

    Ok(())
}
