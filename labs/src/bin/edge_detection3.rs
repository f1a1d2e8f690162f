//! Interactive Canny edge detection.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --features sdl2 --bin edge_detection3 -- lena.png edges.png
//! cargo run --release --bin edge_detection3 -- lena.png edges.png --headless --low 40 --high 90
//! ```
//!
//! The window shows the grey image, its gradient magnitude and the Canny
//! edges side by side. Left/Right move the low threshold slider, Down/Up the
//! high one. `q` or Escape writes the current edge map and exits.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::config::{load_or_default, EdgeParams};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore Canny edge detection thresholds", long_about = None)]
#[command(after_help = "Example: edge_detection3 lena.png lena_canny.png --low 32")]
struct Args {
    /// Image to read
    input_image: PathBuf,

    /// Where to write the edge map
    output_image: PathBuf,

    /// Initial low threshold slider position
    #[arg(long)]
    low: Option<u32>,

    /// Initial high threshold slider position
    #[arg(long)]
    high: Option<u32>,

    /// JSON file with explorer settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut params: EdgeParams = load_or_default(args.config.as_deref())?;
        if let Some(low) = args.low {
            params.low = low;
        }
        if let Some(high) = args.high {
            params.high = high;
        }
        let mut viewer = open_viewer(args.display.headless)?;
        programs::edge_detection3(viewer.as_mut(), &args.input_image, &args.output_image, &params)
    });
}
