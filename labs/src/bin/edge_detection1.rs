//! Gradient-based edge detection with a fixed threshold.
//!
//! Shows the normalised grey image, its Scharr gradient magnitude and the
//! thresholded edges, then writes the edges once `q` or Escape is pressed.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect edges with the Scharr operator", long_about = None)]
#[command(after_help = "Example: edge_detection1 lena.png lena_edges.png")]
struct Args {
    /// Image to read
    input_image: PathBuf,

    /// Where to write the edge map
    output_image: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut viewer = open_viewer(args.display.headless)?;
        programs::edge_detection1(viewer.as_mut(), &args.input_image, &args.output_image)
    });
}
