//! Play a video next to a cartoonised copy of each frame.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --features sdl2 --bin video_from_file -- SAMPLING.gif 0.25 test.mjpeg
//! cargo run --release --bin video_from_file -- frames/ 1 cartoon.gif --headless --fps 30
//! ```
//!
//! Inputs and outputs may be animated GIFs, MJPEG streams (`.mjpeg`/`.mjpg`)
//! or directories of numbered still images. `q` or Escape stops playback.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{parse_positive, run, DisplayArgs};
use labs::config::load_or_default;
use labs::programs::{self, VideoOptions};
use labs::open_viewer;
use shared::video::DEFAULT_FPS;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cartoonise a video", long_about = None)]
#[command(after_help = "Example: video_from_file SAMPLING.gif 0.25 test.mjpeg")]
struct Args {
    /// Video to read
    input_video: PathBuf,

    /// Scale applied to every frame before processing
    #[arg(value_parser = parse_positive)]
    scaling_factor: f64,

    /// Where to write the composite video
    output_video: Option<PathBuf>,

    /// Frame rate for inputs that do not record one
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = parse_positive)]
    fps: f64,

    /// JSON file with cartoon pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let options = VideoOptions {
            output: args.output_video,
            fallback_fps: args.fps,
            params: load_or_default(args.config.as_deref())?,
            progress: args.display.headless,
            ..VideoOptions::new(args.input_video, args.scaling_factor)
        };
        let mut viewer = open_viewer(args.display.headless)?;
        programs::video_from_file(viewer.as_mut(), &options)?;
        Ok(())
    });
}
