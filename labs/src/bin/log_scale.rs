//! Apply a logarithmic intensity transform to the grey levels of an image.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Log-scale the grey levels of an image", long_about = None)]
#[command(after_help = "Example: log_scale dark.png dark_log.png")]
struct Args {
    /// Image to read
    input_image: PathBuf,

    /// Where to write the log-scaled grey image
    output_image: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut viewer = open_viewer(args.display.headless)?;
        programs::log_scale(viewer.as_mut(), &args.input_image, &args.output_image)
    });
}
