//! Smooth a colour image with a square mean filter.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Apply a mean filter to an image", long_about = None)]
#[command(after_help = "Example: mean_filter lena.png lena_blur.png 2")]
struct Args {
    /// Image to read
    input_image: PathBuf,

    /// Where to write the filtered image
    output_image: PathBuf,

    /// Kernel radius; the window is 2 * radius + 1 pixels wide
    #[arg(default_value_t = 1)]
    kernel_radius: u32,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut viewer = open_viewer(args.display.headless)?;
        programs::mean_filter(
            viewer.as_mut(),
            &args.input_image,
            &args.output_image,
            args.kernel_radius,
        )
    });
}
