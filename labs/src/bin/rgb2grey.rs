//! Convert a colour image to greyscale.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a colour image to greyscale", long_about = None)]
#[command(after_help = "Example: rgb2grey lena.png lena_grey.png")]
struct Args {
    /// Colour image to read
    input_image: PathBuf,

    /// Where to write the greyscale image
    output_image: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut viewer = open_viewer(args.display.headless)?;
        programs::rgb2grey(viewer.as_mut(), &args.input_image, &args.output_image)
    });
}
