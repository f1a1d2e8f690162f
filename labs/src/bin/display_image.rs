//! Show an image in a window until a key is pressed.

use std::path::PathBuf;

use clap::Parser;
use labs::cli::{run, DisplayArgs};
use labs::{open_viewer, programs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Display an image", long_about = None)]
#[command(after_help = "Example: display_image lena.png")]
struct Args {
    /// Image to display
    input_image: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() {
    run(|args: Args| {
        let mut viewer = open_viewer(args.display.headless)?;
        programs::display_image(viewer.as_mut(), &args.input_image)
    });
}
