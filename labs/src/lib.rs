//! Lab programs for image display, filtering, edge detection and video
//! cartoonisation.
//!
//! Each binary under `src/bin` parses its arguments and hands over to one
//! function in [`programs`]; keeping the bodies here lets them run against a
//! [`display::HeadlessViewer`] in tests.

pub mod cli;
pub mod config;
pub mod display;
pub mod edge_explorer;
pub mod programs;

pub use config::EdgeParams;
pub use display::{open_viewer, Key, Viewer};
pub use edge_explorer::{EdgeExplorer, SliderState};
