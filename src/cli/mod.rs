//! Command-line interface module.

mod args;
pub mod format;
pub mod svg;

pub use args::{Cli, Commands, SvgArgs};
