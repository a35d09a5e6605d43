//! Formatting helpers shared by templates and the CLI.

pub mod date;
pub mod hash;
pub mod html;
pub mod link;
pub mod text;
