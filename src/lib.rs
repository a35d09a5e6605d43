//! tola-embed - formatting and sanitization helpers for content sites.
//!
//! The core is [`svg::ScalableVectorGraphic`], which prepares SVG assets for
//! inlining: several copies of the same icon can live on one page because
//! every id, class and reference is namespaced per instance.
//!
//! Smaller helpers live in [`utils`] (links, dates, text, HTML attributes)
//! and [`video`] (YouTube/Vimeo URL normalization).

pub mod config;
pub mod logger;
pub mod svg;
pub mod utils;
pub mod video;
