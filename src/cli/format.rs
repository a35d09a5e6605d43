//! `video`, `range` and `tel` subcommands.
//!
//! Each prints one HTML fragment to stdout.

use anyhow::{Result, anyhow};
use tola_embed::{
    config::{DateConfig, VideoConfig},
    utils::{
        date::{DateTimeUtc, format_range, format_range_html},
        link::format_tel,
    },
    video::Video,
};

/// iframe markup for a video link.
pub fn video(url: &str, title: &str, privacy: Option<bool>, config: &VideoConfig) -> Result<String> {
    let video = Video::parse(url)?;
    let privacy = privacy.unwrap_or(config.privacy_enhanced);
    Ok(video.iframe(title, privacy))
}

/// Formatted range between two dates; a missing end means a single day.
pub fn range(start: &str, end: Option<&str>, html: bool, config: &DateConfig) -> Result<String> {
    let start = parse_date(start)?;
    let end = end.map(parse_date).transpose()?.unwrap_or(start);
    let style = config.range_style();
    Ok(if html {
        format_range_html(start, end, &style)
    } else {
        format_range(start, end, &style)
    })
}

/// Parsing also rejects impossible dates such as `2024-02-30`.
fn parse_date(input: &str) -> Result<DateTimeUtc> {
    DateTimeUtc::parse(input).ok_or_else(|| anyhow!("unrecognized date `{input}`"))
}

/// `<a href="tel:...">` for a phone number.
pub fn tel(number: &str, text: Option<&str>) -> Result<String> {
    format_tel(number, text).ok_or_else(|| anyhow!("`{number}` contains no digits"))
}
