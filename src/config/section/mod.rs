//! Configuration section definitions.
//!
//! Each module corresponds to a section in `embed.toml`:
//!
//! | Module  | TOML Section | Purpose                                |
//! |---------|--------------|----------------------------------------|
//! | `svg`   | `[svg]`      | Default sanitizer edits                |
//! | `video` | `[video]`    | Embed privacy mode                     |
//! | `date`  | `[date]`     | Range separator and month names        |

mod date;
mod svg;
mod video;

pub use date::DateConfig;
pub use svg::SvgConfig;
pub use video::VideoConfig;
