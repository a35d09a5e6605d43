//! `[video]` section configuration.
//!
//! ```toml
//! [video]
//! privacy_enhanced = true   # youtube-nocookie.com / Vimeo dnt=1
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Use privacy-enhanced embed URLs.
    pub privacy_enhanced: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            privacy_enhanced: true,
        }
    }
}
