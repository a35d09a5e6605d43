//! Third-party video URL normalization.
//!
//! Accepts the many shapes a YouTube or Vimeo link is pasted in (watch
//! pages, short links, embed URLs, whole `<iframe>` snippets) and turns them
//! into one canonical [`Video`] that can render embed and watch URLs.
//!
//! ```ignore
//! let video = Video::parse("https://youtu.be/dQw4w9WgXcQ?t=1m30s")?;
//! assert_eq!(video.start(), Some(90));
//! let html = video.iframe("Never gonna", true);
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::utils::html::{AttrValue, attributes, parse_attributes};
use crate::utils::link::normalize_url;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("unsupported video URL: {0}")]
    Unsupported(String),

    #[error("invalid video URL `{0}`")]
    InvalidUrl(String, #[source] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Vimeo,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Vimeo => "Vimeo",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalized video reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    provider: Provider,
    id: String,
    /// Start offset in seconds.
    start: Option<u32>,
}

/// Attribute list of an `<iframe ...>` start tag.
static IFRAME_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<iframe\b([^>]*)>").unwrap());

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// `90`, `90s`, `1m30s`, `1h2m3s`.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s?)?$").unwrap()
});

const YOUTUBE_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";
const VIMEO_ALLOW: &str = "autoplay; fullscreen; picture-in-picture";

impl Video {
    /// Parse a video URL or an `<iframe>` embed code.
    pub fn parse(input: &str) -> Result<Self, VideoError> {
        let input = input.trim();
        let href = match IFRAME_TAG.captures(input) {
            Some(caps) => parse_attributes(&caps[1])
                .into_iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("src"))
                .map(|(_, src)| src)
                .unwrap_or_default(),
            None => input.to_string(),
        };

        let normalized = normalize_url(&href);
        let url = Url::parse(&normalized)
            .map_err(|err| VideoError::InvalidUrl(input.to_string(), err))?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(&host);

        let video = match host {
            "youtube.com" | "youtube-nocookie.com" | "music.youtube.com" | "youtu.be" => {
                youtube(host, &url)
            }
            "vimeo.com" | "player.vimeo.com" => vimeo(&url),
            _ => None,
        };
        video.ok_or_else(|| VideoError::Unsupported(input.to_string()))
    }

    #[inline]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start offset in seconds, if the link carried one.
    #[inline]
    pub fn start(&self) -> Option<u32> {
        self.start
    }

    /// URL for an `<iframe src>`.
    ///
    /// With `privacy_enhanced`, YouTube uses the no-cookie domain and Vimeo
    /// gets `dnt=1`.
    pub fn embed_url(&self, privacy_enhanced: bool) -> String {
        match self.provider {
            Provider::YouTube => {
                let host = if privacy_enhanced {
                    "www.youtube-nocookie.com"
                } else {
                    "www.youtube.com"
                };
                let mut url = format!("https://{host}/embed/{}", self.id);
                if let Some(start) = self.start {
                    url.push_str(&format!("?start={start}"));
                }
                url
            }
            Provider::Vimeo => {
                let mut url = format!("https://player.vimeo.com/video/{}", self.id);
                if privacy_enhanced {
                    url.push_str("?dnt=1");
                }
                if let Some(start) = self.start {
                    url.push_str(&format!("#t={start}s"));
                }
                url
            }
        }
    }

    /// Canonical page URL for the video.
    pub fn watch_url(&self) -> String {
        match (self.provider, self.start) {
            (Provider::YouTube, None) => format!("https://www.youtube.com/watch?v={}", self.id),
            (Provider::YouTube, Some(start)) => {
                format!("https://www.youtube.com/watch?v={}&t={start}s", self.id)
            }
            (Provider::Vimeo, None) => format!("https://vimeo.com/{}", self.id),
            (Provider::Vimeo, Some(start)) => format!("https://vimeo.com/{}#t={start}s", self.id),
        }
    }

    /// Poster image URL. Vimeo thumbnails need an API call, so `None`.
    pub fn thumbnail_url(&self) -> Option<String> {
        match self.provider {
            Provider::YouTube => Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.id)),
            Provider::Vimeo => None,
        }
    }

    /// Render a lazy-loading `<iframe>` for the video.
    pub fn iframe(&self, title: &str, privacy_enhanced: bool) -> String {
        let allow = match self.provider {
            Provider::YouTube => YOUTUBE_ALLOW,
            Provider::Vimeo => VIMEO_ALLOW,
        };
        let title = if title.trim().is_empty() {
            format!("{} video", self.provider)
        } else {
            title.trim().to_string()
        };
        let attrs: [(&str, AttrValue); 6] = [
            ("src", self.embed_url(privacy_enhanced).into()),
            ("title", title.into()),
            ("loading", "lazy".into()),
            ("allow", allow.into()),
            ("referrerpolicy", "strict-origin-when-cross-origin".into()),
            ("allowfullscreen", true.into()),
        ];
        format!("<iframe{}></iframe>", attributes(attrs))
    }
}

// ============================================================================
// Providers
// ============================================================================

fn youtube(host: &str, url: &Url) -> Option<Video> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == "youtu.be" {
        segments.next()?.to_string()
    } else {
        match segments.next()? {
            "watch" => query(url, "v")?,
            "embed" | "shorts" | "live" | "v" => segments.next()?.to_string(),
            _ => return None,
        }
    };
    if !YOUTUBE_ID.is_match(&id) {
        return None;
    }

    let start = query(url, "t")
        .or_else(|| query(url, "start"))
        .or_else(|| fragment_time(url))
        .and_then(|t| parse_timestamp(&t));

    Some(Video {
        provider: Provider::YouTube,
        id,
        start,
    })
}

fn vimeo(url: &Url) -> Option<Video> {
    // Numeric id is the last numeric segment: `/123`, `/video/123`,
    // `/channels/staffpicks/123`
    let id = url
        .path_segments()?
        .rev()
        .find(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))?
        .to_string();

    let start = fragment_time(url)
        .or_else(|| query(url, "t"))
        .and_then(|t| parse_timestamp(&t));

    Some(Video {
        provider: Provider::Vimeo,
        id,
        start,
    })
}

fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// `#t=90` style fragments.
fn fragment_time(url: &Url) -> Option<String> {
    url.fragment()?
        .split('&')
        .find_map(|part| part.strip_prefix("t="))
        .map(str::to_string)
}

/// Parse `90`, `90s`, `1m30s` or `1h2m3s` into seconds.
pub fn parse_timestamp(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let caps = TIMESTAMP.captures(input)?;
    let part = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let seconds = part(1)?
        .checked_mul(3600)?
        .checked_add(part(2)?.checked_mul(60)?)?
        .checked_add(part(3)?)?;
    (seconds > 0).then_some(seconds)
}
