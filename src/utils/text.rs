//! String predicates, truncation and e-mail style obfuscation.
//!
//! Predicates accept one needle or many: anything iterable over `AsRef<str>`
//! works, so `contains(s, ["a"])`, `contains(s, &names)` and
//! `contains(s, vec![...])` read the same.

use rand::Rng;

// =============================================================================
// Predicates
// =============================================================================

/// True when `haystack` contains any non-empty needle.
pub fn contains<I, S>(haystack: &str, needles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    any_needle(needles, |needle| haystack.contains(needle))
}

/// True when `haystack` contains every needle (and at least one was given).
pub fn contains_all<I, S>(haystack: &str, needles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = false;
    for needle in needles {
        let needle = needle.as_ref();
        if needle.is_empty() || !haystack.contains(needle) {
            return false;
        }
        seen = true;
    }
    seen
}

/// True when `haystack` starts with any non-empty needle.
pub fn starts_with<I, S>(haystack: &str, needles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    any_needle(needles, |needle| haystack.starts_with(needle))
}

/// True when `haystack` ends with any non-empty needle.
pub fn ends_with<I, S>(haystack: &str, needles: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    any_needle(needles, |needle| haystack.ends_with(needle))
}

#[inline]
fn any_needle<I, S>(needles: I, matches: impl Fn(&str) -> bool) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    needles
        .into_iter()
        .any(|needle| !needle.as_ref().is_empty() && matches(needle.as_ref()))
}

// =============================================================================
// Truncation
// =============================================================================

/// Shorten `text` to at most `limit` characters plus `ellipsis`.
///
/// Cuts on the last whitespace inside the limit when there is one, so words
/// are not split. Text that already fits is returned unchanged.
///
/// # Example
/// ```ignore
/// assert_eq!(truncate("The quick brown fox", 12, "…"), "The quick…");
/// ```
pub fn truncate(text: &str, limit: usize, ellipsis: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];

    // Only back off to a word boundary when the cut lands mid-word
    let next_is_space = text[cut..].starts_with(char::is_whitespace);
    let head = match head.rfind(char::is_whitespace) {
        Some(space) if !next_is_space && space > 0 => &head[..space],
        _ => head,
    };

    let head = head.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'));
    format!("{head}{ellipsis}")
}

/// `"1 file"`, `"3 files"`. Used for CLI summaries.
#[inline]
pub fn count_noun(count: usize, noun: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{s}")
}

// =============================================================================
// Obfuscation
// =============================================================================

/// How a single character is written by [`obfuscate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Literal,
    Decimal,
    Hex,
}

impl Encoding {
    /// Map any number onto one of the three encodings (uniformly for
    /// uniformly distributed input).
    #[inline]
    pub fn from_roll(roll: u64) -> Self {
        match roll % 3 {
            0 => Self::Literal,
            1 => Self::Decimal,
            _ => Self::Hex,
        }
    }
}

/// Encode every character of `text` as itself, a decimal entity or a hex
/// entity, chosen at random per character.
///
/// Used for `mailto:` links to keep naive scrapers away.
pub fn obfuscate(text: &str) -> String {
    let mut rng = rand::thread_rng();
    obfuscate_with(text, || Encoding::from_roll(rng.gen_range(0..3)))
}

/// Like [`obfuscate`] with a caller-provided choice per character.
///
/// Characters that are special in HTML are never written literally.
pub fn obfuscate_with(text: &str, mut choose: impl FnMut() -> Encoding) -> String {
    let mut out = String::with_capacity(text.len() * 6);
    for c in text.chars() {
        let encoding = match choose() {
            Encoding::Literal if matches!(c, '<' | '>' | '&' | '"' | '\'') => Encoding::Decimal,
            encoding => encoding,
        };
        match encoding {
            Encoding::Literal => out.push(c),
            Encoding::Decimal => out.push_str(&format!("&#{};", u32::from(c))),
            Encoding::Hex => out.push_str(&format!("&#x{:x};", u32::from(c))),
        }
    }
    out
}
