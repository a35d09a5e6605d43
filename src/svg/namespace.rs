//! Identifier namespacing.
//!
//! Every sanitized SVG gets a [`Suffix`] that is appended to its ids, class
//! names and to every reference pointing at them, so several inlined SVGs on
//! one page never collide.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::{Captures, Regex};

use super::dom::Document;
use crate::utils::hash::ContentHash;

/// Number of hex digits kept from the content hash.
const SUFFIX_HEX_LEN: usize = 12;

// ============================================================================
// Instance Counter
// ============================================================================

/// Monotonic counter handing out one value per sanitizer instance.
///
/// The process-wide registry is [`InstanceCounter::global`]; tests build
/// their own with [`InstanceCounter::starting_at`] for predictable values.
#[derive(Debug, Default)]
pub struct InstanceCounter(AtomicU64);

impl InstanceCounter {
    pub const fn starting_at(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    /// The process-wide counter, starting at zero.
    pub fn global() -> &'static Self {
        static GLOBAL: InstanceCounter = InstanceCounter::starting_at(0);
        &GLOBAL
    }

    /// Advance and return the new value.
    #[inline]
    pub fn next(&self) -> u64 {
        // Only uniqueness matters
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[cfg(test)]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Suffix
// ============================================================================

/// Per-document namespacing suffix, e.g. `_3f9a0c21b7de`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suffix(String);

impl Suffix {
    /// Derive the suffix from the raw document text and the instance number.
    pub fn derive(raw: &str, instance: u64) -> Self {
        let hash = ContentHash::of_parts(&[raw.as_bytes(), &instance.to_le_bytes()]);
        Self(format!("_{}", hash.short_hex(SUFFIX_HEX_LEN)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Suffix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Document pass
// ============================================================================

/// Suffix every identifier and reference in `doc`.
///
/// Returns the number of `id` attributes renamed.
pub fn namespace(doc: &mut Document, suffix: &Suffix) -> usize {
    let suffix = suffix.as_str();
    let mut renamed = 0;

    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };

        for (key, value) in &mut element.attrs {
            match key.as_str() {
                "id" => {
                    value.push_str(suffix);
                    renamed += 1;
                }
                "class" => *value = suffix_classes(value, suffix),
                "href" | "xlink:href" if value.contains('#') => value.push_str(suffix),
                _ => {}
            }
            if let Cow::Owned(rewritten) = suffix_url_refs(value, suffix) {
                *value = rewritten;
            }
        }

        if element.is_tag("style") {
            doc.edit_text(id, |css| rewrite_stylesheet(css, suffix));
        }
    }

    renamed
}

/// `"icon large"` -> `"icon_S large_S"`.
pub fn suffix_classes(value: &str, suffix: &str) -> String {
    value
        .split_whitespace()
        .map(|token| format!("{token}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `url(#a)`, `url('#a')`, `url("#a")` fragment references.
static URL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"url\((['"]?)#([^'")\s]+)(['"]?)\)"##).unwrap());

/// Insert `suffix` after the fragment name of every `url(#name)`.
pub fn suffix_url_refs<'a>(value: &'a str, suffix: &str) -> Cow<'a, str> {
    if !value.contains("url(") {
        return Cow::Borrowed(value);
    }
    URL_REF.replace_all(value, |caps: &Captures<'_>| {
        format!("url({}#{}{suffix}{})", &caps[1], &caps[2], &caps[3])
    })
}

// ============================================================================
// Stylesheets
// ============================================================================

/// `.name` / `#name` in a selector prelude.
static SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.#]-?[_a-zA-Z][\w-]*").unwrap());

/// `[name` followed by the attribute-selector delimiter.
static ATTR_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\[=~|^$*\s]+)([\]=~|^$*])").unwrap());

/// Rewrite a stylesheet.
///
/// The text is cut at every `{` and `}`. A chunk ending in `{` is a selector
/// prelude and gets its class/id/attribute selectors suffixed; everything
/// else is declarations, where only `url(#name)` references change. Hex
/// colors in declarations therefore stay intact.
pub fn rewrite_stylesheet(css: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(css.len() + 64);
    let mut rest = css;

    while let Some(pos) = rest.find(['{', '}']) {
        let (chunk, tail) = rest.split_at(pos + 1);
        if chunk.ends_with('{') {
            out.push_str(&rewrite_prelude(chunk, suffix));
        } else {
            out.push_str(&suffix_url_refs(chunk, suffix));
        }
        rest = tail;
    }
    out.push_str(&suffix_url_refs(rest, suffix));
    out
}

fn rewrite_prelude(prelude: &str, suffix: &str) -> String {
    let prelude = ATTR_SELECTOR.replace_all(prelude, |caps: &Captures<'_>| {
        format!("[{}{suffix}{}", &caps[1], &caps[2])
    });

    let mut out = String::with_capacity(prelude.len() + 32);
    let mut last = 0;
    for found in SELECTOR.find_iter(&prelude) {
        out.push_str(&prelude[last..found.end()]);
        if prelude[found.end()..]
            .chars()
            .next()
            .is_some_and(ends_selector)
        {
            out.push_str(suffix);
        }
        last = found.end();
    }
    out.push_str(&prelude[last..]);
    out
}

/// A class or id selector is only suffixed when it ends the compound
/// selector: before whitespace, `{` or `,`. `.a:hover` and `.a.b` keep the
/// leading names as written.
#[inline]
fn ends_selector(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | ',')
}
