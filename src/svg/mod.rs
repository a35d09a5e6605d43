//! SVG sanitization for inline embedding.
//!
//! [`ScalableVectorGraphic`] keeps two trees per document: the untouched
//! `source` parse and a `working` copy that every mutator edits. Loading and
//! [`reset`](ScalableVectorGraphic::reset) rebuild the working tree from the
//! source and run the sanitize pipeline:
//!
//! 1. synthesize a `viewBox` from `width`/`height` when missing
//! 2. suffix ids, class names and every reference to them
//!
//! # Example
//!
//! ```ignore
//! let mut svg = ScalableVectorGraphic::new();
//! svg.load("icons/logo.svg")?
//!     .remove_attributes(["width", "height"])?
//!     .title("Logo")?
//!     .fill("currentColor")?;
//! let html = svg.embed()?;
//! ```

pub mod dom;
pub mod namespace;
pub mod style;

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::debug;
use dom::Document;
pub use namespace::{InstanceCounter, Suffix};
use style::DeclarationFilter;

/// Errors from loading or using a [`ScalableVectorGraphic`].
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("SVG file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("malformed SVG: {0}")]
    Malformed(String),

    #[error("no SVG document loaded")]
    NotLoaded,
}

/// State that only exists once a document has been parsed.
#[derive(Debug, Clone)]
struct Loaded {
    /// Raw input, byte-for-byte.
    code: String,
    source: Document,
    working: Document,
    suffix: Suffix,
}

/// An SVG document prepared for inlining into HTML.
#[derive(Debug, Clone)]
pub struct ScalableVectorGraphic {
    instance: u64,
    loaded: Option<Loaded>,
}

impl Default for ScalableVectorGraphic {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalableVectorGraphic {
    /// Empty instance numbered by the process-wide counter.
    pub fn new() -> Self {
        Self::with_counter(InstanceCounter::global())
    }

    /// Empty instance numbered by `counter`.
    pub fn with_counter(counter: &InstanceCounter) -> Self {
        Self {
            instance: counter.next(),
            loaded: None,
        }
    }

    /// Instance number used for the suffix.
    #[inline]
    pub fn instance(&self) -> u64 {
        self.instance
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Suffix appended to identifiers, once a document is loaded.
    pub fn suffix(&self) -> Option<&Suffix> {
        self.loaded.as_ref().map(|loaded| &loaded.suffix)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Read and parse the file at `path`.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, SvgError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SvgError::NotFound(path.to_path_buf()),
            _ => SvgError::Io(path.to_path_buf(), err),
        })?;
        debug!("svg"; "loaded {} ({} bytes)", path.display(), raw.len());
        self.parse(&raw)
    }

    /// Parse `raw` and sanitize it.
    ///
    /// On failure the previously loaded document (if any) is kept.
    pub fn parse(&mut self, raw: &str) -> Result<&mut Self, SvgError> {
        let source = Document::parse(raw)?;
        let suffix = Suffix::derive(raw, self.instance);
        let working = sanitized(&source, &suffix);

        self.loaded = Some(Loaded {
            code: raw.to_string(),
            source,
            working,
            suffix,
        });
        Ok(self)
    }

    /// Throw away all edits and re-run the sanitize pipeline on the source.
    pub fn reset(&mut self) -> Result<&mut Self, SvgError> {
        let loaded = self.loaded_mut()?;
        loaded.working = sanitized(&loaded.source, &loaded.suffix);
        Ok(self)
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Remove attributes from the root element. Absent names are ignored.
    pub fn remove_attributes<I, S>(&mut self, names: I) -> Result<&mut Self, SvgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root = self.loaded_mut()?.working.root_element_mut();
        for name in names {
            root.remove_attr(name.as_ref());
        }
        Ok(self)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<&mut Self, SvgError> {
        self.remove_attributes([name])
    }

    /// Remove style properties from every element.
    ///
    /// Drops the presentation attribute of the same name, the declaration in
    /// `style` attributes and the declaration in `<style>` sheets.
    pub fn remove_styles<I, S>(&mut self, names: I) -> Result<&mut Self, SvgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let working = &mut self.loaded_mut()?.working;
        for filter in names
            .into_iter()
            .filter_map(|name| DeclarationFilter::new(name.as_ref()))
        {
            style::remove_style(working, &filter);
        }
        Ok(self)
    }

    pub fn remove_style(&mut self, name: &str) -> Result<&mut Self, SvgError> {
        self.remove_styles([name])
    }

    /// Set attributes on the root element, overwriting existing values.
    pub fn set_attributes<I, K, V>(&mut self, pairs: I) -> Result<&mut Self, SvgError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let root = self.loaded_mut()?.working.root_element_mut();
        for (key, value) in pairs {
            root.set_attr(key, value);
        }
        Ok(self)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<&mut Self, SvgError> {
        self.set_attributes([(name, value)])
    }

    /// Set the document title.
    ///
    /// Replaces the text of an existing top-level `<title>`, or inserts a new
    /// one as the root's first child.
    pub fn title(&mut self, text: &str) -> Result<&mut Self, SvgError> {
        let doc = &mut self.loaded_mut()?.working;
        let root = doc.root();

        let existing = doc
            .children(root)
            .iter()
            .copied()
            .find(|&child| doc.element(child).is_some_and(|el| el.is_tag("title")));
        let title = match existing {
            Some(title) => title,
            None => {
                let title = doc.create_element("title");
                doc.prepend_child(root, title);
                title
            }
        };
        doc.set_text(title, text);
        Ok(self)
    }

    /// Shorthand for setting the root `fill` attribute.
    pub fn fill(&mut self, color: &str) -> Result<&mut Self, SvgError> {
        self.set_attributes([("fill", color)])
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Sanitized markup.
    pub fn embed(&self) -> Result<String, SvgError> {
        Ok(self.loaded()?.working.serialize())
    }

    /// The raw input exactly as it was parsed.
    pub fn embed_source_code(&self) -> Result<&str, SvgError> {
        Ok(self.loaded()?.code.as_str())
    }

    /// The unsanitized document, re-serialized.
    pub fn embed_source_dom(&self) -> Result<String, SvgError> {
        Ok(self.loaded()?.source.serialize())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[inline]
    fn loaded(&self) -> Result<&Loaded, SvgError> {
        self.loaded.as_ref().ok_or(SvgError::NotLoaded)
    }

    #[inline]
    fn loaded_mut(&mut self) -> Result<&mut Loaded, SvgError> {
        self.loaded.as_mut().ok_or(SvgError::NotLoaded)
    }
}

/// Fresh working copy of `source` with the sanitize pipeline applied.
fn sanitized(source: &Document, suffix: &Suffix) -> Document {
    let mut working = source.clone();
    synthesize_view_box(&mut working);
    let renamed = namespace::namespace(&mut working, suffix);
    debug!("svg"; "namespaced {} ids with {}", renamed, suffix);
    working
}

/// Add `viewBox="0 0 {width} {height}"` when the root has none.
///
/// Values are copied verbatim; units are not stripped.
fn synthesize_view_box(doc: &mut Document) {
    let root = doc.root_element_mut();
    if root.get_attr("viewBox").is_some() {
        return;
    }
    let (Some(width), Some(height)) = (root.get_attr("width"), root.get_attr("height")) else {
        return;
    };
    if width.is_empty() || height.is_empty() {
        return;
    }
    let view_box = format!("0 0 {width} {height}");
    root.set_attr("viewBox", view_box);
}
