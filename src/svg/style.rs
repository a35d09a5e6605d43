//! Removal of CSS declarations from inline styles and stylesheets.

use std::borrow::Cow;

use regex::Regex;

use super::dom::Document;
use crate::debug;

/// Matches one `property: value;` declaration, case-insensitively.
///
/// A declaration must start the text or follow `;`/`{`, so `fill` never
/// matches inside `fill-opacity` or `-webkit-fill`.
#[derive(Debug, Clone)]
pub struct DeclarationFilter {
    property: String,
    pattern: Regex,
}

impl DeclarationFilter {
    /// Build a filter for `property`. Returns `None` for blank names.
    pub fn new(property: &str) -> Option<Self> {
        let property = property.trim();
        if property.is_empty() {
            return None;
        }
        let source = format!(r"(?i)(^|[;{{])\s*{}\s*:[^;}}]*;?", regex::escape(property));
        match Regex::new(&source) {
            Ok(pattern) => Some(Self {
                property: property.to_string(),
                pattern,
            }),
            Err(err) => {
                debug!("svg"; "skipping style `{}`: {}", property, err);
                None
            }
        }
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Remove every matching declaration from `css`.
    pub fn apply<'a>(&self, css: &'a str) -> Cow<'a, str> {
        if !self.pattern.is_match(css) {
            return Cow::Borrowed(css);
        }
        // A removed declaration takes its leading `;` with it, so run until
        // no adjacent duplicates are left
        let mut current = css.to_string();
        while self.pattern.is_match(&current) {
            current = self.pattern.replace_all(&current, "$1").into_owned();
        }
        Cow::Owned(current)
    }
}

/// Strip `filter`'s property from every element of `doc`.
///
/// Covers presentation attributes, `style` attributes and `<style>` text.
/// A `style` attribute left empty is dropped entirely.
pub fn remove_style(doc: &mut Document, filter: &DeclarationFilter) {
    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };

        element.remove_attr(filter.property());

        if let Some(style) = element.get_attr_mut("style") {
            let trimmed = filter.apply(style).trim().to_string();
            *style = trimmed;
            if style.is_empty() {
                element.remove_attr("style");
            }
        }

        if element.is_tag("style") {
            doc.edit_text(id, |css| filter.apply(css).into_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(name: &str) -> DeclarationFilter {
        DeclarationFilter::new(name).unwrap()
    }

    #[test]
    fn test_removes_declaration_with_separator() {
        assert_eq!(filter("fill").apply("fill:#fff;stroke:#000;"), "stroke:#000;");
        assert_eq!(filter("fill").apply("stroke:#000; fill: #fff"), "stroke:#000;");
    }

    #[test]
    fn test_case_insensitive_whole_name() {
        assert_eq!(filter("fill").apply("FILL: red; fill-opacity: .5"), " fill-opacity: .5");
        assert_eq!(filter("Fill").apply("fill-rule:evenodd"), "fill-rule:evenodd");
    }

    #[test]
    fn test_repeated_declarations() {
        assert_eq!(filter("fill").apply("fill:a;fill:b;stroke:c"), "stroke:c");
    }

    #[test]
    fn test_stylesheet_blocks() {
        assert_eq!(
            filter("fill").apply(".a { fill: red; stroke: blue } .b{fill:green}"),
            ".a { stroke: blue } .b{}"
        );
    }

    #[test]
    fn test_blank_property_rejected() {
        assert!(DeclarationFilter::new("  ").is_none());
    }

    #[test]
    fn test_special_characters_escaped() {
        assert_eq!(filter("a.b").apply("axb:1;a.b:2"), "axb:1;");
    }

    #[test]
    fn test_remove_style_from_document() {
        let mut doc = Document::parse(
            r#"<svg fill="red" style="fill:#fff"><path style="fill:#fff;stroke:#000;"/><style>.a{fill:red}</style></svg>"#,
        )
        .unwrap();
        remove_style(&mut doc, &filter("fill"));
        assert_eq!(
            doc.serialize(),
            r#"<svg><path style="stroke:#000;"/><style>.a{}</style></svg>"#
        );
    }
}
