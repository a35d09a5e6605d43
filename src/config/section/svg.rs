//! `[svg]` section configuration.
//!
//! Edits applied to every sanitized SVG after the built-in pipeline.
//!
//! # Example
//!
//! ```toml
//! [svg]
//! remove_attributes = ["width", "height"]   # stripped from the root <svg>
//! remove_styles = ["fill"]                  # stripped from every element
//! title = "Logo"                            # accessible <title>
//! fill = "currentColor"                     # root fill attribute
//! attributes = { role = "img" }             # extra root attributes
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::svg::{ScalableVectorGraphic, SvgError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Attributes removed from the root element.
    pub remove_attributes: Vec<String>,

    /// Style properties removed from every element.
    pub remove_styles: Vec<String>,

    /// Title text; inserted as the first child of the root.
    pub title: Option<String>,

    /// Root `fill` color.
    pub fill: Option<String>,

    /// Extra attributes set on the root, in key order.
    pub attributes: BTreeMap<String, String>,
}

impl SvgConfig {
    /// True when applying this config changes nothing.
    #[cfg(test)]
    pub fn is_noop(&self) -> bool {
        self.remove_attributes.is_empty()
            && self.remove_styles.is_empty()
            && self.title.is_none()
            && self.fill.is_none()
            && self.attributes.is_empty()
    }

    /// Apply the configured edits to a loaded document.
    ///
    /// Order: removals first, then attributes, fill and title, so a fill set
    /// here survives `remove_styles = ["fill"]`.
    pub fn apply(&self, svg: &mut ScalableVectorGraphic) -> Result<(), SvgError> {
        svg.remove_attributes(&self.remove_attributes)?
            .remove_styles(&self.remove_styles)?
            .set_attributes(
                self.attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )?;
        if let Some(fill) = &self.fill {
            svg.fill(fill)?;
        }
        if let Some(title) = &self.title {
            svg.title(title)?;
        }
        Ok(())
    }
}
