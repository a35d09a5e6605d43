//! `[date]` section configuration.
//!
//! ```toml
//! [date]
//! separator = "–"        # joins range ends
//! month_style = "long"   # long (June) | short (Jun)
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::utils::date::{MonthStyle, RangeStyle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub separator: String,
    pub month_style: MonthStyle,
}

impl Default for DateConfig {
    fn default() -> Self {
        let style = RangeStyle::default();
        Self {
            separator: style.separator,
            month_style: style.month,
        }
    }
}

impl DateConfig {
    pub fn range_style(&self) -> RangeStyle {
        RangeStyle {
            separator: self.separator.clone(),
            month: self.month_style,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.trim().is_empty() {
            return Err(ConfigError::validation(
                "date.separator",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
