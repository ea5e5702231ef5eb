//! Display color state.
//!
//! The configured default color is fixed for the life of the process. Requests may ask
//! for another color for that one response, but only from the allowed set.

use std::collections::BTreeSet;

use crate::config::ColorConfig;

/// A requested color outside the allowed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Color '{0}' is not allowed")]
pub struct InvalidColor(pub String);

#[derive(Debug, Clone)]
pub struct ColorService {
    default_color: String,
    allowed: BTreeSet<String>,
}

impl ColorService {
    pub fn new(config: &ColorConfig) -> Self {
        Self {
            default_color: config.default_color.clone(),
            allowed: config.allowed_colors.clone(),
        }
    }

    pub fn current_color(&self) -> &str {
        &self.default_color
    }

    /// Case-sensitive membership check against the allowed set.
    pub fn validate(&self, color: &str) -> Result<String, InvalidColor> {
        if self.allowed.contains(color) {
            Ok(color.to_string())
        } else {
            Err(InvalidColor(color.to_string()))
        }
    }

    /// The color for one request: the override if given and allowed, else the default.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, InvalidColor> {
        match requested {
            Some(color) => self.validate(color),
            None => Ok(self.default_color.clone()),
        }
    }

    /// Allowed colors in sorted order
    pub fn allowed_colors(&self) -> Vec<&str> {
        self.allowed.iter().map(String::as_str).collect()
    }
}
