//! # Settings Module
//!
//! ## Purpose
//! Output formatting of balanced equations, kept as a small serializable configuration
//! that can be stored next to an application and reloaded.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "arrow": " -> ",
//!   "plus": " + ",
//!   "coefficient_separator": "",
//!   "omit_unit_coefficients": true
//! }
//! ```
//! Missing keys fall back to the defaults above.
//!
//! ## Usage Pattern
//! ```rust
//! use chem_balance::settings::FormatConfig;
//! use chem_balance::Stoichiometry::balancer::balance_str;
//!
//! let config = FormatConfig {
//!     arrow: " = ".to_string(),
//!     ..FormatConfig::default()
//! };
//! let balanced = balance_str("H2 + O2 -> H2O").unwrap();
//! assert_eq!(balanced.render(&config), "2H2 + O2 = 2H2O");
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a balanced equation is written out.
///
/// # Fields
/// * `arrow` - text between reactants and products
/// * `plus` - text between two species on the same side
/// * `coefficient_separator` - text between a coefficient and its formula
/// * `omit_unit_coefficients` - write `O2` instead of `1O2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub arrow: String,
    pub plus: String,
    pub coefficient_separator: String,
    pub omit_unit_coefficients: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            arrow: " -> ".to_string(),
            plus: " + ".to_string(),
            coefficient_separator: String::new(),
            omit_unit_coefficients: true,
        }
    }
}

impl FormatConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// A file that does not exist gives the default configuration; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "format config '{}' not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: FormatConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Term of one species: coefficient (unless omitted) and formula.
    pub fn term(&self, coefficient: u64, formula: &str) -> String {
        if coefficient == 1 && self.omit_unit_coefficients {
            formula.to_string()
        } else {
            format!("{}{}{}", coefficient, self.coefficient_separator, formula)
        }
    }
}
