// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for section configuration and data exchange

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by configuration validation and section sources
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A configuration value is out of its valid domain
    #[error("Invalid configuration value `{field}`: {message}")]
    InvalidConfig { field: String, message: String },

    /// A section source could not produce the requested data
    #[error("Section data unavailable: {0}")]
    Section(String),
}

impl ModelError {
    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, msg: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a section source error
    pub fn section(msg: impl Into<String>) -> Self {
        ModelError::Section(msg.into())
    }
}
