//! Controller configuration.
//!
//! A [`ControllerConfig`] can be built in code or loaded from JSON:
//!
//! ```
//! use hanover_flipdot::ControllerConfig;
//!
//! let config = ControllerConfig::from_json(r#"{
//!     "response_timeout_ms": 500,
//!     "signs": [
//!         { "name": "front", "address": 1, "width": 86, "height": 7 },
//!         { "name": "rear", "address": 2, "width": 86, "height": 7, "flip": true }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.signs.len(), 2);
//! assert_eq!(config.response_buffer_size, 128);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlipdotError, Result};
use crate::sign::SignDescriptor;

/// Default time to wait for a sign to answer after a write.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default maximum number of response bytes read per exchange.
pub const DEFAULT_RESPONSE_BUFFER_SIZE: usize = 128;

/// One sign entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignConfig {
    /// Registry name.
    pub name: String,
    /// Bus address.
    pub address: u8,
    /// Panel width in pixels.
    pub width: usize,
    /// Panel height in pixels.
    pub height: usize,
    /// Panel mounted upside-down.
    #[serde(default)]
    pub flip: bool,
}

impl SignConfig {
    pub fn new(name: &str, address: u8, width: usize, height: usize, flip: bool) -> Self {
        Self {
            name: name.to_string(),
            address,
            width,
            height,
            flip,
        }
    }
}

impl TryFrom<&SignConfig> for SignDescriptor {
    type Error = FlipdotError;

    fn try_from(config: &SignConfig) -> Result<Self> {
        SignDescriptor::new(config.address, config.width, config.height, config.flip.into())
    }
}

/// Settings for a [`HanoverController`](crate::HanoverController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// How long to wait for response bytes after each write, in milliseconds.
    pub response_timeout_ms: u64,
    /// Maximum response bytes read per exchange.
    pub response_buffer_size: usize,
    /// Signs registered when the controller is built.
    pub signs: Vec<SignConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT.as_millis() as u64,
            response_buffer_size: DEFAULT_RESPONSE_BUFFER_SIZE,
            signs: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Response timeout as a `Duration`.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::Orientation;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.response_timeout(), Duration::from_secs(2));
        assert_eq!(config.response_buffer_size, 128);
        assert!(config.signs.is_empty());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ControllerConfig::from_json(r#"{"response_buffer_size": 16}"#).unwrap();
        assert_eq!(config.response_buffer_size, 16);
        assert_eq!(config.response_timeout_ms, 2000);
    }

    #[test]
    fn test_from_json_signs() {
        let config = ControllerConfig::from_json(
            r#"{"signs": [{"name": "a", "address": 3, "width": 28, "height": 16, "flip": true}]}"#,
        )
        .unwrap();

        assert_eq!(config.signs, vec![SignConfig::new("a", 3, 28, 16, true)]);
    }

    #[test]
    fn test_from_json_rejects_negative_address() {
        let err = ControllerConfig::from_json(
            r#"{"signs": [{"name": "a", "address": -1, "width": 28, "height": 16}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FlipdotError::Config(_)));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            ControllerConfig::from_json("{not json"),
            Err(FlipdotError::Config(_))
        ));
    }

    #[test]
    fn test_sign_config_to_descriptor() {
        let sign = SignDescriptor::try_from(&SignConfig::new("a", 5, 86, 7, true)).unwrap();
        assert_eq!(sign.address(), 5);
        assert_eq!(sign.orientation(), Orientation::Inverted);

        let err = SignDescriptor::try_from(&SignConfig::new("a", 5, 0, 7, false)).unwrap_err();
        assert!(matches!(err, FlipdotError::InvalidDescriptor(_)));
    }
}
