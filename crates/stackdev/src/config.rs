//! Device configuration.

use alloc::string::String;
use serde::{Deserialize, Serialize};
use stackdev_core::DEFAULT_CAPACITY;

use crate::error::DeviceError;

/// Default device node name (`/dev/stack`).
pub const DEFAULT_DEVICE_NAME: &str = "stack";

/// Default device class name.
pub const DEFAULT_CLASS_NAME: &str = "stack";

/// Which handles see which store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackScope {
    /// Every open gets a fresh store, dropped on close
    #[default]
    PerOpen,
    /// One store for the whole node, shared by all handles and kept across
    /// close and reopen
    PerDevice,
}

/// How a read size that is not a multiple of the word size is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAlignment {
    /// Request `len / WORD_SIZE` words; the remainder is ignored
    #[default]
    RoundDown,
    /// Fail with `InvalidArgument`
    Reject,
}

/// Device configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device node name
    pub name: String,
    /// Device class name
    pub class_name: String,
    /// Capacity of a new store, in words
    pub default_capacity: usize,
    /// Store sharing between handles
    pub scope: StackScope,
    /// Policy for unaligned read sizes
    pub read_alignment: ReadAlignment,
    /// Upper bound for resize; `None` means unbounded
    pub max_capacity: Option<usize>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_DEVICE_NAME),
            class_name: String::from(DEFAULT_CLASS_NAME),
            default_capacity: DEFAULT_CAPACITY,
            scope: StackScope::default(),
            read_alignment: ReadAlignment::default(),
            max_capacity: None,
        }
    }
}

impl DeviceConfig {
    /// Parse a JSON config; absent fields take their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DeviceError> {
        let config: DeviceConfig = serde_json::from_slice(bytes)
            .map_err(|e| DeviceError::invalid_config(alloc::format!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, DeviceError> {
        serde_json::to_string(self).map_err(|e| DeviceError::invalid_config(alloc::format!("{}", e)))
    }

    /// Check the config is usable.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.name.is_empty() {
            return Err(DeviceError::invalid_config("device name is empty"));
        }
        if let Some(max) = self.max_capacity {
            if self.default_capacity > max {
                return Err(DeviceError::invalid_config(alloc::format!(
                    "default capacity {} exceeds max capacity {}",
                    self.default_capacity,
                    max
                )));
            }
        }
        Ok(())
    }

    /// Whether a resize to `new_capacity` is allowed by `max_capacity`.
    pub fn allows_capacity(&self, new_capacity: u64) -> bool {
        match self.max_capacity {
            Some(max) => new_capacity <= max as u64,
            None => true,
        }
    }

    /// Set the default capacity.
    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Set the store scope.
    pub fn with_scope(mut self, scope: StackScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the unaligned read policy.
    pub fn with_read_alignment(mut self, read_alignment: ReadAlignment) -> Self {
        self.read_alignment = read_alignment;
        self
    }

    /// Set the resize bound.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.name, "stack");
        assert_eq!(config.default_capacity, 10);
        assert_eq!(config.scope, StackScope::PerOpen);
        assert_eq!(config.read_alignment, ReadAlignment::RoundDown);
        assert!(config.allows_capacity(u64::MAX));
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = DeviceConfig::from_json(br#"{"default_capacity": 4, "scope": "PerDevice"}"#).unwrap();
        assert_eq!(config.default_capacity, 4);
        assert_eq!(config.scope, StackScope::PerDevice);
        assert_eq!(config.name, "stack");
        assert_eq!(config.max_capacity, None);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = DeviceConfig::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, DeviceError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let config = DeviceConfig::default().with_max_capacity(5);
        assert!(matches!(config.validate(), Err(DeviceError::InvalidConfig(_))));
        assert!(DeviceConfig::default().with_max_capacity(10).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = DeviceConfig {
            name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DeviceConfig::default()
            .with_read_alignment(ReadAlignment::Reject)
            .with_max_capacity(64);
        let json = config.to_json().unwrap();
        assert_eq!(DeviceConfig::from_json(json.as_bytes()).unwrap(), config);
    }
}
