//! Configuration for Actr
//!
//! TigerStyle: Explicit defaults, validation, reasonable limits.
//!
//! Loaded from an `Actr.toml` file. Sections the runtime does not use
//! (`exports`, `dependencies`, `scripts`) are accepted and ignored.

use crate::actor::ServiceType;
use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for Actr
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActrConfig {
    /// Configuration format edition
    #[serde(default = "default_edition")]
    pub edition: u32,

    /// Package metadata
    #[serde(default)]
    pub package: PackageConfig,

    /// System (deployment, discovery, signaling) configuration
    #[serde(default)]
    pub system: SystemConfig,

    /// Host runtime configuration
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_edition() -> u32 {
    1
}

impl Default for ActrConfig {
    fn default() -> Self {
        Self {
            edition: default_edition(),
            package: PackageConfig::default(),
            system: SystemConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ActrConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigLoad { reason, .. } => Error::ConfigLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigLoad {
            path: "<inline>".into(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.edition == 0 {
            return Err(Error::InvalidConfiguration {
                field: "edition".into(),
                reason: "must be at least 1".into(),
            });
        }
        self.package.validate()?;
        self.system.validate()?;
        self.runtime.validate()?;
        Ok(())
    }

    /// Service type declared by the package
    pub fn service_type(&self) -> Result<ServiceType> {
        ServiceType::new(&self.package.manufacturer, &self.package.service_name)
    }
}

// =============================================================================
// Package
// =============================================================================

/// Package metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name
    #[serde(default = "default_package_name")]
    pub name: String,

    /// Manufacturer, the namespace of the service type
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Service name, the name of the service type
    #[serde(rename = "type", default = "default_service_name")]
    pub service_name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Package authors
    #[serde(default)]
    pub authors: Vec<String>,
}

fn default_package_name() -> String {
    "actr-app".to_string()
}

fn default_manufacturer() -> String {
    "acme".to_string()
}

fn default_service_name() -> String {
    "Service".to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: default_package_name(),
            manufacturer: default_manufacturer(),
            service_name: default_service_name(),
            description: None,
            authors: Vec::new(),
        }
    }
}

impl PackageConfig {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfiguration {
                field: "package.name".into(),
                reason: "must not be empty".into(),
            });
        }
        ServiceType::new(&self.manufacturer, &self.service_name).map_err(|e| {
            Error::InvalidConfiguration {
                field: "package.type".into(),
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }
}

// =============================================================================
// System
// =============================================================================

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Signaling server (used by networked transports only)
    #[serde(default)]
    pub signaling: SignalingConfig,

    /// Deployment placement
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Discovery registration
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl SystemConfig {
    fn validate(&self) -> Result<()> {
        self.signaling.validate()?;
        Ok(())
    }
}

/// Signaling server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalingConfig {
    /// Signaling server URL (e.g. `ws://localhost:8081/signaling/ws`)
    #[serde(default)]
    pub url: Option<String>,
}

impl SignalingConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.url {
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(Error::InvalidConfiguration {
                    field: "system.signaling.url".into(),
                    reason: "must use ws:// or wss://".into(),
                });
            }
        }
        Ok(())
    }
}

/// Deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Realm actors are deployed into
    #[serde(default = "default_realm_id")]
    pub realm_id: u32,
}

fn default_realm_id() -> u32 {
    1001
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            realm_id: default_realm_id(),
        }
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Whether started actors register for discovery
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            visible: default_visible(),
        }
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// Host runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Mailbox capacity per actor
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Time in-flight dispatches get to finish once stopping (milliseconds)
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Discovery timeout (milliseconds)
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,

    /// Default timeout for calls through a reference (milliseconds)
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_mailbox_capacity() -> usize {
    MAILBOX_CAPACITY_DEFAULT
}

fn default_drain_timeout_ms() -> u64 {
    DRAIN_TIMEOUT_MS_DEFAULT
}

fn default_discovery_timeout_ms() -> u64 {
    DISCOVERY_TIMEOUT_MS_DEFAULT
}

fn default_call_timeout_ms() -> u64 {
    CALL_TIMEOUT_MS_DEFAULT
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            drain_timeout_ms: default_drain_timeout_ms(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl RuntimeConfig {
    fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAILBOX_CAPACITY_MAX {
            return Err(Error::InvalidConfiguration {
                field: "runtime.mailbox_capacity".into(),
                reason: format!("must be in 1..={}", MAILBOX_CAPACITY_MAX),
            });
        }

        if self.drain_timeout_ms > DRAIN_TIMEOUT_MS_MAX {
            return Err(Error::InvalidConfiguration {
                field: "runtime.drain_timeout_ms".into(),
                reason: format!(
                    "{} exceeds limit {}",
                    self.drain_timeout_ms, DRAIN_TIMEOUT_MS_MAX
                ),
            });
        }

        if self.discovery_timeout_ms == 0 || self.discovery_timeout_ms > DISCOVERY_TIMEOUT_MS_MAX {
            return Err(Error::InvalidConfiguration {
                field: "runtime.discovery_timeout_ms".into(),
                reason: format!("must be in 1..={}", DISCOVERY_TIMEOUT_MS_MAX),
            });
        }

        if self.call_timeout_ms == 0 || self.call_timeout_ms > CALL_TIMEOUT_MS_MAX {
            return Err(Error::InvalidConfiguration {
                field: "runtime.call_timeout_ms".into(),
                reason: format!("must be in 1..={}", CALL_TIMEOUT_MS_MAX),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ECHO_SERVER_TOML: &str = r#"
edition = 1
exports = []

[package]
name = "echo-server"
manufacturer = "acme"
type = "EchoService"
description = "An Actor-RTC service"
authors = []

[dependencies]

[system.signaling]
url = "ws://localhost:8081/signaling/ws"

[system.deployment]
realm_id = 1001

[system.discovery]
visible = true

[scripts]
run = "cargo run"
"#;

    #[test]
    fn test_default_config_valid() {
        let config = ActrConfig::default();
        assert_eq!(config.edition, 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.system.deployment.realm_id, 1001);
        assert!(config.system.discovery.visible);
    }

    #[test]
    fn test_parse_actr_toml() {
        let config = ActrConfig::from_toml_str(ECHO_SERVER_TOML).unwrap();
        assert_eq!(config.package.name, "echo-server");
        assert_eq!(
            config.service_type().unwrap().to_string(),
            "acme:EchoService"
        );
        assert_eq!(
            config.system.signaling.url.as_deref(),
            Some("ws://localhost:8081/signaling/ws")
        );
        assert_eq!(config.runtime.mailbox_capacity, MAILBOX_CAPACITY_DEFAULT);
    }

    #[test]
    fn test_invalid_mailbox_capacity() {
        let mut config = ActrConfig::default();
        config.runtime.mailbox_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration { field, .. }) if field == "runtime.mailbox_capacity"
        ));
    }

    #[test]
    fn test_invalid_service_type() {
        let result = ActrConfig::from_toml_str("[package]\nmanufacturer = \"\"\n");
        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration { field, .. }) if field == "package.type"
        ));
    }

    #[test]
    fn test_invalid_signaling_url() {
        let result =
            ActrConfig::from_toml_str("[system.signaling]\nurl = \"http://localhost\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ECHO_SERVER_TOML.as_bytes()).unwrap();

        let config = ActrConfig::from_file(file.path()).unwrap();
        assert_eq!(config.package.service_name, "EchoService");
    }

    #[test]
    fn test_from_missing_file() {
        let result = ActrConfig::from_file("/nonexistent/Actr.toml");
        assert!(matches!(result, Err(Error::ConfigLoad { .. })));
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"edition = = 1").unwrap();

        match ActrConfig::from_file(file.path()) {
            Err(Error::ConfigLoad { path, .. }) => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("expected ConfigLoad, got {:?}", other),
        }
    }
}
