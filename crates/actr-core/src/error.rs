//! Error types for Actr
//!
//! TigerStyle: Explicit error types with context, using thiserror.

use thiserror::Error;

/// Result type alias for Actr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Actr error types
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Routing Errors
    // =========================================================================
    #[error("Unrecognized route: {route_key}")]
    UnrecognizedRoute { route_key: String },

    #[error("Invalid route key: {key}, reason: {reason}")]
    InvalidRouteKey { key: String, reason: String },

    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    // =========================================================================
    // Call Errors
    // =========================================================================
    #[error("Unreachable destination: {actor_id}")]
    UnreachableDestination { actor_id: String },

    #[error("Actor stopping: {actor_id}")]
    ActorStopping { actor_id: String },

    #[error("Call timeout: {route_key} after {timeout_ms}ms")]
    CallTimeout { route_key: String, timeout_ms: u64 },

    // =========================================================================
    // Discovery Errors
    // =========================================================================
    #[error("Invalid service type: {value}, reason: {reason}")]
    InvalidServiceType { value: String, reason: String },

    #[error("Discovery failed: {service_type}, reason: {reason}")]
    DiscoveryFailed {
        service_type: String,
        reason: String,
    },

    #[error("Discovery timeout: {service_type} after {timeout_ms}ms")]
    DiscoveryTimeout {
        service_type: String,
        timeout_ms: u64,
    },

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Lifecycle hook failed: {actor_id}, hook: {hook}, reason: {reason}")]
    HookFailed {
        actor_id: String,
        hook: String,
        reason: String,
    },

    #[error("Invalid lifecycle transition: {actor_id}, from {from} to {to}")]
    InvalidTransition {
        actor_id: String,
        from: String,
        to: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Serialization failed: {reason}")]
    SerializationFailed { reason: String },

    #[error("Deserialization failed: {reason}")]
    DeserializationFailed { reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an unrecognized route error
    pub fn unrecognized_route(route_key: impl Into<String>) -> Self {
        Self::UnrecognizedRoute {
            route_key: route_key.into(),
        }
    }

    /// Create an unreachable destination error
    pub fn unreachable(actor_id: impl ToString) -> Self {
        Self::UnreachableDestination {
            actor_id: actor_id.to_string(),
        }
    }

    /// Create an actor stopping error
    pub fn stopping(actor_id: impl ToString) -> Self {
        Self::ActorStopping {
            actor_id: actor_id.to_string(),
        }
    }

    /// Create a discovery failed error
    pub fn discovery_failed(service_type: impl ToString, reason: impl Into<String>) -> Self {
        Self::DiscoveryFailed {
            service_type: service_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is retriable
    ///
    /// The runtime never retries on its own; callers use this to decide.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::CallTimeout { .. }
                | Self::DiscoveryTimeout { .. }
                | Self::DiscoveryFailed { .. }
                | Self::ActorStopping { .. }
        )
    }
}
