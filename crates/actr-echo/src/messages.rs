//! Echo protocol: route and message types

use actr_core::error::Result;
use actr_core::{Route, ServiceType};
use serde::{Deserialize, Serialize};

/// Manufacturer of the echo service
pub const ECHO_MANUFACTURER: &str = "acme";

/// Service name of the echo service
pub const ECHO_SERVICE_NAME: &str = "EchoService";

/// Service name of the echo client
pub const ECHO_CLIENT_NAME: &str = "EchoClient";

/// Route key of the echo method
pub const ECHO_ROUTE_KEY: &str = "echo.EchoService.Echo";

/// Reply returned by the client while no server is known
pub const SERVER_NOT_AVAILABLE: &str = "server not available";

/// Service type the echo server registers under
pub fn echo_service_type() -> Result<ServiceType> {
    ServiceType::new(ECHO_MANUFACTURER, ECHO_SERVICE_NAME)
}

/// Service type the echo client is attached as
pub fn echo_client_type() -> Result<ServiceType> {
    ServiceType::new(ECHO_MANUFACTURER, ECHO_CLIENT_NAME)
}

/// Methods of the echo service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoRoute {
    /// Reply with the request message
    Echo,
}

impl Route for EchoRoute {
    const ALL: &'static [Self] = &[Self::Echo];

    fn route_key(&self) -> &'static str {
        match self {
            Self::Echo => ECHO_ROUTE_KEY,
        }
    }
}

/// Echo request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoRequest {
    pub message: String,
}

impl EchoRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Echo response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub reply: String,
    /// Seconds since epoch; 0 for the degraded reply
    pub timestamp: u64,
}

impl EchoResponse {
    /// Degraded reply used when the server dependency is absent
    pub fn server_not_available() -> Self {
        Self {
            reply: SERVER_NOT_AVAILABLE.to_string(),
            timestamp: 0,
        }
    }
}
