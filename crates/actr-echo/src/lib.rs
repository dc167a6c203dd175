//! Actr Echo
//!
//! Echo service and echo client workloads.
//!
//! The server answers `echo.EchoService.Echo` with `Echo: <message>` and the
//! current time. The client discovers the server by service type and forwards
//! the same route to it.

pub mod client;
pub mod messages;
pub mod server;

pub use client::EchoClientWorkload;
pub use messages::{
    echo_client_type, echo_service_type, EchoRequest, EchoResponse, EchoRoute, ECHO_ROUTE_KEY,
    SERVER_NOT_AVAILABLE,
};
pub use server::EchoServerWorkload;
