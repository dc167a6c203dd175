//! Actr Core
//!
//! Core types, errors, and constants for the Actr workload runtime.
//!
//! # Overview
//!
//! An actor hosts a [`Workload`]: handler logic reached through route keys,
//! plus `on_start`/`on_stop` hooks. Workloads talk to other actors only
//! through their [`Context`], and find peers by [`ServiceType`] discovery.
//!
//! # TigerStyle
//!
//! This crate follows [TigerStyle](https://github.com/tigerbeetle/tigerbeetle/blob/main/docs/TIGER_STYLE.md)
//! engineering principles:
//! - Safety > Performance > Developer Experience
//! - Explicit limits with big-endian naming (e.g., `ROUTE_KEY_LENGTH_BYTES_MAX`)
//! - No hidden retries, bounded waits

pub mod actor;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod readiness;
pub mod route;
pub mod telemetry;
pub mod workload;

pub use actor::{ActorId, Dest, ServiceType};
pub use config::ActrConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use io::{FixedClock, TimeProvider, WallClockTime};
pub use readiness::ReadinessSignal;
pub use route::{Route, RouteHandler, RouteKey, RouteTable};
pub use telemetry::{init_telemetry, TelemetryConfig};
pub use workload::{Context, Dispatcher, Router, Workload};
