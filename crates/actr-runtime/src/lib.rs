//! Actr Runtime
//!
//! Single-process host for Actr workloads.
//!
//! # Overview
//!
//! ```text
//! ActorSystem::attach(workload) -> Node --start()--> ActorRef
//!                                   |
//!                      mailbox -> inbound loop -> Dispatcher::dispatch
//! ```
//!
//! Calls between actors travel through the system directory as envelopes on
//! bounded channels; discovery resolves service types to live identities.

pub mod directory;
pub mod discovery;
pub mod lifecycle;
pub mod mailbox;
pub mod node;
pub mod reference;
pub mod router;
pub mod stats;
pub mod system;

pub use directory::Directory;
pub use discovery::{Discovery, LocalDiscovery};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use mailbox::Envelope;
pub use node::Node;
pub use reference::ActorRef;
pub use router::SystemRouter;
pub use stats::DispatchStats;
pub use system::ActorSystem;
