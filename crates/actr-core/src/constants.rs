//! TigerStyle constants for Actr
//!
//! All limits are explicit, use big-endian naming (most significant first),
//! and include units in the name.

// =============================================================================
// Route Limits
// =============================================================================

/// Maximum length of a route key in bytes
pub const ROUTE_KEY_LENGTH_BYTES_MAX: usize = 256;

/// Number of dot-separated segments in a route key (namespace.Service.Method)
pub const ROUTE_KEY_SEGMENTS_COUNT: usize = 3;

/// Maximum number of routes a single route table may hold
pub const ROUTE_TABLE_ENTRIES_COUNT_MAX: usize = 1024;

/// Maximum size of a request or response payload in bytes (1 MB)
pub const PAYLOAD_SIZE_BYTES_MAX: usize = 1024 * 1024;

// =============================================================================
// Identity Limits
// =============================================================================

/// Maximum length of a service type namespace (manufacturer) in bytes
pub const SERVICE_NAMESPACE_LENGTH_BYTES_MAX: usize = 128;

/// Maximum length of a service type name in bytes
pub const SERVICE_NAME_LENGTH_BYTES_MAX: usize = 128;

// =============================================================================
// Runtime Limits
// =============================================================================

/// Default mailbox capacity per actor
pub const MAILBOX_CAPACITY_DEFAULT: usize = 1024;

/// Maximum mailbox capacity per actor
pub const MAILBOX_CAPACITY_MAX: usize = 100_000;

/// Default time in-flight dispatches get to finish once stopping (5 sec)
pub const DRAIN_TIMEOUT_MS_DEFAULT: u64 = 5 * 1000;

/// Maximum drain timeout (5 min)
pub const DRAIN_TIMEOUT_MS_MAX: u64 = 5 * 60 * 1000;

/// Default discovery timeout (3 sec)
pub const DISCOVERY_TIMEOUT_MS_DEFAULT: u64 = 3 * 1000;

/// Maximum discovery timeout (1 min)
pub const DISCOVERY_TIMEOUT_MS_MAX: u64 = 60 * 1000;

/// Default timeout for calls issued through a reference (30 sec)
pub const CALL_TIMEOUT_MS_DEFAULT: u64 = 30 * 1000;

/// Maximum call timeout (2 min)
pub const CALL_TIMEOUT_MS_MAX: u64 = 120 * 1000;

// =============================================================================
// Compile-time assertions
// =============================================================================

const _: () = {
    assert!(ROUTE_KEY_LENGTH_BYTES_MAX >= 64);
    assert!(ROUTE_KEY_SEGMENTS_COUNT == 3);
    assert!(PAYLOAD_SIZE_BYTES_MAX <= 16 * 1024 * 1024);
    assert!(MAILBOX_CAPACITY_DEFAULT <= MAILBOX_CAPACITY_MAX);
    assert!(DRAIN_TIMEOUT_MS_DEFAULT <= DRAIN_TIMEOUT_MS_MAX);
    assert!(DISCOVERY_TIMEOUT_MS_DEFAULT <= DISCOVERY_TIMEOUT_MS_MAX);
    assert!(CALL_TIMEOUT_MS_DEFAULT <= CALL_TIMEOUT_MS_MAX);
};
