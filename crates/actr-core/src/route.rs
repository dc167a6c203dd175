//! Route keys and route tables
//!
//! TigerStyle: Route keys are validated once, tables are immutable after build.
//!
//! A route key names one remote-callable method as `<namespace>.<Service>.<Method>`.
//! Workloads declare their methods as a closed enum implementing [`Route`]; a
//! [`RouteTable`] resolves incoming keys to variants, and the workload's
//! [`RouteHandler`] matches on the variant exhaustively.

use crate::constants::*;
use crate::error::{Error, Result};
use crate::workload::{Context, Dispatcher};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// RouteKey
// =============================================================================

/// Identifier of a remote-callable method
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteKey(String);

impl RouteKey {
    /// Parse and validate a route key
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();

        let invalid = |reason: String| Error::InvalidRouteKey {
            key: key.clone(),
            reason,
        };

        if key.is_empty() {
            return Err(invalid("must not be empty".into()));
        }
        if key.len() > ROUTE_KEY_LENGTH_BYTES_MAX {
            return Err(invalid(format!(
                "length {} exceeds limit {}",
                key.len(),
                ROUTE_KEY_LENGTH_BYTES_MAX
            )));
        }

        let mut segments_count = 0;
        for segment in key.split('.') {
            segments_count += 1;
            if segment.is_empty() {
                return Err(invalid("empty segment".into()));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(invalid(format!(
                    "segment '{}' contains invalid characters",
                    segment
                )));
            }
        }
        if segments_count != ROUTE_KEY_SEGMENTS_COUNT {
            return Err(invalid(format!(
                "expected {} segments, got {}",
                ROUTE_KEY_SEGMENTS_COUNT, segments_count
            )));
        }

        Ok(Self(key))
    }

    /// The full key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace segment (e.g. `echo`)
    pub fn namespace(&self) -> &str {
        self.segment(0)
    }

    /// Service segment (e.g. `EchoService`)
    pub fn service(&self) -> &str {
        self.segment(1)
    }

    /// Method segment (e.g. `Echo`)
    pub fn method(&self) -> &str {
        self.segment(2)
    }

    fn segment(&self, index: usize) -> &str {
        // Validated at parse time: exactly three segments
        self.0.split('.').nth(index).unwrap_or_default()
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RouteKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RouteKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for RouteKey {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<RouteKey> for String {
    fn from(key: RouteKey) -> Self {
        key.0
    }
}

impl AsRef<str> for RouteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Route
// =============================================================================

/// Closed set of methods a workload serves
///
/// Implemented by a fieldless enum; each variant maps to one static key.
pub trait Route: Copy + Eq + Send + Sync + fmt::Debug + 'static {
    /// Every variant, in declaration order
    const ALL: &'static [Self];

    /// The route key this variant answers to
    fn route_key(&self) -> &'static str;
}

/// Handles one resolved route on behalf of a workload
///
/// Implementations `match` on the route, so adding a variant without a
/// handler fails to compile.
#[async_trait]
pub trait RouteHandler<R: Route>: Send + Sync + 'static {
    /// Handle a request for `route`
    async fn handle(&self, route: R, payload: Bytes, ctx: &Context) -> Result<Bytes>;
}

// =============================================================================
// RouteTable
// =============================================================================

/// Immutable mapping from route key to route
///
/// Implements [`Dispatcher`] for any workload that handles `R`. Unknown keys
/// produce [`Error::UnrecognizedRoute`].
#[derive(Debug, Clone)]
pub struct RouteTable<R: Route> {
    routes: HashMap<RouteKey, R>,
}

impl<R: Route> RouteTable<R> {
    /// Build the table from `R::ALL`
    ///
    /// Fails if a variant declares a malformed key or two variants share a key.
    pub fn new() -> Result<Self> {
        assert!(
            R::ALL.len() <= ROUTE_TABLE_ENTRIES_COUNT_MAX,
            "route table exceeds {} entries",
            ROUTE_TABLE_ENTRIES_COUNT_MAX
        );

        let mut routes = HashMap::with_capacity(R::ALL.len());
        for route in R::ALL {
            let key = RouteKey::parse(route.route_key())?;
            if let Some(existing) = routes.insert(key.clone(), *route) {
                return Err(Error::InvalidRouteKey {
                    key: key.to_string(),
                    reason: format!("declared by both {:?} and {:?}", existing, route),
                });
            }
        }

        debug_assert_eq!(routes.len(), R::ALL.len());
        Ok(Self { routes })
    }

    /// Resolve a key to its route
    pub fn resolve(&self, route_key: &RouteKey) -> Result<R> {
        self.routes
            .get(route_key)
            .copied()
            .ok_or_else(|| Error::unrecognized_route(route_key.as_str()))
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All route keys, sorted
    pub fn route_keys(&self) -> Vec<&RouteKey> {
        let mut keys: Vec<_> = self.routes.keys().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl<W, R> Dispatcher<W> for RouteTable<R>
where
    W: RouteHandler<R>,
    R: Route,
{
    async fn dispatch(
        &self,
        workload: &W,
        route_key: &RouteKey,
        payload: Bytes,
        ctx: &Context,
    ) -> Result<Bytes> {
        let route = self.resolve(route_key)?;
        workload.handle(route, payload, ctx).await
    }
}
