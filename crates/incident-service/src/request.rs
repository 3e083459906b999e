//! Request context and acting-user identification
//!
//! Handlers receive a transport-neutral [`RequestContext`]. The acting user
//! is taken from the `x-user-id` header, or the `userId` query parameter
//! when the header is absent. There is no credential check; this is a
//! placeholder for real authentication.

use async_trait::async_trait;
use incident_model::User;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::store::Store;

/// Header naming the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Query parameter naming the acting user.
pub const USER_ID_PARAM: &str = "userId";

/// Transport-neutral view of an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request headers, keys lowercased
    pub headers: HashMap<String, String>,

    /// Query parameters
    pub query: HashMap<String, String>,

    /// Requester IP address
    pub ip_address: Option<String>,

    /// Requester user agent
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Empty context (no acting user).
    pub fn new() -> Self {
        Self::default()
    }

    /// Context acting as the given user.
    pub fn as_user(user_id: i64) -> Self {
        Self::new().with_header(USER_ID_HEADER, user_id.to_string())
    }

    /// Add a header. Header names are case-insensitive.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Attach requester IP address and user agent.
    pub fn with_client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Look up a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The raw acting-user ID, header first.
    pub fn claimed_user_id(&self) -> Option<&str> {
        self.header(USER_ID_HEADER)
            .or_else(|| self.query_param(USER_ID_PARAM))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Identifies the acting user of a request.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// Resolve the acting user.
    ///
    /// # Errors
    ///
    /// `ServiceError::Unauthenticated` if no known user is named.
    async fn resolve(&self, ctx: &RequestContext) -> ServiceResult<User>;
}

/// Resolver trusting the `x-user-id` header / `userId` parameter.
#[derive(Clone)]
pub struct HeaderActorResolver {
    store: Arc<dyn Store>,
}

impl HeaderActorResolver {
    /// Create a resolver looking users up in `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActorResolver for HeaderActorResolver {
    async fn resolve(&self, ctx: &RequestContext) -> ServiceResult<User> {
        let raw = ctx.claimed_user_id().ok_or(ServiceError::Unauthenticated)?;
        let id: i64 = raw.parse().map_err(|_| {
            tracing::debug!(user_id = %raw, "Non-numeric acting user ID");
            ServiceError::Unauthenticated
        })?;

        match self.store.get_user(id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!(user_id = id, "Unknown acting user");
                Err(ServiceError::Unauthenticated)
            }
        }
    }
}
