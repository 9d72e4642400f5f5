//! Resolves who is calling the API.
//!
//! Authentication itself is done by an OAuth2 proxy in front of the server.
//! This module only asks the proxy which user a session cookie belongs to.

mod middleware;
mod resolver;

pub use middleware::identity_guard;
pub use resolver::{
    DEFAULT_USERINFO_TIMEOUT, Identity, IdentityError, IdentityResolver, SESSION_COOKIE,
};
