//! HTTP plumbing shared by the mart server: problem responses, request ids,
//! authentication context and the router host.

pub mod auth;
pub mod config;
pub mod host;
pub mod problem;
pub mod request_id;

pub use auth::{
    Authorizer, Capability, Role, RoleAuthorizer, SecurityCtx, StaticTokenVerifier, TokenVerifier,
};
pub use config::{AuthConfig, HttpConfig, TokenGrant};
pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
