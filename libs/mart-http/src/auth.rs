//! Typed caller identity.
//!
//! Credentials are verified by a [`TokenVerifier`] in the [`require_auth`]
//! middleware, which stores a [`SecurityCtx`] in request extensions. Handlers
//! never read identity from payloads; they extract `SecurityCtx` and check
//! capabilities through an [`Authorizer`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::problem::{forbidden, unauthorized, ProblemResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageCart,
    ManageCoupons,
}

/// Verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityCtx {
    user_id: Uuid,
    role: Role,
}

impl SecurityCtx {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl<S> FromRequestParts<S> for SecurityCtx
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityCtx>()
            .cloned()
            .ok_or_else(|| {
                let mut p = unauthorized("Authentication required");
                p.0.instance = parts.uri.path().to_string();
                p
            })
    }
}

pub trait Authorizer: Send + Sync {
    fn allows(&self, ctx: &SecurityCtx, capability: Capability) -> bool;

    /// Same as [`Authorizer::allows`] but shaped for handlers.
    fn require(
        &self,
        ctx: &SecurityCtx,
        capability: Capability,
        instance: &str,
    ) -> Result<(), ProblemResponse> {
        if self.allows(ctx, capability) {
            return Ok(());
        }
        tracing::warn!(user_id = %ctx.user_id(), ?capability, "capability denied");
        let mut p = forbidden(format!("Role lacks capability {capability:?}"));
        p.0.instance = instance.to_string();
        Err(p)
    }
}

/// Every authenticated caller manages their own cart; only admins manage coupons.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
    fn allows(&self, ctx: &SecurityCtx, capability: Capability) -> bool {
        match capability {
            Capability::ManageCart => true,
            Capability::ManageCoupons => ctx.role() == Role::Admin,
        }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token to a verified identity.
    async fn verify(&self, token: &str) -> Option<SecurityCtx>;
}

/// Verifier backed by a fixed table of pre-issued tokens.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenVerifier {
    grants: HashMap<String, SecurityCtx>,
}

impl StaticTokenVerifier {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        let grants = cfg
            .tokens
            .iter()
            .filter(|g| !g.token.is_empty())
            .map(|g| (g.token.clone(), SecurityCtx::new(g.user_id, g.role)))
            .collect();
        Self { grants }
    }

    pub fn with_token(mut self, token: impl Into<String>, ctx: SecurityCtx) -> Self {
        self.grants.insert(token.into(), ctx);
        self
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<SecurityCtx> {
        self.grants.get(token).cloned()
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware: reject with 401 unless the bearer token verifies.
pub async fn require_auth(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match bearer_token(&req) {
        Some(token) => verifier.verify(token).await,
        None => None,
    };

    match ctx {
        Some(ctx) => {
            tracing::debug!(user_id = %ctx.user_id(), role = ?ctx.role(), "caller authenticated");
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        None => {
            let mut p = unauthorized("Missing or invalid bearer token");
            p.0.instance = req.uri().path().to_string();
            p.into_response()
        }
    }
}
