use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// HTTP host configuration (`modules.http` in the server config).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
    pub auth: AuthConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_enabled: false,
            body_limit_bytes: 1024 * 1024,
            auth: AuthConfig::default(),
        }
    }
}

/// Pre-issued bearer tokens accepted by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub tokens: Vec<TokenGrant>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenGrant {
    pub token: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg: HttpConfig = serde_json::from_value(serde_json::json!({
            "cors_enabled": true
        }))
        .unwrap();
        assert!(cfg.cors_enabled);
        assert_eq!(cfg.body_limit_bytes, 1024 * 1024);
        assert!(cfg.auth.tokens.is_empty());
    }

    #[test]
    fn token_role_defaults_to_customer() {
        let cfg: HttpConfig = serde_json::from_value(serde_json::json!({
            "auth": { "tokens": [
                { "token": "t1", "user_id": "6f1c2b0e-8a43-4c55-9d0b-2f6f4f7a9e11" },
                { "token": "t2", "user_id": "0b7c1c7e-2f3d-4a8e-9f6a-51f0c7d2a3b4", "role": "admin" }
            ]}
        }))
        .unwrap();
        assert_eq!(cfg.auth.tokens[0].role, Role::Customer);
        assert_eq!(cfg.auth.tokens[1].role, Role::Admin);
    }

    #[test]
    fn unknown_fields_rejected() {
        let res: Result<HttpConfig, _> =
            serde_json::from_value(serde_json::json!({ "bind": "0.0.0.0" }));
        assert!(res.is_err());
    }
}
