use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::jwks::{JwksError, KeySetProvider};
use crate::shared::constants::ANONYMOUS_PRINCIPAL;

/// Outcome of authorizing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow { principal_id: String },
    Deny,
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allow { .. })
    }

    /// Render the decision as an allow-all or deny-all policy
    pub fn policy(&self) -> AuthorizerPolicy {
        let (principal_id, effect) = match self {
            AuthDecision::Allow { principal_id } => (principal_id.clone(), PolicyEffect::Allow),
            AuthDecision::Deny => (ANONYMOUS_PRINCIPAL.to_string(), PolicyEffect::Deny),
        };

        AuthorizerPolicy {
            principal_id,
            policy_document: PolicyDocument {
                version: "2012-10-17".to_string(),
                statement: vec![PolicyStatement {
                    action: "execute-api:Invoke".to_string(),
                    effect,
                    resource: "*".to_string(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerPolicy {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: PolicyEffect,
    pub resource: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PolicyEffect {
    Allow,
    Deny,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("No authentication header")]
    MissingHeader,

    #[error("Invalid authentication header")]
    InvalidHeader,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error(transparent)]
    KeySet(#[from] JwksError),

    #[error("Invalid signing key: {0}")]
    SigningKeyNotFound(String),

    #[error("Token verification failed: {0}")]
    Verification(String),
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies bearer tokens against the identity provider's published keys.
///
/// Stateless: the key set is fetched again for every authorization.
pub struct TokenAuthorizer {
    key_sets: Arc<dyn KeySetProvider>,
}

impl TokenAuthorizer {
    pub fn new(key_sets: Arc<dyn KeySetProvider>) -> Self {
        Self { key_sets }
    }

    /// Decide whether the caller presenting `authorization` may proceed.
    ///
    /// Every failure collapses into [`AuthDecision::Deny`].
    pub async fn authorize(&self, authorization: Option<&str>) -> AuthDecision {
        let decision = match self.verify(authorization).await {
            Ok(sub) => {
                tracing::info!(principal_id = %sub, "User was authorized");
                AuthDecision::Allow { principal_id: sub }
            }
            Err(e) => {
                tracing::warn!(error = %e, "User not authorized");
                AuthDecision::Deny
            }
        };

        tracing::debug!(
            allowed = decision.is_allowed(),
            policy = ?decision.policy(),
            "Authorizer decision"
        );

        decision
    }

    async fn verify(&self, authorization: Option<&str>) -> Result<String, AuthorizationError> {
        let token = extract_bearer_token(authorization)?;

        let header =
            decode_header(token).map_err(|e| AuthorizationError::MalformedToken(e.to_string()))?;
        let kid = header.kid.ok_or(AuthorizationError::MissingKeyId)?;

        let key_set = self.key_sets.fetch_key_set().await?;
        let signing_key = key_set
            .find(&kid)
            .ok_or_else(|| AuthorizationError::SigningKeyNotFound(kid.clone()))?;

        tracing::debug!(
            kid = %kid,
            kty = %signing_key.kty,
            alg = ?signing_key.alg,
            "Found signing key"
        );

        let decoding_key = signing_key.decoding_key()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AuthorizationError::Verification(e.to_string()))?;

        Ok(token_data.claims.sub)
    }
}

/// Pull the token out of a `Bearer <token>` header; the scheme is case-insensitive
pub fn extract_bearer_token(authorization: Option<&str>) -> Result<&str, AuthorizationError> {
    let header = authorization.ok_or(AuthorizationError::MissingHeader)?;

    if !header.to_lowercase().starts_with("bearer ") {
        return Err(AuthorizationError::InvalidHeader);
    }

    header
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .ok_or(AuthorizationError::InvalidHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::jwks::{Jwk, JwkSet};
    use async_trait::async_trait;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SIGNING_KEY: &str = include_str!("testdata/signing_key.pem");
    const SIGNING_CERT: &str = include_str!("testdata/signing_cert.pem");
    const OTHER_KEY: &str = include_str!("testdata/other_key.pem");
    const OTHER_CERT: &str = include_str!("testdata/other_cert.pem");

    struct StaticKeySet(Option<JwkSet>);

    #[async_trait]
    impl KeySetProvider for StaticKeySet {
        async fn fetch_key_set(&self) -> Result<JwkSet, JwksError> {
            self.0
                .clone()
                .ok_or_else(|| JwksError::FetchError("connection refused".to_string()))
        }
    }

    fn x5c(cert_pem: &str) -> String {
        cert_pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect()
    }

    fn jwk(kid: &str, cert_pem: &str) -> Jwk {
        Jwk {
            kid: Some(kid.to_string()),
            kty: "RSA".to_string(),
            alg: Some("RS256".to_string()),
            x5c: vec![x5c(cert_pem)],
        }
    }

    fn authorizer() -> TokenAuthorizer {
        let keys = JwkSet {
            keys: vec![jwk("other-key", OTHER_CERT), jwk("signing-key", SIGNING_CERT)],
        };
        TokenAuthorizer::new(Arc::new(StaticKeySet(Some(keys))))
    }

    fn sign(kid: &str, private_key_pem: &str, exp_offset_secs: i64) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());

        let now = chrono::Utc::now().timestamp();
        let claims = json!({
            "sub": "auth0|equipment-owner",
            "iat": now,
            "exp": now + exp_offset_secs,
            "aud": "equipment-status-client",
        });

        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }

    #[tokio::test]
    async fn test_allows_valid_token_and_returns_subject() {
        let token = sign("signing-key", SIGNING_KEY, 3600);
        let decision = authorizer()
            .authorize(Some(&format!("Bearer {}", token)))
            .await;

        assert_eq!(
            decision,
            AuthDecision::Allow {
                principal_id: "auth0|equipment-owner".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_bearer_scheme_is_case_insensitive() {
        let token = sign("signing-key", SIGNING_KEY, 3600);
        let decision = authorizer()
            .authorize(Some(&format!("BEARER {}", token)))
            .await;

        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_denies_missing_header() {
        assert_eq!(authorizer().authorize(None).await, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_non_bearer_scheme() {
        let token = sign("signing-key", SIGNING_KEY, 3600);
        let decision = authorizer()
            .authorize(Some(&format!("Basic {}", token)))
            .await;

        assert_eq!(decision, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_unknown_key_id() {
        let token = sign("rotated-away", SIGNING_KEY, 3600);
        let decision = authorizer()
            .authorize(Some(&format!("Bearer {}", token)))
            .await;

        assert_eq!(decision, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_signature_mismatch() {
        // Claims to be signed by signing-key but was signed with the other private key
        let token = sign("signing-key", OTHER_KEY, 3600);
        let decision = authorizer()
            .authorize(Some(&format!("Bearer {}", token)))
            .await;

        assert_eq!(decision, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_expired_token() {
        let token = sign("signing-key", SIGNING_KEY, -3600);
        let decision = authorizer()
            .authorize(Some(&format!("Bearer {}", token)))
            .await;

        assert_eq!(decision, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_when_key_set_fetch_fails() {
        let authorizer = TokenAuthorizer::new(Arc::new(StaticKeySet(None)));
        let token = sign("signing-key", SIGNING_KEY, 3600);
        let decision = authorizer
            .authorize(Some(&format!("Bearer {}", token)))
            .await;

        assert_eq!(decision, AuthDecision::Deny);
    }

    #[tokio::test]
    async fn test_denies_garbage_token() {
        let decision = authorizer().authorize(Some("Bearer not-a-jwt")).await;
        assert_eq!(decision, AuthDecision::Deny);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(Some("bearer abc")).unwrap(), "abc");
        assert!(matches!(
            extract_bearer_token(None),
            Err(AuthorizationError::MissingHeader)
        ));
        assert!(matches!(
            extract_bearer_token(Some("Token abc")),
            Err(AuthorizationError::InvalidHeader)
        ));
        assert!(matches!(
            extract_bearer_token(Some("Bearer ")),
            Err(AuthorizationError::InvalidHeader)
        ));
    }

    #[test]
    fn test_policy_documents() {
        let allow = AuthDecision::Allow {
            principal_id: "auth0|abc".to_string(),
        }
        .policy();
        let allow_json = serde_json::to_value(&allow).unwrap();
        assert_eq!(allow_json["principalId"], "auth0|abc");
        assert_eq!(allow_json["policyDocument"]["Statement"][0]["Effect"], "Allow");
        assert_eq!(allow_json["policyDocument"]["Statement"][0]["Resource"], "*");

        let deny_json = serde_json::to_value(AuthDecision::Deny.policy()).unwrap();
        assert_eq!(deny_json["principalId"], "user");
        assert_eq!(deny_json["policyDocument"]["Statement"][0]["Effect"], "Deny");
    }
}
