use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::time::Duration;

/// JSON Web Key Set as published by the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kid: Option<String>,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    /// Certificate chain, each entry base64 DER; the first entry holds the signing key
    #[serde(default)]
    pub x5c: Vec<String>,
}

impl JwkSet {
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }
}

impl Jwk {
    /// PEM certificate rebuilt from the first certificate of the chain
    pub fn certificate_pem(&self) -> Result<String, JwksError> {
        let der_base64 = self.x5c.first().ok_or_else(|| {
            JwksError::MissingCertificate(self.kid.clone().unwrap_or_default())
        })?;

        Ok(to_certificate_pem(der_base64))
    }

    /// RSA verification key taken from the certificate's subject public key
    pub fn decoding_key(&self) -> Result<DecodingKey, JwksError> {
        let pem = self.certificate_pem()?;
        DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| JwksError::InvalidCertificate(e.to_string()))
    }
}

/// Wrap a base64 DER certificate into PEM armor with 64-column lines
pub fn to_certificate_pem(der_base64: &str) -> String {
    let body: Vec<char> = der_base64.chars().filter(|c| !c.is_whitespace()).collect();

    let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");
    for line in body.chunks(64) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str("-----END CERTIFICATE-----\n");
    pem
}

/// Source of the identity provider's current key set
#[async_trait]
pub trait KeySetProvider: Send + Sync {
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches the key set over HTTPS on every call
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
}

impl JwksClient {
    pub fn new(jwks_url: &str, timeout: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        Ok(Self {
            jwks_url: jwks_url.to_string(),
            client,
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

#[async_trait]
impl KeySetProvider for JwksClient {
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "Failed to fetch JWKS: HTTP {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        tracing::debug!("Fetched {} signing keys from {}", jwks.keys.len(), self.jwks_url);

        Ok(jwks)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Signing key {0} has no certificate chain")]
    MissingCertificate(String),

    #[error("Invalid signing certificate: {0}")]
    InvalidCertificate(String),
}
