//! Credential types and user credential data

use crate::auth::{AuthConfig, Authenticator, DEFAULT_TOKEN_TYPE};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};

// ============================================================================
// Declarations
// ============================================================================

/// OAuth2 grant a credential type uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrantType {
    /// Authorization code, exchanged by the host
    AuthorizationCode,
    /// Client credentials, exchanged by this crate
    ClientCredentials,
}

/// Where the client id/secret go on the token request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientAuthentication {
    /// Form body
    Body,
    /// Basic auth header
    Header,
}

/// Kind of a credential property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    /// Free text
    String,
    /// One of a fixed set of values
    Options,
    /// Fixed value not shown to the user
    Hidden,
}

/// One property a credential type declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperty {
    /// Key in the credential data
    pub name: &'static str,
    /// Label shown to the user
    pub display_name: &'static str,
    /// Property kind
    pub kind: PropertyKind,
    /// Default value
    pub default: &'static str,
    /// Allowed values for `Options`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
    /// Whether a value must be provided
    pub required: bool,
}

impl CredentialProperty {
    /// A free-text property
    pub fn string(name: &'static str, display_name: &'static str) -> Self {
        Self {
            name,
            display_name,
            kind: PropertyKind::String,
            default: "",
            options: Vec::new(),
            required: false,
        }
    }

    /// A hidden property with a fixed default
    pub fn hidden(name: &'static str, display_name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            display_name,
            kind: PropertyKind::Hidden,
            default,
            options: Vec::new(),
            required: true,
        }
    }

    /// An options property
    pub fn options(
        name: &'static str,
        display_name: &'static str,
        options: Vec<&'static str>,
        default: &'static str,
    ) -> Self {
        Self {
            name,
            display_name,
            kind: PropertyKind::Options,
            default,
            options,
            required: true,
        }
    }

    /// Mark the property as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Declaration of a credential type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    /// Unique name referenced by nodes (e.g. `zohoOAuth2Api`)
    pub name: &'static str,
    /// Label shown to the user
    pub display_name: &'static str,
    /// Base credential type
    pub extends: &'static str,
    /// OAuth2 grant
    pub grant_type: GrantType,
    /// How the client authenticates at the token endpoint
    pub authentication: ClientAuthentication,
    /// Declared properties
    pub properties: Vec<CredentialProperty>,
}

impl CredentialType {
    /// Look up a declared property
    pub fn property(&self, name: &str) -> Option<&CredentialProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

// ============================================================================
// User Data
// ============================================================================

/// Credential values supplied by the user (or the host)
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialData {
    /// Ready-to-use access token
    pub access_token: Option<String>,
    /// Refresh token for the refresh flow
    pub refresh_token: Option<String>,
    /// OAuth2 client id
    pub client_id: Option<String>,
    /// OAuth2 client secret
    pub client_secret: Option<String>,
    /// API base URL override
    pub base_url: Option<String>,
    /// Token endpoint override
    pub token_url: Option<String>,
    /// Zoho data center
    pub region: Option<String>,
    /// Tributech API URL
    pub api_url: Option<String>,
    /// Tributech token endpoint
    pub auth_url: Option<String>,
    /// OAuth2 scope
    pub scope: Option<String>,
    /// Webhook signing secret
    pub secret: Option<String>,
}

impl CredentialData {
    /// Non-empty value of an optional field
    pub(crate) fn field(value: &Option<String>) -> Option<String> {
        value.clone().none_if_empty()
    }

    /// Non-empty value of a field that must be present
    pub(crate) fn require(value: &Option<String>, name: &str) -> Result<String> {
        Self::field(value).ok_or_else(|| Error::missing_field(name))
    }

    /// Auth for OAuth2 credentials whose code exchange the host performs:
    /// a ready access token, or a refresh token plus client pair
    pub fn user_oauth2(&self, default_token_url: &str) -> Result<AuthConfig> {
        if let Some(token) = Self::field(&self.access_token) {
            return Ok(AuthConfig::Bearer { token });
        }

        let Some(refresh_token) = Self::field(&self.refresh_token) else {
            return Err(Error::missing_field("access_token"));
        };

        Ok(AuthConfig::Oauth2Refresh {
            token_url: Self::field(&self.token_url)
                .unwrap_or_else(|| default_token_url.to_string()),
            client_id: Self::require(&self.client_id, "client_id")?,
            client_secret: Self::require(&self.client_secret, "client_secret")?,
            refresh_token,
        })
    }
}

impl std::fmt::Debug for CredentialData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("CredentialData")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("region", &self.region)
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("scope", &self.scope)
            .field("secret", &redact(&self.secret))
            .finish()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// A credential resolved into everything a node needs to talk to its API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    /// API base URL
    pub base_url: String,
    /// Request authentication
    pub auth: AuthConfig,
    /// Authorization scheme
    pub token_type: String,
}

impl ResolvedCredential {
    /// Create a resolved credential with the default bearer scheme
    pub fn new(base_url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    /// Use a custom authorization scheme
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Build an authenticated HTTP client rooted at the API base URL
    pub fn http_client(&self, http: HttpClientConfig) -> Result<HttpClient> {
        let config = HttpClientConfigBuilder::from_config(http)
            .base_url(self.base_url.clone())
            .build();
        let authenticator =
            Authenticator::new(self.auth.clone()).with_token_type(self.token_type.clone());
        Ok(HttpClient::with_config(config)?.with_authenticator(authenticator))
    }
}
