//! Tributech data API credential (OAuth2 client credentials)

use super::types::{
    ClientAuthentication, CredentialData, CredentialProperty, CredentialType, GrantType,
    ResolvedCredential,
};
use crate::auth::AuthConfig;
use crate::error::Result;
use std::collections::HashMap;

/// Credential type name
pub const NAME: &str = "tributechOAuth2Api";

/// Declaration of the Tributech credential type
pub fn credential_type() -> CredentialType {
    CredentialType {
        name: NAME,
        display_name: "Tributech OAuth2 API",
        extends: "oAuth2Api",
        grant_type: GrantType::ClientCredentials,
        authentication: ClientAuthentication::Body,
        properties: vec![
            CredentialProperty::string("api_url", "Data API URL").required(),
            CredentialProperty::string("auth_url", "Token URL").required(),
            CredentialProperty::string("client_id", "Client ID").required(),
            CredentialProperty::string("client_secret", "Client Secret").required(),
            CredentialProperty::string("scope", "Scope"),
        ],
    }
}

/// Resolve user data into a Tributech credential
pub fn resolve(data: &CredentialData) -> Result<ResolvedCredential> {
    let base_url = match CredentialData::field(&data.base_url) {
        Some(url) => url,
        None => CredentialData::require(&data.api_url, "api_url")?,
    };

    // A ready token skips the client credentials exchange
    if let Some(token) = CredentialData::field(&data.access_token) {
        return Ok(ResolvedCredential::new(base_url, AuthConfig::Bearer { token }));
    }

    let token_url = match CredentialData::field(&data.token_url) {
        Some(url) => url,
        None => CredentialData::require(&data.auth_url, "auth_url")?,
    };

    let scopes = CredentialData::field(&data.scope)
        .map(|scope| scope.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    let auth = AuthConfig::Oauth2ClientCredentials {
        token_url,
        client_id: CredentialData::require(&data.client_id, "client_id")?,
        client_secret: CredentialData::require(&data.client_secret, "client_secret")?,
        scopes,
        token_body: HashMap::new(),
    };

    Ok(ResolvedCredential::new(base_url, auth))
}
