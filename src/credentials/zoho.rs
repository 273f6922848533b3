//! Zoho CRM OAuth2 credential

use super::types::{
    ClientAuthentication, CredentialData, CredentialProperty, CredentialType, GrantType,
    ResolvedCredential,
};
use crate::error::{Error, Result};

/// Credential type name
pub const NAME: &str = "zohoOAuth2Api";

/// Authorization scheme Zoho expects instead of `Bearer`
pub const TOKEN_TYPE: &str = "Zoho-oauthtoken";

/// Zoho data center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// zoho.eu
    Europe,
    /// zoho.com
    #[default]
    UnitedStates,
}

impl Region {
    /// Parse the `region` credential value
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "europe" => Ok(Self::Europe),
            "unitedStates" => Ok(Self::UnitedStates),
            other => Err(Error::invalid_config(
                "region",
                format!("unknown Zoho region '{other}', expected 'europe' or 'unitedStates'"),
            )),
        }
    }

    /// Top-level domain of the data center
    pub fn tld(self) -> &'static str {
        match self {
            Self::Europe => "eu",
            Self::UnitedStates => "com",
        }
    }

    /// CRM API root
    pub fn api_url(self) -> String {
        format!("https://www.zohoapis.{}/crm/v2", self.tld())
    }

    /// Token endpoint
    pub fn token_url(self) -> String {
        format!("https://accounts.zoho.{}/oauth/v2/token", self.tld())
    }
}

/// Declaration of the Zoho credential type
pub fn credential_type() -> CredentialType {
    CredentialType {
        name: NAME,
        display_name: "Zoho OAuth2 API",
        extends: "oAuth2Api",
        grant_type: GrantType::AuthorizationCode,
        authentication: ClientAuthentication::Body,
        properties: vec![CredentialProperty::options(
            "region",
            "Region",
            vec!["europe", "unitedStates"],
            "unitedStates",
        )],
    }
}

/// Resolve user data into a Zoho CRM credential
pub fn resolve(data: &CredentialData) -> Result<ResolvedCredential> {
    let region = match CredentialData::field(&data.region) {
        Some(value) => Region::parse(&value)?,
        None => Region::default(),
    };

    let base_url = CredentialData::field(&data.base_url).unwrap_or_else(|| region.api_url());
    let auth = data.user_oauth2(&region.token_url())?;

    Ok(ResolvedCredential::new(base_url, auth).with_token_type(TOKEN_TYPE))
}
