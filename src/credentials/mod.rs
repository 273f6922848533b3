//! Credentials module
//!
//! Declares the credential types nodes reference and turns user-supplied
//! credential data into an authenticated client configuration.
//!
//! | Type | Flow |
//! |------|------|
//! | `ciscoWebexOAuth2Api` | OAuth2, token handed over by the host |
//! | `zohoOAuth2Api` | OAuth2, token handed over by the host, region-specific hosts |
//! | `tributechOAuth2Api` | OAuth2 client credentials |

pub mod tributech;
mod types;
pub mod webex;
pub mod zoho;

pub use types::{
    ClientAuthentication, CredentialData, CredentialProperty, CredentialType, GrantType,
    PropertyKind, ResolvedCredential,
};

use crate::error::{Error, Result};

/// Every known credential type
pub fn all() -> Vec<CredentialType> {
    vec![
        webex::credential_type(),
        zoho::credential_type(),
        tributech::credential_type(),
    ]
}

/// Find a credential type by name
pub fn find(name: &str) -> Option<CredentialType> {
    all().into_iter().find(|c| c.name == name)
}

/// Resolve credential data for the named credential type
pub fn resolve(name: &str, data: &CredentialData) -> Result<ResolvedCredential> {
    match name {
        webex::NAME => webex::resolve(data),
        zoho::NAME => zoho::resolve(data),
        tributech::NAME => tributech::resolve(data),
        other => Err(Error::config(format!("Unknown credential type '{other}'"))),
    }
}
