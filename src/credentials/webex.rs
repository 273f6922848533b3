//! Cisco Webex OAuth2 credential

use super::types::{
    ClientAuthentication, CredentialData, CredentialProperty, CredentialType, GrantType,
    ResolvedCredential,
};
use crate::error::Result;

/// Credential type name
pub const NAME: &str = "ciscoWebexOAuth2Api";

/// Webex API root
pub const API_URL: &str = "https://webexapis.com/v1";

/// Authorization endpoint
pub const AUTHORIZATION_URL: &str = "https://webexapis.com/v1/authorize";

/// Token endpoint
pub const ACCESS_TOKEN_URL: &str = "https://webexapis.com/v1/access_token";

/// Scopes requested on authorization
pub const SCOPES: &[&str] = &[
    "spark:all",
    "spark:kms",
    "meeting:schedules_read",
    "meeting:schedules_write",
    "meeting:participants_read",
    "meeting:participants_write",
    "meeting:preferences_read",
    "meeting:preferences_write",
    "meeting:recordings_read",
    "meeting:recordings_write",
    "meeting:controls_read",
    "meeting:controls_write",
    "meeting:admin_schedule_read",
    "meeting:admin_schedule_write",
    "meeting:admin_preferences_read",
    "meeting:admin_preferences_write",
    "meeting:admin_recordings_read",
    "meeting:admin_recordings_write",
    "meeting:admin_participants_read",
    "spark-admin:people_read",
    "spark-admin:people_write",
    "spark-admin:places_read",
    "spark-admin:places_write",
    "spark-admin:devices_read",
    "spark-admin:devices_write",
    "spark-admin:workspaces_read",
    "spark-admin:workspaces_write",
    "spark-admin:workspace_locations_read",
    "spark-admin:workspace_locations_write",
    "spark-admin:organizations_read",
    "spark-admin:organizations_write",
    "spark-admin:roles_read",
    "spark-admin:licenses_read",
    "spark-admin:call_qualities_read",
    "spark-admin:hybrid_clusters_read",
    "spark-admin:hybrid_connectors_read",
    "spark-admin:resource_groups_read",
    "spark-admin:resource_group_memberships_read",
    "spark-admin:resource_group_memberships_write",
    "spark-admin:broadworks_subscribers_write",
    "spark-admin:broadworks_enterprises_read",
    "spark-admin:broadworks_enterprises_write",
    "spark-compliance:messages_read",
    "spark-compliance:messages_write",
    "spark-compliance:memberships_read",
    "spark-compliance:memberships_write",
    "spark-compliance:rooms_read",
    "spark-compliance:rooms_write",
    "spark-compliance:teams_read",
    "spark-compliance:team_memberships_read",
    "spark-compliance:team_memberships_write",
    "spark-compliance:events_read",
    "identity:placeonetimepassword_create",
    "analytics:read_all",
    "audit:events_read",
];

/// Declaration of the Webex credential type
pub fn credential_type() -> CredentialType {
    CredentialType {
        name: NAME,
        display_name: "Cisco Webex OAuth2 API",
        extends: "oAuth2Api",
        grant_type: GrantType::AuthorizationCode,
        authentication: ClientAuthentication::Body,
        properties: vec![
            CredentialProperty::hidden("authUrl", "Authorization URL", AUTHORIZATION_URL),
            CredentialProperty::hidden("accessTokenUrl", "Access Token URL", ACCESS_TOKEN_URL),
            CredentialProperty::string("secret", "Secret"),
        ],
    }
}

/// Resolve user data into a Webex API credential
pub fn resolve(data: &CredentialData) -> Result<ResolvedCredential> {
    let base_url = CredentialData::field(&data.base_url).unwrap_or_else(|| API_URL.to_string());
    Ok(ResolvedCredential::new(
        base_url,
        data.user_oauth2(ACCESS_TOKEN_URL)?,
    ))
}
