use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Audience selector tag, one per strategy.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    User,
    Space,
    Organization,
    Everyone,
    UaaScope,
    Email,
}

impl Audience {
    pub const ALL: [Self; 6] =
        [Self::User, Self::Space, Self::Organization, Self::Everyone, Self::UaaScope, Self::Email];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Space => "space",
            Self::Organization => "organization",
            Self::Everyone => "everyone",
            Self::UaaScope => "uaa_scope",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OrganizationRole {
    OrgManager,
    BillingManager,
    OrgAuditor,
}

impl OrganizationRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrgManager => "OrgManager",
            Self::BillingManager => "BillingManager",
            Self::OrgAuditor => "OrgAuditor",
        }
    }

    /// Cloud Controller association listing the holders of this role.
    #[must_use]
    pub const fn association(self) -> &'static str {
        match self {
            Self::OrgManager => "managers",
            Self::BillingManager => "billing_managers",
            Self::OrgAuditor => "auditors",
        }
    }
}

impl fmt::Display for OrganizationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrganizationRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OrgManager" => Ok(Self::OrgManager),
            "BillingManager" => Ok(Self::BillingManager),
            "OrgAuditor" => Ok(Self::OrgAuditor),
            _ => error::InvalidOrganizationRoleSnafu { role: s.to_string() }.fail(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Kind {
    pub id: String,
    pub description: String,
    pub critical: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Client {
    pub id: String,
    pub description: String,
}

/// HTML part of a message, split so the worker can wrap its own template
/// around the body.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Html {
    pub body_content: String,
    pub body_attributes: String,
    pub head: String,
    pub doctype: String,
}

impl Html {
    #[must_use]
    pub fn is_empty(&self) -> bool { self.body_content.is_empty() }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: Html,
}

/// Correlation data of the inbound request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct VcapRequest {
    pub id: String,
    pub receipt_time: DateTime<Utc>,
}

/// Immutable input of a strategy, built once per notify call.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Dispatch {
    /// User GUID, space GUID, organization GUID or scope, depending on the
    /// audience. Empty for everyone and email dispatches.
    pub guid: String,
    pub role: Option<OrganizationRole>,
    pub uaa_host: String,
    pub kind: Kind,
    pub client: Client,
    pub message: Message,
    pub vcap_request: VcapRequest,
    pub campaign_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organization_role() {
        assert_eq!("OrgManager".parse::<OrganizationRole>().unwrap(), OrganizationRole::OrgManager);
        assert_eq!(
            "BillingManager".parse::<OrganizationRole>().unwrap().association(),
            "billing_managers"
        );
        assert_eq!("OrgAuditor".parse::<OrganizationRole>().unwrap().to_string(), "OrgAuditor");

        let err = "SpaceDeveloper".parse::<OrganizationRole>().unwrap_err();
        assert!(matches!(err, Error::InvalidOrganizationRole { ref role } if role == "SpaceDeveloper"));
    }

    #[test]
    fn test_audience_tags_are_unique() {
        let tags = Audience::ALL.iter().map(|audience| audience.as_str()).collect::<Vec<_>>();
        let mut deduplicated = tags.clone();
        deduplicated.sort_unstable();
        deduplicated.dedup();

        assert_eq!(tags.len(), deduplicated.len());
        assert_eq!(Audience::UaaScope.to_string(), "uaa_scope");
    }
}
