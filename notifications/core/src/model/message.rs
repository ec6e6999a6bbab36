use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{self, Error};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Queued,
    Delivered,
    Failed,
    Undeliverable,
}

impl MessageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Undeliverable => "undeliverable",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for MessageStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            "undeliverable" => Ok(Self::Undeliverable),
            _ => error::InvalidMessageStatusSnafu { value: s.to_string() }.fail(),
        }
    }
}

/// Tracking row of one queued job, keyed by the job's message ID.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MessageStatusRecord {
    pub id: String,
    pub status: MessageStatus,
    pub campaign_id: Option<String>,
}

impl MessageStatusRecord {
    #[must_use]
    pub fn queued(id: impl Into<String>, campaign_id: Option<String>) -> Self {
        Self { id: id.into(), status: MessageStatus::Queued, campaign_id }
    }
}

/// Per-recipient acknowledgement returned by a notify call. It confirms the
/// job was queued, not that the email was sent.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
pub struct Response {
    pub status: MessageStatus,
    pub recipient: String,
    pub notification_id: String,
    pub vcap_request_id: String,
}
