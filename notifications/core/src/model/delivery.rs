use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Options, Organization, Recipient, Space};

/// Schema tag of the jobs written by this service.
pub const DELIVERY_JOB_TYPE: &str = "v2";

/// Payload of one queued job. It carries everything the delivery worker needs
/// to render and send the email without calling back into this service.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Delivery {
    pub job_type: String,
    pub options: Options,
    pub recipient: Recipient,
    pub space: Space,
    pub organization: Organization,
    pub client_id: String,
    pub message_id: String,
    pub uaa_host: String,
    pub scope: String,
    pub vcap_request_id: String,
    pub request_received: DateTime<Utc>,
    pub campaign_id: Option<String>,
}
