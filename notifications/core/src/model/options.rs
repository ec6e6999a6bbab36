use serde::{Deserialize, Serialize};

use crate::model::{Dispatch, Html};

/// Message content merged with the endorsement of the strategy that resolved
/// the audience. One value is shared by every recipient of a dispatch.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Options {
    pub reply_to: String,
    pub subject: String,
    pub to: String,
    pub kind_id: String,
    pub kind_description: String,
    pub source_description: String,
    pub text: String,
    pub html: Html,
    pub endorsement: String,
}

impl Options {
    #[must_use]
    pub fn new(dispatch: &Dispatch, endorsement: impl Into<String>) -> Self {
        let Dispatch { kind, client, message, .. } = dispatch;
        Self {
            reply_to: message.reply_to.clone(),
            subject: message.subject.clone(),
            to: message.to.clone(),
            kind_id: kind.id.clone(),
            kind_description: kind.description.clone(),
            source_description: client.description.clone(),
            text: message.text.clone(),
            html: message.html.clone(),
            endorsement: endorsement.into(),
        }
    }
}
