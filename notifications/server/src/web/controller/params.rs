use std::ops::Range;

use notifications_core::model::{
    Audience, Client, Dispatch, Html, Kind, Message, OrganizationRole, VcapRequest,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    service::ClientRegistry,
    web::{
        controller::error::{Error, Result},
        middleware::AuthClient,
    },
};

/// Body of every notify endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NotifyParams {
    /// Kind of notification, lowercase letters, digits, `_`, `-` and `.`.
    /// Optional for `/emails`. Whether the kind is critical is taken from its
    /// registration.
    #[serde(default)]
    pub kind_id: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub text: String,

    /// Either a fragment or a complete document, which is split into doctype,
    /// head, body attributes and body content.
    #[serde(default)]
    pub html: String,

    #[serde(default)]
    pub reply_to: String,

    /// Recipient address, required for `/emails`.
    #[serde(default)]
    pub to: String,

    /// Restricts an organization notification to `OrgManager`,
    /// `BillingManager` or `OrgAuditor`.
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub campaign_id: Option<String>,
}

fn is_valid_kind_id(kind_id: &str) -> bool {
    kind_id.bytes().all(|b| {
        b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-' || b == b'.'
    })
}

impl NotifyParams {
    /// Validates the params for `audience`, collecting every violation.
    fn validate(&self, audience: Audience) -> std::result::Result<Option<OrganizationRole>, Vec<String>> {
        let mut errors = Vec::new();

        if self.kind_id.is_empty() {
            if audience != Audience::Email {
                errors.push(r#""kind_id" is a required field"#.to_string());
            }
        } else if !is_valid_kind_id(&self.kind_id) {
            errors.push(r#""kind_id" is improperly formatted"#.to_string());
        }

        if audience == Audience::Email && self.to.trim().is_empty() {
            errors.push(r#""to" is a required field"#.to_string());
        }

        if self.text.is_empty() && self.html.is_empty() {
            errors.push(r#""text" or "html" fields must be supplied"#.to_string());
        }

        let role = match (audience, self.role.as_deref()) {
            (Audience::Organization, Some(role)) if !role.is_empty() => match role.parse::<OrganizationRole>() {
                Ok(role) => Some(role),
                Err(err) => {
                    errors.push(err.to_string());
                    None
                }
            },
            _ => None,
        };

        if errors.is_empty() {
            Ok(role)
        } else {
            Err(errors)
        }
    }

    /// Builds the dispatch of a notify call. The client and kind descriptions
    /// and the criticality of the kind come from `registry`.
    ///
    /// # Errors
    /// Returns a validation error listing every invalid field, or the error
    /// of the registry lookup
    pub async fn into_dispatch(
        self,
        audience: Audience,
        guid: String,
        client: &AuthClient,
        registry: &dyn ClientRegistry,
        vcap_request: VcapRequest,
    ) -> Result<Dispatch> {
        let role = self.validate(audience).map_err(|errors| Error::Validation { errors })?;
        let (registered_client, kind) =
            registry.find_or_create(&client.client_id, &self.kind_id).await?;

        Ok(Dispatch {
            guid,
            role,
            uaa_host: client.uaa_host.clone(),
            kind,
            client: registered_client,
            message: Message {
                to: self.to.trim().to_string(),
                reply_to: self.reply_to,
                subject: self.subject,
                text: self.text,
                html: split_html(&self.html),
            },
            vcap_request,
            campaign_id: self.campaign_id.filter(|campaign_id| !campaign_id.is_empty()),
        })
    }
}

/// A kind of notification a client sends.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct KindParams {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Requires the `critical_notifications.write` scope to register.
    #[serde(default)]
    pub critical: bool,
}

/// Body of `PUT /registration`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegistrationParams {
    #[serde(default)]
    pub source_description: String,

    /// Every kind of the client. Kinds registered before and missing here
    /// are removed; when absent, the registered kinds are kept.
    #[serde(default)]
    pub kinds: Option<Vec<KindParams>>,
}

impl RegistrationParams {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.source_description.trim().is_empty() {
            errors.push(r#""source_description" is a required field"#.to_string());
        }

        for kind in self.kinds.iter().flatten() {
            if kind.id.is_empty() {
                errors.push(r#""kind.id" is a required field"#.to_string());
            } else if !is_valid_kind_id(&kind.id) {
                errors.push(r#""kind.id" is improperly formatted"#.to_string());
            }
            if kind.description.trim().is_empty() {
                errors.push(r#""kind.description" is a required field"#.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds the client registered by `client_id` and its kinds.
    ///
    /// # Errors
    /// Returns a validation error listing every invalid field
    pub fn into_registration(self, client_id: &str) -> Result<(Client, Option<Vec<Kind>>)> {
        self.validate().map_err(|errors| Error::Validation { errors })?;

        let client = Client { id: client_id.to_string(), description: self.source_description };
        let kinds = self.kinds.map(|kinds| {
            kinds
                .into_iter()
                .map(|KindParams { id, description, critical }| Kind { id, description, critical })
                .collect()
        });

        Ok((client, kinds))
    }
}

struct Element {
    whole: Range<usize>,
    attributes: Range<usize>,
    content: Range<usize>,
}

/// Locates the first `tag` element of an ASCII-lowercased document.
fn element(lower: &str, tag: &str) -> Option<Element> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut from = 0;
    let start = loop {
        let start = from + lower[from..].find(&open)?;
        let next = lower[start + open.len()..].chars().next()?;
        if next == '>' || next.is_ascii_whitespace() {
            break start;
        }
        from = start + open.len();
    };

    let tag_end = start + lower[start..].find('>')?;
    let content_end = lower[tag_end..].find(&close).map_or(lower.len(), |index| tag_end + index);
    let end = (content_end + close.len()).min(lower.len());

    Some(Element {
        whole: start..end,
        attributes: start + open.len()..tag_end,
        content: tag_end + 1..content_end,
    })
}

/// Splits an HTML document into the parts the delivery worker wraps its own
/// template around. A fragment without `<body>` becomes the body content.
#[must_use]
pub fn split_html(html: &str) -> Html {
    let lower = html.to_ascii_lowercase();

    let leading = html.len() - html.trim_start().len();
    let doctype_end = if lower[leading..].starts_with("<!doctype") {
        lower[leading..].find('>').map(|index| leading + index + 1)
    } else {
        None
    };
    let doctype = doctype_end.map_or_else(String::new, |end| html[leading..end].to_string());

    let head = element(&lower, "head");
    let head_content = head.as_ref().map_or_else(String::new, |head| {
        html[head.content.clone()].trim().to_string()
    });

    let (body_attributes, body_content) = if let Some(body) = element(&lower, "body") {
        (html[body.attributes].trim().to_string(), html[body.content].trim().to_string())
    } else {
        let region = element(&lower, "html")
            .map_or(doctype_end.unwrap_or(0)..html.len(), |document| document.content);

        let content = match head {
            Some(head) if region.start <= head.whole.start && head.whole.end <= region.end => {
                format!("{}{}", &html[region.start..head.whole.start], &html[head.whole.end..region.end])
            }
            _ => html[region].to_string(),
        };
        (String::new(), content.trim().to_string())
    };

    Html { body_content, body_attributes, head: head_content, doctype }
}
