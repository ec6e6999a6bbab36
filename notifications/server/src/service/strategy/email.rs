use std::sync::Arc;

use async_trait::async_trait;
use lettre::Address;
use notifications_core::model::{
    Audience, Dispatch, Options, Organization, Recipient, Response, Space,
};

use crate::service::{
    database::Connection,
    error::{Error, Result},
    job_enqueuer::JobEnqueuer,
    strategy::{enqueue_context, Strategy},
};

pub const EMAIL_ENDORSEMENT: &str = "This message was sent directly to your email address.";

/// Notifies a bare email address without consulting UAA or Cloud Controller.
pub struct EmailStrategy<C>
where
    C: Connection,
{
    enqueuer: Arc<dyn JobEnqueuer<C>>,
}

impl<C> EmailStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new(enqueuer: Arc<dyn JobEnqueuer<C>>) -> Self { Self { enqueuer } }
}

#[async_trait]
impl<C> Strategy<C> for EmailStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::Email }

    #[tracing::instrument(skip_all)]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        let to = dispatch.message.to.trim();
        if to.is_empty() {
            return Err(Error::MissingTarget { audience: Audience::Email.as_str() });
        }
        if to.parse::<Address>().is_err() {
            return Err(Error::InvalidEmail { email: to.to_string() });
        }

        let recipients = vec![Recipient::email(to)];
        let options = Options { to: to.to_string(), ..Options::new(&dispatch, EMAIL_ENDORSEMENT) };
        let context = enqueue_context(&dispatch, Space::default(), Organization::default(), "");

        self.enqueuer.enqueue(connection, recipients, options, context).await
    }
}

#[cfg(test)]
mod tests {
    use notifications_core::model::Message;

    use super::*;
    use crate::service::testing::{FakeConnection, FakeJobEnqueuer};

    fn dispatch_to(to: &str) -> Dispatch {
        Dispatch {
            message: Message {
                to: to.to_string(),
                subject: "this is the subject".to_string(),
                text: "hello".to_string(),
                ..Message::default()
            },
            ..Dispatch::default()
        }
    }

    #[tokio::test]
    async fn test_enqueues_the_bare_address() {
        let enqueuer = Arc::new(FakeJobEnqueuer::default());
        let strategy = EmailStrategy::<FakeConnection>::new(enqueuer.clone());

        let responses = strategy
            .dispatch(&FakeConnection::default(), dispatch_to("dr@strangelove.com"))
            .await
            .unwrap();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].recipient, "dr@strangelove.com");

        let call = enqueuer.last_call();
        assert_eq!(call.recipients, vec![Recipient::email("dr@strangelove.com")]);
        assert_eq!(call.options.to, "dr@strangelove.com");
        assert_eq!(call.options.endorsement, EMAIL_ENDORSEMENT);
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_dropped_from_recipient_and_options() {
        let enqueuer = Arc::new(FakeJobEnqueuer::default());
        let strategy = EmailStrategy::<FakeConnection>::new(enqueuer.clone());

        let _responses = strategy
            .dispatch(&FakeConnection::default(), dispatch_to("  dr@strangelove.com\n"))
            .await
            .unwrap();

        let call = enqueuer.last_call();
        assert_eq!(call.recipients, vec![Recipient::email("dr@strangelove.com")]);
        assert_eq!(call.options.to, "dr@strangelove.com");
    }

    #[tokio::test]
    async fn test_rejects_malformed_addresses_before_enqueueing() {
        let enqueuer = Arc::new(FakeJobEnqueuer::default());
        let strategy = EmailStrategy::<FakeConnection>::new(enqueuer.clone());

        let err = strategy
            .dispatch(&FakeConnection::default(), dispatch_to("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEmail { ref email } if email == "not-an-email"));

        let err = strategy.dispatch(&FakeConnection::default(), dispatch_to("  ")).await.unwrap_err();
        assert!(matches!(err, Error::MissingTarget { audience: "email" }));

        assert!(enqueuer.calls().is_empty());
    }
}
