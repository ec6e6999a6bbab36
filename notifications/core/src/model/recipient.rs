use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A single addressee of a notification.
///
/// Platform users are addressed by GUID and their email address is looked up
/// by the delivery worker; bare email recipients carry the address itself.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    UserGuid(String),
    Email(String),
}

impl Recipient {
    #[inline]
    pub fn user(guid: impl Into<String>) -> Self { Self::UserGuid(guid.into()) }

    #[inline]
    pub fn email(address: impl Into<String>) -> Self { Self::Email(address.into()) }

    /// Identity used for de-duplication and in responses: the GUID when
    /// present, else the email address.
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &str {
        match self {
            Self::UserGuid(identity) | Self::Email(identity) => identity,
        }
    }

    #[inline]
    #[must_use]
    pub fn user_guid(&self) -> Option<&str> {
        match self {
            Self::UserGuid(guid) => Some(guid),
            Self::Email(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn email_address(&self) -> Option<&str> {
        match self {
            Self::UserGuid(_) => None,
            Self::Email(address) => Some(address),
        }
    }

    /// Builds user recipients from resolved GUIDs, keeping the first
    /// occurrence of each GUID and the original order.
    pub fn users<I>(guids: I) -> Vec<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        guids
            .into_iter()
            .map(Into::into)
            .collect::<IndexSet<String>>()
            .into_iter()
            .map(Self::UserGuid)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(Recipient::user("user-1").identity(), "user-1");
        assert_eq!(Recipient::email("someone@example.com").identity(), "someone@example.com");
        assert_eq!(Recipient::user("user-1").email_address(), None);
        assert_eq!(Recipient::email("someone@example.com").user_guid(), None);
    }

    #[test]
    fn test_users_drops_duplicate_guids() {
        let recipients = Recipient::users(["user-3", "user-1", "user-3", "user-2", "user-1"]);

        assert_eq!(
            recipients,
            vec![Recipient::user("user-3"), Recipient::user("user-1"), Recipient::user("user-2")]
        );
    }
}
