use std::fmt;

/// Bearer token issued by UAA.
#[derive(Clone, Eq, PartialEq)]
pub struct Token {
    access_token: String,
    uaa_host: Option<String>,
}

impl Token {
    #[inline]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), uaa_host: None }
    }

    /// Token issued by the UAA zone at `uaa_host`; lookups made with it go to
    /// the same zone.
    #[inline]
    pub fn issued_by(access_token: impl Into<String>, uaa_host: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), uaa_host: Some(uaa_host.into()) }
    }

    #[inline]
    #[must_use]
    pub fn access_token(&self) -> &str { &self.access_token }

    #[inline]
    #[must_use]
    pub fn uaa_host(&self) -> Option<&str> { self.uaa_host.as_deref() }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("uaa_host", &self.uaa_host)
            .finish()
    }
}
