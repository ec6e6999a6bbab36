use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to build UAA HTTP client, error: {source}"))]
    InitializeClient { source: reqwest::Error },

    #[snafu(display("Failed to send request to {url}, error: {source}"))]
    SendRequest { url: String, source: reqwest::Error },

    #[snafu(display("UAA responded {status} to {url}: {body}"))]
    UnexpectedStatus { url: String, status: u16, body: String },

    #[snafu(display("Failed to decode UAA response from {url}, error: {source}"))]
    DecodeResponse { url: String, source: reqwest::Error },

    #[snafu(display("{message}"))]
    Unexpected { message: String },
}

impl Error {
    /// Whether UAA could not be reached or failed on its side.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::SendRequest { source, .. } => source.is_connect() || source.is_timeout(),
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
