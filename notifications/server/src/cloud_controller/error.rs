use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to build Cloud Controller HTTP client, error: {source}"))]
    InitializeClient { source: reqwest::Error },

    #[snafu(display("Failed to send request to {url}, error: {source}"))]
    SendRequest { url: String, source: reqwest::Error },

    #[snafu(display("Cloud Controller responded {status} to {url}: {body}"))]
    UnexpectedStatus { url: String, status: u16, body: String },

    #[snafu(display("Failed to decode Cloud Controller response from {url}, error: {source}"))]
    DecodeResponse { url: String, source: reqwest::Error },
}

impl Error {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { status: 404, .. })
    }
}
