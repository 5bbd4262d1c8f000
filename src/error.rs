use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Data store not configured")]
    NotConfigured,
    #[error("Error reaching the data store")]
    Http(#[source] reqwest::Error),
    #[error("Data store answered {status} for <{url}>")]
    Status {
        status: u16,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected rows from the data store")]
    Decode(#[source] reqwest::Error),
    #[error("Malformed Content-Range header {0:?}")]
    ContentRange(String),
}

impl StoreError {
    pub fn http(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => Self::Status {
                status: status.as_u16(),
                url: url.to_string(),
                source: err,
            },
            _ => Self::Http(err),
        }
    }

    pub fn decode(err: reqwest::Error) -> Self {
        Self::Decode(err)
    }
}
