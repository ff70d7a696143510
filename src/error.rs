#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Timestamp {0} is outside the range of 64-bit ticks since the Unix epoch")]
    TimestampOutOfRange(String),

    #[error("Couldn't parse timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Required wire field '{0}' is missing")]
    MissingField(&'static str),

    #[error("Malformed wire envelope: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Encoded envelope is {size} bytes, the limit is {limit}")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Envelope has no body to decode")]
    MissingBody,

    #[error("Typed envelope has no message to encode")]
    MissingPayload,

    #[error("Payload codec failed: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(Box::new(e))
    }
}
