use std::fmt;

use prost::Message;

use crate::{
    Clock, Codec, Config, Endpoint, Error, MessageId, Result, SystemClock, Timestamp, TypedEnvelope,
    wire::{self, WireEnvelope},
};

/// Wire form of a message: header metadata plus an already-encoded body.
///
/// - `id` and `created_time`: assigned once at construction, read-only afterwards.
/// - `message_type`: must be set explicitly (or copied from a typed envelope).
/// - `correlation_id` / `correlation_time`: optional link to a related message.
/// - `source` / `target`: sender and receiver, cloned on every header copy.
/// - `body`: opaque payload bytes produced by a [`Codec`].
///
/// Use [`Envelope::to_bytes`] and [`Envelope::from_bytes`] for the binary layout
/// described in [`wire`](crate::wire).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename = "Message")
)]
pub struct Envelope {
    id: MessageId,
    created_time: Timestamp,
    pub message_type: Option<String>,
    pub correlation_id: Option<String>,
    pub correlation_time: Timestamp,
    pub source: Option<Endpoint>,
    pub target: Option<Endpoint>,
    pub body: Option<Vec<u8>>,
}

impl Envelope {
    /// Create an empty envelope with a fresh id, stamped with the system time.
    pub fn new() -> Self {
        Self::with_clock(&SystemClock)
    }

    /// Create an empty envelope with a fresh id, stamped by the given clock.
    pub fn with_clock<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::with_identity(MessageId::new(), clock.now())
    }

    /// Create an empty envelope with an explicit id and creation time.
    ///
    /// Used when rebuilding an envelope that already exists elsewhere,
    /// e.g. after reading it from the wire.
    pub fn with_identity(id: MessageId, created_time: Timestamp) -> Self {
        Self {
            id,
            created_time,
            message_type: None,
            correlation_id: None,
            correlation_time: Timestamp::EPOCH,
            source: None,
            target: None,
            body: None,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn created_time(&self) -> Timestamp {
        self.created_time
    }

    pub fn message_type(&self) -> Option<&str> {
        self.message_type.as_deref()
    }

    /// Length of the body, 0 when absent.
    pub fn body_size(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Link this envelope to a related message.
    pub fn with_correlation(mut self, correlation_id: impl Into<String>, correlation_time: Timestamp) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self.correlation_time = correlation_time;
        self
    }

    pub fn with_source(mut self, source: Endpoint) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_target(mut self, target: Endpoint) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Build a typed envelope carrying this header.
    ///
    /// The body is not decoded; `message` of the result is `None`.
    /// See [`Envelope::open`] to decode the body as well.
    pub fn to_typed<T>(&self) -> TypedEnvelope<T> {
        TypedEnvelope::from_envelope(self)
    }

    /// Build a wire envelope carrying the header of `source`.
    ///
    /// The body is left unset; see [`TypedEnvelope::seal`] to encode the message as well.
    pub fn from_typed<T>(source: &TypedEnvelope<T>) -> Self {
        let mut envelope = Self::with_identity(source.id().clone(), source.created_time());
        envelope.copy_header_from(source);
        envelope
    }

    /// Overwrite every header field with the values of `source`.
    ///
    /// Endpoints are cloned, never shared. The body stays as it is.
    pub fn copy_header_from<T>(&mut self, source: &TypedEnvelope<T>) {
        self.id = source.id().clone();
        self.created_time = source.created_time();
        self.message_type = source.message_type.clone();
        self.correlation_id = source.correlation_id.clone();
        self.correlation_time = source.correlation_time;
        self.source = source.source.clone();
        self.target = source.target.clone();
    }

    /// Decode the body with `codec` into a typed envelope with the same header.
    ///
    /// # Errors
    ///
    /// [`Error::MissingBody`] when there is no body, or whatever the codec reports.
    pub fn open<T, C>(&self, codec: &C) -> Result<TypedEnvelope<T>>
    where
        C: Codec<T> + ?Sized,
    {
        let body = self.body.as_deref().ok_or(Error::MissingBody)?;
        let message = codec.decode(body)?;
        tracing::trace!(message_id = %self.id, body_size = body.len(), "opened envelope");

        let mut typed = self.to_typed();
        typed.message = Some(message);
        Ok(typed)
    }

    /// Encode into the binary wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        WireEnvelope::from(self).encode_to_vec()
    }

    /// Encode into the binary wire layout, enforcing `config.max_message_size`.
    pub fn to_bytes_with(&self, config: &Config) -> Result<Vec<u8>> {
        let wire = WireEnvelope::from(self);
        let size = wire.encoded_len();
        if size > config.max_message_size {
            return Err(Error::MessageTooLarge {
                size,
                limit: config.max_message_size,
            });
        }
        Ok(wire.encode_to_vec())
    }

    /// Decode from the binary wire layout using the default [`Config`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &Config::default())
    }

    /// Decode from the binary wire layout.
    ///
    /// # Errors
    ///
    /// - [`Error::MessageTooLarge`] when `bytes` exceeds `config.max_message_size`
    /// - [`Error::Decode`] on malformed input
    /// - [`Error::MissingField`] when the id or creation time is absent
    pub fn from_bytes_with(bytes: &[u8], config: &Config) -> Result<Self> {
        if bytes.len() > config.max_message_size {
            tracing::debug!(
                size = bytes.len(),
                limit = config.max_message_size,
                "rejected oversized envelope"
            );
            return Err(Error::MessageTooLarge {
                size: bytes.len(),
                limit: config.max_message_size,
            });
        }
        wire::decode(bytes).inspect_err(|e| tracing::debug!(error = %e, "rejected wire envelope"))
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<&TypedEnvelope<T>> for Envelope {
    fn from(source: &TypedEnvelope<T>) -> Self {
        Self::from_typed(source)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MessageType[{}], Source[{}], Target[{}], BodySize[{}], \
             MessageID[{}], CorrelationID[{}], CorrelationTime[{}], CreatedTime[{}]",
            self.message_type.as_deref().unwrap_or_default(),
            DisplayOpt(&self.source),
            DisplayOpt(&self.target),
            self.body_size(),
            self.id,
            self.correlation_id.as_deref().unwrap_or_default(),
            self.correlation_time,
            self.created_time,
        )
    }
}

/// Renders `None` as an empty string.
pub(crate) struct DisplayOpt<'a, T>(pub &'a Option<T>);

impl<T: fmt::Display> fmt::Display for DisplayOpt<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => Ok(()),
        }
    }
}
