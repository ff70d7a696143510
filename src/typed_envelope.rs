use std::fmt;

use crate::{
    Clock, Codec, Endpoint, Envelope, Error, MessageId, Payload, Result, SystemClock, Timestamp,
    envelope::DisplayOpt,
};

/// In-memory form of a message: the same header as [`Envelope`] plus a typed payload.
///
/// `message_type` defaults to [`Payload::message_type`] of `T` and may be overridden.
/// `message` is never serialized here; it travels as the body of the wire form
/// after [`TypedEnvelope::seal`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename = "Message", bound = "")
)]
pub struct TypedEnvelope<T> {
    id: MessageId,
    created_time: Timestamp,
    pub message_type: Option<String>,
    pub correlation_id: Option<String>,
    pub correlation_time: Timestamp,
    pub source: Option<Endpoint>,
    pub target: Option<Endpoint>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub message: Option<T>,
}

impl<T: Payload> TypedEnvelope<T> {
    /// Create an envelope with a fresh id, stamped with the system time.
    pub fn new() -> Self {
        Self::with_clock(&SystemClock)
    }

    /// Create an envelope with a fresh id, stamped by the given clock.
    pub fn with_clock<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::with_identity(MessageId::new(), clock.now())
    }

    /// Create an envelope with an explicit id and creation time.
    pub fn with_identity(id: MessageId, created_time: Timestamp) -> Self {
        let mut envelope = Self::blank(id, created_time);
        envelope.message_type = Some(T::message_type().into_owned());
        envelope
    }
}

impl<T> TypedEnvelope<T> {
    fn blank(id: MessageId, created_time: Timestamp) -> Self {
        Self {
            id,
            created_time,
            message_type: None,
            correlation_id: None,
            correlation_time: Timestamp::EPOCH,
            source: None,
            target: None,
            message: None,
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

    pub fn with_message(mut self, message: T) -> Self {
        self.message = Some(message);
        self
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

    /// Build a wire envelope carrying this header, with no body.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::from_typed(self)
    }

    /// Build a typed envelope carrying the header of `source`, with no message.
    pub fn from_envelope(source: &Envelope) -> Self {
        let mut envelope = Self::blank(source.id().clone(), source.created_time());
        envelope.copy_header_from(source);
        envelope
    }

    /// Overwrite every header field with the values of `source`.
    ///
    /// Endpoints are cloned, never shared. The message stays as it is.
    pub fn copy_header_from(&mut self, source: &Envelope) {
        self.id = source.id().clone();
        self.created_time = source.created_time();
        self.message_type = source.message_type.clone();
        self.correlation_id = source.correlation_id.clone();
        self.correlation_time = source.correlation_time;
        self.source = source.source.clone();
        self.target = source.target.clone();
    }

    /// Encode the message with `codec` into the body of a wire envelope with the same header.
    ///
    /// # Errors
    ///
    /// [`Error::MissingPayload`] when there is no message, or whatever the codec reports.
    pub fn seal<C>(&self, codec: &C) -> Result<Envelope>
    where
        C: Codec<T> + ?Sized,
    {
        let message = self.message.as_ref().ok_or(Error::MissingPayload)?;
        let body = codec.encode(message)?;
        tracing::trace!(message_id = %self.id, body_size = body.len(), "sealed envelope");

        let mut envelope = self.to_envelope();
        envelope.body = Some(body);
        Ok(envelope)
    }
}

impl<T: Payload> Default for TypedEnvelope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<&Envelope> for TypedEnvelope<T> {
    fn from(source: &Envelope) -> Self {
        Self::from_envelope(source)
    }
}

impl<T> fmt::Display for TypedEnvelope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MessageType[{}], Source[{}], Target[{}], \
             MessageID[{}], CorrelationID[{}], CorrelationTime[{}], CreatedTime[{}]",
            self.message_type.as_deref().unwrap_or_default(),
            DisplayOpt(&self.source),
            DisplayOpt(&self.target),
            self.id,
            self.correlation_id.as_deref().unwrap_or_default(),
            self.correlation_time,
            self.created_time,
        )
    }
}
