//! Postmark - message envelopes for transport
//!
//! A message travels in one of two forms:
//!
//! - [`TypedEnvelope<T>`]: in-memory form, header metadata plus a typed `message`.
//! - [`Envelope`]: wire form, the same header plus an opaque, already-encoded `body`.
//!
//! The two are independent record types related only by explicit conversions.
//! Header conversions copy every header field and clone the endpoints; the payload is
//! handled by a [`Codec`] through [`TypedEnvelope::seal`] and [`Envelope::open`].
//!
//! ```rust
//! use postmark::{Envelope, FixedClock, Payload, TypedEnvelope};
//!
//! struct OrderPlaced;
//! impl Payload for OrderPlaced {}
//!
//! let clock = FixedClock("2023-01-01T00:00:00Z".parse().unwrap());
//! let typed = TypedEnvelope::<OrderPlaced>::with_clock(&clock);
//! assert_eq!(typed.message_type(), Some("OrderPlaced"));
//!
//! let wire = typed.to_envelope();
//! let decoded = Envelope::from_bytes(&wire.to_bytes()).unwrap();
//! assert_eq!(decoded.id(), typed.id());
//! ```

mod clock;
mod codec;
mod config;
mod endpoint;
mod envelope;
mod error;
mod message_id;
mod payload;
mod typed_envelope;

pub mod timestamp;
pub mod wire;

pub use clock::{Clock, FixedClock, SystemClock};
#[cfg(feature = "serde")]
pub use codec::JsonCodec;
pub use codec::Codec;
pub use config::Config;
pub use endpoint::Endpoint;
pub use envelope::Envelope;
pub use error::Error;
pub use message_id::MessageId;
pub use payload::Payload;
pub use timestamp::Timestamp;
pub use typed_envelope::TypedEnvelope;

#[cfg(feature = "macros")]
pub use postmark_macros::Payload;

pub type Result<T = ()> = std::result::Result<T, Error>;
