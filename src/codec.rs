use crate::Result;

/// Turns a typed payload into body bytes and back.
///
/// Envelopes never look inside the body; the codec is the only component that
/// knows how `T` is serialized. Errors are passed through unchanged by
/// [`TypedEnvelope::seal`](crate::TypedEnvelope::seal) and [`Envelope::open`](crate::Envelope::open).
pub trait Codec<T> {
    fn encode(&self, message: &T) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON body encoding via `serde_json`.
#[cfg(feature = "serde")]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

#[cfg(feature = "serde")]
impl<T> Codec<T> for JsonCodec
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(&self, message: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(message)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
