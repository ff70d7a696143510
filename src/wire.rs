//! Binary wire layout of [`Envelope`].
//!
//! The layout is protobuf-compatible. Field tags are a compatibility contract: a tag
//! listed in [`ENVELOPE_SCHEMA`] or [`ENDPOINT_SCHEMA`] is never reassigned, and
//! decoders skip tags they don't know. Absent optional fields are omitted.
//!
//! | tag | field                | kind     |
//! |-----|----------------------|----------|
//! | 1   | MessageID            | string   |
//! | 2   | MessageType          | string   |
//! | 5   | CreatedTimeTicks     | int64    |
//! | 10  | CorrelationID        | string   |
//! | 11  | CorrelationTimeTicks | int64    |
//! | 30  | Source               | Endpoint |
//! | 31  | Target               | Endpoint |
//! | 80  | Body                 | bytes    |

use prost::{Message, encoding::WireType};

use crate::{Endpoint, Envelope, Error, MessageId, Result, Timestamp};

/// Bumped whenever a field is added to one of the schema tables.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// Signed 64-bit count of 100 ns ticks since the Unix epoch.
    Ticks,
    Endpoint,
    Bytes,
}

impl FieldKind {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Ticks => WireType::Varint,
            FieldKind::String | FieldKind::Endpoint | FieldKind::Bytes => WireType::LengthDelimited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: u32,
    pub name: &'static str,
    pub kind: FieldKind,
    /// Decoding fails when a required field is absent.
    pub required: bool,
}

pub const MESSAGE_ID: FieldSpec = FieldSpec {
    tag: 1,
    name: "MessageID",
    kind: FieldKind::String,
    required: true,
};
pub const MESSAGE_TYPE: FieldSpec = FieldSpec {
    tag: 2,
    name: "MessageType",
    kind: FieldKind::String,
    required: false,
};
pub const CREATED_TIME: FieldSpec = FieldSpec {
    tag: 5,
    name: "CreatedTimeTicks",
    kind: FieldKind::Ticks,
    required: true,
};
pub const CORRELATION_ID: FieldSpec = FieldSpec {
    tag: 10,
    name: "CorrelationID",
    kind: FieldKind::String,
    required: false,
};
pub const CORRELATION_TIME: FieldSpec = FieldSpec {
    tag: 11,
    name: "CorrelationTimeTicks",
    kind: FieldKind::Ticks,
    required: false,
};
pub const SOURCE: FieldSpec = FieldSpec {
    tag: 30,
    name: "Source",
    kind: FieldKind::Endpoint,
    required: false,
};
pub const TARGET: FieldSpec = FieldSpec {
    tag: 31,
    name: "Target",
    kind: FieldKind::Endpoint,
    required: false,
};
pub const BODY: FieldSpec = FieldSpec {
    tag: 80,
    name: "Body",
    kind: FieldKind::Bytes,
    required: false,
};

pub const ENVELOPE_SCHEMA: &[FieldSpec] = &[
    MESSAGE_ID,
    MESSAGE_TYPE,
    CREATED_TIME,
    CORRELATION_ID,
    CORRELATION_TIME,
    SOURCE,
    TARGET,
    BODY,
];

pub const ENDPOINT_NAME: FieldSpec = FieldSpec {
    tag: 1,
    name: "Name",
    kind: FieldKind::String,
    required: false,
};
pub const ENDPOINT_ADDRESS: FieldSpec = FieldSpec {
    tag: 2,
    name: "Address",
    kind: FieldKind::String,
    required: false,
};

pub const ENDPOINT_SCHEMA: &[FieldSpec] = &[ENDPOINT_NAME, ENDPOINT_ADDRESS];

/// Looks up an envelope field by tag.
pub fn envelope_field(tag: u32) -> Option<&'static FieldSpec> {
    ENVELOPE_SCHEMA.iter().find(|f| f.tag == tag)
}

// Tags below must match the schema tables above.
#[derive(Clone, PartialEq, Message)]
pub(crate) struct WireEnvelope {
    #[prost(string, optional, tag = "1")]
    pub message_id: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub message_type: Option<String>,
    #[prost(int64, optional, tag = "5")]
    pub created_time_ticks: Option<i64>,
    #[prost(string, optional, tag = "10")]
    pub correlation_id: Option<String>,
    #[prost(int64, optional, tag = "11")]
    pub correlation_time_ticks: Option<i64>,
    #[prost(message, optional, tag = "30")]
    pub source: Option<WireEndpoint>,
    #[prost(message, optional, tag = "31")]
    pub target: Option<WireEndpoint>,
    #[prost(bytes = "vec", optional, tag = "80")]
    pub body: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub(crate) struct WireEndpoint {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub address: Option<String>,
}

impl From<&Endpoint> for WireEndpoint {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            name: endpoint.name.clone(),
            address: endpoint.address.clone(),
        }
    }
}

impl From<WireEndpoint> for Endpoint {
    fn from(wire: WireEndpoint) -> Self {
        Self {
            name: wire.name,
            address: wire.address,
        }
    }
}

impl From<&Envelope> for WireEnvelope {
    fn from(envelope: &Envelope) -> Self {
        Self {
            message_id: Some(envelope.id().to_string()),
            message_type: envelope.message_type.clone(),
            created_time_ticks: Some(envelope.created_time().ticks()),
            correlation_id: envelope.correlation_id.clone(),
            correlation_time_ticks: Some(envelope.correlation_time.ticks()),
            source: envelope.source.as_ref().map(WireEndpoint::from),
            target: envelope.target.as_ref().map(WireEndpoint::from),
            body: envelope.body.clone(),
        }
    }
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = Error;

    fn try_from(wire: WireEnvelope) -> Result<Self> {
        let id = wire
            .message_id
            .map(MessageId::from)
            .ok_or(Error::MissingField(MESSAGE_ID.name))?;
        let created_time = wire
            .created_time_ticks
            .map(Timestamp::from_ticks)
            .ok_or(Error::MissingField(CREATED_TIME.name))?;

        let mut envelope = Envelope::with_identity(id, created_time);
        envelope.message_type = wire.message_type;
        envelope.correlation_id = wire.correlation_id;
        envelope.correlation_time = wire
            .correlation_time_ticks
            .map_or(Timestamp::EPOCH, Timestamp::from_ticks);
        envelope.source = wire.source.map(Endpoint::from);
        envelope.target = wire.target.map(Endpoint::from);
        envelope.body = wire.body;
        Ok(envelope)
    }
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Envelope> {
    let wire = WireEnvelope::decode(bytes)?;
    Envelope::try_from(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::encoding::encode_key;

    fn with_only(spec: &FieldSpec) -> WireEnvelope {
        let mut wire = WireEnvelope::default();
        let endpoint = WireEndpoint {
            name: "e".into(),
            address: None,
        };
        match spec.tag {
            1 => wire.message_id = Some("id".into()),
            2 => wire.message_type = Some("T".into()),
            5 => wire.created_time_ticks = Some(7),
            10 => wire.correlation_id = Some("c".into()),
            11 => wire.correlation_time_ticks = Some(7),
            30 => wire.source = Some(endpoint),
            31 => wire.target = Some(endpoint),
            80 => wire.body = Some(vec![1, 2, 3]),
            other => panic!("schema lists tag {other} that WireEnvelope doesn't have"),
        }
        wire
    }

    #[test]
    fn struct_tags_match_schema_table() {
        for spec in ENVELOPE_SCHEMA {
            let bytes = with_only(spec).encode_to_vec();
            let mut key = Vec::new();
            encode_key(spec.tag, spec.kind.wire_type(), &mut key);
            assert!(bytes.starts_with(&key), "field {} not under tag {}", spec.name, spec.tag);
        }
    }

    #[test]
    fn endpoint_tags_match_schema_table() {
        let bytes = WireEndpoint {
            name: "n".into(),
            address: Some("a".into()),
        }
        .encode_to_vec();
        let mut expected = Vec::new();
        encode_key(ENDPOINT_NAME.tag, ENDPOINT_NAME.kind.wire_type(), &mut expected);
        expected.extend_from_slice(&[1, b'n']);
        encode_key(ENDPOINT_ADDRESS.tag, ENDPOINT_ADDRESS.kind.wire_type(), &mut expected);
        expected.extend_from_slice(&[1, b'a']);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn schema_version_tracks_the_tables() {
        let envelope_tags: Vec<u32> = ENVELOPE_SCHEMA.iter().map(|f| f.tag).collect();
        let endpoint_tags: Vec<u32> = ENDPOINT_SCHEMA.iter().map(|f| f.tag).collect();
        assert_eq!(
            (SCHEMA_VERSION, envelope_tags.as_slice(), endpoint_tags.as_slice()),
            (1, &[1, 2, 5, 10, 11, 30, 31, 80][..], &[1, 2][..]),
            "schema tables changed: bump SCHEMA_VERSION and update this snapshot together"
        );
    }

    #[test]
    fn schema_tags_are_unique() {
        for (i, a) in ENVELOPE_SCHEMA.iter().enumerate() {
            assert!(ENVELOPE_SCHEMA[i + 1..].iter().all(|b| b.tag != a.tag));
        }
        assert_eq!(envelope_field(80), Some(&BODY));
        assert_eq!(envelope_field(3), None);
    }

    #[test]
    fn golden_header_bytes() {
        let mut envelope = Envelope::with_identity("abc".into(), Timestamp::from_ticks(1));
        envelope.message_type = Some("T".into());
        let wire = WireEnvelope::from(&envelope);
        let bytes = wire.encode_to_vec();
        assert_eq!(wire.encoded_len(), bytes.len());
        assert_eq!(
            bytes,
            [0x0A, 3, b'a', b'b', b'c', 0x12, 1, b'T', 0x28, 1, 0x58, 0]
        );
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let no_id = with_only(&CREATED_TIME).encode_to_vec();
        assert!(matches!(decode(&no_id), Err(Error::MissingField("MessageID"))));

        let no_time = with_only(&MESSAGE_ID).encode_to_vec();
        assert!(matches!(
            decode(&no_time),
            Err(Error::MissingField("CreatedTimeTicks"))
        ));
    }

    #[test]
    fn absent_correlation_time_is_epoch() {
        let mut wire = with_only(&MESSAGE_ID);
        wire.created_time_ticks = Some(5);
        let envelope = decode(&wire.encode_to_vec()).unwrap();
        assert_eq!(envelope.correlation_time, Timestamp::EPOCH);
        assert_eq!(envelope.message_type, None);
        assert_eq!(envelope.body, None);
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let mut wire = with_only(&MESSAGE_ID);
        wire.created_time_ticks = Some(5);
        let mut bytes = wire.encode_to_vec();
        encode_key(99, WireType::Varint, &mut bytes);
        bytes.push(42);

        let envelope = decode(&bytes).unwrap();
        assert_eq!(envelope.id().as_str(), "id");
        assert_eq!(envelope.created_time().ticks(), 5);
    }

    #[test]
    fn truncated_input_is_a_decode_error() {
        let bytes = [0x0A, 10, b'a'];
        assert!(matches!(decode(&bytes), Err(Error::Decode(_))));
    }
}
