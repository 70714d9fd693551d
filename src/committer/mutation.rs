use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::convert::TryFrom;
use std::fmt;

/// Longest mutation type tag a record can carry.
pub const MAX_MUTATION_TYPE_LEN: usize = u16::MAX as usize;

/// Client chosen id of a mutation. Retries of the same mutation carry the same id, so the state
/// machine can recognize them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MutationId(pub u128);

impl MutationId {
    pub fn random() -> Self {
        MutationId(rand::random())
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// A state machine operation submitted for replication. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRequest {
    pub mutation_type: String,
    pub data: Bytes,
    pub mutation_id: Option<MutationId>,
}

impl MutationRequest {
    pub fn new(mutation_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        MutationRequest {
            mutation_type: mutation_type.into(),
            data: data.into(),
            mutation_id: None,
        }
    }

    pub fn with_mutation_id(mut self, mutation_id: MutationId) -> Self {
        self.mutation_id = Some(mutation_id);
        self
    }
}

/// Opaque result of applying a `MutationRequest` to the state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationResponse {
    pub data: Bytes,
}

impl MutationResponse {
    pub fn new(data: impl Into<Bytes>) -> Self {
        MutationResponse { data: data.into() }
    }
}

/// One logged mutation as it is written to the changelog and shipped to followers.
///
/// Byte representation:
///
/// ```text
/// | 0 | 1 .. 8    | 9 .. 16     | 17  | 18 .. 33           | 2 bytes | ... | ... |
/// +---+-----------+-------------+-----+--------------------+---------+-----+-----+
/// |Vrs| Timestamp | Random seed | Flg | Mutation id (opt.) | TypeLen |Type | Data|
/// +---+-----------+-------------+-----+--------------------+---------+-----+-----+
/// ```
///
/// * `Vrs` - version of the serialized payload
/// * `Timestamp` - leader wall clock millis when the mutation was logged
/// * `Random seed` - seed handed to the state machine so every peer applies deterministically
/// * `Flg` - bit 0 set when a mutation id follows
/// * `Id` - 16 byte mutation id, only present when flagged
/// * `TypeLen` - u16 length of `Type`
/// * `Type` - utf8 mutation type tag, at most `MAX_MUTATION_TYPE_LEN` bytes
/// * `Data` - app specific payload, runs to the end of the record
///
/// All integers are big endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub timestamp_millis: i64,
    pub random_seed: u64,
    pub request: MutationRequest,
}

const MUTATION_RECORD_FORMAT_VERSION: u8 = 1;
const FLAG_HAS_MUTATION_ID: u8 = 0x01;
const MUTATION_ID_SIZE: usize = 16;
// Header without the optional mutation id.
const MIN_HEADER_SIZE: usize = 1 + 8 + 8 + 1 + 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDecodeError {
    #[error("record is {0} bytes, shorter than its header")]
    Truncated(usize),
    #[error("unknown record format version {0}")]
    UnknownFormatVersion(u8),
    #[error("unknown record flags {0:#04x}")]
    UnknownFlags(u8),
    #[error("mutation type is not valid utf8")]
    InvalidMutationType,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordEncodeError {
    #[error("mutation type is {0} bytes, longer than the {max} byte limit", max = MAX_MUTATION_TYPE_LEN)]
    MutationTypeTooLong(usize),
}

impl MutationRecord {
    pub fn encode(&self) -> Result<Bytes, RecordEncodeError> {
        let type_bytes = self.request.mutation_type.as_bytes();
        let type_len = u16::try_from(type_bytes.len())
            .map_err(|_| RecordEncodeError::MutationTypeTooLong(type_bytes.len()))?;

        let mut bytes = BytesMut::with_capacity(
            MIN_HEADER_SIZE + MUTATION_ID_SIZE + type_bytes.len() + self.request.data.len(),
        );
        bytes.put_u8(MUTATION_RECORD_FORMAT_VERSION);
        bytes.put_i64(self.timestamp_millis);
        bytes.put_u64(self.random_seed);
        match self.request.mutation_id {
            Some(mutation_id) => {
                bytes.put_u8(FLAG_HAS_MUTATION_ID);
                bytes.put_u128(mutation_id.0);
            }
            None => bytes.put_u8(0),
        }
        bytes.put_u16(type_len);
        bytes.put_slice(type_bytes);
        bytes.put_slice(&self.request.data);

        Ok(bytes.freeze())
    }
}

impl TryFrom<Bytes> for MutationRecord {
    type Error = RecordDecodeError;

    fn try_from(mut bytes: Bytes) -> Result<Self, Self::Error> {
        let total_len = bytes.len();
        if total_len < MIN_HEADER_SIZE {
            return Err(RecordDecodeError::Truncated(total_len));
        }

        let format_version = bytes.get_u8();
        if format_version != MUTATION_RECORD_FORMAT_VERSION {
            return Err(RecordDecodeError::UnknownFormatVersion(format_version));
        }

        let timestamp_millis = bytes.get_i64();
        let random_seed = bytes.get_u64();

        let flags = bytes.get_u8();
        let mutation_id = match flags {
            0 => None,
            FLAG_HAS_MUTATION_ID => {
                if bytes.remaining() < MUTATION_ID_SIZE + 2 {
                    return Err(RecordDecodeError::Truncated(total_len));
                }
                Some(MutationId(bytes.get_u128()))
            }
            _ => return Err(RecordDecodeError::UnknownFlags(flags)),
        };

        let type_len = bytes.get_u16() as usize;
        if bytes.remaining() < type_len {
            return Err(RecordDecodeError::Truncated(total_len));
        }

        let type_bytes = bytes.split_to(type_len);
        let mutation_type =
            String::from_utf8(type_bytes.to_vec()).map_err(|_| RecordDecodeError::InvalidMutationType)?;

        Ok(MutationRecord {
            timestamp_millis,
            random_seed,
            request: MutationRequest {
                mutation_type,
                data: bytes,
                mutation_id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mutation_type: &str, data: &'static [u8]) -> MutationRecord {
        MutationRecord {
            timestamp_millis: 1_600_000_000_123,
            random_seed: 0xDEAD_BEEF_0000_0001,
            request: MutationRequest::new(mutation_type, Bytes::from_static(data)),
        }
    }

    #[test]
    fn decode_reads_back_header_and_payload() {
        let original = record("set_key", b"k=v");
        let decoded = MutationRecord::try_from(original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);

        // Empty type and payload are legal.
        let original = record("", b"");
        let encoded = original.encode().unwrap();
        assert_eq!(encoded.len(), MIN_HEADER_SIZE);
        assert_eq!(MutationRecord::try_from(encoded).unwrap(), original);
    }

    #[test]
    fn mutation_id_travels_in_the_header() {
        let mutation_id = MutationId(0x0102_0304_0506_0708_090A_0B0C_0D0E_0F10);
        let mut original = record("ab", b"\x07");
        original.request = original.request.with_mutation_id(mutation_id);

        let encoded = original.encode().unwrap();
        assert_eq!(encoded.len(), MIN_HEADER_SIZE + MUTATION_ID_SIZE + 3);
        assert_eq!(encoded[17], FLAG_HAS_MUTATION_ID);
        assert_eq!(encoded[18], 0x01);
        assert_eq!(encoded[33], 0x10);
        assert_eq!(&encoded[34..36], &[0, 2]);

        let decoded = MutationRecord::try_from(encoded).unwrap();
        assert_eq!(decoded.request.mutation_id, Some(mutation_id));
        assert_eq!(decoded, original);
    }

    #[test]
    fn layout_is_big_endian_with_leading_format_version() {
        let encoded = record("ab", b"\x07").encode().unwrap();
        assert_eq!(encoded[0], MUTATION_RECORD_FORMAT_VERSION);
        assert_eq!(encoded[17], 0);
        assert_eq!(&encoded[18..20], &[0, 2]);
        assert_eq!(&encoded[20..22], b"ab");
        assert_eq!(encoded[22], 7);
    }

    #[test]
    fn oversized_mutation_type_is_not_encoded() {
        let longest = "t".repeat(MAX_MUTATION_TYPE_LEN);
        let original = record(&longest, b"payload");
        let decoded = MutationRecord::try_from(original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);

        let too_long = "t".repeat(70_000);
        assert_eq!(
            record(&too_long, b"payload").encode(),
            Err(RecordEncodeError::MutationTypeTooLong(70_000))
        );
    }

    #[test]
    fn decode_rejects_malformed_records() {
        assert_eq!(
            MutationRecord::try_from(Bytes::from_static(&[1, 2, 3])),
            Err(RecordDecodeError::Truncated(3))
        );

        let mut bad_version = record("t", b"").encode().unwrap().to_vec();
        bad_version[0] = 9;
        assert_eq!(
            MutationRecord::try_from(Bytes::from(bad_version)),
            Err(RecordDecodeError::UnknownFormatVersion(9))
        );

        let mut bad_flags = record("t", b"").encode().unwrap().to_vec();
        bad_flags[17] = 0x80;
        assert_eq!(
            MutationRecord::try_from(Bytes::from(bad_flags)),
            Err(RecordDecodeError::UnknownFlags(0x80))
        );

        // Flagged id, but the record ends before it.
        let mut missing_id = record("", b"").encode().unwrap().to_vec();
        missing_id[17] = FLAG_HAS_MUTATION_ID;
        let len = missing_id.len();
        assert_eq!(
            MutationRecord::try_from(Bytes::from(missing_id)),
            Err(RecordDecodeError::Truncated(len))
        );

        // Type length claims more bytes than the record has.
        let mut short_type = record("t", b"").encode().unwrap().to_vec();
        short_type[19] = 200;
        let len = short_type.len();
        assert_eq!(
            MutationRecord::try_from(Bytes::from(short_type)),
            Err(RecordDecodeError::Truncated(len))
        );

        let mut bad_utf8 = record("t", b"").encode().unwrap().to_vec();
        bad_utf8[20] = 0xFF;
        assert_eq!(
            MutationRecord::try_from(Bytes::from(bad_utf8)),
            Err(RecordDecodeError::InvalidMutationType)
        );
    }
}
