//! Binary encoding of the discovery cache.
//!
//! Layout, with all integers little-endian and every string prefixed by its
//! `u32` byte length:
//!
//! ```text
//! owner identity   : string
//! record count     : u32
//! record count times:
//!     capability   : string
//!     resource id  : string
//!     endpoint     : string
//!     api version  : string
//! ```
//!
//! There is no in-band version tag. Decoding is strict: trailing bytes are
//! rejected, so a file written by an extended layout reads as corrupt rather
//! than being misinterpreted.

use discovery_record::{CachedDiscoverySet, DiscoveryRecord, InvalidRecordError, Records};

mod reader;

use reader::Reader;

/// Smallest possible encoded record: four empty strings.
const MIN_RECORD_LEN: usize = 4 * size_of::<u32>();

/// Errors returned while encoding a discovery set.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A string does not fit a `u32` length prefix.
    #[error("string of {len} bytes is too long to encode")]
    StringTooLong {
        /// The byte length of the string.
        len: usize,
    },

    /// The set has more records than fit a `u32` count.
    #[error("{count} records is too many to encode")]
    TooManyRecords {
        /// The number of records.
        count: usize,
    },
}

/// Errors returned while decoding a discovery set.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input ended before a fixed-width field.
    #[error("unexpected end of input at byte offset {offset}")]
    Truncated {
        /// Offset of the field that could not be read.
        offset: usize,
    },

    /// A length prefix points past the end of the input.
    #[error(
        "length prefix {length} at byte offset {offset} exceeds the {remaining} remaining bytes"
    )]
    LengthOutOfBounds {
        /// Offset of the length prefix.
        offset: usize,

        /// The declared length.
        length: u32,

        /// Bytes left after the prefix.
        remaining: usize,
    },

    /// String contents are not valid UTF-8.
    #[error("invalid UTF-8 string at byte offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string contents.
        offset: usize,
    },

    /// A record does not hold a valid discovery record.
    #[error("invalid record for capability \"{capability}\": {source}")]
    InvalidRecord {
        /// The capability the record is keyed by.
        capability: String,

        /// The validation failure.
        #[source]
        source: InvalidRecordError,
    },

    /// The same capability appears twice.
    #[error("duplicate capability \"{0}\"")]
    DuplicateCapability(String),

    /// Extra bytes after the last record.
    #[error("{count} trailing bytes after the last record")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },
}

/// Encode a discovery set into its binary form.
///
/// Records are written ordered by capability name so that equal sets always
/// produce identical bytes.
pub fn encode(set: &CachedDiscoverySet) -> Result<Vec<u8>, EncodeError> {
    let records = set.records();
    let count = u32::try_from(records.len()).map_err(|_| EncodeError::TooManyRecords {
        count: records.len(),
    })?;

    let mut entries: Vec<_> = records.iter().collect();
    entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    let mut buf = Vec::new();
    write_str(&mut buf, set.owner_identity())?;
    buf.extend_from_slice(&count.to_le_bytes());

    for (capability, record) in entries {
        write_str(&mut buf, capability)?;
        write_str(&mut buf, record.service_resource_id())?;
        write_str(&mut buf, record.service_endpoint().as_str())?;
        write_str(&mut buf, record.api_version())?;
    }

    Ok(buf)
}

/// Decode a discovery set from its binary form.
pub fn decode(bytes: &[u8]) -> Result<CachedDiscoverySet, DecodeError> {
    let mut reader = Reader::new(bytes);

    let owner_identity = reader.read_str()?.to_owned();
    let count = reader.read_u32()?;

    // The count is untrusted; never reserve more than the input could hold.
    let capacity = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(reader.remaining() / MIN_RECORD_LEN);
    let mut records = Records::with_capacity(capacity);

    for _ in 0..count {
        let capability = reader.read_str()?;
        let service_resource_id = reader.read_str()?;
        let service_endpoint = reader.read_str()?;
        let api_version = reader.read_str()?;

        let record = DiscoveryRecord::parse(service_endpoint, service_resource_id, api_version)
            .map_err(|source| DecodeError::InvalidRecord {
                capability: capability.to_owned(),
                source,
            })?;

        if records.insert(capability.to_owned(), record).is_some() {
            return Err(DecodeError::DuplicateCapability(capability.to_owned()));
        }
    }

    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes {
            count: reader.remaining(),
        });
    }

    Ok(CachedDiscoverySet::new(owner_identity, records))
}

/// Append a length-prefixed string.
fn write_str(buf: &mut Vec<u8>, value: &str) -> Result<(), EncodeError> {
    let len =
        u32::try_from(value.len()).map_err(|_| EncodeError::StringTooLong { len: value.len() })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}
