//! Frame encoding for row sets moving between ranks
//!
//! ## Frame Format
//!
//! ```text
//! [magic: u32][version: u8][type: u8][length: u32][payload: bytes][crc32: u32]
//! ```
//!
//! - **magic**: `HODF` as a little-endian u32
//! - **type**: 1 = shard (a [`RowSet`]), 2 = abort (an [`Error`])
//! - **length**: payload length in bytes
//! - **payload**: bincode-serialized shard or error
//! - **crc32**: CRC32 over \[type\]\[payload\]
//!
//! Any malformed frame decodes to a communication error: a frame that fails
//! its checksum means the transport is broken and the collective cannot be
//! trusted.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use hodmock_core::{Error, Result, RowSet};
use std::io::{Cursor, Read};

const MAGIC: u32 = u32::from_le_bytes(*b"HODF");
const VERSION: u8 = 1;

const TYPE_SHARD: u8 = 1;
const TYPE_ABORT: u8 = 2;

/// magic + version + type + length
const HEADER_LEN: usize = 4 + 1 + 1 + 4;
const TRAILER_LEN: usize = 4;

/// A decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Rows destined for (or contributed by) one rank
    Shard(RowSet),
    /// The sender failed; every receiver should fail with the same error
    Abort(Error),
}

/// Encode a row set as a shard frame
pub fn encode_shard(rows: &RowSet) -> Result<Vec<u8>> {
    let payload = bincode::serialize(rows)
        .map_err(|e| Error::communication(format!("failed to encode shard: {}", e)))?;
    frame(TYPE_SHARD, &payload)
}

/// Encode an error as an abort frame
pub fn encode_abort(error: &Error) -> Result<Vec<u8>> {
    let payload = bincode::serialize(error)
        .map_err(|e| Error::communication(format!("failed to encode abort: {}", e)))?;
    frame(TYPE_ABORT, &payload)
}

fn frame(type_tag: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::communication(format!("frame payload of {} bytes is too large", payload.len())))?;

    let mut hasher = Hasher::new();
    hasher.update(&[type_tag]);
    hasher.update(payload);
    let crc = hasher.finalize();

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    buf.write_u32::<LittleEndian>(MAGIC)?;
    buf.write_u8(VERSION)?;
    buf.write_u8(type_tag)?;
    buf.write_u32::<LittleEndian>(len)?;
    buf.extend_from_slice(payload);
    buf.write_u32::<LittleEndian>(crc)?;
    Ok(buf)
}

/// Decode and verify a frame
pub fn decode_frame(buf: &[u8]) -> Result<Frame> {
    if buf.len() < HEADER_LEN + TRAILER_LEN {
        return Err(Error::communication(format!(
            "truncated frame: {} bytes",
            buf.len()
        )));
    }
    let mut cursor = Cursor::new(buf);
    let truncated = |_| Error::communication("truncated frame header");

    let magic = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if magic != MAGIC {
        return Err(Error::communication(format!("bad frame magic {:#010x}", magic)));
    }
    let version = cursor.read_u8().map_err(truncated)?;
    if version != VERSION {
        return Err(Error::communication(format!(
            "unsupported frame version {}",
            version
        )));
    }
    let type_tag = cursor.read_u8().map_err(truncated)?;
    let len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
    if buf.len() != HEADER_LEN + len + TRAILER_LEN {
        return Err(Error::communication(format!(
            "frame length mismatch: header says {} payload bytes, frame has {}",
            len,
            buf.len().saturating_sub(HEADER_LEN + TRAILER_LEN)
        )));
    }
    let mut payload = vec![0u8; len];
    cursor.read_exact(&mut payload).map_err(truncated)?;
    let expected_crc = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

    let mut hasher = Hasher::new();
    hasher.update(&[type_tag]);
    hasher.update(&payload);
    if hasher.finalize() != expected_crc {
        return Err(Error::communication("frame checksum mismatch"));
    }

    match type_tag {
        TYPE_SHARD => bincode::deserialize::<RowSet>(&payload)
            .map(Frame::Shard)
            .map_err(|e| Error::communication(format!("failed to decode shard: {}", e))),
        TYPE_ABORT => bincode::deserialize::<Error>(&payload)
            .map(Frame::Abort)
            .map_err(|e| Error::communication(format!("failed to decode abort: {}", e))),
        other => Err(Error::communication(format!("unknown frame type {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hodmock_core::{Column, ColumnData};

    fn sample() -> RowSet {
        RowSet::new(vec![
            Column::new("x", ColumnData::Float64(vec![1.5, -2.0])),
            Column::new("gal_type", ColumnData::text(["centrals", "satellites"])),
        ])
        .unwrap()
    }

    #[test]
    fn test_shard_frame_decodes() {
        let bytes = encode_shard(&sample()).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap(), Frame::Shard(sample()));
    }

    #[test]
    fn test_abort_frame_decodes() {
        let err = Error::Transform {
            model: "zheng07".into(),
            reason: "boom".into(),
        };
        let bytes = encode_abort(&err).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap(), Frame::Abort(err));
    }

    #[test]
    fn test_empty_rowset_frame() {
        let bytes = encode_shard(&RowSet::empty()).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap(), Frame::Shard(RowSet::empty()));
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut bytes = encode_shard(&sample()).unwrap();
        let mid = HEADER_LEN + 3;
        bytes[mid] ^= 0xFF;
        let err = decode_frame(&bytes).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_bad_magic_detected() {
        let mut bytes = encode_shard(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(decode_frame(&bytes).unwrap_err().to_string().contains("magic"));
    }

    #[test]
    fn test_truncated_frame_detected() {
        let bytes = encode_shard(&sample()).unwrap();
        assert!(decode_frame(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode_frame(&bytes[..3]).is_err());
    }
}
