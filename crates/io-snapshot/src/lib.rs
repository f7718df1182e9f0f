//! Deterministic snapshot encoding for emulated I/O devices.
//!
//! The format is a small tag-length-value (TLV) container:
//! - deterministic byte output (fields are emitted in ascending tag order)
//! - forward compatibility (unknown tags are skipped on load)
//! - explicit major/minor versioning at the device level

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use thiserror::Error;

const FORMAT_MAGIC: [u8; 4] = *b"QZSS";
const FORMAT_MAJOR: u8 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot truncated at offset {0}")]
    Truncated(usize),
    #[error("bad snapshot magic")]
    BadMagic,
    #[error("snapshot is for device {found:?}, expected {expected:?}")]
    WrongDevice { expected: [u8; 4], found: [u8; 4] },
    #[error("unsupported snapshot format major {0}")]
    UnsupportedFormat(u8),
    #[error("unsupported device snapshot major {found}, expected {expected}")]
    UnsupportedDeviceMajor { expected: u8, found: u8 },
    #[error("field tag {tag} has length {len}, expected {expected}")]
    BadFieldLength { tag: u16, len: usize, expected: usize },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Device snapshot version, bumped on incompatible layout changes (major) or
/// forward-compatible additions (minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub major: u8,
    pub minor: u8,
}

impl SnapshotVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

/// Snapshotting contract for emulated devices.
///
/// Implementations must keep `DEVICE_ID` stable and only make
/// forward-compatible additions within the same major version by adding new
/// TLV fields.
pub trait IoSnapshot {
    const DEVICE_ID: [u8; 4];
    const DEVICE_VERSION: SnapshotVersion;

    fn save_state(&self) -> Vec<u8>;
    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()>;
}

pub struct SnapshotWriter {
    device_id: [u8; 4],
    version: SnapshotVersion,
    fields: BTreeMap<u16, Vec<u8>>,
}

impl SnapshotWriter {
    pub fn new(device_id: [u8; 4], version: SnapshotVersion) -> Self {
        Self {
            device_id,
            version,
            fields: BTreeMap::new(),
        }
    }

    pub fn field_bool(&mut self, tag: u16, value: bool) {
        self.fields.insert(tag, vec![value as u8]);
    }

    pub fn field_u8(&mut self, tag: u16, value: u8) {
        self.fields.insert(tag, vec![value]);
    }

    pub fn field_u16(&mut self, tag: u16, value: u16) {
        self.fields.insert(tag, value.to_le_bytes().to_vec());
    }

    pub fn field_u32(&mut self, tag: u16, value: u32) {
        self.fields.insert(tag, value.to_le_bytes().to_vec());
    }

    pub fn field_u64(&mut self, tag: u16, value: u64) {
        self.fields.insert(tag, value.to_le_bytes().to_vec());
    }

    pub fn field_bytes(&mut self, tag: u16, value: Vec<u8>) {
        self.fields.insert(tag, value);
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&FORMAT_MAGIC);
        out.push(FORMAT_MAJOR);
        out.extend_from_slice(&self.device_id);
        out.push(self.version.major);
        out.push(self.version.minor);
        for (tag, payload) in &self.fields {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
        }
        out
    }
}

pub struct SnapshotReader<'a> {
    device_version: SnapshotVersion,
    fields: BTreeMap<u16, &'a [u8]>,
}

impl<'a> SnapshotReader<'a> {
    pub fn parse(bytes: &'a [u8], device_id: [u8; 4]) -> SnapshotResult<Self> {
        if bytes.len() < 11 {
            return Err(SnapshotError::Truncated(bytes.len()));
        }
        if bytes[0..4] != FORMAT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        if bytes[4] != FORMAT_MAJOR {
            return Err(SnapshotError::UnsupportedFormat(bytes[4]));
        }
        let found: [u8; 4] = bytes[5..9].try_into().unwrap();
        if found != device_id {
            return Err(SnapshotError::WrongDevice {
                expected: device_id,
                found,
            });
        }
        let device_version = SnapshotVersion::new(bytes[9], bytes[10]);

        let mut fields = BTreeMap::new();
        let mut off = 11usize;
        while off < bytes.len() {
            if off + 6 > bytes.len() {
                return Err(SnapshotError::Truncated(off));
            }
            let tag = u16::from_le_bytes(bytes[off..off + 2].try_into().unwrap());
            let len =
                u32::from_le_bytes(bytes[off + 2..off + 6].try_into().unwrap()) as usize;
            off += 6;
            if off + len > bytes.len() {
                return Err(SnapshotError::Truncated(off));
            }
            // Last write wins; well-formed snapshots never repeat a tag.
            fields.insert(tag, &bytes[off..off + len]);
            off += len;
        }

        Ok(Self {
            device_version,
            fields,
        })
    }

    pub fn device_version(&self) -> SnapshotVersion {
        self.device_version
    }

    pub fn ensure_device_major(&self, expected: u8) -> SnapshotResult<()> {
        if self.device_version.major != expected {
            return Err(SnapshotError::UnsupportedDeviceMajor {
                expected,
                found: self.device_version.major,
            });
        }
        Ok(())
    }

    fn fixed(&self, tag: u16, expected: usize) -> SnapshotResult<Option<&'a [u8]>> {
        match self.fields.get(&tag) {
            None => Ok(None),
            Some(payload) if payload.len() == expected => Ok(Some(payload)),
            Some(payload) => Err(SnapshotError::BadFieldLength {
                tag,
                len: payload.len(),
                expected,
            }),
        }
    }

    pub fn bool(&self, tag: u16) -> SnapshotResult<Option<bool>> {
        Ok(self.fixed(tag, 1)?.map(|p| p[0] != 0))
    }

    pub fn u8(&self, tag: u16) -> SnapshotResult<Option<u8>> {
        Ok(self.fixed(tag, 1)?.map(|p| p[0]))
    }

    pub fn u16(&self, tag: u16) -> SnapshotResult<Option<u16>> {
        Ok(self
            .fixed(tag, 2)?
            .map(|p| u16::from_le_bytes(p.try_into().unwrap())))
    }

    pub fn u32(&self, tag: u16) -> SnapshotResult<Option<u32>> {
        Ok(self
            .fixed(tag, 4)?
            .map(|p| u32::from_le_bytes(p.try_into().unwrap())))
    }

    pub fn u64(&self, tag: u16) -> SnapshotResult<Option<u64>> {
        Ok(self
            .fixed(tag, 8)?
            .map(|p| u64::from_le_bytes(p.try_into().unwrap())))
    }

    pub fn bytes(&self, tag: u16) -> Option<&'a [u8]> {
        self.fields.get(&tag).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_tag_ordering() {
        let mut w = SnapshotWriter::new(*b"TEST", SnapshotVersion::new(1, 2));
        w.field_u32(7, 0xdead_beef);
        w.field_u16(1, 0x1234);
        w.field_bool(3, true);
        let bytes = w.finish();

        // Emitting the same fields in a different order must be byte-identical.
        let mut w2 = SnapshotWriter::new(*b"TEST", SnapshotVersion::new(1, 2));
        w2.field_bool(3, true);
        w2.field_u32(7, 0xdead_beef);
        w2.field_u16(1, 0x1234);
        assert_eq!(bytes, w2.finish());

        let r = SnapshotReader::parse(&bytes, *b"TEST").unwrap();
        r.ensure_device_major(1).unwrap();
        assert_eq!(r.device_version().minor, 2);
        assert_eq!(r.u16(1).unwrap(), Some(0x1234));
        assert_eq!(r.bool(3).unwrap(), Some(true));
        assert_eq!(r.u32(7).unwrap(), Some(0xdead_beef));
        assert_eq!(r.u64(9).unwrap(), None);
    }

    #[test]
    fn rejects_wrong_device_and_truncation() {
        let mut w = SnapshotWriter::new(*b"AAAA", SnapshotVersion::new(1, 0));
        w.field_u64(1, 42);
        let bytes = w.finish();

        assert!(matches!(
            SnapshotReader::parse(&bytes, *b"BBBB"),
            Err(SnapshotError::WrongDevice { .. })
        ));
        assert!(matches!(
            SnapshotReader::parse(&bytes[..bytes.len() - 1], *b"AAAA"),
            Err(SnapshotError::Truncated(_))
        ));
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let mut w = SnapshotWriter::new(*b"TEST", SnapshotVersion::new(1, 0));
        w.field_u16(1, 5);
        w.field_bytes(200, vec![0; 16]);
        let bytes = w.finish();

        let r = SnapshotReader::parse(&bytes, *b"TEST").unwrap();
        assert_eq!(r.u16(1).unwrap(), Some(5));
        assert_eq!(r.bytes(200).map(|b| b.len()), Some(16));
    }

    #[test]
    fn field_length_mismatch_is_an_error() {
        let mut w = SnapshotWriter::new(*b"TEST", SnapshotVersion::new(1, 0));
        w.field_u16(1, 5);
        let bytes = w.finish();

        let r = SnapshotReader::parse(&bytes, *b"TEST").unwrap();
        assert!(matches!(
            r.u32(1),
            Err(SnapshotError::BadFieldLength { tag: 1, .. })
        ));
    }
}
