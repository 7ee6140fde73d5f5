use std::io;

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};
pub use four_cc::FourCC;

mod boxes;
mod config;
mod tree;
mod writer;

pub use boxes::*;
pub use config::{FragmentWriterConfig, NON_SYNC_SAMPLE_FLAGS, SYNC_SAMPLE_FLAGS};
pub use tree::{BoxHandle, BoxId, BoxTree};
pub use writer::{FragmentWriter, MovieFragment};

/// Version and flags of a "full" box, packed into one 32-bit word on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FullBoxHeader {
    version: u8,
    flags: u32,
}

impl FullBoxHeader {
    pub const SIZE: u64 = 4;

    pub fn new(version: u8, flags: u32) -> Self {
        FullBoxHeader {
            version,
            flags: flags & 0x00ff_ffff,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    fn bits(&self) -> u32 {
        (u32::from(self.version) << 24) | self.flags
    }
}

/// The header every box starts with.
///
/// The size is kept in the 32-bit field unless it does not fit, in which case
/// the 32-bit field holds the sentinel `1` and the real size is carried in a
/// 64-bit field that follows the type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    name: FourCC,
    size: u32,
    large_size: u64,
    full: Option<FullBoxHeader>,
}

impl BoxHeader {
    pub const SIZE: u64 = 8;
    pub const LARGE_SIZE: u64 = 16;

    const LARGE_SIZE_SENTINEL: u32 = 1;

    /// A plain box with a 32-bit size.
    pub fn new(name: FourCC, size: u32) -> Self {
        BoxHeader {
            name,
            size,
            large_size: 0,
            full: None,
        }
    }

    /// A plain box with a 64-bit size.
    pub fn new_large(name: FourCC, size: u64) -> Self {
        BoxHeader {
            name,
            size: Self::LARGE_SIZE_SENTINEL,
            large_size: size,
            full: None,
        }
    }

    /// A full box with a 32-bit size.
    pub fn new_full(name: FourCC, size: u32, version: u8, flags: u32) -> Self {
        BoxHeader {
            full: Some(FullBoxHeader::new(version, flags)),
            ..Self::new(name, size)
        }
    }

    /// A full box with a 64-bit size.
    pub fn new_full_large(name: FourCC, size: u64, version: u8, flags: u32) -> Self {
        BoxHeader {
            full: Some(FullBoxHeader::new(version, flags)),
            ..Self::new_large(name, size)
        }
    }

    /// Builds the header of a box whose body (children included) is
    /// `payload_size` bytes long, picking the compact form when it fits.
    pub fn for_payload(name: FourCC, full: Option<FullBoxHeader>, payload_size: u64) -> Self {
        let mut header = BoxHeader {
            name,
            size: 0,
            large_size: 0,
            full,
        };
        header.set_payload_size(payload_size);

        header
    }

    /// Header of a childless box.
    pub fn for_box<B: Mp4Box + ?Sized>(boks: &B) -> Self {
        Self::for_payload(B::NAME, boks.get_full_box_header(), boks.content_size())
    }

    pub fn name(&self) -> FourCC {
        self.name
    }

    pub fn full_box_header(&self) -> Option<FullBoxHeader> {
        self.full
    }

    pub(crate) fn set_full_box_header(&mut self, full: Option<FullBoxHeader>) {
        debug_assert_eq!(self.full.is_some(), full.is_some());

        self.full = full;
    }

    pub fn is_large(&self) -> bool {
        self.size == Self::LARGE_SIZE_SENTINEL
    }

    pub fn header_size(&self) -> u64 {
        let size = if self.is_large() {
            Self::LARGE_SIZE
        } else {
            Self::SIZE
        };

        match self.full {
            Some(_) => size + FullBoxHeader::SIZE,
            None => size,
        }
    }

    /// Total size of the box, header included.
    pub fn size(&self) -> u64 {
        if self.is_large() {
            self.large_size
        } else {
            self.size as u64
        }
    }

    /// Stores `size` verbatim, switching to the 64-bit field when it needs 33 bits or more.
    pub fn set_size(&mut self, size: u64) {
        if size > u32::MAX as u64 {
            self.size = Self::LARGE_SIZE_SENTINEL;
            self.large_size = size;
        } else {
            self.size = size as u32;
            self.large_size = 0;
        }
    }

    /// Size of everything following the header.
    pub fn payload_size(&self) -> u64 {
        self.size() - self.header_size()
    }

    /// Resizes the box to hold `payload_size` bytes after the header. The
    /// header itself grows by 8 bytes if the compact form can no longer
    /// represent the total.
    pub fn set_payload_size(&mut self, payload_size: u64) {
        let full = self.full.map_or(0, |_| FullBoxHeader::SIZE);
        let compact = payload_size + Self::SIZE + full;

        if compact > u32::MAX as u64 {
            self.set_size(payload_size + Self::LARGE_SIZE + full);
        } else {
            self.set_size(compact);
        }
    }

    pub fn write(&self, writer: &mut BytesMut) {
        let mut header = [0u8; 20];

        BigEndian::write_u32(&mut header[..], self.size);
        header[4..8].copy_from_slice(&self.name.0);

        let mut len = 8;
        if self.is_large() {
            BigEndian::write_u64(&mut header[len..], self.large_size);
            len += 8;
        }

        if let Some(full) = self.full {
            BigEndian::write_u32(&mut header[len..], full.bits());
            len += 4;
        }

        writer.put_slice(&header[..len]);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Mp4BoxError {
    #[error("Failed to write box: {0}")]
    IoError(#[from] io::Error),

    #[error("Frame of {0} bytes is too short to wrap, at least 4 bytes are required")]
    FrameTooShort(usize),

    #[error("Frame of {0} bytes does not fit in a 32-bit sample size")]
    FrameTooLarge(usize),

    #[error("{0:?} does not belong to this box tree")]
    UnknownBox(BoxId),

    #[error("Expected a '{expected}' box but found '{found}'")]
    BoxKindMismatch { expected: FourCC, found: FourCC },
}

/// A trait interface for a MP4 box.
pub trait Mp4Box {
    const NAME: FourCC;

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        None
    }

    /// The size of the contents of the box, not counting any child boxes.
    fn content_size(&self) -> u64;

    /// Total size of the box when written on its own.
    fn size(&self) -> u64 {
        BoxHeader::for_box(self).size()
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError>;

    /// Writes a box that has no children. Boxes inside a [`BoxTree`] are
    /// written through the tree instead.
    fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        BoxHeader::for_box(self).write(writer);

        self.write_box_contents(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_header_layout() {
        let header = BoxHeader::new(FourCC(*b"moov"), 8);

        let mut buf = BytesMut::new();
        header.write(&mut buf);

        assert_eq!(&buf[..], &[0, 0, 0, 8, b'm', b'o', b'o', b'v']);
        assert_eq!(header.header_size(), 8);
        assert_eq!(header.size(), 8);
    }

    #[test]
    fn full_header_packs_version_and_flags() {
        let header = BoxHeader::new_full(FourCC(*b"tkhd"), 104, 1, 0x7);

        let mut buf = BytesMut::new();
        header.write(&mut buf);

        assert_eq!(header.header_size(), 12);
        assert_eq!(&buf[..], &[0, 0, 0, 104, b't', b'k', b'h', b'd', 1, 0, 0, 7]);
    }

    #[test]
    fn flags_are_truncated_to_24_bits() {
        let full = FullBoxHeader::new(2, 0xff12_3456);

        assert_eq!(full.version(), 2);
        assert_eq!(full.flags(), 0x12_3456);
    }

    #[test]
    fn large_header_uses_sentinel() {
        let header = BoxHeader::new_large(FourCC(*b"mdat"), 0x1_0000_0010);

        let mut buf = BytesMut::new();
        header.write(&mut buf);

        assert!(header.is_large());
        assert_eq!(header.header_size(), 16);
        assert_eq!(header.size(), 0x1_0000_0010);
        assert_eq!(&buf[..4], &[0, 0, 0, 1]);
        assert_eq!(&buf[4..8], b"mdat");
        assert_eq!(&buf[8..], &[0, 0, 0, 1, 0, 0, 0, 0x10]);
    }

    #[test]
    fn large_full_header_orders_size_before_flags() {
        let header = BoxHeader::new_full_large(FourCC(*b"tfdt"), 1 << 33, 1, 0);

        let mut buf = BytesMut::new();
        header.write(&mut buf);

        assert_eq!(header.header_size(), 20);
        assert_eq!(buf.len(), 20);
        assert_eq!(&buf[8..16], &(1u64 << 33).to_be_bytes());
        assert_eq!(&buf[16..], &[1, 0, 0, 0]);
    }

    #[test]
    fn set_size_switches_representation() {
        let mut header = BoxHeader::new(FourCC(*b"free"), 8);

        header.set_size(u32::MAX as u64);
        assert!(!header.is_large());

        header.set_size(1 << 32);
        assert!(header.is_large());
        assert_eq!(header.size(), 1 << 32);

        header.set_size(64);
        assert!(!header.is_large());
        assert_eq!(header.size(), 64);
    }

    #[test]
    fn payload_promotion_adds_large_size_field() {
        let mut header = BoxHeader::for_payload(FourCC(*b"mdat"), None, 100);
        assert_eq!(header.size(), 108);

        let payload = u32::MAX as u64 - 4;
        header.set_payload_size(payload);

        assert!(header.is_large());
        assert_eq!(header.size(), payload + 16);
        assert_eq!(header.payload_size(), payload);
    }
}
