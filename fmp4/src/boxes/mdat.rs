use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::{Mp4Box, Mp4BoxError};

/// Number of leading frame bytes that never make it into the `mdat` box.
pub const SKIPPED_PREFIX_LEN: usize = 4;

/// Media data for one frame.
///
/// The first [`SKIPPED_PREFIX_LEN`] bytes of `data` are dropped; the box only
/// carries what follows them.
pub struct MediaDataBox<'a> {
    pub data: &'a [u8],
}

impl<'a> MediaDataBox<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MediaDataBox { data }
    }

    /// The bytes written as the body of the box.
    pub fn payload(&self) -> &'a [u8] {
        self.data.get(SKIPPED_PREFIX_LEN..).unwrap_or_default()
    }
}

impl<'a> Mp4Box for MediaDataBox<'a> {
    const NAME: FourCC = FourCC(*b"mdat");

    fn content_size(&self) -> u64 {
        self.payload().len() as _
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_slice(self.payload());

        Ok(())
    }
}
