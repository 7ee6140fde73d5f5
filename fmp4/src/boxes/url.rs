use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

/// Media data is in the same file as the box referencing it.
pub const DATA_ENTRY_SELF_CONTAINED: u32 = 0x000001;

pub struct DataEntryUrlBox {
    pub flags: u32,
    pub location: String,
}

impl DataEntryUrlBox {
    /// A self-contained entry; an empty `location` is omitted from the box entirely.
    pub fn new(location: String) -> Self {
        DataEntryUrlBox {
            flags: DATA_ENTRY_SELF_CONTAINED,
            location,
        }
    }

    fn has_location(&self) -> bool {
        self.flags & DATA_ENTRY_SELF_CONTAINED == 0 || !self.location.is_empty()
    }
}

impl Mp4Box for DataEntryUrlBox {
    const NAME: FourCC = FourCC(*b"url ");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, self.flags))
    }

    fn content_size(&self) -> u64 {
        if self.has_location() {
            self.location.as_bytes().len() as u64 + 1
        } else {
            0
        }
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        if self.has_location() {
            writer.put_slice(self.location.as_bytes());
            writer.put_u8(0);
        }

        Ok(())
    }
}
