use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

use std::mem::size_of;

/// Holds the data entries (`url ` or `urn `) as child boxes.
#[derive(Default)]
pub struct DataReferenceBox {
    pub(crate) entry_count: u32,
}

impl DataReferenceBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }
}

impl Mp4Box for DataReferenceBox {
    const NAME: FourCC = FourCC(*b"dref");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 // entry_count
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 4];

        BigEndian::write_u32(&mut contents[..], self.entry_count);

        writer.put_slice(&contents);

        Ok(())
    }
}
