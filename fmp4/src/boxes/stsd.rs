use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::FullBoxHeader;
use crate::Mp4Box;
use crate::Mp4BoxError;

use std::mem::size_of;

/// Sample entries are attached as child boxes; the count follows the children.
#[derive(Default)]
pub struct SampleDescriptionBox {
    pub(crate) entry_count: u32,
}

impl SampleDescriptionBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }
}

impl Mp4Box for SampleDescriptionBox {
    const NAME: FourCC = FourCC(*b"stsd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 // entry_count
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 4];
        BigEndian::write_u32(&mut contents, self.entry_count);

        writer.put_slice(&contents);

        Ok(())
    }
}
