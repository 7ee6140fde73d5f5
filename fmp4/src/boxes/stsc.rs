use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

pub struct SampleToChunkBox {
    pub entry_count: u32,
}

impl SampleToChunkBox {
    pub fn new(entry_count: u32) -> Self {
        SampleToChunkBox { entry_count }
    }
}

impl Mp4Box for SampleToChunkBox {
    const NAME: FourCC = FourCC(*b"stsc");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        4 // entry_count
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 4];
        BigEndian::write_u32(&mut contents, self.entry_count);

        writer.put_slice(&contents);

        Ok(())
    }
}
