use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

use std::mem::size_of;

/// Sample size table. Only the header fields are written; fragmented files
/// describe their samples in `trun` boxes instead.
pub struct SampleSizeBox {
    pub sample_size: u32,
    pub sample_count: u32,
}

impl SampleSizeBox {
    pub fn new(sample_size: u32, sample_count: u32) -> Self {
        SampleSizeBox {
            sample_size,
            sample_count,
        }
    }
}

impl Mp4Box for SampleSizeBox {
    const NAME: FourCC = FourCC(*b"stsz");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 // sample_size
            + size_of::<u32>() as u64 // sample_count
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 8];

        BigEndian::write_u32(&mut contents[..], self.sample_size);
        BigEndian::write_u32(&mut contents[4..], self.sample_count);

        writer.put_slice(&contents);

        Ok(())
    }
}
