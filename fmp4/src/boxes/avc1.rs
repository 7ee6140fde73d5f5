use byteorder::{BigEndian, WriteBytesExt};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4Box;
use crate::Mp4BoxError;

use std::mem::size_of;

/// Visual sample entry for AVC video. The `avcC` box follows as a child.
pub struct AvcSampleEntryBox {
    pub width: u16,
    pub height: u16,
}

impl AvcSampleEntryBox {
    pub fn new(width: u16, height: u16) -> Self {
        AvcSampleEntryBox { width, height }
    }
}

impl Mp4Box for AvcSampleEntryBox {
    const NAME: FourCC = FourCC(*b"avc1");

    fn content_size(&self) -> u64 {
        size_of::<u8>() as u64 * 6 // reserved
            + size_of::<u16>() as u64 // data_reference_index
            + size_of::<u8>() as u64 * 16 // pre_defined, reserved
            + size_of::<u16>() as u64 // width
            + size_of::<u16>() as u64 // height
            + size_of::<u32>() as u64 // horizresolution
            + size_of::<u32>() as u64 // vertresolution
            + size_of::<u8>() as u64 * 4 // reserved
            + size_of::<u16>() as u64 // frame_count
            + size_of::<u8>() as u64 * 32 // compressorname
            + size_of::<u16>() as u64 // depth
            + size_of::<i16>() as u64 // pre_defined
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut v = Vec::new();

        v.extend(&[0u8; 6]);
        v.write_u16::<BigEndian>(1)?;

        v.extend(&[0u8; 16]);

        v.write_u16::<BigEndian>(self.width)?;
        v.write_u16::<BigEndian>(self.height)?;
        v.write_u32::<BigEndian>(0x0048_0000)?; // 72 dpi
        v.write_u32::<BigEndian>(0x0048_0000)?;
        v.extend(&[0u8; 4]);
        v.write_u16::<BigEndian>(1)?;
        v.extend(&[0u8; 32]);
        v.write_u16::<BigEndian>(0x003c)?;
        v.write_i16::<BigEndian>(-1)?;

        assert_eq!(v.len() as u64, self.content_size());

        writer.put_slice(&v);

        Ok(())
    }
}
