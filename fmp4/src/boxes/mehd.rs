use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

pub struct MovieExtendsHeaderBox {
    pub fragment_duration: u32,
}

impl MovieExtendsHeaderBox {
    pub fn new(fragment_duration: u32) -> Self {
        MovieExtendsHeaderBox { fragment_duration }
    }
}

impl Mp4Box for MovieExtendsHeaderBox {
    const NAME: FourCC = FourCC(*b"mehd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        4 // fragment_duration
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 4];
        BigEndian::write_u32(&mut contents, self.fragment_duration);

        writer.put_slice(&contents);

        Ok(())
    }
}
