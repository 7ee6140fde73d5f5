use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

use std::mem::size_of;

/// Lets the reader pick any unused track id.
pub const NEXT_TRACK_ID_ANY: u32 = 0xffff_ffff;

pub struct MovieHeaderBox {
    pub creation_time: u32,
    pub modification_time: u32,
    pub timescale: u32,
    pub duration: u32,
}

impl MovieHeaderBox {
    pub fn new(creation_time: u32, modification_time: u32, timescale: u32, duration: u32) -> Self {
        MovieHeaderBox {
            creation_time,
            modification_time,
            timescale,
            duration,
        }
    }
}

impl Mp4Box for MovieHeaderBox {
    const NAME: FourCC = FourCC(*b"mvhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u32>() as u64 + // creation_time
        size_of::<u32>() as u64 + // modification_time
        size_of::<u32>() as u64 + // timescale
        size_of::<u32>() as u64 + // duration
        size_of::<u32>() as u64 + // rate
        size_of::<u16>() as u64 + // volume
        size_of::<u16>() as u64 + // reserved
        size_of::<u32>() as u64 * 2 + // reserved
        size_of::<i32>() as u64 * 9 + // matrix
        size_of::<u32>() as u64 * 6 + // pre_defined
        size_of::<u32>() as u64 // next_track_ID
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 96];

        BigEndian::write_u32(&mut contents[..], self.creation_time);
        BigEndian::write_u32(&mut contents[4..], self.modification_time);
        BigEndian::write_u32(&mut contents[8..], self.timescale);
        BigEndian::write_u32(&mut contents[12..], self.duration);

        BigEndian::write_i32(&mut contents[16..], 0x00010000); // rate 1.0
        BigEndian::write_i16(&mut contents[20..], 0x0100); // volume 1.0

        // unity matrix
        BigEndian::write_i32(&mut contents[32..], 0x00010000);
        BigEndian::write_i32(&mut contents[48..], 0x00010000);
        BigEndian::write_i32(&mut contents[64..], 0x40000000);

        BigEndian::write_u32(&mut contents[92..], NEXT_TRACK_ID_ANY);

        writer.put_slice(&contents);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_96_bytes_for_any_arguments() {
        for mvhd in [
            MovieHeaderBox::new(0, 0, 1000, 0),
            MovieHeaderBox::new(u32::MAX, 7, 90_000, u32::MAX),
        ] {
            let mut buf = BytesMut::new();
            mvhd.write_box_contents(&mut buf).unwrap();

            assert_eq!(mvhd.content_size(), 96);
            assert_eq!(buf.len(), 96);
            assert_eq!(mvhd.size(), 108);
        }
    }

    #[test]
    fn next_track_id_is_automatic() {
        let mut buf = BytesMut::new();
        MovieHeaderBox::new(0, 0, 1000, 0)
            .write_box_contents(&mut buf)
            .unwrap();

        assert_eq!(&buf[8..12], &1000u32.to_be_bytes());
        assert_eq!(&buf[16..20], &[0, 1, 0, 0]);
        assert_eq!(&buf[20..22], &[1, 0]);
        assert_eq!(&buf[92..], &[0xff, 0xff, 0xff, 0xff]);
    }
}
