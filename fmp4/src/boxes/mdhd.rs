use byteorder::{BigEndian, ByteOrder};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

use std::mem::size_of;

/// Duration of a track whose length is not known up front.
pub const UNKNOWN_DURATION: u64 = u64::MAX;

pub struct MediaHeaderBox {
    pub timescale: u32,
    pub duration: u64,
    pub language: [u8; 3],
}

impl MediaHeaderBox {
    /// `language` is an ISO-639-2/T code. Missing characters are filled in with `a`.
    pub fn new(timescale: u32, language: &str) -> Self {
        let mut code = [b'a'; 3];
        for (dst, src) in code.iter_mut().zip(language.bytes()) {
            *dst = src;
        }

        MediaHeaderBox {
            timescale,
            duration: UNKNOWN_DURATION,
            language: code,
        }
    }

    /// Packs the language as three 5-bit characters offset by 0x60, with the pad bit clear.
    pub fn packed_language(&self) -> u16 {
        self.language
            .iter()
            .fold(0u16, |acc, &c| (acc << 5) | u16::from(c.wrapping_sub(0x60) & 0x1f))
    }
}

impl Mp4Box for MediaHeaderBox {
    const NAME: FourCC = FourCC(*b"mdhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        size_of::<u64>() as u64 + // creation_time
        size_of::<u64>() as u64 + // modification_time
        size_of::<u32>() as u64 + // timescale
        size_of::<u64>() as u64 + // duration
        size_of::<u16>() as u64 + // language
        size_of::<u16>() as u64 // pre_defined
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut contents = [0u8; 32];

        BigEndian::write_u32(&mut contents[16..], self.timescale);
        BigEndian::write_u64(&mut contents[20..], self.duration);
        BigEndian::write_u16(&mut contents[28..], self.packed_language());

        writer.put_slice(&contents);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_english() {
        let mdhd = MediaHeaderBox::new(120, "eng");

        // e = 5, n = 14, g = 7
        assert_eq!(mdhd.packed_language(), (5 << 10) | (14 << 5) | 7);
        assert_eq!(mdhd.packed_language(), 0x15c7);

        let mut buf = BytesMut::new();
        mdhd.write_box_contents(&mut buf).unwrap();

        assert_eq!(buf.len(), 32);
        assert_eq!(&buf[28..], &[0x15, 0xc7, 0, 0]);
    }

    #[test]
    fn short_language_is_padded() {
        let mdhd = MediaHeaderBox::new(120, "e");

        assert_eq!(&mdhd.language, b"eaa");
        assert_eq!(mdhd.packed_language() & 0x8000, 0);
    }

    #[test]
    fn duration_is_unknown() {
        let mut buf = BytesMut::new();
        MediaHeaderBox::new(120, "und")
            .write_box_contents(&mut buf)
            .unwrap();

        assert_eq!(&buf[16..20], &120u32.to_be_bytes());
        assert_eq!(&buf[20..28], &[0xff; 8]);
    }
}
