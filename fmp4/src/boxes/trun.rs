use byteorder::{BigEndian, WriteBytesExt};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use std::mem::size_of;

use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

bitflags::bitflags! {
    pub struct TrackFragmentRunFlags: u32 {
        const DATA_OFFSET_PRESENT = 0x00000001;
        const FIRST_SAMPLE_FLAGS_PRESENT = 0x00000004;
        const SAMPLE_DURATION_PRESENT = 0x00000100;
        const SAMPLE_SIZE_PRESENT = 0x00000200;
        const SAMPLE_FLAGS_PRESENT = 0x00000400;
        const SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT = 0x00000800;
    }
}

/// A run describing a single sample.
///
/// The per-sample fields are written once, so the body is
/// `4 + 4 * (number of optional fields present)` bytes.
pub struct TrackFragmentRunBox {
    flags: TrackFragmentRunFlags,
    pub sample_count: u32,
    pub data_offset: i32,
    pub first_sample_flags: u32,
    pub sample_duration: u32,
    pub sample_size: u32,
    pub sample_flags: u32,
    pub sample_composition_time_offset: i32,
}

impl TrackFragmentRunBox {
    pub fn new(flags: TrackFragmentRunFlags, sample_count: u32) -> Self {
        TrackFragmentRunBox {
            flags,
            sample_count,
            data_offset: 0,
            first_sample_flags: 0,
            sample_duration: 0,
            sample_size: 0,
            sample_flags: 0,
            sample_composition_time_offset: 0,
        }
    }

    pub fn flags(&self) -> TrackFragmentRunFlags {
        self.flags
    }

    pub fn set_data_offset(&mut self, data_offset: i32) {
        self.data_offset = data_offset;
    }

    pub fn set_first_sample_flags(&mut self, first_sample_flags: u32) {
        self.first_sample_flags = first_sample_flags;
    }

    pub fn set_sample_duration(&mut self, sample_duration: u32) {
        self.sample_duration = sample_duration;
    }

    pub fn set_sample_size(&mut self, sample_size: u32) {
        self.sample_size = sample_size;
    }

    pub fn set_sample_flags(&mut self, sample_flags: u32) {
        self.sample_flags = sample_flags;
    }

    pub fn set_sample_composition_time_offset(&mut self, offset: i32) {
        self.sample_composition_time_offset = offset;
    }
}

impl Mp4Box for TrackFragmentRunBox {
    const NAME: FourCC = FourCC(*b"trun");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, self.flags.bits()))
    }

    fn content_size(&self) -> u64 {
        let optional = [
            TrackFragmentRunFlags::DATA_OFFSET_PRESENT,
            TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT,
            TrackFragmentRunFlags::SAMPLE_DURATION_PRESENT,
            TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT,
            TrackFragmentRunFlags::SAMPLE_FLAGS_PRESENT,
            TrackFragmentRunFlags::SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT,
        ];

        let present = optional
            .iter()
            .filter(|&&flag| self.flags.contains(flag))
            .count() as u64;

        size_of::<u32>() as u64 + // sample_count
        size_of::<u32>() as u64 * present
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut v = Vec::new();

        v.write_u32::<BigEndian>(self.sample_count)?;

        if self.flags.contains(TrackFragmentRunFlags::DATA_OFFSET_PRESENT) {
            v.write_i32::<BigEndian>(self.data_offset)?;
        }

        if self.flags.contains(TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT) {
            v.write_u32::<BigEndian>(self.first_sample_flags)?;
        }

        if self.flags.contains(TrackFragmentRunFlags::SAMPLE_DURATION_PRESENT) {
            v.write_u32::<BigEndian>(self.sample_duration)?;
        }

        if self.flags.contains(TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT) {
            v.write_u32::<BigEndian>(self.sample_size)?;
        }

        if self.flags.contains(TrackFragmentRunFlags::SAMPLE_FLAGS_PRESENT) {
            v.write_u32::<BigEndian>(self.sample_flags)?;
        }

        if self
            .flags
            .contains(TrackFragmentRunFlags::SAMPLE_COMPOSITION_TIME_OFFSET_PRESENT)
        {
            v.write_i32::<BigEndian>(self.sample_composition_time_offset)?;
        }

        assert_eq!(v.len() as u64, self.content_size());

        writer.put_slice(&v);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_four_bytes_per_optional_field() {
        let cases = [
            (TrackFragmentRunFlags::empty(), 4),
            (TrackFragmentRunFlags::DATA_OFFSET_PRESENT, 8),
            (
                TrackFragmentRunFlags::DATA_OFFSET_PRESENT
                    | TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT
                    | TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT,
                16,
            ),
            (TrackFragmentRunFlags::all(), 28),
        ];

        for (flags, expected) in cases {
            let trun = TrackFragmentRunBox::new(flags, 1);

            let mut buf = BytesMut::new();
            trun.write_box_contents(&mut buf).unwrap();

            assert_eq!(trun.content_size(), expected, "{:?}", flags);
            assert_eq!(buf.len() as u64, expected);
        }
    }

    #[test]
    fn writes_offset_then_first_flags_then_size() {
        let mut trun = TrackFragmentRunBox::new(
            TrackFragmentRunFlags::DATA_OFFSET_PRESENT
                | TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT
                | TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT,
            1,
        );
        trun.set_data_offset(112);
        trun.set_first_sample_flags(0x0200_0000);
        trun.set_sample_size(50);
        trun.set_sample_duration(99);

        let mut buf = BytesMut::new();
        trun.write(&mut buf).unwrap();

        assert_eq!(&buf[8..12], &[0, 0, 0x02, 0x05]);
        assert_eq!(
            &buf[12..],
            &[0, 0, 0, 1, 0, 0, 0, 112, 2, 0, 0, 0, 0, 0, 0, 50]
        );
    }
}
