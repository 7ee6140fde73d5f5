use byteorder::{BigEndian, WriteBytesExt};
use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

use std::mem::size_of;

bitflags::bitflags! {
    pub struct TrackFragmentHeaderFlags: u32 {
        const BASE_DATA_OFFSET_PRESENT = 0x000001;
        const SAMPLE_DESCRIPTION_INDEX_PRESENT = 0x000002;
        const DEFAULT_SAMPLE_DURATION_PRESENT = 0x000008;
        const DEFAULT_SAMPLE_SIZE_PRESENT = 0x000010;
        const DEFAULT_SAMPLE_FLAGS_PRESENT = 0x000020;
        const DURATION_IS_EMPTY = 0x010000;
        const DEFAULT_BASE_IS_MOOF = 0x020000;
    }
}

/// Track fragment header. Which optional fields are written is fixed by
/// `flags`; values of absent fields are kept but never serialized.
pub struct TrackFragmentHeaderBox {
    flags: TrackFragmentHeaderFlags,
    pub track_id: u32,
    pub base_data_offset: u64,
    pub sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl TrackFragmentHeaderBox {
    pub fn new(flags: TrackFragmentHeaderFlags, track_id: u32) -> Self {
        TrackFragmentHeaderBox {
            flags,
            track_id,
            base_data_offset: 0,
            sample_description_index: 0,
            default_sample_duration: 0,
            default_sample_size: 0,
            default_sample_flags: 0,
        }
    }

    pub fn flags(&self) -> TrackFragmentHeaderFlags {
        self.flags
    }

    pub fn set_default_sample_duration(&mut self, default_sample_duration: u32) {
        self.default_sample_duration = default_sample_duration;
    }

    pub fn set_default_sample_size(&mut self, default_sample_size: u32) {
        self.default_sample_size = default_sample_size;
    }

    pub fn set_default_sample_flags(&mut self, default_sample_flags: u32) {
        self.default_sample_flags = default_sample_flags;
    }
}

impl Mp4Box for TrackFragmentHeaderBox {
    const NAME: FourCC = FourCC(*b"tfhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, self.flags.bits()))
    }

    fn content_size(&self) -> u64 {
        let mut size = size_of::<u32>() as u64; // track_ID

        if self.flags.contains(TrackFragmentHeaderFlags::BASE_DATA_OFFSET_PRESENT) {
            size += size_of::<u64>() as u64;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::SAMPLE_DESCRIPTION_INDEX_PRESENT)
        {
            size += size_of::<u32>() as u64;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT)
        {
            size += size_of::<u32>() as u64;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_SIZE_PRESENT)
        {
            size += size_of::<u32>() as u64;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_FLAGS_PRESENT)
        {
            size += size_of::<u32>() as u64;
        }

        size
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let mut v = Vec::new();

        v.write_u32::<BigEndian>(self.track_id)?;

        if self.flags.contains(TrackFragmentHeaderFlags::BASE_DATA_OFFSET_PRESENT) {
            v.write_u64::<BigEndian>(self.base_data_offset)?;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::SAMPLE_DESCRIPTION_INDEX_PRESENT)
        {
            v.write_u32::<BigEndian>(self.sample_description_index)?;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT)
        {
            v.write_u32::<BigEndian>(self.default_sample_duration)?;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_SIZE_PRESENT)
        {
            v.write_u32::<BigEndian>(self.default_sample_size)?;
        }

        if self
            .flags
            .contains(TrackFragmentHeaderFlags::DEFAULT_SAMPLE_FLAGS_PRESENT)
        {
            v.write_u32::<BigEndian>(self.default_sample_flags)?;
        }

        assert_eq!(v.len() as u64, self.content_size());

        writer.put_slice(&v);

        Ok(())
    }
}
