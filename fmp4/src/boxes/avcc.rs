use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4Box;
use crate::Mp4BoxError;

use std::mem::size_of;

/// Decoder configuration record without any parameter sets.
///
/// Decoders that need the SPS/PPS up front cannot start from this record
/// alone; the parameter sets have to arrive in-band.
#[derive(Default)]
pub struct AvcConfigurationBox;

impl AvcConfigurationBox {
    pub fn new() -> Self {
        AvcConfigurationBox
    }
}

impl Mp4Box for AvcConfigurationBox {
    const NAME: FourCC = FourCC(*b"avcC");

    fn content_size(&self) -> u64 {
        size_of::<u8>() as u64 // configurationVersion
            + size_of::<u8>() as u64 // AVCProfileIndication
            + size_of::<u8>() as u64 // profile_compatibility
            + size_of::<u8>() as u64 // AVCLevelIndication
            + size_of::<u8>() as u64 // lengthSizeMinusOne
            + size_of::<u8>() as u64 // numOfSequenceParameterSets
            + size_of::<u8>() as u64 // numOfPictureParameterSets
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_slice(&[
            1,
            0,
            0,
            0,
            0b1111_1100 | 3,
            0b1110_0000, // no sequence parameter sets
            0,           // no picture parameter sets
        ]);

        Ok(())
    }
}
