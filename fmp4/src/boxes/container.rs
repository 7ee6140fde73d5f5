use four_cc::FourCC;

use bytes::BytesMut;

use crate::{Mp4Box, Mp4BoxError};

/// Declares a box with no body of its own that only holds child boxes.
macro_rules! container_box {
    ($(#[$meta:meta])* $name:ident, $fourcc:literal) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Mp4Box for $name {
            const NAME: FourCC = FourCC(*$fourcc);

            fn content_size(&self) -> u64 {
                0
            }

            fn write_box_contents(&self, _writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
                Ok(())
            }
        }
    };
}

container_box!(MovieBox, b"moov");
container_box!(
    /// Marks the movie as fragmented.
    MovieExtendsBox,
    b"mvex"
);
container_box!(TrackBox, b"trak");
container_box!(MediaBox, b"mdia");
container_box!(MediaInformationBox, b"minf");
container_box!(DataInformationBox, b"dinf");
container_box!(SampleTableBox, b"stbl");
container_box!(MovieFragmentBox, b"moof");
container_box!(TrackFragmentBox, b"traf");
