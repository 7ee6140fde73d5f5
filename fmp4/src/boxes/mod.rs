mod avc1;
mod avcc;
mod container;
mod dref;
mod hdlr;
mod mdat;
mod mdhd;
mod mehd;
mod mfhd;
mod mvhd;
mod stco;
mod stsc;
mod stsd;
mod stsz;
mod stts;
mod tfdt;
mod tfhd;
mod tkhd;
mod trex;
mod trun;
mod url;
mod urn;
mod vmhd;

pub use self::{
    avc1::*, avcc::*, container::*, dref::*, hdlr::*, mdat::*, mdhd::*, mehd::*, mfhd::*,
    mvhd::*, stco::*, stsc::*, stsd::*, stsz::*, stts::*, tfdt::*, tfhd::*, tkhd::*, trex::*,
    trun::*, url::*, urn::*, vmhd::*,
};

use bytes::BytesMut;
use four_cc::FourCC;

use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

/// A box type that can live inside a [`BoxTree`](crate::BoxTree).
pub trait CatalogBox: Mp4Box + Into<BoxKind> {
    fn from_kind(kind: &BoxKind) -> Option<&Self>;

    fn from_kind_mut(kind: &mut BoxKind) -> Option<&mut Self>;
}

macro_rules! box_kinds {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Every box the writer knows how to build, one variant per box type.
        pub enum BoxKind {
            $($variant($ty)),*
        }

        impl BoxKind {
            pub fn name(&self) -> FourCC {
                match self {
                    $(BoxKind::$variant(_) => <$ty as Mp4Box>::NAME),*
                }
            }

            pub fn full_box_header(&self) -> Option<FullBoxHeader> {
                match self {
                    $(BoxKind::$variant(boks) => boks.get_full_box_header()),*
                }
            }

            /// Size of the box's own fields, children excluded.
            pub fn content_size(&self) -> u64 {
                match self {
                    $(BoxKind::$variant(boks) => boks.content_size()),*
                }
            }

            pub fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
                match self {
                    $(BoxKind::$variant(boks) => boks.write_box_contents(writer)),*
                }
            }
        }

        $(
            impl From<$ty> for BoxKind {
                fn from(boks: $ty) -> Self {
                    BoxKind::$variant(boks)
                }
            }

            impl CatalogBox for $ty {
                fn from_kind(kind: &BoxKind) -> Option<&Self> {
                    match kind {
                        BoxKind::$variant(boks) => Some(boks),
                        _ => None,
                    }
                }

                fn from_kind_mut(kind: &mut BoxKind) -> Option<&mut Self> {
                    match kind {
                        BoxKind::$variant(boks) => Some(boks),
                        _ => None,
                    }
                }
            }
        )*
    };
}

box_kinds! {
    Movie(MovieBox),
    MovieHeader(MovieHeaderBox),
    MovieExtends(MovieExtendsBox),
    MovieExtendsHeader(MovieExtendsHeaderBox),
    TrackExtends(TrackExtendsBox),
    Track(TrackBox),
    TrackHeader(TrackHeaderBox),
    Media(MediaBox),
    MediaHeader(MediaHeaderBox),
    Handler(HandlerBox),
    MediaInformation(MediaInformationBox),
    VideoMediaHeader(VideoMediaHeaderBox),
    DataInformation(DataInformationBox),
    DataReference(DataReferenceBox),
    DataEntryUrl(DataEntryUrlBox),
    DataEntryUrn(DataEntryUrnBox),
    SampleTable(SampleTableBox),
    SampleDescription(SampleDescriptionBox),
    AvcSampleEntry(AvcSampleEntryBox),
    AvcConfiguration(AvcConfigurationBox),
    SampleSize(SampleSizeBox),
    SampleToChunk(SampleToChunkBox),
    TimeToSample(TimeToSampleBox),
    ChunkOffset(ChunkOffsetBox),
    MovieFragment(MovieFragmentBox),
    MovieFragmentHeader(MovieFragmentHeaderBox),
    TrackFragment(TrackFragmentBox),
    TrackFragmentHeader(TrackFragmentHeaderBox),
    TrackFragmentBaseMediaDecodeTime(TrackFragmentBaseMediaDecodeTimeBox),
    TrackFragmentRun(TrackFragmentRunBox),
}

impl BoxKind {
    /// Called after a child box has been attached. Boxes that carry an entry
    /// count keep it in step with their children; the count field has a
    /// fixed width, so the size is unaffected.
    pub(crate) fn child_added(&mut self) {
        match self {
            BoxKind::SampleDescription(stsd) => stsd.entry_count += 1,
            BoxKind::DataReference(dref) => dref.entry_count += 1,
            _ => {}
        }
    }
}
