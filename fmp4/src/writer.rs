use std::fs::OpenOptions;
use std::io::Write;
use std::mem;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::*;

/// The `moof` box tree that is reused for every frame, together with handles
/// to the boxes whose fields change from frame to frame.
pub struct MovieFragment {
    tree: BoxTree,
    mfhd: BoxHandle<MovieFragmentHeaderBox>,
    tfhd: BoxHandle<TrackFragmentHeaderBox>,
    tfdt: BoxHandle<TrackFragmentBaseMediaDecodeTimeBox>,
    trun: BoxHandle<TrackFragmentRunBox>,
}

impl MovieFragment {
    pub fn new(config: &FragmentWriterConfig, sequence_number: u32) -> Result<Self, Mp4BoxError> {
        let mut tree = BoxTree::new(MovieFragmentBox);

        let mfhd = tree.push_handle(tree.root(), MovieFragmentHeaderBox::new(sequence_number))?;
        let traf = tree.push(tree.root(), TrackFragmentBox)?;

        let mut tfhd = TrackFragmentHeaderBox::new(
            TrackFragmentHeaderFlags::DEFAULT_BASE_IS_MOOF
                | TrackFragmentHeaderFlags::DEFAULT_SAMPLE_FLAGS_PRESENT
                | TrackFragmentHeaderFlags::DEFAULT_SAMPLE_SIZE_PRESENT
                | TrackFragmentHeaderFlags::DEFAULT_SAMPLE_DURATION_PRESENT,
            config.track_id,
        );
        tfhd.sample_description_index = 1;
        tfhd.set_default_sample_duration(config.default_sample_duration);
        tfhd.set_default_sample_flags(config.default_sample_flags);
        let tfhd = tree.push_handle(traf, tfhd)?;

        let tfdt = tree.push_handle(
            traf,
            TrackFragmentBaseMediaDecodeTimeBox::new(sequence_number.into()),
        )?;

        let mut trun = TrackFragmentRunBox::new(
            TrackFragmentRunFlags::DATA_OFFSET_PRESENT
                | TrackFragmentRunFlags::SAMPLE_SIZE_PRESENT
                | TrackFragmentRunFlags::FIRST_SAMPLE_FLAGS_PRESENT,
            1,
        );
        trun.set_data_offset(BoxHeader::SIZE as i32);
        trun.set_first_sample_flags(config.first_sample_flags);
        let trun = tree.push_handle(traf, trun)?;

        Ok(MovieFragment {
            tree,
            mfhd,
            tfhd,
            tfdt,
            trun,
        })
    }

    pub fn size(&self) -> u64 {
        self.tree.size()
    }

    pub fn tree(&self) -> &BoxTree {
        &self.tree
    }

    pub fn set_sequence_number(&mut self, sequence_number: u32) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.mfhd, |mfhd| mfhd.sequence_number = sequence_number)
    }

    pub fn set_base_media_decode_time(&mut self, decode_time: u64) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.tfdt, |tfdt| tfdt.set_base_media_decode_time(decode_time))
    }

    pub fn set_data_offset(&mut self, data_offset: i32) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.trun, |trun| trun.set_data_offset(data_offset))
    }

    pub fn set_sample_size(&mut self, sample_size: u32) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.trun, |trun| trun.set_sample_size(sample_size))
    }

    pub fn set_default_sample_size(&mut self, sample_size: u32) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.tfhd, |tfhd| tfhd.set_default_sample_size(sample_size))
    }

    pub fn set_default_sample_flags(&mut self, sample_flags: u32) -> Result<(), Mp4BoxError> {
        self.tree
            .modify(self.tfhd, |tfhd| tfhd.set_default_sample_flags(sample_flags))
    }

    pub fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        self.tree.write(writer)
    }
}

/// Wraps encoded video frames, one at a time, into a fragmented MP4 stream.
///
/// The first call produces the `moov` header. Every call after that produces
/// one `moof` + `mdat` pair that can be appended to what was written before.
/// A writer serves a single stream; use one writer per encoder.
pub struct FragmentWriter {
    config: FragmentWriterConfig,
    state: WriterState,
    sequence_number: u32,
    fragments_written: u64,
}

enum WriterState {
    Uninitialized,
    /// The movie header has been written; the fragment is reused for every frame.
    Streaming(MovieFragment),
}

impl FragmentWriter {
    pub fn new(config: FragmentWriterConfig) -> Self {
        FragmentWriter {
            config,
            state: WriterState::Uninitialized,
            sequence_number: 0,
            fragments_written: 0,
        }
    }

    pub fn config(&self) -> &FragmentWriterConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, WriterState::Streaming(_))
    }

    /// Sequence number the next frame will get.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Number of `moof` + `mdat` pairs written so far. Lags the number of
    /// wrapped frames by one when the first frame only produced the header.
    pub fn fragments_written(&self) -> u64 {
        self.fragments_written
    }

    pub fn wrap(&mut self, frame: &[u8], width: u16, height: u16) -> Result<Bytes, Mp4BoxError> {
        let mut buffer = BytesMut::with_capacity(frame.len() + 1024);

        self.wrap_into(frame, width, height, &mut buffer)?;

        Ok(buffer.freeze())
    }

    /// Appends the output for `frame` to `buffer`. Nothing is written and no
    /// state changes if `frame` is rejected.
    pub fn wrap_into(
        &mut self,
        frame: &[u8],
        width: u16,
        height: u16,
        buffer: &mut BytesMut,
    ) -> Result<(), Mp4BoxError> {
        if frame.len() < SKIPPED_PREFIX_LEN {
            return Err(Mp4BoxError::FrameTooShort(frame.len()));
        }

        let sample_size =
            u32::try_from(frame.len()).map_err(|_| Mp4BoxError::FrameTooLarge(frame.len()))?;

        let (mut fragment, emit_fragment) =
            match mem::replace(&mut self.state, WriterState::Uninitialized) {
                WriterState::Streaming(fragment) => (fragment, true),
                WriterState::Uninitialized => {
                    let moov = movie_box(&self.config, width, height)?;
                    moov.write(buffer)?;

                    debug!(
                        "Wrote {} byte movie header for a {}x{} track",
                        moov.size(),
                        width,
                        height
                    );

                    let fragment = MovieFragment::new(&self.config, self.sequence_number)?;

                    (fragment, self.config.emit_initial_fragment)
                }
            };

        let result = self.write_fragment(&mut fragment, frame, sample_size, emit_fragment, buffer);
        self.state = WriterState::Streaming(fragment);

        result
    }

    fn write_fragment(
        &mut self,
        fragment: &mut MovieFragment,
        frame: &[u8],
        sample_size: u32,
        emit: bool,
        buffer: &mut BytesMut,
    ) -> Result<(), Mp4BoxError> {
        let moof_size = fragment.size();

        fragment.set_sequence_number(self.sequence_number)?;
        fragment.set_base_media_decode_time(self.sequence_number.into())?;
        // the sample starts right after the 'mdat' header
        fragment.set_data_offset((moof_size + BoxHeader::SIZE) as i32)?;
        fragment.set_sample_size(sample_size)?;
        fragment.set_default_sample_size(sample_size)?;
        fragment.set_default_sample_flags(self.config.default_sample_flags)?;

        let sequence_number = self.sequence_number;
        self.sequence_number = self.sequence_number.wrapping_add(1);

        if emit {
            let mdat = MediaDataBox::new(frame);

            fragment.write(buffer)?;
            mdat.write(buffer)?;
            self.fragments_written += 1;

            trace!(
                "Wrote fragment {} ({} byte moof, {} byte mdat)",
                sequence_number,
                moof_size,
                mdat.size()
            );
        }

        Ok(())
    }

    /// Wraps `frame` and appends the result to the file at `path`.
    pub fn wrap_to_file<P: AsRef<Path>>(
        &mut self,
        frame: &[u8],
        width: u16,
        height: u16,
        path: P,
    ) -> Result<(), Mp4BoxError> {
        let bytes = self.wrap(frame, width, height)?;

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&bytes)?;

        Ok(())
    }
}

impl Default for FragmentWriter {
    fn default() -> Self {
        FragmentWriter::new(FragmentWriterConfig::default())
    }
}

fn movie_box(
    config: &FragmentWriterConfig,
    width: u16,
    height: u16,
) -> Result<BoxTree, Mp4BoxError> {
    let mut moov = BoxTree::new(MovieBox);
    let root = moov.root();

    moov.push(root, MovieHeaderBox::new(0, 0, config.movie_timescale, 0))?;
    moov.add_child(root, movie_extends_box(config)?)?;
    moov.add_child(root, track_box(config, width, height)?)?;

    Ok(moov)
}

fn movie_extends_box(config: &FragmentWriterConfig) -> Result<BoxTree, Mp4BoxError> {
    let mut mvex = BoxTree::new(MovieExtendsBox);
    let root = mvex.root();

    mvex.push(root, MovieExtendsHeaderBox::new(0))?;
    mvex.push(root, TrackExtendsBox::new(config.track_id, 1, 0, 0, 0))?;

    Ok(mvex)
}

fn track_box(
    config: &FragmentWriterConfig,
    width: u16,
    height: u16,
) -> Result<BoxTree, Mp4BoxError> {
    let mut trak = BoxTree::new(TrackBox);
    let root = trak.root();

    trak.push(root, TrackHeaderBox::new(config.track_id, width, height))?;

    let mdia = trak.push(root, MediaBox)?;
    trak.push(
        mdia,
        MediaHeaderBox::new(config.media_timescale, &config.language),
    )?;
    trak.push(
        mdia,
        HandlerBox::new(config.handler_type, config.handler_name.clone()),
    )?;
    trak.add_child(mdia, media_information_box(width, height)?)?;

    Ok(trak)
}

fn media_information_box(width: u16, height: u16) -> Result<BoxTree, Mp4BoxError> {
    let mut minf = BoxTree::new(MediaInformationBox);
    let root = minf.root();

    minf.push(root, VideoMediaHeaderBox::default())?;

    let dinf = minf.push(root, DataInformationBox)?;
    let dref = minf.push(dinf, DataReferenceBox::new())?;
    minf.push(dref, DataEntryUrlBox::new(String::new()))?;

    minf.add_child(root, sample_table_box(width, height)?)?;

    Ok(minf)
}

/// The classic sample tables stay empty; fragments carry all sample timing.
fn sample_table_box(width: u16, height: u16) -> Result<BoxTree, Mp4BoxError> {
    let mut stbl = BoxTree::new(SampleTableBox);
    let root = stbl.root();

    let stsd = stbl.push(root, SampleDescriptionBox::new())?;
    let avc1 = stbl.push(stsd, AvcSampleEntryBox::new(width, height))?;
    stbl.push(avc1, AvcConfigurationBox::new())?;

    stbl.push(root, SampleSizeBox::new(0, 0))?;
    stbl.push(root, SampleToChunkBox::new(0))?;
    stbl.push(root, TimeToSampleBox::new(0))?;
    stbl.push(root, ChunkOffsetBox::new(0))?;

    Ok(stbl)
}
