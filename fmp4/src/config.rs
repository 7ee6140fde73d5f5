use four_cc::FourCC;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::VIDEO_HANDLER;

/// Sample flags for a frame that depends on other frames.
pub const NON_SYNC_SAMPLE_FLAGS: u32 = 0x0101_0000;

/// Sample flags for a frame that other frames depend on and that does not
/// depend on any other frame itself.
pub const SYNC_SAMPLE_FLAGS: u32 = 0x0200_0000;

/// Values the movie header and the fragment skeleton are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentWriterConfig {
    pub track_id: u32,
    pub movie_timescale: u32,
    pub media_timescale: u32,
    /// ISO-639-2/T language code of the track.
    pub language: String,
    #[serde(deserialize_with = "four_cc")]
    pub handler_type: FourCC,
    pub handler_name: String,
    pub default_sample_duration: u32,
    pub default_sample_flags: u32,
    pub first_sample_flags: u32,
    /// Also write the first frame's fragment right after the movie header.
    pub emit_initial_fragment: bool,
}

impl Default for FragmentWriterConfig {
    fn default() -> Self {
        FragmentWriterConfig {
            track_id: 1,
            movie_timescale: 1000,
            media_timescale: 120,
            language: String::from("eng"),
            handler_type: VIDEO_HANDLER,
            handler_name: String::from("Video Handler"),
            default_sample_duration: 1,
            default_sample_flags: NON_SYNC_SAMPLE_FLAGS,
            first_sample_flags: SYNC_SAMPLE_FLAGS,
            emit_initial_fragment: false,
        }
    }
}

fn four_cc<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FourCC, D::Error> {
    let code = String::deserialize(deserializer)?;

    <[u8; 4]>::try_from(code.as_bytes())
        .map(FourCC)
        .map_err(|_| de::Error::custom(format!("expected four characters, got {:?}", code)))
}
