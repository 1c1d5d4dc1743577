//! Format decoders
//!
//! One decoder per supported container, all producing a fully materialized
//! [`Track`]. Dispatch goes through [`decoder_for`] on the sniffed
//! [`MediaFormat`].

mod aiff;
mod flac;
mod mp3;
mod wav;

pub use aiff::AiffDecoder;
pub use flac::FlacDecoder;
pub use mp3::Mp3Decoder;
pub use wav::WavDecoder;

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::ConvertibleSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::detection::MediaFormat;
use super::track::Track;
use crate::error::DecodeError;

/// Decode a whole file into a track
pub trait Decoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Track, DecodeError>;
}

/// Pick the decoder for a sniffed format. `Unsupported` has none.
pub fn decoder_for(format: MediaFormat) -> Option<&'static dyn Decoder> {
    match format {
        MediaFormat::Mp3 => Some(&Mp3Decoder),
        MediaFormat::Flac => Some(&FlacDecoder),
        MediaFormat::Wav => Some(&WavDecoder),
        MediaFormat::Aiff => Some(&AiffDecoder),
        MediaFormat::Unsupported => None,
    }
}

/// Interleaved samples of one decoded packet
pub(crate) struct Chunk<S> {
    pub samples: Vec<S>,
    pub channels: usize,
    pub rate: u32,
}

impl<S: Copy> Chunk<S> {
    /// Iterate over sample frames
    pub fn frames(&self) -> impl Iterator<Item = &[S]> {
        self.samples.chunks_exact(self.channels.max(1))
    }
}

fn to_chunk<S>(decoded: AudioBufferRef<'_>) -> Chunk<S>
where
    S: ConvertibleSample,
{
    let spec = *decoded.spec();
    let mut buf = SampleBuffer::<S>::new(decoded.capacity() as u64, spec);
    buf.copy_interleaved_ref(decoded);
    Chunk {
        samples: buf.samples().to_vec(),
        channels: spec.channels.count(),
        rate: spec.rate,
    }
}

/// Run the container demuxer and codec over every packet of the file's
/// first audio track, handing each decoded packet to `on_chunk`.
///
/// Returns the track's codec parameters as read from the container header.
/// The file is closed when this returns, on success or error.
pub(crate) fn decode_packets<S, F>(
    path: &Path,
    extension: &str,
    mut on_chunk: F,
) -> Result<CodecParameters, DecodeError>
where
    S: ConvertibleSample,
    F: FnMut(Chunk<S>, &CodecParameters) -> Result<(), DecodeError>,
{
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Unsupported("no audio track".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder =
        symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                return Err(DecodeError::Unsupported(
                    "track list changed mid-stream".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        on_chunk(to_chunk(decoded), &params)?;
    }

    Ok(params)
}
