//! WAV output
//!
//! Writes 16-bit linear PCM with an exact-length header. Data goes to a
//! hidden temp file in the destination directory and is renamed into place
//! only after the header is finalized, so an interrupted write never leaves
//! a partial file under the final name.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::{ChannelLayout, QuantizedPcm};
use crate::error::EncodeError;

/// Extension of every output file
pub const OUTPUT_EXTENSION: &str = "wav";

/// Output bit depth
pub const BITS_PER_SAMPLE: u16 = 16;

/// Derive `<output_dir>/<stem>.wav` from an input path.
///
/// The stem is the file name up to its last `.`, unless that dot is the
/// first character (`.hidden` keeps its whole name).
pub fn output_path(output_dir: &Path, input: &Path) -> Result<PathBuf, EncodeError> {
    // `file_stem` applies the same rule and keeps non-UTF-8 names intact
    let stem = input
        .file_stem()
        .ok_or_else(|| EncodeError::InvalidName(input.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    Ok(output_dir.join(name))
}

/// Write quantized frames to `path` as a WAV file.
///
/// Stereo output writes each frame as a left/right pair. Mono output writes
/// the frame slots as consecutive samples and leaves out a synthesized tail.
pub fn write_wav(
    path: &Path,
    pcm: &QuantizedPcm,
    channels: ChannelLayout,
    sample_rate: u32,
) -> Result<(), EncodeError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pcmconv-").suffix(".part");
    // Same creation mode as `File::create`, so the umask decides the final bits
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    let spec = WavSpec {
        channels: channels.count() as u16,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    {
        let mut writer = WavWriter::new(BufWriter::new(tmp.as_file_mut()), spec)?;
        match channels {
            ChannelLayout::Stereo => {
                for &[left, right] in pcm.frames() {
                    writer.write_sample(left)?;
                    writer.write_sample(right)?;
                }
            }
            ChannelLayout::Mono => {
                for sample in pcm.samples() {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;
    }

    // Dropping `tmp` on any error path above removes the partial file
    tmp.persist(path).map_err(|e| EncodeError::Io(e.error))?;

    log::debug!(
        "Wrote {} ({} channels, {} Hz, {} samples{})",
        path.display(),
        channels.count(),
        sample_rate,
        pcm.sample_count(),
        if pcm.is_padded() { ", odd tail" } else { "" }
    );
    Ok(())
}
