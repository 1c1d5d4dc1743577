//! Content-based media type detection
//!
//! Files are classified by their leading bytes, never by extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ClassificationError;

/// Number of leading bytes inspected when sniffing
const SNIFF_LEN: usize = 512;

pub const MEDIA_TYPE_MP3: &str = "audio/mpeg";
pub const MEDIA_TYPE_FLAC: &str = "audio/flac";
pub const MEDIA_TYPE_WAV: &str = "audio/wav";
pub const MEDIA_TYPE_AIFF: &str = "audio/aiff";
pub const MEDIA_TYPE_UNKNOWN: &str = "application/octet-stream";

/// Input container formats the pipeline knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp3,
    Flac,
    Wav,
    Aiff,
    Unsupported,
}

impl MediaFormat {
    /// Map a media type string to a format. Anything but the four audio
    /// types is `Unsupported`.
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            MEDIA_TYPE_MP3 => Self::Mp3,
            MEDIA_TYPE_FLAC => Self::Flac,
            MEDIA_TYPE_WAV => Self::Wav,
            MEDIA_TYPE_AIFF => Self::Aiff,
            _ => Self::Unsupported,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Mp3 => MEDIA_TYPE_MP3,
            Self::Flac => MEDIA_TYPE_FLAC,
            Self::Wav => MEDIA_TYPE_WAV,
            Self::Aiff => MEDIA_TYPE_AIFF,
            Self::Unsupported => MEDIA_TYPE_UNKNOWN,
        }
    }

    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }
}

/// Anything that can tell the pipeline what a file contains
pub trait Classifier: Send + Sync {
    /// Return the media type string for the file's content
    fn classify(&self, path: &Path) -> Result<String, ClassificationError>;
}

/// Default classifier: sniffs magic numbers from the file head
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl Classifier for ContentSniffer {
    fn classify(&self, path: &Path) -> Result<String, ClassificationError> {
        classify(path)
    }
}

/// Classify a file by reading its first bytes
pub fn classify(path: &Path) -> Result<String, ClassificationError> {
    let io_err = |source| ClassificationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(io_err)?;

    Ok(sniff(&head).to_string())
}

/// Detect the media type of a content prefix
pub fn sniff(head: &[u8]) -> &'static str {
    if head.starts_with(b"fLaC") {
        MEDIA_TYPE_FLAC
    } else if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WAVE" {
        MEDIA_TYPE_WAV
    } else if head.len() >= 12
        && &head[0..4] == b"FORM"
        && (&head[8..12] == b"AIFF" || &head[8..12] == b"AIFC")
    {
        MEDIA_TYPE_AIFF
    } else if head.starts_with(b"ID3") || is_mpeg_frame_sync(head) {
        MEDIA_TYPE_MP3
    } else {
        MEDIA_TYPE_UNKNOWN
    }
}

/// 11-bit frame sync followed by a non-reserved layer (rules out ADTS)
fn is_mpeg_frame_sync(head: &[u8]) -> bool {
    head.len() >= 2 && head[0] == 0xFF && head[1] & 0xE0 == 0xE0 && head[1] & 0x06 != 0
}

/// Classify a file and map the result to a [`MediaFormat`]
pub fn detect_format(classifier: &dyn Classifier, path: &Path) -> Result<MediaFormat, ClassificationError> {
    let media_type = classifier.classify(path)?;
    Ok(MediaFormat::from_media_type(&media_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recognizes_audio_signatures() {
        assert_eq!(sniff(b"fLaC\0\0\0\x22"), MEDIA_TYPE_FLAC);
        assert_eq!(sniff(b"RIFF\x24\0\0\0WAVEfmt "), MEDIA_TYPE_WAV);
        assert_eq!(sniff(b"FORM\0\0\0\x2eAIFFCOMM"), MEDIA_TYPE_AIFF);
        assert_eq!(sniff(b"FORM\0\0\0\x2eAIFCFVER"), MEDIA_TYPE_AIFF);
        assert_eq!(sniff(b"ID3\x04\0\0\0\0\0\0"), MEDIA_TYPE_MP3);
        assert_eq!(sniff(&[0xFF, 0xFB, 0x90, 0x64]), MEDIA_TYPE_MP3);
    }

    #[test]
    fn test_rejects_non_audio() {
        assert_eq!(sniff(b"hello world"), MEDIA_TYPE_UNKNOWN);
        assert_eq!(sniff(b""), MEDIA_TYPE_UNKNOWN);
        // ADTS AAC shares the sync word but has layer bits 00
        assert_eq!(sniff(&[0xFF, 0xF1, 0x50, 0x80]), MEDIA_TYPE_UNKNOWN);
        // RIFF but not WAVE
        assert_eq!(sniff(b"RIFF\x24\0\0\0AVI LIST"), MEDIA_TYPE_UNKNOWN);
    }

    #[test]
    fn test_media_type_mapping() {
        assert_eq!(MediaFormat::from_media_type("audio/mpeg"), MediaFormat::Mp3);
        assert_eq!(MediaFormat::from_media_type("audio/flac"), MediaFormat::Flac);
        assert_eq!(MediaFormat::from_media_type("audio/wav"), MediaFormat::Wav);
        assert_eq!(MediaFormat::from_media_type("audio/aiff"), MediaFormat::Aiff);
        assert_eq!(MediaFormat::from_media_type("audio/ogg"), MediaFormat::Unsupported);
        assert_eq!(MediaFormat::from_media_type("text/plain"), MediaFormat::Unsupported);
        assert!(!MediaFormat::Unsupported.is_supported());
    }

    #[test]
    fn test_classify_reads_content_not_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("really_flac.mp3");
        std::fs::write(&path, b"fLaC\0\0\0\x22rest").unwrap();

        assert_eq!(classify(&path).unwrap(), MEDIA_TYPE_FLAC);
        assert_eq!(detect_format(&ContentSniffer, &path).unwrap(), MediaFormat::Flac);
    }

    #[test]
    fn test_classify_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = classify(&dir.path().join("missing.wav"));
        assert!(matches!(result, Err(ClassificationError::Io { .. })));
    }
}
