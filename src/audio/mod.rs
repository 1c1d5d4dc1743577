// Audio module - canonical track model, detection, decoding, resampling and quantization

pub mod decode;
pub mod detection;
pub mod quantize;
pub mod resample;
pub mod track;

pub use decode::{decoder_for, Decoder};
pub use detection::{classify, detect_format, Classifier, ContentSniffer, MediaFormat};
pub use quantize::{quantize, Frame, QuantizedPcm};
pub use resample::{needs_resample, resample};
pub use track::{ChannelLayout, Track};
