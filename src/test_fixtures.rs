//! Test fixtures for decoder and pipeline tests
//!
//! Builds small audio files on the fly: WAV through hound, AIFF and FLAC
//! byte by byte. The FLAC writer only emits verbatim subframes, which is
//! enough to exercise a real decoder without an encoder dependency.

#![cfg(test)]

use std::io::Write;
use std::path::Path;

/// Write interleaved 16-bit samples as a WAV file
pub fn write_wav_i16(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    samples: &[i16],
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Bytes in one 128 kbit/s, 44.1 kHz MPEG-1 Layer III frame without padding
const MP3_FRAME_LEN: usize = 417;

/// Write `frames` silent MPEG-1 Layer III frames at 44100 Hz.
///
/// Zeroed side information and main data decode to digital silence.
pub fn write_mp3_silence(path: &Path, mono: bool, frames: usize) -> std::io::Result<()> {
    // Sync, MPEG-1, layer III, no CRC, 128 kbit/s, 44100 Hz; then joint stereo or mono
    let header: [u8; 4] = if mono {
        [0xFF, 0xFB, 0x90, 0xC4]
    } else {
        [0xFF, 0xFB, 0x90, 0x64]
    };

    let mut bytes = Vec::with_capacity(frames * MP3_FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&header);
        bytes.resize(bytes.len() + MP3_FRAME_LEN - header.len(), 0);
    }
    std::fs::File::create(path)?.write_all(&bytes)
}

/// IEEE 754 80-bit extended encoding of a positive integer rate
fn extended_rate(rate: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if rate == 0 {
        return out;
    }
    let shift = 31 - rate.leading_zeros();
    let exponent = 16383 + shift as u16;
    let mantissa = (rate as u64) << (63 - shift);
    out[..2].copy_from_slice(&exponent.to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}

/// Write interleaved 16-bit samples as a big-endian AIFF file
pub fn write_aiff_i16(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    samples: &[i16],
) -> std::io::Result<()> {
    let frames = (samples.len() / channels.max(1) as usize) as u32;
    let data_len = (samples.len() * 2) as u32;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"FORM");
    bytes.extend_from_slice(&(4 + 26 + 16 + data_len).to_be_bytes());
    bytes.extend_from_slice(b"AIFF");

    bytes.extend_from_slice(b"COMM");
    bytes.extend_from_slice(&18u32.to_be_bytes());
    bytes.extend_from_slice(&channels.to_be_bytes());
    bytes.extend_from_slice(&frames.to_be_bytes());
    bytes.extend_from_slice(&16u16.to_be_bytes());
    bytes.extend_from_slice(&extended_rate(sample_rate));

    bytes.extend_from_slice(b"SSND");
    bytes.extend_from_slice(&(8 + data_len).to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_be_bytes());
    }

    std::fs::File::create(path)?.write_all(&bytes)
}

/// A FLAC stream of verbatim frames
pub struct FlacFixture {
    pub sample_rate: u32,
    /// 16 or 24
    pub bits_per_sample: u32,
    /// One sample list per channel, all the same length
    pub channels: Vec<Vec<i32>>,
    /// Samples per channel in each frame; 0 puts everything in one frame
    pub block_size: usize,
}

/// MSB-first bit packer
#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    bits: u32,
}

impl BitWriter {
    fn write(&mut self, value: u64, bits: u32) {
        for i in (0..bits).rev() {
            self.acc = (self.acc << 1) | ((value >> i) & 1);
            self.bits += 1;
            if self.bits == 8 {
                self.bytes.push(self.acc as u8);
                self.acc = 0;
                self.bits = 0;
            }
        }
    }

    fn align(&mut self) {
        while self.bits != 0 {
            self.write(0, 1);
        }
    }
}

fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
        }
    }
    crc
}

fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x8005 } else { crc << 1 };
        }
    }
    crc
}

/// Write `fixture` as a FLAC stream of fixed-blocksize verbatim frames
pub fn write_flac(path: &Path, fixture: &FlacFixture) -> std::io::Result<()> {
    let channels = fixture.channels.len() as u64;
    let total = fixture.channels.first().map_or(0, Vec::len);
    let block = if fixture.block_size == 0 {
        total
    } else {
        fixture.block_size
    };
    let bps = fixture.bits_per_sample as u64;
    let sample_size_code = match fixture.bits_per_sample {
        8 => 0b001,
        12 => 0b010,
        16 => 0b100,
        20 => 0b101,
        24 => 0b110,
        _ => 0b000,
    };

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"fLaC");

    // Last metadata block, STREAMINFO, 34 bytes
    bytes.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
    let mut info = BitWriter::default();
    let declared_block = (block as u64).max(16);
    info.write(declared_block, 16);
    info.write(declared_block, 16);
    info.write(0, 24);
    info.write(0, 24);
    info.write(fixture.sample_rate as u64, 20);
    info.write(channels - 1, 3);
    info.write(bps - 1, 5);
    info.write(total as u64, 36);
    info.write(0, 64);
    info.write(0, 64);
    bytes.extend_from_slice(&info.bytes);

    let mask = (1u64 << bps) - 1;
    let mut offset = 0;
    let mut number = 0u32;
    while offset < total {
        let len = block.min(total - offset);
        let mut frame = BitWriter::default();
        frame.write(0b1111_1111_1111_10, 14);
        frame.write(0, 1);
        // Fixed blocksize, so the header carries a frame number
        frame.write(0, 1);
        // 8- or 16-bit block size stored at the end of the header
        let wide_block = len > 256;
        frame.write(if wide_block { 0b0111 } else { 0b0110 }, 4);
        // Sample rate taken from STREAMINFO
        frame.write(0, 4);
        frame.write(channels - 1, 4);
        frame.write(sample_size_code, 3);
        frame.write(0, 1);
        let mut utf8 = [0u8; 4];
        let coded = char::from_u32(number)
            .expect("frame number below the surrogate range")
            .encode_utf8(&mut utf8);
        for &byte in coded.as_bytes() {
            frame.write(byte as u64, 8);
        }
        frame.write(len as u64 - 1, if wide_block { 16 } else { 8 });
        let header_crc = crc8(&frame.bytes);
        frame.write(header_crc as u64, 8);

        for samples in &fixture.channels {
            // Zero pad, verbatim type, no wasted bits
            frame.write(0, 1);
            frame.write(0b000001, 6);
            frame.write(0, 1);
            for &sample in &samples[offset..offset + len] {
                frame.write(sample as i64 as u64 & mask, bps as u32);
            }
        }
        frame.align();
        let frame_crc = crc16(&frame.bytes);
        frame.write(frame_crc as u64, 16);
        bytes.extend_from_slice(&frame.bytes);

        offset += len;
        number += 1;
    }

    std::fs::File::create(path)?.write_all(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_rate_encoding() {
        // 44100 Hz as it appears in every CD-rate AIFF header
        assert_eq!(
            extended_rate(44100),
            [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            extended_rate(48000),
            [0x40, 0x0E, 0xBB, 0x80, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_crc_check_values() {
        assert_eq!(crc8(b"123456789"), 0xF4);
        assert_eq!(crc16(b"123456789"), 0xFEE8);
    }
}
