use crate::domain::model::Waveform;
use crate::utils::error::{BridgeError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

/// 16-bit PCM 單聲道 WAV
pub fn encode_wav(waveform: &Waveform) -> Result<Vec<u8>> {
    if waveform.sample_rate == 0 {
        return Err(BridgeError::generation("sample rate must be positive"));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in &waveform.samples {
            let value = sample.clamp(-1.0, 1.0);
            let scaled = (value * i16::MAX as f32).round() as i16;
            writer.write_sample(scaled)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// 讀取 WAV 並轉成 f32；多聲道只取第一聲道
pub fn decode_wav(wav_bytes: &[u8]) -> Result<Waveform> {
    let mut reader = WavReader::new(Cursor::new(wav_bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok(Waveform::new(samples, spec.sample_rate))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_header_and_length() {
        let waveform = Waveform::new(vec![0.0, 0.5, -0.5, 1.0], 24000);
        let bytes = encode_wav(&waveform).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44 位元組標頭 + 4 個 16-bit 樣本
        assert_eq!(bytes.len(), 44 + 8);

        let reader = WavReader::new(Cursor::new(&bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        let waveform = Waveform::new(vec![3.0, -7.5], 16000);
        let bytes = encode_wav(&waveform).unwrap();

        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn test_decode_wav_reads_back_samples() {
        let waveform = Waveform::new(vec![0.25, -0.25], 22050);
        let decoded = decode_wav(&encode_wav(&waveform).unwrap()).unwrap();

        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.samples.len(), 2);
        assert!((decoded.samples[0] - 0.25).abs() < 1e-3);
        assert!((decoded.samples[1] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_decode_wav_takes_first_channel() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for sample in [0.1f32, 0.9, 0.2, 0.8] {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }

        let decoded = decode_wav(&cursor.into_inner()).unwrap();
        assert_eq!(decoded.samples, vec![0.1, 0.2]);
    }

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        assert!(encode_wav(&Waveform::new(vec![0.0], 0)).is_err());
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(decode_base64("not base64!!").is_err());
        assert_eq!(decode_base64(&encode_base64(b"RIFF")).unwrap(), b"RIFF");
    }

    #[test]
    fn test_decode_wav_rejects_non_wav() {
        assert!(decode_wav(b"ID3\x03 not a wav").is_err());
    }
}
