use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rodio::buffer::SamplesBuffer;
use rodio::{ OutputStream, Sink };
use thiserror::Error;

/// Synthesized speech arrives as little-endian PCM16 mono at 24 kHz.
pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PCM16 payload has an odd byte length ({0})")]
    TruncatedSample(usize),
    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Decodes a base64 PCM16 payload into normalized f32 samples in
/// [-1, 1]. The whole utterance is decoded before playback starts.
pub fn decode_pcm16(payload: &str) -> Result<Vec<f32>, AudioError> {
    let bytes = BASE64.decode(payload)?;
    if bytes.len() % 2 != 0 {
        return Err(AudioError::TruncatedSample(bytes.len()));
    }
    Ok(
        bytes
            .chunks_exact(2)
            .map(|pair| (i16::from_le_bytes([pair[0], pair[1]]) as f32) / 32768.0)
            .collect()
    )
}

/// Plays one utterance through the default output device, blocking
/// until it finishes. Call from `spawn_blocking` in async contexts.
/// Concurrent invocations overlap; playback is never cancelled.
pub fn play_pcm16(samples: Vec<f32>) -> Result<(), AudioError> {
    let (_stream, handle) = OutputStream::try_default().map_err(|e|
        AudioError::Output(e.to_string())
    )?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioError::Output(e.to_string()))?;
    sink.append(SamplesBuffer::new(CHANNELS, SAMPLE_RATE, samples));
    sink.sleep_until_end();
    Ok(())
}
