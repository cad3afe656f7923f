//! Procedural music generator
//!
//! Derives a tempo and a pentatonic melody from an MD5 digest of the prompt
//! (and the lyrics it accompanies) and renders it to a 16-bit mono WAV file.
//! The same inputs always produce the same clip.

use crate::error::StudioResult;
use crate::models::MusicMeta;
use std::f32::consts::PI;
use std::path::PathBuf;

pub const MIN_BPM: u32 = 90;
pub const MAX_BPM: u32 = 140;

/// Base note (A3) in Hz
const ROOT_HZ: f32 = 220.0;

/// Two octaves of the minor pentatonic scale, in semitones above the root
const PENTATONIC: [i32; 10] = [0, 3, 5, 7, 10, 12, 15, 17, 19, 22];

const ATTACK_SECONDS: f32 = 0.01;
const AMPLITUDE: f32 = 0.7;

/// Tempo and note sequence of a clip
#[derive(Debug, Clone, PartialEq)]
pub struct Melody {
    pub bpm: u32,
    pub notes: Vec<f32>,
}

impl Melody {
    /// Compose a melody long enough to fill `duration` seconds
    pub fn compose(prompt: &str, reference_text: Option<&str>, duration: f32) -> Self {
        let seed = format!("{}\n{}", prompt, reference_text.unwrap_or_default());
        let digest = md5::compute(seed.as_bytes()).0;

        let bpm = MIN_BPM + u32::from(digest[0]) % (MAX_BPM - MIN_BPM + 1);
        let beats = (duration * bpm as f32 / 60.0).ceil().max(1.0) as usize;

        let notes = (0..beats)
            .map(|i| {
                let degree = digest[(i + 1) % digest.len()] as usize % PENTATONIC.len();
                ROOT_HZ * 2f32.powf(PENTATONIC[degree] as f32 / 12.0)
            })
            .collect();

        Self { bpm, notes }
    }

    pub fn beat_seconds(&self) -> f32 {
        60.0 / self.bpm as f32
    }

    /// Render to PCM samples with a short attack and exponential release per note
    pub fn render(&self, sample_rate: u32, duration: f32) -> Vec<i16> {
        let total = (duration * sample_rate as f32).round() as usize;
        let beat = self.beat_seconds();
        let rate = sample_rate as f32;

        (0..total)
            .map(|n| {
                let t = n as f32 / rate;
                let index = ((t / beat) as usize).min(self.notes.len().saturating_sub(1));
                let freq = self.notes.get(index).copied().unwrap_or(ROOT_HZ);
                let local = t - index as f32 * beat;

                let attack = (local / ATTACK_SECONDS).min(1.0);
                let release = (-3.0 * local / beat).exp();
                let envelope = attack * release;

                let tone = 0.75 * (2.0 * PI * freq * t).sin() + 0.25 * (4.0 * PI * freq * t).sin();
                let value = tone * envelope * AMPLITUDE;

                (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
            })
            .collect()
    }
}

/// Encode mono 16-bit PCM samples as a RIFF/WAVE file
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;

    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + samples.len() * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

/// Music generator writing clips into the output directory
pub struct MusicGenerator {
    output_dir: PathBuf,
    sample_rate: u32,
    duration: f32,
}

impl MusicGenerator {
    pub fn new(output_dir: PathBuf, sample_rate: u32, duration: f32) -> Self {
        Self {
            output_dir,
            sample_rate,
            duration,
        }
    }

    /// Compose, render and write `music_<uid>.wav`
    pub async fn generate(
        &self,
        prompt: &str,
        reference_text: Option<&str>,
        uid: &str,
    ) -> StudioResult<MusicMeta> {
        let melody = Melody::compose(prompt, reference_text, self.duration);
        let samples = melody.render(self.sample_rate, self.duration);
        let wav = encode_wav(&samples, self.sample_rate);

        let file = format!("music_{}.wav", uid);
        let path = self.output_dir.join(&file);
        tokio::fs::write(&path, wav).await?;

        tracing::debug!(
            "Wrote {} ({} bpm, {} notes, {} samples)",
            file,
            melody.bpm,
            melody.notes.len(),
            samples.len()
        );

        Ok(MusicMeta {
            path,
            file,
            bpm: melody.bpm,
            duration: self.duration,
            sample_rate: self.sample_rate,
        })
    }
}
