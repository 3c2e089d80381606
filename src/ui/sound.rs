/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Effects are fire-and-forget (non-blocking) via rodio's Sink. The
/// background track loops on its own Sink, restarted each new game and
/// paused/resumed with `toggle_music()`. Pausing music leaves effects on.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing). When the audio device can't be opened,
/// `SoundEngine::new()` returns None and the game runs silently.

/// Which effect to play. Chosen by the playback layer from game events.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Dice,
    Step,
    Ladder,
    Snake,
    Win,
}

#[cfg(feature = "sound")]
mod inner {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = 2.0 * std::f32::consts::PI;
    const MUSIC_VOLUME: f32 = 0.25;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        music: RefCell<Option<Sink>>,
        music_track: Arc<Vec<u8>>,
        sfx_dice: Arc<Vec<u8>>,
        sfx_step: Arc<Vec<u8>>,
        sfx_ladder: Arc<Vec<u8>>,
        sfx_snake: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("audio unavailable, running silent: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                music: RefCell::new(None),
                music_track: Arc::new(make_wav(&gen_music())),
                sfx_dice: Arc::new(make_wav(&gen_dice())),
                sfx_step: Arc::new(make_wav(&gen_step())),
                sfx_ladder: Arc::new(make_wav(&gen_ladder())),
                sfx_snake: Arc::new(make_wav(&gen_snake())),
                sfx_win: Arc::new(make_wav(&gen_win())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Dice => &self.sfx_dice,
                Sfx::Step => &self.sfx_step,
                Sfx::Ladder => &self.sfx_ladder,
                Sfx::Snake => &self.sfx_snake,
                Sfx::Win => &self.sfx_win,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// (Re)start the looping background track from the top. Returns
        /// whether it is playing.
        pub fn start_music(&self) -> bool {
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    tracing::warn!("music unavailable: {e}");
                    return false;
                }
            };
            let cursor = Cursor::new(self.music_track.as_ref().clone());
            match rodio::Decoder::new(cursor) {
                Ok(src) => {
                    sink.set_volume(MUSIC_VOLUME);
                    sink.append(src.repeat_infinite());
                    // Dropping the old sink stops it.
                    *self.music.borrow_mut() = Some(sink);
                    true
                }
                Err(e) => {
                    tracing::warn!("music decode failed: {e}");
                    false
                }
            }
        }

        /// Pause or resume the background track; returns whether it plays.
        pub fn toggle_music(&self) -> bool {
            match self.music.borrow().as_ref() {
                Some(sink) if sink.is_paused() => {
                    sink.play();
                    true
                }
                Some(sink) => {
                    sink.pause();
                    false
                }
                None => false,
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Dice rattle: a handful of short noise clicks with gaps.
    fn gen_dice() -> Vec<f32> {
        let click = (SAMPLE_RATE as f32 * 0.018) as usize;
        let gap = (SAMPLE_RATE as f32 * 0.035) as usize;
        let mut rng: u32 = 2024;
        let mut samples = Vec::new();
        for k in 0..6 {
            let volume = 0.35 - k as f32 * 0.04;
            for i in 0..click {
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = 1.0 - i as f32 / click as f32;
                samples.push(noise * env * volume);
            }
            samples.extend(std::iter::repeat(0.0).take(gap));
        }
        samples
    }

    /// Token step: very short soft tick.
    fn gen_step() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.03) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * 660.0 * TAU).sin() * env * 0.15
            })
            .collect()
    }

    /// Ladder: rising sweep, 300Hz → 1200Hz.
    fn gen_ladder() -> Vec<f32> {
        let duration = 0.45;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * 900.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.4);
                // sine + 3rd harmonic for a brighter, retro tone
                ((phase * TAU).sin() * 0.7 + (phase * 3.0 * TAU).sin() * 0.3) * env * 0.3
            })
            .collect()
    }

    /// Snake: falling sweep with a hiss on top.
    fn gen_snake() -> Vec<f32> {
        let duration = 0.5;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        let mut rng: u32 = 777;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 700.0 - t * 520.0;
                phase += freq / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.7);
                ((phase * TAU).sin() * 0.6 + noise * 0.25) * env * 0.3
            })
            .collect()
    }

    /// Win: ascending fanfare C5→E5→G5→C6 with a held last note.
    fn gen_win() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let note_dur = 0.11;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * TAU).sin() * 0.6
                    + (t * freq * 2.0 * TAU).sin() * 0.3
                    + (t * freq * 3.0 * TAU).sin() * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let last = notes[notes.len() - 1];
        let n = (SAMPLE_RATE as f32 * 0.35) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            samples.push((t * last * TAU).sin() * env * 0.3);
        }
        samples
    }

    /// Background loop: a pentatonic melody over a root-fifth bass,
    /// 16 eighth notes at 120 bpm. Every note fades in and out so the
    /// loop point is silent.
    fn gen_music() -> Vec<f32> {
        const MELODY: [f32; 16] = [
            392.0, 440.0, 523.0, 587.0, 523.0, 440.0, 392.0, 330.0,
            349.0, 392.0, 440.0, 523.0, 440.0, 392.0, 349.0, 294.0,
        ];
        const BASS: [f32; 4] = [131.0, 196.0, 175.0, 147.0];
        let note = (SAMPLE_RATE as f32 * 0.25) as usize;
        let fade = note / 8;
        let mut samples = Vec::with_capacity(note * MELODY.len());
        for (k, &freq) in MELODY.iter().enumerate() {
            let bass = BASS[k / 4];
            for i in 0..note {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (i.min(note - 1 - i) as f32 / fade as f32).min(1.0);
                let lead = (t * freq * TAU).sin() * 0.5 + (t * freq * 2.0 * TAU).sin() * 0.1;
                let low = (t * bass * TAU).sin() * 0.3;
                samples.push((lead + low) * env * 0.4);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
    pub fn start_music(&self) -> bool { false }
    pub fn toggle_music(&self) -> bool { false }
}
