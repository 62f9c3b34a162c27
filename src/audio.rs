//! Synthesized sound effects.
//!
//! Three short cues rendered up front with fundsp and replayed through
//! detached rodio sinks: a flap blip, a score chime, and the death sweep
//! (a sawtooth falling from 400 Hz to 80 Hz while fading out). If no
//! audio device is available the game simply runs silent.

use fundsp::prelude32::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

const SAMPLE_RATE: u32 = 44_100;

pub struct AudioOutput {
    inner: Option<Inner>,
}

struct Inner {
    // Dropping the stream kills every sink attached to it.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    flap: Vec<f32>,
    score: Vec<f32>,
    death: Vec<f32>,
}

impl AudioOutput {
    /// Open the default output device; silent fallback on failure.
    pub fn open() -> Self {
        let inner = OutputStream::try_default().ok().map(|(stream, handle)| Inner {
            _stream: stream,
            handle,
            flap: render_flap(),
            score: render_score(),
            death: render_death(),
        });
        Self { inner }
    }

    pub fn play_flap(&self) {
        if let Some(inner) = &self.inner {
            play(inner, &inner.flap);
        }
    }

    pub fn play_score(&self) {
        if let Some(inner) = &self.inner {
            play(inner, &inner.score);
        }
    }

    pub fn play_death(&self) {
        if let Some(inner) = &self.inner {
            play(inner, &inner.death);
        }
    }
}

fn play(inner: &Inner, samples: &[f32]) {
    if let Ok(sink) = Sink::try_new(&inner.handle) {
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
        sink.detach();
    }
}

fn render_mono(node: &mut dyn AudioUnit, seconds: f32) -> Vec<f32> {
    node.set_sample_rate(SAMPLE_RATE as f64);
    let frames = (SAMPLE_RATE as f32 * seconds).round() as usize;
    (0..frames).map(|_| node.get_mono()).collect()
}

/// Falling saw sweep, 400 Hz to 80 Hz over 0.4 s, gain 0.15 to 0 over 0.5 s.
fn render_death() -> Vec<f32> {
    let mut node = lfo(|t: f32| {
        let freq = lerp(400.0, 80.0, (t / 0.4).min(1.0));
        let gain = lerp(0.15, 0.0, (t / 0.5).min(1.0));
        (freq, gain)
    }) >> (saw() * pass());
    render_mono(&mut node, 0.5)
}

/// Quick rising sine blip.
fn render_flap() -> Vec<f32> {
    let mut node = lfo(|t: f32| {
        let freq = lerp(350.0, 700.0, (t / 0.08).min(1.0));
        let gain = lerp(0.12, 0.0, (t / 0.1).min(1.0));
        (freq, gain)
    }) >> (sine() * pass());
    render_mono(&mut node, 0.1)
}

/// Two-note chime.
fn render_score() -> Vec<f32> {
    let mut node = lfo(|t: f32| {
        let freq = if t < 0.07 { 660.0 } else { 880.0 };
        let gain = lerp(0.12, 0.0, (t / 0.18).min(1.0));
        (freq, gain)
    }) >> (sine() * pass());
    render_mono(&mut node, 0.18)
}
