//! # Ping-Pong Delay Engine
//!
//! Two delay lines whose feedback paths are cross-wired, so every echo lands
//! on the opposite side from the one before it.
//!
//! ```text
//!            ┌──────────── × feedback ◄───────────┐
//!            ▼                                    │
//!  inR ────►(+)──► [ Left line ] ──► left tap ──┐ │
//!                                               ╳ │   (taps cross over)
//!  inL ────►(+)──► [ Right line ] ─► right tap ─┘ │
//!            ▲                                    │
//!            └──────────── × feedback ◄───────────┘
//!
//!  outL = dry_wet × inL + (1 - dry_wet) × left tap
//!  outR = dry_wet × inR + (1 - dry_wet) × right tap
//! ```
//!
//! A click on the left input therefore comes back first on the right, then
//! on the left scaled by `feedback`, then on the right scaled by
//! `feedback²`, and so on.
//!
//! Once per block the delay length is resolved from the host tempo (see
//! [`tempo`](super::tempo)). The per-sample loop then only does index
//! wrapping, two reads, two writes and the mix.

use std::sync::Arc;

use nih_plug::prelude::*;

use super::delay_line::{DelayLine, Heads};
use super::effect_params::EffectParameters;
use super::tempo::{resolve_delay_samples, NoteDivision, Transport};

/// Longest echo the buffers can hold, in seconds. A half note at 60 BPM
/// fits exactly.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Rate assumed before the host reports one, so the buffers always exist.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Level at which the tail is considered inaudible (-60 dB).
const TAIL_FLOOR_DB: f32 = -60.0;

/// The stereo ping-pong delay.
///
/// Owned by the audio thread. Parameters are read from the shared
/// [`EffectParameters`], which other threads may change at any time.
pub struct PingPongEngine {
    params: Arc<EffectParameters>,

    sample_rate: f32,
    max_delay_seconds: f32,

    left: DelayLine,
    right: DelayLine,
    heads: Heads,

    /// Delay length resolved at the start of the most recent block.
    active_len: usize,

    /// Set by `prepare()`/`reset()`. The first block afterwards puts the
    /// write head `active_len` ahead of the read head using the length it
    /// resolves, so the initial silence matches the host's tempo.
    realign_pending: bool,
}

impl PingPongEngine {
    /// Create an engine with [`MAX_DELAY_SECONDS`] of buffer at
    /// [`DEFAULT_SAMPLE_RATE`].
    pub fn new(params: Arc<EffectParameters>) -> Self {
        Self::with_max_delay(params, MAX_DELAY_SECONDS)
    }

    /// Create an engine whose buffers hold `max_delay_seconds` of audio.
    ///
    /// The buffers are allocated right away, so processing before
    /// [`prepare()`](Self::prepare) is safe, just at the assumed rate.
    pub fn with_max_delay(params: Arc<EffectParameters>, max_delay_seconds: f32) -> Self {
        let max_delay_seconds = if max_delay_seconds.is_finite() && max_delay_seconds > 0.0 {
            max_delay_seconds
        } else {
            MAX_DELAY_SECONDS
        };
        let capacity = buffer_capacity(DEFAULT_SAMPLE_RATE, max_delay_seconds);
        let active_len = resolve_delay_samples(None, None, DEFAULT_SAMPLE_RATE, capacity);

        Self {
            params,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_delay_seconds,
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            heads: Heads::new(active_len),
            active_len,
            realign_pending: true,
        }
    }

    /// Allocate both delay lines for `sample_rate` and flush them.
    ///
    /// Must run before processing whenever the sample rate changes, and
    /// never concurrently with [`process()`](Self::process). Always clears
    /// the buffers and resets the heads, even if the rate is unchanged.
    ///
    /// `max_block_size` is only reported; the engine works on blocks of any
    /// length.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            nih_log!(
                "invalid sample rate {}, using {} Hz instead",
                sample_rate,
                DEFAULT_SAMPLE_RATE
            );
            DEFAULT_SAMPLE_RATE
        };

        let capacity = buffer_capacity(self.sample_rate, self.max_delay_seconds);
        self.left.reallocate(capacity);
        self.right.reallocate(capacity);

        self.active_len = resolve_delay_samples(None, None, self.sample_rate, capacity);
        self.heads = Heads::new(self.active_len);
        self.realign_pending = true;

        nih_log!(
            "ping-pong delay prepared: {} Hz, {} samples per line, blocks up to {}",
            self.sample_rate,
            capacity,
            max_block_size
        );
    }

    /// Flush both lines and reset the heads without reallocating.
    ///
    /// Used when the host stops playback, so stale echoes don't bleed into
    /// the next run.
    pub fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.heads = Heads::new(self.active_len);
        self.realign_pending = true;
    }

    /// Process one stereo block in place.
    ///
    /// The block length is the shorter of the two slices; an empty block
    /// does nothing at all.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32], transport: Option<Transport>) {
        let num_samples = left.len().min(right.len());
        if num_samples == 0 {
            return;
        }

        let (dry_wet, feedback) = self.begin_block(transport);

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.tick(*l, *r, dry_wet, feedback);
            *l = out_l;
            *r = out_r;
        }
    }

    /// Process one mono block in place.
    ///
    /// The sample feeds both sides of the ping-pong, and the channel gets
    /// the right-hand output.
    pub fn process_mono(&mut self, channel: &mut [f32], transport: Option<Transport>) {
        if channel.is_empty() {
            return;
        }

        let (dry_wet, feedback) = self.begin_block(transport);

        for sample in channel.iter_mut() {
            let (_, out_r) = self.tick(*sample, *sample, dry_wet, feedback);
            *sample = out_r;
        }
    }

    /// Samples the host should keep calling `process()` after the input goes
    /// silent.
    ///
    /// Each pass around the loop scales the echo by `feedback`, so after `N`
    /// passes the level is `feedback^N`. Solving `feedback^N = 0.001`
    /// (-60 dB) gives the number of repeats; the tail is that many delay
    /// lengths. The first echo always needs one full delay length.
    pub fn tail_samples(&self) -> u32 {
        let feedback = self.params.feedback();
        let delay = self.active_len as f32;

        let repeats = if feedback > 0.001 {
            (TAIL_FLOOR_DB / 20.0) / feedback.log10()
        } else {
            0.0
        };

        ((1.0 + repeats) * delay) as u32
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn capacity(&self) -> usize {
        self.left.capacity()
    }

    /// Delay length used by the most recent block.
    pub fn active_delay_samples(&self) -> usize {
        self.active_len
    }

    pub fn params(&self) -> &Arc<EffectParameters> {
        &self.params
    }

    /// Resolve the delay length and snapshot the mix parameters.
    fn begin_block(&mut self, transport: Option<Transport>) -> (f32, f32) {
        let division: Option<NoteDivision> = self.params.note_division();
        self.active_len =
            resolve_delay_samples(transport, division, self.sample_rate, self.capacity());

        if self.realign_pending {
            self.heads = Heads::new(self.active_len);
            self.realign_pending = false;
        }

        (self.params.dry_wet(), self.params.feedback())
    }

    /// One sample of the ping-pong loop. Order matters: the echo taps are
    /// read before the same slots are overwritten.
    #[inline]
    fn tick(&mut self, in_l: f32, in_r: f32, dry_wet: f32, feedback: f32) -> (f32, f32) {
        self.heads.wrap(self.active_len);

        let delay_out_l = self.left.read(self.heads.read);
        let delay_out_r = self.right.read(self.heads.read);

        // Cross-feed: each line is fed by the opposite side.
        let delay_in_l = in_r + feedback * delay_out_r;
        let delay_in_r = in_l + feedback * delay_out_l;

        self.left.write(self.heads.write, delay_in_l);
        self.right.write(self.heads.write, delay_in_r);

        let out_l = dry_wet * in_l + (1.0 - dry_wet) * delay_out_l;
        let out_r = dry_wet * in_r + (1.0 - dry_wet) * delay_out_r;

        self.heads.advance();

        (out_l, out_r)
    }
}

/// `ceil(max_delay_seconds × sample_rate)`, at least one sample.
fn buffer_capacity(sample_rate: f32, max_delay_seconds: f32) -> usize {
    ((max_delay_seconds as f64 * sample_rate as f64).ceil() as usize).max(1)
}
