//! # Ping-Pong Delay: A Tempo-Synced AU/VST3/CLAP Stereo Delay
//!
//! A stereo delay whose echoes bounce between the left and right channels,
//! spaced by a note division of the host's tempo. Built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug) and exported as Audio
//! Unit (AUv2), VST3 and CLAP from one codebase.
//!
//! ## Signal Flow
//!
//! ```text
//!  once per block:  host tempo + note division ──► delay length (samples)
//!
//!  every sample:    left line  ◄── inR + feedback × right tap
//!                   right line ◄── inL + feedback × left tap
//!
//!                   outL = dry/wet × inL + (1 - dry/wet) × left tap
//!                   outR = dry/wet × inR + (1 - dry/wet) × right tap
//! ```
//!
//! The DSP lives in [`dsp`]; this file only adapts it to the host.

pub mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::{effect_params::EffectParameters, ping_pong::PingPongEngine, tempo::Transport};
use nih_plug::prelude::*;
use params::PluginParams;

/// The plugin as the host sees it.
///
/// Host parameters (`PluginParams`) can be touched from any thread and
/// forward into `shared`. The engine is owned by the audio thread and only
/// reads `shared`, so there are no locks anywhere.
struct PingPongDelay {
    params: Arc<PluginParams>,
    shared: Arc<EffectParameters>,
    engine: PingPongEngine,
}

impl Default for PingPongDelay {
    fn default() -> Self {
        let shared = Arc::new(EffectParameters::default());
        Self {
            params: Arc::new(PluginParams::new(shared.clone())),
            // Allocated at a placeholder rate; `initialize()` reallocates
            // once the host reports the real one.
            engine: PingPongEngine::new(shared.clone()),
            shared,
        }
    }
}

impl Plugin for PingPongDelay {
    const NAME: &'static str = "Ping-Pong Delay";
    const VENDOR: &'static str = "Ping-Pong Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo is the intended layout. Mono feeds both sides of the
    // ping-pong and hears the right-hand output.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // The engine snapshots parameters once per block, so splitting blocks
    // at automation points would only add overhead.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called on load and whenever the sample rate or layout changes. The
    /// host guarantees `process()` is not running, so this is where the
    /// delay lines get (re)allocated.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            nih_log!("refusing to initialize at sample rate {}", sample_rate);
            return false;
        }

        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get())
            .unwrap_or(2);
        nih_log!("initializing with {} channel(s)", num_channels);

        self.params.sync_to(&self.shared);
        self.engine.prepare(sample_rate, buffer_config.max_buffer_size as usize);

        true
    }

    /// Playback stopped or the plugin was bypassed: drop pending echoes so
    /// they don't burst out on the next play.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // Read once; a tempo change mid-block waits for the next block.
        let transport = context.transport().tempo.and_then(Transport::from_bpm);

        match buffer.as_slice() {
            [left, right, ..] => self.engine.process(left, right, transport),
            [mono] => self.engine.process_mono(mono, transport),
            [] => {}
        }

        ProcessStatus::Tail(self.engine.tail_samples())
    }
}

impl ClapPlugin for PingPongDelay {
    const CLAP_ID: &'static str = "com.ping-pong-audio.ping-pong-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A tempo-synced stereo delay that bounces echoes between channels");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for PingPongDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"PingPongDelay001";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(PingPongDelay);
nih_export_vst3!(PingPongDelay);

// AUv2 entry point for hosts that only load Audio Units (Logic Pro).
clap_wrapper::export_auv2!();
