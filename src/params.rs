//! # Plugin Parameters
//!
//! The knobs the host shows for this plugin. Each parameter has a stable
//! string ID (`#[id = "..."]`) that presets are saved under; never change
//! these once published.
//!
//! The engine does not read these directly. Every parameter forwards its
//! value into the shared [`EffectParameters`] through a value-changed
//! callback, which the host may fire from any thread. The engine then reads
//! the atomics once per block.
//!
//! There is no smoothing: a jump in dry/wet or feedback takes effect at the
//! next block boundary.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::effect_params::{
    EffectParameters, DEFAULT_DRY_WET, DEFAULT_FEEDBACK, DEFAULT_NOTE_DIVISION,
};
use crate::dsp::tempo::NoteDivision;

#[derive(Params)]
pub struct PluginParams {
    /// **Dry/Wet**: 100% is the untouched input, 0% is only the echoes.
    #[id = "drywet"]
    pub dry_wet: FloatParam,

    /// **Feedback**: how much of each echo is sent to the other side for
    /// the next repeat. The range stops at 90%, well short of runaway.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Note**: echo spacing as a fraction of the host tempo. Without a
    /// host tempo the delay is one second regardless.
    #[id = "note"]
    pub note_division: EnumParam<NoteDivision>,
}

impl PluginParams {
    /// Build the host parameters, wired to write into `shared`.
    pub fn new(shared: Arc<EffectParameters>) -> Self {
        Self {
            dry_wet: FloatParam::new(
                "Dry/Wet",
                DEFAULT_DRY_WET,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage())
            .with_step_size(0.01)
            .with_callback({
                let shared = shared.clone();
                Arc::new(move |value| shared.set_dry_wet(value))
            }),

            feedback: FloatParam::new(
                "Feedback",
                DEFAULT_FEEDBACK,
                FloatRange::Linear { min: 0.1, max: 0.9 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage())
            .with_step_size(0.01)
            .with_callback({
                let shared = shared.clone();
                Arc::new(move |value| shared.set_feedback(value))
            }),

            note_division: EnumParam::new("Note", DEFAULT_NOTE_DIVISION)
                .with_callback(Arc::new(move |division| shared.set_note_division(division))),
        }
    }

    /// Copy every current value into `shared`.
    ///
    /// Callbacks only fire on changes, so this covers values restored
    /// before the plugin was initialized.
    pub fn sync_to(&self, shared: &EffectParameters) {
        shared.set_dry_wet(self.dry_wet.value());
        shared.set_feedback(self.feedback.value());
        shared.set_note_division(self.note_division.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shared_defaults() {
        let shared = Arc::new(EffectParameters::default());
        let params = PluginParams::new(shared.clone());

        assert!((params.dry_wet.value() - shared.dry_wet()).abs() < 1e-6);
        assert!((params.feedback.value() - shared.feedback()).abs() < 1e-6);
        assert_eq!(Some(params.note_division.value()), shared.note_division());
    }

    #[test]
    fn test_sync_overwrites_shared_values() {
        let shared = Arc::new(EffectParameters::default());
        let params = PluginParams::new(shared.clone());

        shared.set_dry_wet(0.0);
        shared.set_feedback(0.9);
        shared.set_note_division(NoteDivision::Half);

        params.sync_to(&shared);

        assert!((shared.dry_wet() - DEFAULT_DRY_WET).abs() < 1e-6);
        assert!((shared.feedback() - DEFAULT_FEEDBACK).abs() < 1e-6);
        assert_eq!(shared.note_division(), Some(DEFAULT_NOTE_DIVISION));
    }
}
