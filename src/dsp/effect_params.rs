//! # Shared Effect Parameters
//!
//! The values the control surface changes while audio is running. Each one
//! lives in its own atomic, so a UI or automation thread can write while the
//! audio thread reads, with no locks.
//!
//! Floats are stored as their bit pattern in an `AtomicU32`. `Relaxed`
//! ordering is enough: every field is independent, and a value arriving one
//! block late is inaudible.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use super::tempo::NoteDivision;

/// Upper bound for feedback. At 1.0 the echoes would never decay, and above
/// it they would grow until they clip.
pub const MAX_FEEDBACK: f32 = 0.95;

pub const DEFAULT_DRY_WET: f32 = 0.5;
pub const DEFAULT_FEEDBACK: f32 = 0.5;
pub const DEFAULT_NOTE_DIVISION: NoteDivision = NoteDivision::Eighth;

/// Lock-free parameter cells shared between the control surface and the
/// engine, usually behind an `Arc`.
pub struct EffectParameters {
    /// 1.0 is fully dry, 0.0 fully wet.
    dry_wet: AtomicU32,
    feedback: AtomicU32,
    note_division: AtomicU8,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            dry_wet: AtomicU32::new(DEFAULT_DRY_WET.to_bits()),
            feedback: AtomicU32::new(DEFAULT_FEEDBACK.to_bits()),
            note_division: AtomicU8::new(DEFAULT_NOTE_DIVISION.to_u8()),
        }
    }
}

impl EffectParameters {
    pub fn dry_wet(&self) -> f32 {
        f32::from_bits(self.dry_wet.load(Ordering::Relaxed))
    }

    /// Set the dry/wet blend, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_dry_wet(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.dry_wet
            .store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn feedback(&self) -> f32 {
        f32::from_bits(self.feedback.load(Ordering::Relaxed))
    }

    /// Set the feedback amount, clamped to `[0, MAX_FEEDBACK]`. NaN is
    /// ignored.
    ///
    /// Clamping here keeps the per-sample loop free of range checks.
    pub fn set_feedback(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.feedback
            .store(value.clamp(0.0, MAX_FEEDBACK).to_bits(), Ordering::Relaxed);
    }

    /// The selected division, or `None` if the stored index is not a known
    /// division.
    pub fn note_division(&self) -> Option<NoteDivision> {
        NoteDivision::from_u8(self.note_division.load(Ordering::Relaxed))
    }

    pub fn set_note_division(&self, division: NoteDivision) {
        self.note_division.store(division.to_u8(), Ordering::Relaxed);
    }

    /// Step to the next division in the cycle and return it.
    ///
    /// An unknown stored index restarts the cycle at the default division.
    pub fn advance_note_division(&self) -> NoteDivision {
        let mut next = DEFAULT_NOTE_DIVISION;
        // `fetch_update` retries if another writer raced us; the closure
        // always returns `Some`, so the result is always `Ok`.
        let _ = self
            .note_division
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |index| {
                next = NoteDivision::from_u8(index)
                    .map_or(DEFAULT_NOTE_DIVISION, NoteDivision::advance);
                Some(next.to_u8())
            });
        next
    }
}
