//! # Tempo Sync
//!
//! Converts the host's tempo and the selected note division into a delay
//! length in samples:
//!
//! ```text
//! delay_samples = beat_fraction × (60 / bpm) × sample_rate
//! ```
//!
//! At 120 BPM and 48 kHz one beat lasts 0.5 s, so a quarter-note delay is
//! 24000 samples and an eighth-note delay is 12000 samples.
//!
//! When the host reports no tempo, the delay falls back to exactly one
//! second and the note division is ignored.

use nih_plug::prelude::*;

/// Musical length of one echo.
///
/// The `#[id]` strings are stored in host presets, so they must never
/// change once published.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDivision {
    #[id = "eighth"]
    #[name = "1/8 note"]
    Eighth,
    #[id = "dotted-eighth"]
    #[name = "dotted 1/8 note"]
    DottedEighth,
    #[id = "quarter"]
    #[name = "1/4 note"]
    Quarter,
    #[id = "half"]
    #[name = "1/2 note"]
    Half,
}

impl NoteDivision {
    /// Cycle order used by [`advance()`](Self::advance).
    pub const ALL: [NoteDivision; 4] = [
        NoteDivision::Eighth,
        NoteDivision::DottedEighth,
        NoteDivision::Quarter,
        NoteDivision::Half,
    ];

    /// Length of this division in beats (quarter notes).
    pub const fn beat_fraction(self) -> f64 {
        match self {
            NoteDivision::Eighth => 0.5,
            NoteDivision::DottedEighth => 0.75,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Half => 2.0,
        }
    }

    /// The next division in the cycle, wrapping from half back to eighth.
    ///
    /// This is the whole state machine behind a "note" button: every press
    /// moves one step along [`ALL`](Self::ALL).
    pub const fn advance(self) -> Self {
        match self {
            NoteDivision::Eighth => NoteDivision::DottedEighth,
            NoteDivision::DottedEighth => NoteDivision::Quarter,
            NoteDivision::Quarter => NoteDivision::Half,
            NoteDivision::Half => NoteDivision::Eighth,
        }
    }

    /// Compact encoding for atomic storage.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`to_u8()`](Self::to_u8). Unknown values decode to `None`.
    pub fn from_u8(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Beat fraction for a possibly unset division. Unset behaves like a
/// quarter note.
pub fn beat_fraction(division: Option<NoteDivision>) -> f64 {
    division.map_or(1.0, NoteDivision::beat_fraction)
}

/// Snapshot of the host transport, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transport {
    bpm: f64,
}

impl Transport {
    /// Build a snapshot from a host tempo.
    ///
    /// Returns `None` for a zero, negative or non-finite tempo, which is
    /// then treated the same as a host without transport.
    pub fn from_bpm(bpm: f64) -> Option<Self> {
        (bpm.is_finite() && bpm > 0.0).then_some(Self { bpm })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }
}

/// Compute the active delay length in samples.
///
/// * With a transport: `round(beat_fraction × seconds_per_beat × sample_rate)`
///   clamped to `[1, capacity]`.
/// * Without one: `sample_rate` samples (one second), clamped the same way.
pub fn resolve_delay_samples(
    transport: Option<Transport>,
    division: Option<NoteDivision>,
    sample_rate: f32,
    capacity: usize,
) -> usize {
    let samples = match transport {
        Some(transport) => {
            (beat_fraction(division) * transport.seconds_per_beat() * sample_rate as f64).round()
        }
        None => sample_rate as f64,
    };

    // `as` saturates, so a huge or NaN product can't wrap around.
    (samples as usize).clamp(1, capacity.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPACITY_48K: usize = 96_000;

    #[test]
    fn test_quarter_note_at_120_bpm() {
        let transport = Transport::from_bpm(120.0);
        let len = resolve_delay_samples(
            transport,
            Some(NoteDivision::Quarter),
            48_000.0,
            CAPACITY_48K,
        );
        assert_eq!(len, 24_000);
    }

    /// Every division at 120 BPM, 48 kHz.
    #[test]
    fn test_division_table() {
        let transport = Transport::from_bpm(120.0);
        let cases = [
            (NoteDivision::Eighth, 12_000),
            (NoteDivision::DottedEighth, 18_000),
            (NoteDivision::Quarter, 24_000),
            (NoteDivision::Half, 48_000),
        ];

        for (division, expected) in cases {
            let len = resolve_delay_samples(transport, Some(division), 48_000.0, CAPACITY_48K);
            assert_eq!(len, expected, "{division:?}");
        }
    }

    /// The product is rounded, not truncated: 0.75 × 0.6 s × 44100 = 19845,
    /// and 0.5 × (60 / 133) × 44100 = 9947.37 rounds down to 9947.
    #[test]
    fn test_length_is_rounded() {
        let len = resolve_delay_samples(
            Transport::from_bpm(100.0),
            Some(NoteDivision::DottedEighth),
            44_100.0,
            88_200,
        );
        assert_eq!(len, 19_845);

        let len = resolve_delay_samples(
            Transport::from_bpm(133.0),
            Some(NoteDivision::Eighth),
            44_100.0,
            88_200,
        );
        assert_eq!(len, 9_947);
    }

    /// No transport means one second, whatever the division says.
    #[test]
    fn test_fallback_without_transport() {
        for division in NoteDivision::ALL {
            let len = resolve_delay_samples(None, Some(division), 44_100.0, 88_200);
            assert_eq!(len, 44_100);
        }
    }

    #[test]
    fn test_unset_division_acts_like_quarter() {
        let len = resolve_delay_samples(Transport::from_bpm(120.0), None, 48_000.0, CAPACITY_48K);
        assert_eq!(len, 24_000);
        assert_eq!(NoteDivision::from_u8(9), None);
    }

    /// Very slow tempos are clamped to the buffer, very fast ones to 1.
    #[test]
    fn test_length_is_clamped() {
        let slow = resolve_delay_samples(
            Transport::from_bpm(20.0),
            Some(NoteDivision::Half),
            48_000.0,
            CAPACITY_48K,
        );
        assert_eq!(slow, CAPACITY_48K);

        let fast = resolve_delay_samples(
            Transport::from_bpm(1.0e9),
            Some(NoteDivision::Eighth),
            48_000.0,
            CAPACITY_48K,
        );
        assert_eq!(fast, 1);
    }

    #[test]
    fn test_invalid_tempo_is_no_transport() {
        assert!(Transport::from_bpm(0.0).is_none());
        assert!(Transport::from_bpm(-90.0).is_none());
        assert!(Transport::from_bpm(f64::NAN).is_none());
        assert!(Transport::from_bpm(f64::INFINITY).is_none());

        let transport = Transport::from_bpm(90.0).unwrap();
        assert!((transport.bpm() - 90.0).abs() < 1e-12);
        assert!((transport.seconds_per_beat() - 60.0 / 90.0).abs() < 1e-12);
    }

    /// Four presses bring the button back to where it started.
    #[test]
    fn test_advance_cycles_through_all_divisions() {
        let mut division = NoteDivision::Eighth;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(division);
            division = division.advance();
        }

        assert_eq!(seen, NoteDivision::ALL);
        assert_eq!(division, NoteDivision::Eighth);
    }

    #[test]
    fn test_u8_encoding_round_trips() {
        for division in NoteDivision::ALL {
            assert_eq!(NoteDivision::from_u8(division.to_u8()), Some(division));
        }
    }
}
