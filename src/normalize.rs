//! Frequency normalization
//!
//! Maps raw frequencies onto the keyboard's `1..=255` scale. The most
//! frequent entry always lands on 255 and the least frequent on the floor;
//! 0 is never assigned because the keyboard reads it as "absent".

use crate::record::FrequencyEntry;
use clap::ValueEnum;

/// Highest normalized frequency
pub const MAX_FREQUENCY: u8 = 255;

/// Default lowest normalized frequency for a real word
pub const DEFAULT_FLOOR: u8 = 1;

/// Default lowest normalized frequency for a bigram
///
/// Bigrams get their own band at the top of the scale so that a bigram
/// always outranks the unigram prediction for the same context.
pub const DEFAULT_BIGRAM_FLOOR: u8 = 176;

/// Rescale function applied to raw frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scale {
    /// Proportional to the raw value
    Linear,
    /// Proportional to the logarithm of the raw value
    Log,
}

impl Scale {
    /// Project a raw frequency; `None` if it has no place on this scale
    fn project(self, raw: f64) -> Option<f64> {
        match self {
            Self::Linear => Some(raw),
            Self::Log if raw > 0.0 => Some(raw.ln()),
            Self::Log => None,
        }
    }
}

/// Assigns normalized frequencies to a whole record set
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    scale: Scale,
    floor: u8,
}

impl Normalizer {
    /// A floor of 0 is raised to 1
    pub fn new(scale: Scale, floor: u8) -> Self {
        Self {
            scale,
            floor: floor.max(1),
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Normalize every entry against the distribution of the slice itself
    pub fn normalize<T: FrequencyEntry>(&self, entries: &mut [T]) {
        let Some((lo, hi)) = self.bounds(entries) else {
            for entry in entries.iter_mut() {
                entry.set_normalized_frequency(MAX_FREQUENCY);
            }
            return;
        };

        for entry in entries.iter_mut() {
            let value = self.scaled(entry.raw_frequency(), lo, hi);
            entry.set_normalized_frequency(value);
        }
    }

    fn bounds<T: FrequencyEntry>(&self, entries: &[T]) -> Option<(f64, f64)> {
        let mut projected = entries
            .iter()
            .filter_map(|e| self.scale.project(e.raw_frequency()));

        let first = projected.next()?;
        let (lo, hi) = projected.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((lo, hi))
    }

    fn scaled(&self, raw: f64, lo: f64, hi: f64) -> u8 {
        let Some(value) = self.scale.project(raw) else {
            return self.floor;
        };
        if hi <= lo {
            return MAX_FREQUENCY;
        }

        let span = f64::from(MAX_FREQUENCY - self.floor);
        let position = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        self.floor + (position * span).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BigramRecord, WordRecord};

    fn records(raw: &[f64]) -> Vec<WordRecord> {
        raw.iter()
            .enumerate()
            .map(|(i, &f)| WordRecord::new(format!("w{}", i), f, i))
            .collect()
    }

    fn normalized(records: &[WordRecord]) -> Vec<u8> {
        records.iter().map(|r| r.normalized_frequency).collect()
    }

    #[test]
    fn test_linear_bounds() {
        let mut words = records(&[100.0, 50.0, 0.0]);
        Normalizer::new(Scale::Linear, DEFAULT_FLOOR).normalize(&mut words);

        assert_eq!(normalized(&words), vec![255, 128, 1]);
    }

    #[test]
    fn test_log_bounds() {
        let mut words = records(&[100.0, 50.0]);
        Normalizer::new(Scale::Log, DEFAULT_FLOOR).normalize(&mut words);

        assert_eq!(normalized(&words), vec![255, 1]);
    }

    #[test]
    fn test_log_midpoint() {
        let mut words = records(&[10_000.0, 100.0, 1.0]);
        Normalizer::new(Scale::Log, DEFAULT_FLOOR).normalize(&mut words);

        assert_eq!(normalized(&words), vec![255, 128, 1]);
    }

    #[test]
    fn test_log_zero_maps_to_floor() {
        let mut words = records(&[8.0, 0.0, 2.0]);
        Normalizer::new(Scale::Log, 5).normalize(&mut words);

        assert_eq!(normalized(&words), vec![255, 5, 5]);
    }

    #[test]
    fn test_ties_share_value() {
        let mut words = records(&[7.0, 3.0, 7.0, 5.0, 3.0]);
        Normalizer::new(Scale::Log, DEFAULT_FLOOR).normalize(&mut words);

        let values = normalized(&words);
        assert_eq!(values[0], values[2]);
        assert_eq!(values[1], values[4]);
        assert!(values[3] > values[1] && values[3] < values[0]);
    }

    #[test]
    fn test_uniform_input_maps_to_max() {
        let mut words = records(&[4.0, 4.0, 4.0]);
        Normalizer::new(Scale::Linear, DEFAULT_FLOOR).normalize(&mut words);
        assert_eq!(normalized(&words), vec![255, 255, 255]);

        let mut zeros = records(&[0.0, 0.0]);
        Normalizer::new(Scale::Log, DEFAULT_FLOOR).normalize(&mut zeros);
        assert_eq!(normalized(&zeros), vec![255, 255]);
    }

    #[test]
    fn test_floor_never_zero() {
        let normalizer = Normalizer::new(Scale::Linear, 0);
        let mut words = records(&[10.0, 1.0]);
        normalizer.normalize(&mut words);

        assert_eq!(normalized(&words), vec![255, 1]);
    }

    #[test]
    fn test_bigram_band() {
        let mut pairs = vec![
            BigramRecord {
                first: "the".to_string(),
                second: "cat".to_string(),
                raw_frequency: 50.0,
                normalized_frequency: 0,
                order: 0,
            },
            BigramRecord {
                first: "the".to_string(),
                second: "dog".to_string(),
                raw_frequency: 1.0,
                normalized_frequency: 0,
                order: 1,
            },
        ];
        Normalizer::new(Scale::Log, DEFAULT_BIGRAM_FLOOR).normalize(&mut pairs);

        assert_eq!(pairs[0].normalized_frequency, 255);
        assert_eq!(pairs[1].normalized_frequency, DEFAULT_BIGRAM_FLOOR);
    }

    #[test]
    fn test_monotonic() {
        let raw = [1.0, 3.0, 9.0, 27.0, 81.0, 243.0, 729.0, 2187.0];
        for scale in [Scale::Linear, Scale::Log] {
            let mut words = records(&raw);
            Normalizer::new(scale, DEFAULT_FLOOR).normalize(&mut words);

            let values = normalized(&words);
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{:?}: {:?}", scale, values);
            assert_eq!(*values.last().unwrap(), 255);
            assert_eq!(values[0], 1);
        }
    }
}
