//! Battery configuration
//!
//! Fixed tables and timing parameters are built once here and injected into
//! each test controller. Nothing in this module is mutated after startup.

use crate::types::Viewport;
use serde::ser::{Serialize, Serializer};
use std::time::Duration;

/// Default loop rate in frames per second
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Psychomotor vigilance task parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PvtConfig {
    /// Completed (non false-start) trials required to finish
    pub max_trials: u32,
    /// Lower bound of the pre-stimulus delay
    pub min_delay: Duration,
    /// Upper bound of the pre-stimulus delay
    pub max_delay: Duration,
}

impl Default for PvtConfig {
    fn default() -> Self {
        Self {
            max_trials: 10,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl PvtConfig {
    /// The longer 2-10 second delay window used by the earlier variant
    pub fn extended_delays() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            ..Self::default()
        }
    }
}

/// Digit span parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DigitSpanConfig {
    pub start_span: usize,
    pub max_span: usize,
    pub trials_per_span: usize,
    /// How long each digit stays on screen
    pub digit_duration: Duration,
    /// How long correctness feedback stays on screen
    pub feedback_duration: Duration,
}

impl Default for DigitSpanConfig {
    fn default() -> Self {
        Self {
            start_span: 3,
            max_span: 9,
            trials_per_span: 2,
            digit_duration: Duration::from_millis(1000),
            feedback_duration: Duration::from_millis(1500),
        }
    }
}

/// Fixed mapping from digit 1-9 to display glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    glyphs: [char; 9],
}

impl Default for SymbolMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl SymbolMap {
    pub fn standard() -> Self {
        Self {
            glyphs: ['-', 'T', '#', 'O', 'H', 'L', '^', 'X', '='],
        }
    }

    /// Build a map from glyphs for digits 1 through 9 in order
    pub fn from_glyphs(glyphs: [char; 9]) -> Self {
        Self { glyphs }
    }

    /// Glyph mapped to `digit`, or `None` outside 1-9
    pub fn glyph(&self, digit: u8) -> Option<char> {
        match digit {
            1..=9 => Some(self.glyphs[(digit - 1) as usize]),
            _ => None,
        }
    }

    /// `(digit, glyph)` pairs in ascending digit order
    pub fn pairs(&self) -> impl Iterator<Item = (u8, char)> + '_ {
        self.glyphs
            .iter()
            .enumerate()
            .map(|(i, glyph)| (i as u8 + 1, *glyph))
    }
}

impl Serialize for SymbolMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.pairs()
                .map(|(digit, glyph)| (digit.to_string(), glyph.to_string())),
        )
    }
}

/// Digit symbol substitution parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DsstConfig {
    pub duration: Duration,
    /// Glyphs presented per round
    pub round_length: usize,
    pub symbols: SymbolMap,
}

impl Default for DsstConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(90),
            round_length: 6,
            symbols: SymbolMap::standard(),
        }
    }
}

/// Stanford Sleepiness Scale descriptions for ratings 1-7
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepinessScale {
    descriptions: [&'static str; 7],
}

impl Default for SleepinessScale {
    fn default() -> Self {
        Self::stanford()
    }
}

impl SleepinessScale {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 7;

    pub fn stanford() -> Self {
        Self {
            descriptions: [
                "Feeling active, vital, alert, or wide awake",
                "Functioning at high levels, but not at peak; able to concentrate",
                "Awake, but relaxed; responsive but not fully alert",
                "Somewhat foggy, let down",
                "Foggy; losing interest in remaining awake; slowed down",
                "Sleepy, woozy, fighting sleep; prefer to lie down",
                "No longer fighting sleep, sleep onset soon; having dream-like thoughts",
            ],
        }
    }

    pub fn description(&self, rating: u8) -> Option<&'static str> {
        match rating {
            1..=7 => Some(self.descriptions[(rating - 1) as usize]),
            _ => None,
        }
    }

    pub fn ratings(&self) -> impl Iterator<Item = u8> {
        Self::MIN_RATING..=Self::MAX_RATING
    }
}

/// Free-text feelings entry parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FeelingsConfig {
    pub max_chars: usize,
    /// Cursor blink half-period
    pub cursor_blink: Duration,
}

impl Default for FeelingsConfig {
    fn default() -> Self {
        Self {
            max_chars: 200,
            cursor_blink: Duration::from_millis(500),
        }
    }
}

/// Everything the battery needs, built once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryConfig {
    pub viewport: Viewport,
    pub frame_rate: u32,
    pub pvt: PvtConfig,
    pub digit_span: DigitSpanConfig,
    pub dsst: DsstConfig,
    pub sleepiness: SleepinessScale,
    pub feelings: FeelingsConfig,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            pvt: PvtConfig::default(),
            digit_span: DigitSpanConfig::default(),
            dsst: DsstConfig::default(),
            sleepiness: SleepinessScale::stanford(),
            feelings: FeelingsConfig::default(),
        }
    }
}

impl BatteryConfig {
    /// Frame budget at the configured rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_map_lookup() {
        let map = SymbolMap::standard();
        assert_eq!(map.glyph(1), Some('-'));
        assert_eq!(map.glyph(9), Some('='));
        assert_eq!(map.glyph(0), None);
        assert_eq!(map.glyph(10), None);
        assert_eq!(map.pairs().count(), 9);
    }

    #[test]
    fn test_symbol_map_serializes_as_digit_keyed_object() {
        let value = serde_json::to_value(SymbolMap::standard()).unwrap();
        assert_eq!(value["1"], "-");
        assert_eq!(value["4"], "O");
        assert_eq!(value.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_sleepiness_descriptions() {
        let scale = SleepinessScale::stanford();
        assert_eq!(scale.description(4), Some("Somewhat foggy, let down"));
        assert_eq!(scale.description(0), None);
        assert_eq!(scale.description(8), None);
        assert_eq!(scale.ratings().count(), 7);
    }

    #[test]
    fn test_frame_interval() {
        let config = BatteryConfig::default();
        let interval = config.frame_interval();
        assert!(interval > Duration::from_millis(16));
        assert!(interval < Duration::from_millis(17));
    }
}
