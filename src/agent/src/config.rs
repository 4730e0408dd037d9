//! Engine configuration.
//!
//! Values come from the built-in defaults, optionally a JSON file, then
//! environment variables. Nothing is clamped: an out-of-range value fails
//! [`EngineConfig::validate`] and the engine refuses to start.

use std::{collections::HashSet, fmt::Display, fs, path::Path, str::FromStr};

use common::model::game::Move;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    predictor::PredictorKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Longest suffix the pattern matcher tracks (K).
    pub suffix_max_length: usize,
    /// Number of recent rounds the frequency predictor looks at (W).
    pub frequency_window: usize,
    /// Run length the streak predictor needs before it speaks.
    pub streak_length: usize,
    pub learning_rate: f64,
    pub initial_score: f64,
    pub score_floor: f64,
    /// Chance per round of replacing the counter-move with a uniform draw.
    pub deviation_probability: f64,
    /// Predicted opponent move when every predictor abstains.
    pub fallback_move: Move,
    pub predictors: Vec<PredictorKind>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            suffix_max_length: 3,
            frequency_window: 5,
            streak_length: 3,
            learning_rate: 0.2,
            initial_score: 1.0,
            score_floor: 0.1,
            deviation_probability: 0.05,
            fallback_move: Move::Rock,
            predictors: PredictorKind::DEFAULT_SET.to_vec(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `KEY=value` overrides from `lookup`. Unset keys leave the
    /// current value alone.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SUFFIX_MAX_LENGTH") {
            self.suffix_max_length = parse("suffix_max_length", &raw)?;
        }
        if let Some(raw) = lookup("LOOKBACK_ROUNDS") {
            self.frequency_window = parse("frequency_window", &raw)?;
        }
        if let Some(raw) = lookup("STREAK_LENGTH") {
            self.streak_length = parse("streak_length", &raw)?;
        }
        if let Some(raw) = lookup("LEARNING_RATE") {
            self.learning_rate = parse("learning_rate", &raw)?;
        }
        if let Some(raw) = lookup("INITIAL_SCORE") {
            self.initial_score = parse("initial_score", &raw)?;
        }
        if let Some(raw) = lookup("MIN_SCORE") {
            self.score_floor = parse("score_floor", &raw)?;
        }
        if let Some(raw) = lookup("DEVIATION_CHANCE") {
            self.deviation_probability = parse("deviation_probability", &raw)?;
        }
        if let Some(raw) = lookup("FALLBACK_MOVE") {
            self.fallback_move = parse("fallback_move", &raw)?;
        }
        if let Some(raw) = lookup("PREDICTORS") {
            self.predictors = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse("predictors", s))
                .collect::<Result<_>>()?;
        }
        if let Some(raw) = lookup("SEED") {
            self.seed = Some(parse("seed", &raw)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix_max_length < 1 {
            return Err(Error::invalid("suffix_max_length", "must be at least 1"));
        }
        if self.frequency_window < 1 {
            return Err(Error::invalid("frequency_window", "must be at least 1"));
        }
        if self.streak_length < 2 {
            return Err(Error::invalid("streak_length", "must be at least 2"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(Error::invalid(
                "learning_rate",
                format!("{} must be non-negative and finite", self.learning_rate),
            ));
        }
        if !self.initial_score.is_finite() {
            return Err(Error::invalid("initial_score", "must be finite"));
        }
        if !self.score_floor.is_finite() || self.score_floor > self.initial_score {
            return Err(Error::invalid(
                "score_floor",
                format!(
                    "{} must be finite and not above initial_score {}",
                    self.score_floor, self.initial_score
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.deviation_probability) {
            return Err(Error::invalid(
                "deviation_probability",
                format!("{} is outside [0, 1]", self.deviation_probability),
            ));
        }
        let mut seen = HashSet::new();
        for kind in &self.predictors {
            if !seen.insert(kind) {
                return Err(Error::invalid(
                    "predictors",
                    format!("'{}' is registered twice", kind),
                ));
            }
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_deviation_probability(mut self, probability: f64) -> Self {
        self.deviation_probability = probability;
        self
    }

    pub fn with_fallback_move(mut self, fallback: Move) -> Self {
        self.fallback_move = fallback;
        self
    }

    pub fn with_predictors(mut self, predictors: impl Into<Vec<PredictorKind>>) -> Self {
        self.predictors = predictors.into();
        self
    }
}

fn parse<T>(field: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::invalid(field, format!("could not parse '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.suffix_max_length, 3);
        assert_eq!(config.frequency_window, 5);
        assert_eq!(config.fallback_move, Move::Rock);
    }

    #[test]
    fn overrides_replace_values() {
        let config = EngineConfig::default()
            .with_overrides(lookup(&[
                ("SUFFIX_MAX_LENGTH", "4"),
                ("LEARNING_RATE", "0.5"),
                ("FALLBACK_MOVE", "scissors"),
                ("PREDICTORS", "suffix, frequency,streak"),
                ("SEED", "7"),
            ]))
            .expect("overrides should parse");
        assert_eq!(config.suffix_max_length, 4);
        assert_eq!(config.learning_rate, 0.5);
        assert_eq!(config.fallback_move, Move::Scissors);
        assert_eq!(
            config.predictors,
            vec![
                PredictorKind::Suffix,
                PredictorKind::Frequency,
                PredictorKind::Streak
            ]
        );
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.frequency_window, 5);
    }

    #[test]
    fn unparsable_override_is_invalid() {
        let err = EngineConfig::default()
            .with_overrides(lookup(&[("LOOKBACK_ROUNDS", "five")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration {
                field: "frequency_window",
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            (
                EngineConfig {
                    suffix_max_length: 0,
                    ..Default::default()
                },
                "suffix_max_length",
            ),
            (
                EngineConfig {
                    learning_rate: -0.1,
                    ..Default::default()
                },
                "learning_rate",
            ),
            (
                EngineConfig {
                    score_floor: 2.0,
                    ..Default::default()
                },
                "score_floor",
            ),
            (
                EngineConfig {
                    deviation_probability: 1.5,
                    ..Default::default()
                },
                "deviation_probability",
            ),
            (
                EngineConfig {
                    predictors: vec![PredictorKind::Suffix, PredictorKind::Suffix],
                    ..Default::default()
                },
                "predictors",
            ),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(Error::InvalidConfiguration { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {} to be rejected, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn json_fills_missing_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"frequency_window": 8, "fallback_move": "PAPER"}"#)
                .expect("Could not parse config");
        assert_eq!(config.frequency_window, 8);
        assert_eq!(config.fallback_move, Move::Paper);
        assert_eq!(config.learning_rate, 0.2);

        assert!(serde_json::from_str::<EngineConfig>(r#"{"window": 8}"#).is_err());
    }
}
