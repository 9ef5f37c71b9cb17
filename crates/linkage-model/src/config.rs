//! Matching configuration and its validation.
//!
//! Configurations are plain values handed to the engine by the caller. A
//! [`MatchingConfig`] or [`Thresholds`] can only be obtained through
//! validation: their fields are private, and the constructors, builders and
//! deserialization all reject inverted thresholds and administrative weight
//! keys up front.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::field::FieldName;

/// Relative importance per field. Weights need not sum to anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, f64>",
    into = "BTreeMap<String, f64>"
)]
pub struct FieldWeights(BTreeMap<FieldName, f64>);

impl FieldWeights {
    /// Build weights from string keys, as read from an external profile.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = BTreeMap::new();
        for (key, weight) in pairs {
            let field: FieldName = key.parse()?;
            check_weight(field, weight)?;
            weights.insert(field, weight);
        }
        Ok(Self(weights))
    }

    /// Build weights from typed keys.
    pub fn from_fields<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (FieldName, f64)>,
    {
        let mut weights = BTreeMap::new();
        for (field, weight) in pairs {
            check_weight(field, weight)?;
            weights.insert(field, weight);
        }
        Ok(Self(weights))
    }

    /// Identity and location fields.
    pub fn standard() -> Self {
        Self(BTreeMap::from([
            (FieldName::FirstName, 20.0),
            (FieldName::MiddleName, 5.0),
            (FieldName::LastName, 20.0),
            (FieldName::Sex, 5.0),
            (FieldName::BirthDate, 25.0),
            (FieldName::Village, 10.0),
            (FieldName::SubVillage, 5.0),
            (FieldName::District, 5.0),
        ]))
    }

    /// Standard fields plus household, phone and identifier fields.
    pub fn extended() -> Self {
        let mut weights = Self::standard().0;
        weights.extend([
            (FieldName::HouseholdHead, 10.0),
            (FieldName::MotherName, 10.0),
            (FieldName::OldestHouseholdMember, 5.0),
            (FieldName::PhoneNumber, 15.0),
            (FieldName::Identifiers, 30.0),
        ]);
        Self(weights)
    }

    pub fn get(&self, field: FieldName) -> Option<f64> {
        self.0.get(&field).copied()
    }

    /// Return a copy with one weight replaced.
    pub fn with_weight(&self, field: FieldName, weight: f64) -> Result<Self> {
        check_weight(field, weight)?;
        let mut weights = self.0.clone();
        weights.insert(field, weight);
        Ok(Self(weights))
    }

    /// Fields with a positive weight, in canonical order.
    pub fn active(&self) -> impl Iterator<Item = (FieldName, f64)> + '_ {
        self.0
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(field, weight)| (*field, *weight))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, f64)> + '_ {
        self.0.iter().map(|(field, weight)| (*field, *weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<String, f64>> for FieldWeights {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self> {
        Self::from_pairs(raw.iter().map(|(key, weight)| (key.as_str(), *weight)))
    }
}

impl From<FieldWeights> for BTreeMap<String, f64> {
    fn from(weights: FieldWeights) -> Self {
        weights
            .0
            .into_iter()
            .map(|(field, weight)| (field.key().to_string(), weight))
            .collect()
    }
}

fn check_weight(field: FieldName, weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::InvalidWeight {
            field: field.key().to_string(),
            weight,
        });
    }
    Ok(())
}

/// Three ascending cut points on the 0-100 score scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdsDef")]
pub struct Thresholds {
    high: f64,
    medium: f64,
    low: f64,
}

#[derive(Deserialize)]
struct ThresholdsDef {
    high: f64,
    medium: f64,
    low: f64,
}

impl TryFrom<ThresholdsDef> for Thresholds {
    type Error = ConfigError;

    fn try_from(def: ThresholdsDef) -> Result<Self> {
        Self::new(def.high, def.medium, def.low)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 85.0,
            medium: 60.0,
            low: 30.0,
        }
    }
}

impl Thresholds {
    pub fn new(high: f64, medium: f64, low: f64) -> Result<Self> {
        let thresholds = Self { high, medium, low };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub const fn high(&self) -> f64 {
        self.high
    }

    pub const fn medium(&self) -> f64 {
        self.medium
    }

    /// Also the default minimum score a search keeps.
    pub const fn low(&self) -> f64 {
        self.low
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("high", self.high), ("medium", self.medium), ("low", self.low)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.high < self.medium {
            return Err(ConfigError::ThresholdOrder {
                upper: "high",
                upper_value: self.high,
                lower: "medium",
                lower_value: self.medium,
            });
        }
        if self.medium < self.low {
            return Err(ConfigError::ThresholdOrder {
                upper: "medium",
                upper_value: self.medium,
                lower: "low",
                lower_value: self.low,
            });
        }
        Ok(())
    }
}

/// Which scorer ranks candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmType {
    /// Weighted linear combination of field similarities.
    #[default]
    Deterministic,
    /// Fellegi-Sunter log-likelihood accumulation.
    Probabilistic,
}

/// Fellegi-Sunter agreement probabilities for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldProbabilities {
    /// Probability the field agrees given a true match.
    pub m: f64,
    /// Probability the field agrees by chance.
    pub u: f64,
}

impl FieldProbabilities {
    pub const fn new(m: f64, u: f64) -> Self {
        Self { m, u }
    }

    /// Built-in table used when a field has no override.
    pub fn default_for(field: FieldName) -> Self {
        match field {
            FieldName::FirstName => Self::new(0.95, 0.02),
            FieldName::MiddleName => Self::new(0.80, 0.05),
            FieldName::LastName => Self::new(0.95, 0.03),
            FieldName::Sex => Self::new(0.98, 0.50),
            FieldName::BirthDate => Self::new(0.95, 0.01),
            FieldName::Village => Self::new(0.90, 0.10),
            FieldName::SubVillage => Self::new(0.85, 0.15),
            FieldName::District => Self::new(0.95, 0.30),
            FieldName::HouseholdHead => Self::new(0.85, 0.02),
            FieldName::MotherName => Self::new(0.85, 0.02),
            FieldName::OldestHouseholdMember => Self::new(0.75, 0.03),
            FieldName::PhoneNumber => Self::new(0.90, 0.001),
            FieldName::Identifiers => Self::new(0.99, 0.0001),
        }
    }

    fn validate(&self, field: FieldName) -> Result<()> {
        for (parameter, value) in [("m", self.m), ("u", self.u)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidProbability {
                    field: field.key().to_string(),
                    parameter,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Parameters of the probabilistic scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbabilisticSettings {
    /// Per-field replacements for the built-in m/u table.
    pub overrides: BTreeMap<FieldName, FieldProbabilities>,
    /// Prior log2 odds of a match, added to the accumulated weight.
    pub prior_log2_odds: f64,
}

impl Default for ProbabilisticSettings {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::new(),
            prior_log2_odds: -6.0,
        }
    }
}

impl ProbabilisticSettings {
    pub fn probabilities_for(&self, field: FieldName) -> FieldProbabilities {
        self.overrides
            .get(&field)
            .copied()
            .unwrap_or_else(|| FieldProbabilities::default_for(field))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.prior_log2_odds.is_finite() {
            return Err(ConfigError::InvalidPrior(self.prior_log2_odds));
        }
        for (field, probabilities) in &self.overrides {
            probabilities.validate(*field)?;
        }
        Ok(())
    }
}

/// Everything a scorer needs to compare two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MatchingConfigDef")]
pub struct MatchingConfig {
    field_weights: FieldWeights,
    threshold: Thresholds,
    fuzzy_matching: bool,
    algorithm_type: AlgorithmType,
    probabilistic: ProbabilisticSettings,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            field_weights: FieldWeights::standard(),
            threshold: Thresholds::default(),
            fuzzy_matching: true,
            algorithm_type: AlgorithmType::Deterministic,
            probabilistic: ProbabilisticSettings::default(),
        }
    }
}

impl MatchingConfig {
    /// Validate and build a config from its parts.
    pub fn new(
        field_weights: FieldWeights,
        threshold: Thresholds,
        fuzzy_matching: bool,
        algorithm_type: AlgorithmType,
    ) -> Result<Self> {
        let config = Self {
            field_weights,
            threshold,
            fuzzy_matching,
            algorithm_type,
            probabilistic: ProbabilisticSettings::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Default thresholds over the extended field set.
    pub fn extended() -> Self {
        Self {
            field_weights: FieldWeights::extended(),
            ..Self::default()
        }
    }

    pub fn field_weights(&self) -> &FieldWeights {
        &self.field_weights
    }

    pub const fn threshold(&self) -> Thresholds {
        self.threshold
    }

    pub const fn fuzzy_matching(&self) -> bool {
        self.fuzzy_matching
    }

    pub const fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    pub fn probabilistic(&self) -> &ProbabilisticSettings {
        &self.probabilistic
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm_type: AlgorithmType) -> Self {
        self.algorithm_type = algorithm_type;
        self
    }

    #[must_use]
    pub fn with_fuzzy_matching(mut self, enabled: bool) -> Self {
        self.fuzzy_matching = enabled;
        self
    }

    pub fn with_thresholds(mut self, threshold: Thresholds) -> Result<Self> {
        threshold.validate()?;
        self.threshold = threshold;
        Ok(self)
    }

    pub fn with_weights(mut self, field_weights: FieldWeights) -> Result<Self> {
        self.field_weights = field_weights;
        self.validate()?;
        Ok(self)
    }

    pub fn with_probabilistic(mut self, settings: ProbabilisticSettings) -> Result<Self> {
        settings.validate()?;
        self.probabilistic = settings;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;
        if self.field_weights.active().next().is_none() {
            return Err(ConfigError::NoWeightedFields);
        }
        self.probabilistic.validate()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchingConfigDef {
    #[serde(default)]
    field_weights: Option<FieldWeights>,
    #[serde(default)]
    threshold: Option<Thresholds>,
    #[serde(default = "default_fuzzy")]
    fuzzy_matching: bool,
    #[serde(default)]
    algorithm_type: AlgorithmType,
    #[serde(default)]
    probabilistic: ProbabilisticSettings,
}

fn default_fuzzy() -> bool {
    true
}

impl TryFrom<MatchingConfigDef> for MatchingConfig {
    type Error = ConfigError;

    fn try_from(def: MatchingConfigDef) -> Result<Self> {
        let config = Self {
            field_weights: def.field_weights.unwrap_or_default(),
            threshold: def.threshold.unwrap_or_default(),
            fuzzy_matching: def.fuzzy_matching,
            algorithm_type: def.algorithm_type,
            probabilistic: def.probabilistic,
        };
        config.validate()?;
        Ok(config)
    }
}
