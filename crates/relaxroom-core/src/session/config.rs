use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One hour, the default cycle length.
pub const DEFAULT_DURATION_MS: u64 = 60 * 60 * 1000;

/// Per-session settings. Fixed once a session starts.
///
/// Deserializing goes through [`SessionConfig::new`], so a decoded config
/// is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
    duration_ms: u64,
}

#[derive(Deserialize)]
struct RawSessionConfig {
    duration_ms: u64,
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = ValidationError;

    fn try_from(raw: RawSessionConfig) -> Result<Self, Self::Error> {
        Self::new(raw.duration_ms)
    }
}

impl SessionConfig {
    /// Rejects a zero duration, which would accrue a token on every tick.
    pub fn new(duration_ms: u64) -> Result<Self, ValidationError> {
        if duration_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "duration_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self { duration_ms })
    }

    pub fn from_amount(amount: f64, unit: DurationUnit) -> Result<Self, ValidationError> {
        Self::new(unit.to_ms(amount)?)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

/// Unit a user enters the cycle length in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Minutes,
    Hours,
}

impl DurationUnit {
    pub fn ms_per_unit(self) -> u64 {
        match self {
            DurationUnit::Minutes => 60 * 1000,
            DurationUnit::Hours => 60 * 60 * 1000,
        }
    }

    /// Fractional amounts are allowed ("1.5 hours"), rounded to the millisecond.
    pub fn to_ms(self, amount: f64) -> Result<u64, ValidationError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!("{amount} is not a positive amount"),
            });
        }
        let ms = (amount * self.ms_per_unit() as f64).round();
        if ms >= u64::MAX as f64 {
            return Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!("{amount} {self:?} is too long"),
            });
        }
        Ok(ms as u64)
    }

    /// Express `ms` in this unit.
    pub fn from_ms(self, ms: u64) -> f64 {
        ms as f64 / self.ms_per_unit() as f64
    }

    /// Human-readable length, e.g. `"25 minutes"`, `"1.5 hours"`, `"1 hour"`.
    pub fn describe(self, ms: u64) -> String {
        let amount = (self.from_ms(ms) * 100.0).round() / 100.0;
        let name = match (self, amount == 1.0) {
            (DurationUnit::Minutes, true) => "minute",
            (DurationUnit::Minutes, false) => "minutes",
            (DurationUnit::Hours, true) => "hour",
            (DurationUnit::Hours, false) => "hours",
        };
        format!("{amount} {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_rejected() {
        assert!(SessionConfig::new(0).is_err());
        assert_eq!(SessionConfig::new(1).unwrap().duration_ms(), 1);
    }

    #[test]
    fn default_is_one_hour() {
        assert_eq!(SessionConfig::default().duration_ms(), 3_600_000);
    }

    #[test]
    fn amounts_convert_by_unit() {
        assert_eq!(DurationUnit::Minutes.to_ms(25.0).unwrap(), 1_500_000);
        assert_eq!(DurationUnit::Hours.to_ms(1.5).unwrap(), 5_400_000);
        assert_eq!(DurationUnit::Hours.from_ms(1_800_000), 0.5);
        assert_eq!(
            SessionConfig::from_amount(2.0, DurationUnit::Hours)
                .unwrap()
                .duration_ms(),
            7_200_000
        );
    }

    #[test]
    fn deserializing_validates_duration() {
        assert!(serde_json::from_str::<SessionConfig>(r#"{"duration_ms":0}"#).is_err());
        let config: SessionConfig = serde_json::from_str(r#"{"duration_ms":1500}"#).unwrap();
        assert_eq!(config.duration_ms(), 1_500);
        let back = serde_json::to_string(&config).unwrap();
        assert_eq!(back, r#"{"duration_ms":1500}"#);
    }

    #[test]
    fn describe_uses_the_unit() {
        assert_eq!(DurationUnit::Minutes.describe(1_500_000), "25 minutes");
        assert_eq!(DurationUnit::Minutes.describe(60_000), "1 minute");
        assert_eq!(DurationUnit::Hours.describe(5_400_000), "1.5 hours");
        assert_eq!(DurationUnit::Hours.describe(3_600_000), "1 hour");
        assert_eq!(DurationUnit::Minutes.describe(90_000), "1.5 minutes");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(DurationUnit::Minutes.to_ms(0.0).is_err());
        assert!(DurationUnit::Minutes.to_ms(-3.0).is_err());
        assert!(DurationUnit::Hours.to_ms(f64::NAN).is_err());
        assert!(SessionConfig::from_amount(0.0, DurationUnit::Hours).is_err());
    }
}
