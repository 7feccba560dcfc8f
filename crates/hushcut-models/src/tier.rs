//! Billing tier definitions.
//!
//! The tier selects the detection strategy and its constraints:
//!
//! - `Basic`: FFmpeg amplitude silence detection, inputs capped at 60s
//! - `Premium`: Whisper speech segmentation, no duration cap

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Billing/capability tier for a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Amplitude-threshold detection, duration-capped.
    #[default]
    Basic,

    /// Speech-activity detection via the transcription model, uncapped.
    Premium,
}

impl Tier {
    /// All available tiers.
    pub const ALL: &'static [Tier] = &[Tier::Basic, Tier::Premium];

    /// Returns the tier name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Premium => "premium",
        }
    }

    /// Returns a human-readable description of the detection strategy.
    pub fn description(&self) -> &'static str {
        match self {
            Tier::Basic => "Amplitude silence detection (max 60s input)",
            Tier::Premium => "Speech segmentation via transcription model",
        }
    }

    /// Maximum input duration allowed for this tier, if any.
    pub fn max_duration_secs(&self) -> Option<f64> {
        match self {
            Tier::Basic => Some(60.0),
            Tier::Premium => None,
        }
    }

    /// Returns true if an input of `duration` seconds is accepted.
    pub fn allows_duration(&self, duration: f64) -> bool {
        match self.max_duration_secs() {
            Some(cap) => duration <= cap,
            None => true,
        }
    }

    /// Returns true if this tier needs the speech model loaded.
    pub fn uses_speech_model(&self) -> bool {
        matches!(self, Tier::Premium)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "free" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown tier: {0}")]
pub struct TierParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse() {
        assert_eq!("basic".parse::<Tier>().unwrap(), Tier::Basic);
        assert_eq!("free".parse::<Tier>().unwrap(), Tier::Basic);
        assert_eq!("premium".parse::<Tier>().unwrap(), Tier::Premium);
        assert_eq!("PREMIUM".parse::<Tier>().unwrap(), Tier::Premium);
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::Basic.to_string(), "basic");
        assert_eq!(Tier::Premium.to_string(), "premium");
    }

    #[test]
    fn test_duration_caps() {
        assert!(Tier::Basic.allows_duration(60.0));
        assert!(!Tier::Basic.allows_duration(60.1));
        assert!(Tier::Premium.allows_duration(7200.0));
        assert_eq!(Tier::Premium.max_duration_secs(), None);
    }

    #[test]
    fn test_speech_model_requirement() {
        assert!(!Tier::Basic.uses_speech_model());
        assert!(Tier::Premium.uses_speech_model());
    }
}
