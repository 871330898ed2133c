use serde::{Deserialize, Serialize};
use std::fmt;

pub type Tick = f64; // musical time, real-valued so onsets keep sub-tick precision
pub type Millis = f64;

pub const DEFAULT_QUARTER_NOTE_TICKS: u32 = 960;
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum TempoError {
    #[error("tempo must be positive, got {0}")]
    NonPositive(f64),
    #[error("tempo is not a finite number")]
    NotFinite,
}

/// Beats per minute, always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Bpm(f64);

impl Bpm {
    pub fn new(value: f64) -> Result<Self, TempoError> {
        if !value.is_finite() {
            return Err(TempoError::NotFinite);
        }
        if value <= 0.0 {
            return Err(TempoError::NonPositive(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn ms_per_beat(self) -> Millis {
        60_000.0 / self.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(DEFAULT_BPM)
    }
}

impl TryFrom<f64> for Bpm {
    type Error = TempoError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Bpm::new(value)
    }
}

impl From<Bpm> for f64 {
    fn from(value: Bpm) -> Self {
        value.0
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid time signature {numerator}/{denominator}")]
pub struct TimeSignatureError {
    pub numerator: u32,
    pub denominator: u32,
}

/// Meter with a non-zero numerator and denominator, also when deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSignature")]
pub struct TimeSignature {
    numerator: u32,
    denominator: u32,
}

#[derive(Deserialize)]
struct RawTimeSignature {
    numerator: u32,
    denominator: u32,
}

impl TryFrom<RawTimeSignature> for TimeSignature {
    type Error = TimeSignatureError;

    fn try_from(raw: RawTimeSignature) -> Result<Self, Self::Error> {
        TimeSignature::new(raw.numerator, raw.denominator)
    }
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, TimeSignatureError> {
        if numerator == 0 || denominator == 0 {
            return Err(TimeSignatureError {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(self) -> u32 {
        self.numerator
    }

    pub fn denominator(self) -> u32 {
        self.denominator
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
