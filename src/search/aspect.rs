//! The four scored aspects, plus per-aspect score and weight vectors.
//!
//! Weights are a closed struct, not an open map: an aspect name outside
//! the recognized four is a parse error, never a silently ignored key.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Activities,
    Scenery,
    Amenities,
    Location,
}

impl Aspect {
    pub const ALL: [Aspect; 4] = [
        Aspect::Activities,
        Aspect::Scenery,
        Aspect::Amenities,
        Aspect::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::Scenery => "scenery",
            Self::Amenities => "amenities",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "activities" => Ok(Self::Activities),
            "scenery" => Ok(Self::Scenery),
            "amenities" => Ok(Self::Amenities),
            "location" => Ok(Self::Location),
            other => Err(PlannerError::UnknownAspect(other.to_string())),
        }
    }
}

/// One f32 per aspect. Used for similarity scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AspectScores {
    pub activities: f32,
    pub scenery: f32,
    pub amenities: f32,
    pub location: f32,
}

impl AspectScores {
    pub fn get(&self, aspect: Aspect) -> f32 {
        match aspect {
            Aspect::Activities => self.activities,
            Aspect::Scenery => self.scenery,
            Aspect::Amenities => self.amenities,
            Aspect::Location => self.location,
        }
    }

    pub fn set(&mut self, aspect: Aspect, value: f32) {
        match aspect {
            Aspect::Activities => self.activities = value,
            Aspect::Scenery => self.scenery = value,
            Aspect::Amenities => self.amenities = value,
            Aspect::Location => self.location = value,
        }
    }
}

/// Caller-supplied aspect weights. Need not sum to 1; the engine
/// normalizes before combining. All-zero is legal and documented: every
/// combined score becomes 0 and results order by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AspectWeights {
    pub activities: f32,
    pub scenery: f32,
    pub amenities: f32,
    pub location: f32,
}

impl Default for AspectWeights {
    /// The stock profile: activities matter most, location least.
    fn default() -> Self {
        Self {
            activities: 0.4,
            scenery: 0.3,
            amenities: 0.2,
            location: 0.1,
        }
    }
}

impl AspectWeights {
    pub fn zero() -> Self {
        Self {
            activities: 0.0,
            scenery: 0.0,
            amenities: 0.0,
            location: 0.0,
        }
    }

    /// Weight 1 on a single aspect, 0 elsewhere.
    pub fn only(aspect: Aspect) -> Self {
        let mut weights = Self::zero();
        weights.set(aspect, 1.0);
        weights
    }

    pub fn get(&self, aspect: Aspect) -> f32 {
        match aspect {
            Aspect::Activities => self.activities,
            Aspect::Scenery => self.scenery,
            Aspect::Amenities => self.amenities,
            Aspect::Location => self.location,
        }
    }

    pub fn set(&mut self, aspect: Aspect, value: f32) {
        match aspect {
            Aspect::Activities => self.activities = value,
            Aspect::Scenery => self.scenery = value,
            Aspect::Amenities => self.amenities = value,
            Aspect::Location => self.location = value,
        }
    }

    pub fn sum(&self) -> f32 {
        self.activities + self.scenery + self.amenities + self.location
    }

    /// Scale so the weights sum to 1. An all-zero vector is returned
    /// unchanged rather than producing NaNs.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            return *self;
        }
        Self {
            activities: self.activities / total,
            scenery: self.scenery / total,
            amenities: self.amenities / total,
            location: self.location / total,
        }
    }

    /// Parse `aspect=value` pairs from the command line. No pairs means
    /// the default profile; any explicit pair means every unmentioned
    /// aspect weighs 0, so `-w activities=1` is a pure-activity search.
    pub fn parse_args(args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Self::default());
        }

        let mut weights = Self::zero();
        for arg in args {
            let (name, raw_value) = arg
                .split_once('=')
                .ok_or_else(|| PlannerError::MalformedWeight(arg.clone()))?;
            let aspect: Aspect = name.trim().parse()?;
            let value: f32 = raw_value
                .trim()
                .parse()
                .map_err(|_| PlannerError::MalformedWeight(arg.clone()))?;
            if value < 0.0 {
                return Err(PlannerError::NegativeWeight {
                    aspect: aspect.as_str(),
                    value,
                });
            }
            weights.set(aspect, value);
        }
        Ok(weights)
    }
}
