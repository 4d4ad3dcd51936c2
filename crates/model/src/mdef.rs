//! Halo mass definitions
//!
//! A mass definition names the overdensity used to define a halo boundary.
//! It selects which halo table columns the model reads: mass from
//! `halo_m<mdef>` and boundary radius from `halo_r<mdef>`.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Halo boundary convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MassDefinition {
    /// Virial overdensity (`vir`)
    #[default]
    Virial,
    /// Overdensity relative to the critical density (`NNNc`)
    Critical(u32),
    /// Overdensity relative to the mean matter density (`NNNm`)
    Mean(u32),
}

impl MassDefinition {
    /// Halo table column holding halo mass
    pub fn mass_key(&self) -> String {
        format!("halo_m{}", self)
    }

    /// Halo table column holding the boundary radius
    pub fn radius_key(&self) -> String {
        format!("halo_r{}", self)
    }
}

impl fmt::Display for MassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassDefinition::Virial => f.write_str("vir"),
            MassDefinition::Critical(n) => write!(f, "{}c", n),
            MassDefinition::Mean(n) => write!(f, "{}m", n),
        }
    }
}

impl FromStr for MassDefinition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "vir" {
            return Ok(MassDefinition::Virial);
        }
        let invalid = || ModelError::InvalidMassDefinition(s.to_string());
        if s.len() < 2 || !s.is_ascii() {
            return Err(invalid());
        }
        let (digits, suffix) = s.split_at(s.len() - 1);
        let overdensity: u32 = digits.parse().map_err(|_| invalid())?;
        if overdensity == 0 {
            return Err(invalid());
        }
        match suffix {
            "c" => Ok(MassDefinition::Critical(overdensity)),
            "m" => Ok(MassDefinition::Mean(overdensity)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for MassDefinition {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MassDefinition> for String {
    fn from(mdef: MassDefinition) -> Self {
        mdef.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_forms() {
        assert_eq!("vir".parse::<MassDefinition>().unwrap(), MassDefinition::Virial);
        assert_eq!(
            "200c".parse::<MassDefinition>().unwrap(),
            MassDefinition::Critical(200)
        );
        assert_eq!("500m".parse::<MassDefinition>().unwrap(), MassDefinition::Mean(500));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "c", "200x", "abc", "0c", "-5m", "vira"] {
            assert!(bad.parse::<MassDefinition>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_column_keys() {
        let mdef = MassDefinition::Critical(200);
        assert_eq!(mdef.mass_key(), "halo_m200c");
        assert_eq!(mdef.radius_key(), "halo_r200c");
        assert_eq!(MassDefinition::Virial.mass_key(), "halo_mvir");
    }
}
