//! Constrained input domains.
//!
//! Each option type is a closed enum whose `ALL` list doubles as the set of
//! valid values for form population. The `validate_*` functions are the
//! string-level predicates used by the input step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

macro_rules! option_enum {
  (
    $(#[$meta:meta])*
    $name:ident, $kind:literal {
      $($variant:ident => $value:literal),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum $name {
      $($variant),+
    }

    impl $name {
      /// Every valid value, in display order.
      pub const ALL: &'static [$name] = &[$($name::$variant),+];

      pub fn as_str(&self) -> &'static str {
        match self {
          $($name::$variant => $value),+
        }
      }

      /// Valid values joined for error messages, e.g. `"a, b, c"`.
      pub fn valid_list() -> String {
        Self::ALL
          .iter()
          .map(|v| v.as_str())
          .collect::<Vec<_>>()
          .join(", ")
      }
    }

    impl FromStr for $name {
      type Err = ConfigError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($value => Ok($name::$variant),)+
          other => Err(ConfigError::UnknownOption {
            kind: $kind,
            value: other.to_string(),
            expected: Self::valid_list(),
          }),
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }
  };
}

option_enum! {
  /// Kind of goods being delivered.
  MaterialType, "material_type" {
    Standard => "standard",
    Fragile => "fragile",
    Perishable => "perishable",
    Heavy => "heavy",
  }
}

option_enum! {
  /// How fast the delivery must arrive.
  Urgency, "urgency" {
    Standard => "standard",
    Express => "express",
    SameDay => "same_day",
  }
}

option_enum! {
  /// Kind of area the destination is in.
  LocationType, "location_type" {
    Urban => "urban",
    Suburban => "suburban",
    Rural => "rural",
  }
}

pub fn validate_material_type(value: &str) -> bool {
  value.parse::<MaterialType>().is_ok()
}

pub fn validate_urgency(value: &str) -> bool {
  value.parse::<Urgency>().is_ok()
}

pub fn validate_location_type(value: &str) -> bool {
  value.parse::<LocationType>().is_ok()
}

/// All valid option values, grouped for UI population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidOptions {
  pub material_types: Vec<&'static str>,
  pub urgencies: Vec<&'static str>,
  pub location_types: Vec<&'static str>,
}

pub fn valid_options() -> ValidOptions {
  ValidOptions {
    material_types: MaterialType::ALL.iter().map(|v| v.as_str()).collect(),
    urgencies: Urgency::ALL.iter().map(|v| v.as_str()).collect(),
    location_types: LocationType::ALL.iter().map(|v| v.as_str()).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_known_values() {
    assert_eq!("fragile".parse::<MaterialType>().unwrap(), MaterialType::Fragile);
    assert_eq!("same_day".parse::<Urgency>().unwrap(), Urgency::SameDay);
    assert_eq!("rural".parse::<LocationType>().unwrap(), LocationType::Rural);
  }

  #[test]
  fn test_parse_unknown_value() {
    let err = "unknown".parse::<MaterialType>().unwrap_err();
    assert_eq!(
      err.to_string(),
      "unknown material_type 'unknown', expected one of: standard, fragile, perishable, heavy"
    );
  }

  #[test]
  fn test_validators_are_case_sensitive() {
    assert!(validate_material_type("heavy"));
    assert!(!validate_material_type("Heavy"));
    assert!(validate_urgency("express"));
    assert!(!validate_urgency("overnight"));
    assert!(validate_location_type("suburban"));
    assert!(!validate_location_type(""));
  }

  #[test]
  fn test_valid_options_order() {
    let options = valid_options();
    assert_eq!(
      options.material_types,
      vec!["standard", "fragile", "perishable", "heavy"]
    );
    assert_eq!(options.urgencies, vec!["standard", "express", "same_day"]);
    assert_eq!(options.location_types, vec!["urban", "suburban", "rural"]);
  }

  #[test]
  fn test_serde_uses_snake_case() {
    let json = serde_json::to_string(&Urgency::SameDay).unwrap();
    assert_eq!(json, "\"same_day\"");
  }
}
