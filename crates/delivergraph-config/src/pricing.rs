use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::{LocationType, MaterialType, Urgency};

const FALLBACK_MATERIAL_PRICE: f64 = 100.0;
const FALLBACK_URGENCY_MULTIPLIER: f64 = 1.0;
const FALLBACK_LOCATION_ADJUSTMENT: f64 = 0.0;

/// Rate tables used by the pricing steps.
///
/// Lookups for an option missing from a table fall back to the standard
/// rate (100.0 base, 1.0x urgency, no location charge), so a partial file
/// still prices every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
  pub material_base_prices: BTreeMap<MaterialType, f64>,
  pub urgency_multipliers: BTreeMap<Urgency, f64>,
  pub weight: WeightSurcharge,
  pub location_adjustments: BTreeMap<LocationType, f64>,
  pub distance_rate_per_km: f64,
}

/// Surcharge applied to every kilogram above `threshold_kg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSurcharge {
  pub threshold_kg: f64,
  pub surcharge_per_kg: f64,
}

impl Default for WeightSurcharge {
  fn default() -> Self {
    Self {
      threshold_kg: 10.0,
      surcharge_per_kg: 5.0,
    }
  }
}

impl Default for PricingConfig {
  fn default() -> Self {
    Self {
      material_base_prices: BTreeMap::from([
        (MaterialType::Standard, 100.0),
        (MaterialType::Fragile, 150.0),
        (MaterialType::Perishable, 180.0),
        (MaterialType::Heavy, 200.0),
      ]),
      urgency_multipliers: BTreeMap::from([
        (Urgency::Standard, 1.0),
        (Urgency::Express, 1.5),
        (Urgency::SameDay, 2.0),
      ]),
      weight: WeightSurcharge::default(),
      location_adjustments: BTreeMap::from([
        (LocationType::Urban, 0.0),
        (LocationType::Suburban, 25.0),
        (LocationType::Rural, 50.0),
      ]),
      distance_rate_per_km: 4.0,
    }
  }
}

impl PricingConfig {
  pub fn material_base_price(&self, material: MaterialType) -> f64 {
    self
      .material_base_prices
      .get(&material)
      .copied()
      .unwrap_or(FALLBACK_MATERIAL_PRICE)
  }

  pub fn urgency_multiplier(&self, urgency: Urgency) -> f64 {
    self
      .urgency_multipliers
      .get(&urgency)
      .copied()
      .unwrap_or(FALLBACK_URGENCY_MULTIPLIER)
  }

  pub fn location_adjustment(&self, location: LocationType) -> f64 {
    self
      .location_adjustments
      .get(&location)
      .copied()
      .unwrap_or(FALLBACK_LOCATION_ADJUSTMENT)
  }

  /// Reject tables that would produce negative or non-finite prices.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let amounts = self
      .material_base_prices
      .values()
      .chain(self.location_adjustments.values())
      .chain([
        &self.distance_rate_per_km,
        &self.weight.threshold_kg,
        &self.weight.surcharge_per_kg,
      ]);
    for amount in amounts {
      if !amount.is_finite() || *amount < 0.0 {
        return Err(ConfigError::Invalid(format!(
          "pricing amounts must be finite and non-negative, got {}",
          amount
        )));
      }
    }

    for (urgency, multiplier) in &self.urgency_multipliers {
      if !multiplier.is_finite() || *multiplier <= 0.0 {
        return Err(ConfigError::Invalid(format!(
          "urgency multiplier for '{}' must be positive, got {}",
          urgency, multiplier
        )));
      }
    }

    Ok(())
  }
}
