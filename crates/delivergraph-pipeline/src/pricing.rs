//! Pricing formulas. Every function is pure in its inputs and the rate tables.

use delivergraph_config::{LocationType, MaterialType, PricingConfig, Urgency};

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// Material base price plus the per-kilometre distance charge.
pub fn base_price(pricing: &PricingConfig, material: MaterialType, distance_km: f64) -> f64 {
  pricing.material_base_price(material) + distance_km * pricing.distance_rate_per_km
}

pub fn urgency_multiplier(pricing: &PricingConfig, urgency: Urgency) -> f64 {
  pricing.urgency_multiplier(urgency)
}

/// Charge for every kilogram above the threshold, zero at or below it.
pub fn weight_surcharge(pricing: &PricingConfig, weight_kg: f64) -> f64 {
  let excess = weight_kg - pricing.weight.threshold_kg;
  if excess > 0.0 {
    excess * pricing.weight.surcharge_per_kg
  } else {
    0.0
  }
}

pub fn location_adjustment(pricing: &PricingConfig, location: LocationType) -> f64 {
  pricing.location_adjustment(location)
}

/// `round2(base * multiplier + surcharge + location)`.
pub fn total_price(base: f64, multiplier: f64, surcharge: f64, location: f64) -> f64 {
  round2(base * multiplier + surcharge + location)
}
