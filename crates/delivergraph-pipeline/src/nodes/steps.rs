//! Synchronous pricing steps. Each is a plain `(state) -> state` function
//! lifted into the graph with `node_fn`.

use delivergraph_config::{LocationType, MaterialType, PricingConfig, Urgency};

use crate::pricing;
use crate::state::DeliveryState;

/// Re-check the distance before any money is computed.
pub fn check_distance(mut state: DeliveryState) -> DeliveryState {
  match state.distance {
    Some(distance) if distance > 0.0 => {
      state.log(format!("Distance: {} km (manual input)", distance));
    }
    _ => state.fail("Invalid distance provided"),
  }
  state
}

/// Unparseable options fall back to the standard rates, which is how
/// [`PricingConfig`] treats a value missing from its tables.
fn parse<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
  value.as_deref().and_then(|v| v.parse().ok())
}

pub fn material(pricing: &PricingConfig, mut state: DeliveryState) -> DeliveryState {
  let distance = state.distance.unwrap_or(0.0);
  let material = parse::<MaterialType>(&state.material_type).unwrap_or(MaterialType::Standard);
  let base = pricing.material_base_price(material);
  let base_price = pricing::base_price(pricing, material, distance);

  state.base_price = Some(base_price);
  state.log(format!(
    "Material pricing: {} (base: {:.2} + distance: {} km x {:.2}/km) = {:.2}",
    material.as_str().to_uppercase(),
    base,
    distance,
    pricing.distance_rate_per_km,
    base_price
  ));
  state
}

pub fn urgency(pricing: &PricingConfig, mut state: DeliveryState) -> DeliveryState {
  let urgency = parse::<Urgency>(&state.urgency).unwrap_or(Urgency::Standard);
  let multiplier = pricing::urgency_multiplier(pricing, urgency);

  state.urgency_multiplier = Some(multiplier);
  state.log(format!(
    "Urgency: {} (multiplier: {}x)",
    urgency.as_str().to_uppercase(),
    multiplier
  ));
  state
}

pub fn weight(pricing: &PricingConfig, mut state: DeliveryState) -> DeliveryState {
  let weight = state.weight.unwrap_or(0.0);
  let surcharge = pricing::weight_surcharge(pricing, weight);

  state.weight_surcharge = Some(surcharge);
  if surcharge > 0.0 {
    state.log(format!(
      "Weight: {} kg (excess: {} kg x {:.2}/kg) = +{:.2}",
      weight,
      weight - pricing.weight.threshold_kg,
      pricing.weight.surcharge_per_kg,
      surcharge
    ));
  } else {
    state.log(format!("Weight: {} kg (within threshold)", weight));
  }
  state
}

pub fn location(pricing: &PricingConfig, mut state: DeliveryState) -> DeliveryState {
  let location = parse::<LocationType>(&state.location_type).unwrap_or(LocationType::Urban);
  let adjustment = pricing::location_adjustment(pricing, location);

  state.location_adjustment = Some(adjustment);
  let name = location.as_str().to_uppercase();
  if adjustment > 0.0 {
    state.log(format!("Location: {} (+{:.2})", name, adjustment));
  } else {
    state.log(format!("Location: {}", name));
  }
  state
}
