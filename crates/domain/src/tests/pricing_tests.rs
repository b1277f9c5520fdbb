// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use serde_json::json;

use crate::{CapacityMap, DomainError, Money, PricingModel, PricingPolicy, VehicleClass};

fn car_and_bike() -> CapacityMap {
    CapacityMap::from_entries([(VehicleClass::Car, 10), (VehicleClass::Bike, 20)])
}

#[test]
fn test_free_ignores_supplied_config() {
    let policy: PricingPolicy = PricingPolicy::from_config(
        PricingModel::Free,
        Some(&json!({"car": 99})),
        &car_and_bike(),
    )
    .unwrap();
    assert_eq!(policy, PricingPolicy::Free);
}

#[test]
fn test_fixed_requires_config() {
    let result = PricingPolicy::from_config(PricingModel::Fixed, None, &car_and_bike());
    assert!(matches!(
        result,
        Err(DomainError::MissingPricingConfig {
            model: PricingModel::Fixed
        })
    ));

    let result =
        PricingPolicy::from_config(PricingModel::Fixed, Some(&json!({})), &car_and_bike());
    assert_eq!(result.unwrap_err().code(), "MISSING_PRICING_CONFIG");
}

#[test]
fn test_fixed_missing_class_is_incomplete() {
    let result = PricingPolicy::from_config(
        PricingModel::Fixed,
        Some(&json!({"car": 50})),
        &car_and_bike(),
    );
    match result.unwrap_err() {
        DomainError::IncompletePricingConfig { missing } => {
            assert_eq!(missing, vec![VehicleClass::Bike]);
        }
        other => panic!("Expected IncompletePricingConfig, got {other:?}"),
    }
}

#[test]
fn test_fixed_negative_amount_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Fixed,
        Some(&json!({"car": -5, "bike": 10})),
        &car_and_bike(),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_fixed_non_numeric_amount_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Fixed,
        Some(&json!({"car": "fifty", "bike": 10})),
        &car_and_bike(),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_unknown_vehicle_class_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Fixed,
        Some(&json!({"car": 5, "bike": 10, "van": 3})),
        &car_and_bike(),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_fixed_accepts_any_key_case() {
    let policy: PricingPolicy = PricingPolicy::from_config(
        PricingModel::Fixed,
        Some(&json!({"CAR": 50, "Bike": 12.5})),
        &car_and_bike(),
    )
    .unwrap();
    match policy {
        PricingPolicy::Fixed(rates) => {
            assert_eq!(rates[&VehicleClass::Car], Money::from_cents(5000));
            assert_eq!(rates[&VehicleClass::Bike], Money::from_cents(1250));
        }
        other => panic!("Expected Fixed, got {other:?}"),
    }
}

#[test]
fn test_hourly_defaults_base_hours_to_one() {
    let policy: PricingPolicy = PricingPolicy::from_config(
        PricingModel::Hourly,
        Some(&json!({
            "car": {"base": 30, "incremental": 10},
            "bike": {"base": 10, "base_hours": 2, "incremental": 5}
        })),
        &car_and_bike(),
    )
    .unwrap();
    match policy {
        PricingPolicy::Hourly(rates) => {
            assert_eq!(rates[&VehicleClass::Car].base_hours, Decimal::ONE);
            assert_eq!(rates[&VehicleClass::Bike].base_hours, Decimal::from(2));
        }
        other => panic!("Expected Hourly, got {other:?}"),
    }
}

#[test]
fn test_hourly_zero_base_hours_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Hourly,
        Some(&json!({
            "car": {"base": 30, "base_hours": 0, "incremental": 10},
            "bike": {"base": 10, "incremental": 5}
        })),
        &car_and_bike(),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_hourly_missing_incremental_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Hourly,
        Some(&json!({"car": {"base": 30}, "bike": {"base": 10, "incremental": 5}})),
        &car_and_bike(),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

#[test]
fn test_zero_capacity_classes_need_no_pricing() {
    let capacity: CapacityMap =
        CapacityMap::from_entries([(VehicleClass::Car, 4), (VehicleClass::Truck, 0)]);
    let policy: PricingPolicy =
        PricingPolicy::from_config(PricingModel::Fixed, Some(&json!({"car": 20})), &capacity)
            .unwrap();
    assert_eq!(policy.model(), PricingModel::Fixed);
}

#[test]
fn test_policy_storage_form_survives_serde() {
    let policy: PricingPolicy = PricingPolicy::from_config(
        PricingModel::Hourly,
        Some(&json!({
            "car": {"base": 30, "base_hours": 2, "incremental": 10},
            "bike": {"base": 10, "incremental": 5}
        })),
        &car_and_bike(),
    )
    .unwrap();
    let stored: String = serde_json::to_string(&policy).unwrap();
    let loaded: PricingPolicy = serde_json::from_str(&stored).unwrap();
    assert_eq!(loaded, policy);

    let free: String = serde_json::to_string(&PricingPolicy::Free).unwrap();
    assert_eq!(
        serde_json::from_str::<PricingPolicy>(&free).unwrap(),
        PricingPolicy::Free
    );
}

#[test]
fn test_hourly_incremental_beyond_storable_range_is_invalid() {
    let result = PricingPolicy::from_config(
        PricingModel::Hourly,
        Some(&json!({"car": {"base": 10, "incremental": 1e27}})),
        &CapacityMap::from_entries([(VehicleClass::Car, 10)]),
    );
    assert_eq!(result.unwrap_err().code(), "INVALID_PRICING_CONFIG");
}

