// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing policies and validation of raw pricing configuration.
//!
//! Slot owners submit pricing as a loosely-shaped JSON object keyed by
//! vehicle class. [`PricingPolicy::from_config`] turns that into a typed
//! policy, rejecting anything the fee engine could not price.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capacity::CapacityMap;
use crate::error::DomainError;
use crate::money::Money;
use crate::types::VehicleClass;

wire_enum! {
    /// Pricing model of a slot.
    pub enum PricingModel {
        /// No charge.
        Free => "FREE",
        /// A flat amount per stay.
        Fixed => "FIXED",
        /// A base amount covering some hours, then a per-hour increment.
        Hourly => "HOURLY",
    }
}

/// Hourly rate for one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyRate {
    /// Charged for any stay up to `base_hours`.
    pub base: Money,
    /// Hours covered by `base`. Always positive.
    pub base_hours: Decimal,
    /// Charged per started hour beyond `base_hours`.
    pub incremental: Money,
}

/// A validated pricing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", content = "rates", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingPolicy {
    /// No charge. Carries no configuration.
    Free,
    /// Flat amount per class.
    Fixed(BTreeMap<VehicleClass, Money>),
    /// Hourly rates per class.
    Hourly(BTreeMap<VehicleClass, HourlyRate>),
}

impl PricingPolicy {
    /// Returns the model of this policy.
    #[must_use]
    pub const fn model(&self) -> PricingModel {
        match self {
            Self::Free => PricingModel::Free,
            Self::Fixed(_) => PricingModel::Fixed,
            Self::Hourly(_) => PricingModel::Hourly,
        }
    }

    /// Validates raw configuration for `model` against the slot's capacity.
    ///
    /// FREE ignores whatever configuration is supplied. FIXED expects a
    /// non-negative number per class. HOURLY expects
    /// `{ "base": >= 0, "base_hours": > 0, "incremental": >= 0 }` per class,
    /// with `base_hours` defaulting to 1.
    ///
    /// # Errors
    ///
    /// - [`DomainError::MissingPricingConfig`] when a paid model has no
    ///   configuration
    /// - [`DomainError::InvalidPricingConfig`] when an entry is malformed or
    ///   out of range
    /// - [`DomainError::IncompletePricingConfig`] when a capacity-bearing
    ///   class has no entry
    pub fn from_config(
        model: PricingModel,
        config: Option<&Value>,
        capacity: &CapacityMap,
    ) -> Result<Self, DomainError> {
        let policy: Self = match model {
            PricingModel::Free => return Ok(Self::Free),
            PricingModel::Fixed => {
                let entries: &Map<String, Value> = config_object(model, config)?;
                let mut rates: BTreeMap<VehicleClass, Money> = BTreeMap::new();
                for (key, value) in entries {
                    let class: VehicleClass = parse_class(key)?;
                    let amount: Decimal = non_negative(value, &format!("FIXED {class}"))?;
                    rates.insert(class, Money::new(amount));
                }
                Self::Fixed(rates)
            }
            PricingModel::Hourly => {
                let entries: &Map<String, Value> = config_object(model, config)?;
                let mut rates: BTreeMap<VehicleClass, HourlyRate> = BTreeMap::new();
                for (key, value) in entries {
                    let class: VehicleClass = parse_class(key)?;
                    rates.insert(class, parse_hourly_rate(class, value)?);
                }
                Self::Hourly(rates)
            }
        };

        let missing: Vec<VehicleClass> = policy.missing_classes(capacity);
        if missing.is_empty() {
            Ok(policy)
        } else {
            Err(DomainError::IncompletePricingConfig { missing })
        }
    }

    /// Capacity-bearing classes this policy does not price.
    #[must_use]
    pub fn missing_classes(&self, capacity: &CapacityMap) -> Vec<VehicleClass> {
        capacity
            .classes()
            .filter(|class| match self {
                Self::Free => false,
                Self::Fixed(rates) => !rates.contains_key(class),
                Self::Hourly(rates) => !rates.contains_key(class),
            })
            .collect()
    }
}

fn config_object(
    model: PricingModel,
    config: Option<&Value>,
) -> Result<&Map<String, Value>, DomainError> {
    match config {
        None | Some(Value::Null) => Err(DomainError::MissingPricingConfig { model }),
        Some(Value::Object(entries)) if entries.is_empty() => {
            Err(DomainError::MissingPricingConfig { model })
        }
        Some(Value::Object(entries)) => Ok(entries),
        Some(_) => Err(DomainError::InvalidPricingConfig(format!(
            "{model} configuration must be an object keyed by vehicle class"
        ))),
    }
}

fn parse_class(key: &str) -> Result<VehicleClass, DomainError> {
    VehicleClass::from_str(key)
        .map_err(|_| DomainError::InvalidPricingConfig(format!("unknown vehicle class '{key}'")))
}

fn parse_hourly_rate(class: VehicleClass, value: &Value) -> Result<HourlyRate, DomainError> {
    let Value::Object(fields) = value else {
        return Err(DomainError::InvalidPricingConfig(format!(
            "HOURLY {class} must be an object with base and incremental"
        )));
    };

    let (Some(base), Some(incremental)) = (fields.get("base"), fields.get("incremental")) else {
        return Err(DomainError::InvalidPricingConfig(format!(
            "HOURLY {class} must have base and incremental"
        )));
    };

    let base: Decimal = non_negative(base, &format!("HOURLY {class} base"))?;
    let incremental: Decimal = non_negative(incremental, &format!("HOURLY {class} incremental"))?;
    let base_hours: Decimal = match fields.get("base_hours") {
        None | Some(Value::Null) => Decimal::ONE,
        Some(value) => {
            let hours: Decimal = decimal(value, &format!("HOURLY {class} base_hours"))?;
            if hours <= Decimal::ZERO {
                return Err(DomainError::InvalidPricingConfig(format!(
                    "HOURLY {class} base_hours must be greater than zero"
                )));
            }
            hours
        }
    };

    Ok(HourlyRate {
        base: Money::new(base),
        base_hours,
        incremental: Money::new(incremental),
    })
}

fn non_negative(value: &Value, what: &str) -> Result<Decimal, DomainError> {
    let amount: Decimal = decimal(value, what)?;
    if amount < Decimal::ZERO {
        return Err(DomainError::InvalidPricingConfig(format!(
            "{what} must not be negative"
        )));
    }
    if !Money::new(amount).is_storable() {
        return Err(DomainError::InvalidPricingConfig(format!(
            "{what} exceeds the largest storable amount"
        )));
    }
    Ok(amount)
}

fn decimal(value: &Value, what: &str) -> Result<Decimal, DomainError> {
    let Value::Number(number) = value else {
        return Err(DomainError::InvalidPricingConfig(format!(
            "{what} must be a number"
        )));
    };
    let text: String = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DomainError::InvalidPricingConfig(format!("{what} is not a valid amount")))
}
