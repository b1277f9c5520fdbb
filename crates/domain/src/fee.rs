// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::error::DomainError;
use crate::money::Money;
use crate::pricing::{HourlyRate, PricingPolicy};
use crate::types::VehicleClass;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Computes the fee for a stay.
///
/// - FREE is always zero.
/// - FIXED charges the class's flat amount regardless of duration.
/// - HOURLY charges `base` up to `base_hours`, then `incremental` for every
///   started hour beyond it.
///
/// A class the policy does not price yields zero.
///
/// # Errors
///
/// Returns [`DomainError::InvalidPricingConfig`] if an hourly fee grows past
/// the largest storable amount.
pub fn compute_fee(
    policy: &PricingPolicy,
    vehicle_class: VehicleClass,
    check_in: OffsetDateTime,
    check_out: OffsetDateTime,
) -> Result<Money, DomainError> {
    match policy {
        PricingPolicy::Free => Ok(Money::ZERO),
        PricingPolicy::Fixed(rates) => {
            Ok(rates.get(&vehicle_class).copied().unwrap_or(Money::ZERO))
        }
        PricingPolicy::Hourly(rates) => match rates.get(&vehicle_class) {
            Some(rate) => hourly_fee(rate, vehicle_class, elapsed_hours(check_in, check_out)),
            None => Ok(Money::ZERO),
        },
    }
}

/// Fractional hours between two instants, at millisecond resolution.
#[must_use]
pub fn elapsed_hours(check_in: OffsetDateTime, check_out: OffsetDateTime) -> Decimal {
    let millis: i128 = (check_out - check_in).whole_milliseconds();
    Decimal::try_from_i128_with_scale(millis, 0).unwrap_or_default()
        / Decimal::from(MILLIS_PER_HOUR)
}

fn hourly_fee(
    rate: &HourlyRate,
    vehicle_class: VehicleClass,
    hours: Decimal,
) -> Result<Money, DomainError> {
    if hours <= rate.base_hours {
        return Ok(rate.base);
    }
    let extra_hours: Decimal = (hours - rate.base_hours).ceil();
    extra_hours
        .checked_mul(rate.incremental.amount())
        .map(Money::new)
        .and_then(|extra| rate.base.checked_add(extra))
        .ok_or_else(|| {
            DomainError::InvalidPricingConfig(format!(
                "HOURLY {vehicle_class} fee after {extra_hours} extra hour(s) exceeds the largest storable amount"
            ))
        })
}
