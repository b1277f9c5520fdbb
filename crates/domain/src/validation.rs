// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::money::Money;

/// Shortest accepted normalized vehicle identifier.
pub const MIN_VEHICLE_NUMBER_LEN: usize = 3;
/// Longest accepted normalized vehicle identifier.
pub const MAX_VEHICLE_NUMBER_LEN: usize = 20;

const MAX_SLOT_NAME_LEN: usize = 200;

/// Strips everything except ASCII letters and digits and uppercases the rest.
///
/// # Errors
///
/// Returns [`DomainError::InvalidVehicleNumber`] when the normalized length is
/// outside `MIN_VEHICLE_NUMBER_LEN..=MAX_VEHICLE_NUMBER_LEN`.
pub fn normalize_vehicle_number(raw: &str) -> Result<String, DomainError> {
    let normalized: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if (MIN_VEHICLE_NUMBER_LEN..=MAX_VEHICLE_NUMBER_LEN).contains(&normalized.len()) {
        Ok(normalized)
    } else {
        Err(DomainError::InvalidVehicleNumber(raw.to_string()))
    }
}

/// Validates the amount collected at check-out. Zero is allowed.
///
/// # Errors
///
/// Returns an error if the amount is negative or too large to store.
pub fn validate_collected_amount(amount: Money) -> Result<(), DomainError> {
    if amount.is_negative() {
        return Err(DomainError::InvalidInput {
            field: "collected_amount",
            message: format!("must not be negative, got {amount}"),
        });
    }
    ensure_storable(amount, "collected_amount")
}

/// Validates a due payment. Must be strictly positive.
///
/// # Errors
///
/// Returns an error if the amount is zero, negative, or too large to store.
pub fn validate_payment_amount(amount: Money) -> Result<(), DomainError> {
    if !amount.is_positive() {
        return Err(DomainError::InvalidInput {
            field: "paid_amount",
            message: format!("must be greater than zero, got {amount}"),
        });
    }
    ensure_storable(amount, "paid_amount")
}

fn ensure_storable(amount: Money, field: &'static str) -> Result<(), DomainError> {
    if amount.is_storable() {
        Ok(())
    } else {
        Err(DomainError::InvalidInput {
            field,
            message: format!("{amount} exceeds the largest storable amount"),
        })
    }
}

/// Rejections must say why.
///
/// # Errors
///
/// Returns an error if the reason is absent or blank.
pub fn validate_rejection_reason(reason: Option<&str>) -> Result<String, DomainError> {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => Ok(reason.to_string()),
        _ => Err(DomainError::InvalidInput {
            field: "rejection_reason",
            message: String::from("a reason is required when rejecting a slot"),
        }),
    }
}

/// Validates a slot's display name.
///
/// # Errors
///
/// Returns an error if the name is blank or too long.
pub fn validate_slot_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput {
            field: "name",
            message: String::from("slot name cannot be empty"),
        });
    }
    if trimmed.chars().count() > MAX_SLOT_NAME_LEN {
        return Err(DomainError::InvalidInput {
            field: "name",
            message: format!("slot name cannot exceed {MAX_SLOT_NAME_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}
