// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::validation::normalize_vehicle_number;

/// An opaque, already-verified user identity.
///
/// The ledger never authenticates; it only compares identities handed to it
/// by the request layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an actor identity from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value: String = value.into();
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidInput {
                field: "actor_id",
                message: String::from("actor identity cannot be empty"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vehicle identifier in normalized form: ASCII alphanumerics, uppercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VehicleNumber(String);

impl VehicleNumber {
    /// Normalizes and validates a raw vehicle identifier.
    ///
    /// `"ab-12 cd 3456"` becomes `"AB12CD3456"`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidVehicleNumber`] if the normalized form is
    /// shorter or longer than the accepted bounds.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        normalize_vehicle_number(raw).map(Self)
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VehicleNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VehicleNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: String = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

wire_enum! {
    /// Vehicle classes a slot can hold.
    pub enum VehicleClass {
        /// Cars and other four-wheelers.
        Car => "CAR",
        /// Two-wheelers.
        Bike => "BIKE",
        /// Trucks and heavy vehicles.
        Truck => "TRUCK",
    }
}

wire_enum! {
    /// How a payment was collected. Amounts are recorded, never processed.
    pub enum PaymentMethod {
        /// Cash.
        Cash => "CASH",
        /// Unified Payments Interface transfer.
        Upi => "UPI",
        /// Card terminal.
        Card => "CARD",
        /// Anything else.
        Other => "OTHER",
    }
}

wire_enum! {
    /// When a slot expects payment.
    pub enum PaymentTiming {
        /// Collected at check-in.
        Upfront => "UPFRONT",
        /// Collected at check-out.
        OnExit => "ON_EXIT",
    }
}
