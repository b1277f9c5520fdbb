// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::VehicleClass;

/// Maximum vehicles per class. Only capacity-bearing classes are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityMap(BTreeMap<VehicleClass, u32>);

impl CapacityMap {
    /// Builds a capacity map, dropping classes with zero capacity.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (VehicleClass, u32)>,
    {
        Self(
            entries
                .into_iter()
                .filter(|(_, capacity)| *capacity > 0)
                .collect(),
        )
    }

    /// Capacity for a class, zero when the slot does not take it.
    #[must_use]
    pub fn get(&self, class: VehicleClass) -> u32 {
        self.0.get(&class).copied().unwrap_or(0)
    }

    /// Capacity-bearing classes in stable order.
    pub fn classes(&self) -> impl Iterator<Item = VehicleClass> + '_ {
        self.0.keys().copied()
    }

    /// Iterates over `(class, capacity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleClass, u32)> + '_ {
        self.0.iter().map(|(class, capacity)| (*class, *capacity))
    }

    /// Returns whether no class has capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total spaces across all classes.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|capacity| u64::from(*capacity)).sum()
    }
}

/// Point-in-time availability of one vehicle class at a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassAvailability {
    /// The vehicle class.
    pub vehicle_class: VehicleClass,
    /// Configured maximum.
    pub capacity: u32,
    /// Vehicles currently counted in.
    pub occupied: u32,
    /// Remaining spaces.
    pub available: u32,
    /// Occupied share of capacity, in percent at two decimals.
    pub occupancy_percentage: Decimal,
}

impl ClassAvailability {
    /// Computes availability from the stored counters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::LedgerInvariant`] if the counter exceeds capacity.
    pub fn from_counters(
        vehicle_class: VehicleClass,
        capacity: u32,
        occupied: u32,
    ) -> Result<Self, DomainError> {
        let available: u32 = capacity.checked_sub(occupied).ok_or_else(|| {
            DomainError::LedgerInvariant(format!(
                "{vehicle_class} occupancy {occupied} exceeds capacity {capacity}"
            ))
        })?;

        let occupancy_percentage: Decimal = if capacity == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(occupied) * Decimal::ONE_HUNDRED / Decimal::from(capacity))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Ok(Self {
            vehicle_class,
            capacity,
            occupied,
            available,
            occupancy_percentage,
        })
    }
}
