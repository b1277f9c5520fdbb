// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

#[macro_use]
mod macros;

mod access;
mod capacity;
mod entities;
mod error;
mod fee;
mod lifecycle;
mod money;
mod pricing;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use access::{AccessLevel, EffectiveRole, OrgRole, SlotRole, StaffRole};
pub use capacity::{CapacityMap, ClassAvailability};
pub use entities::{
    Due, DueDraft, DuePayment, GeoPoint, OrgMembership, Organization, Session, SessionClosure,
    SessionDraft, Slot, SlotDraft, StaffAssignment, Verification,
};
pub use error::DomainError;
pub use fee::{compute_fee, elapsed_hours};
pub use lifecycle::{DueStatus, OrganizationStatus, PaymentStatus, SessionStatus, SlotStatus};
pub use money::Money;
pub use pricing::{HourlyRate, PricingModel, PricingPolicy};
pub use types::{ActorId, PaymentMethod, PaymentTiming, VehicleClass, VehicleNumber};
pub use validation::{
    MAX_VEHICLE_NUMBER_LEN, MIN_VEHICLE_NUMBER_LEN, normalize_vehicle_number,
    validate_collected_amount, validate_payment_amount, validate_rejection_reason,
    validate_slot_name,
};
