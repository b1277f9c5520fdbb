// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod backend_validation_tests;
mod staff_and_audit_tests;

use parkledger::SlotStatusChange;
use parkledger_domain::{
    ActorId, CapacityMap, DueDraft, DueStatus, GeoPoint, Money, PaymentTiming, PricingPolicy,
    SessionDraft, SlotDraft, SlotStatus, VehicleClass, VehicleNumber, Verification,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{LedgerStore, Persistence, PersistenceError};

pub fn create_test_time() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

pub fn create_test_owner() -> ActorId {
    ActorId::new("owner-1").unwrap()
}

pub fn create_test_vehicle(raw: &str) -> VehicleNumber {
    VehicleNumber::parse(raw).unwrap()
}

/// A FIXED-priced slot with two cars and one bike.
pub fn create_test_slot_draft() -> SlotDraft {
    let mut rates: BTreeMap<VehicleClass, Money> = BTreeMap::new();
    rates.insert(VehicleClass::Car, Money::from_cents(5_000));
    rates.insert(VehicleClass::Bike, Money::from_cents(2_000));

    SlotDraft {
        owner: create_test_owner(),
        organization_id: None,
        name: String::from("Market Street Lot"),
        description: Some(String::from("Behind the market")),
        address: String::from("12 Market Street"),
        geo: GeoPoint::new(12.97, 77.59).unwrap(),
        capacity: CapacityMap::from_entries([(VehicleClass::Car, 2), (VehicleClass::Bike, 1)]),
        pricing: PricingPolicy::Fixed(rates),
        payment_timing: PaymentTiming::OnExit,
        created_at: create_test_time(),
    }
}

pub fn create_test_session_draft(slot_id: i64, vehicle: &str, class: VehicleClass) -> SessionDraft {
    SessionDraft {
        slot_id,
        vehicle: create_test_vehicle(vehicle),
        vehicle_class: class,
        vehicle_owner: None,
        checked_in_by: create_test_owner(),
        check_in_at: create_test_time(),
    }
}

pub fn create_test_due_draft(session_id: i64, vehicle: &str, cents: i64) -> DueDraft {
    DueDraft {
        vehicle: create_test_vehicle(vehicle),
        owner: create_test_owner(),
        session_id,
        amount_due: Money::from_cents(cents),
        status: DueStatus::Pending,
        created_at: create_test_time(),
        paid_at: None,
        notes: None,
    }
}

/// Inserts the standard draft and approves it.
pub fn insert_active_slot(persistence: &mut Persistence) -> i64 {
    persistence
        .in_transaction(|store| {
            let slot_id: i64 = store.insert_slot(&create_test_slot_draft())?;
            activate(store, slot_id)?;
            Ok::<i64, PersistenceError>(slot_id)
        })
        .unwrap()
}

pub fn activate(store: &mut dyn LedgerStore, slot_id: i64) -> Result<(), PersistenceError> {
    store.update_slot_status(&SlotStatusChange {
        slot_id,
        status: SlotStatus::Active,
        verification: Some(Verification {
            verified_by: ActorId::new("platform-admin").unwrap(),
            verified_at: create_test_time(),
            rejection_reason: None,
        }),
    })
}

/// Takes a space and opens a session the way check-in does.
pub fn check_in(persistence: &mut Persistence, slot_id: i64, vehicle: &str) -> i64 {
    persistence
        .in_transaction(|store| {
            assert!(store.try_occupy(slot_id, VehicleClass::Car)?);
            store.insert_session(&create_test_session_draft(slot_id, vehicle, VehicleClass::Car))
        })
        .unwrap()
}
