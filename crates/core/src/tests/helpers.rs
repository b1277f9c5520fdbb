// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use parkledger_audit::{Actor, Cause};
use parkledger_domain::{
    ActorId, CapacityMap, Due, DueStatus, GeoPoint, HourlyRate, Money, PaymentStatus,
    PaymentTiming, PricingPolicy, Session, SessionStatus, Slot, SlotStatus, VehicleClass,
    VehicleNumber,
};
use rust_decimal::Decimal;
use time::{OffsetDateTime, macros::datetime};

pub const T0: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::user(ActorId::new("staff-1").unwrap())
}

pub fn create_test_owner() -> Actor {
    Actor::user(ActorId::new("owner-1").unwrap())
}

pub fn create_test_admin() -> Actor {
    Actor::admin(ActorId::new("platform-admin").unwrap())
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Gate request"))
}

pub fn hourly_car_policy() -> PricingPolicy {
    let mut rates: BTreeMap<VehicleClass, HourlyRate> = BTreeMap::new();
    rates.insert(
        VehicleClass::Car,
        HourlyRate {
            base: Money::from_cents(3000),
            base_hours: Decimal::from(2),
            incremental: Money::from_cents(1000),
        },
    );
    PricingPolicy::Hourly(rates)
}

pub fn create_test_slot(status: SlotStatus, pricing: PricingPolicy) -> Slot {
    let mut occupancy: BTreeMap<VehicleClass, u32> = BTreeMap::new();
    occupancy.insert(VehicleClass::Car, 0);
    Slot {
        slot_id: 1,
        owner: ActorId::new("owner-1").unwrap(),
        organization_id: None,
        name: String::from("North Gate"),
        description: None,
        address: String::from("1 Harbour Road"),
        geo: GeoPoint::new(12.97, 77.59).unwrap(),
        capacity: CapacityMap::from_entries([(VehicleClass::Car, 2)]),
        occupancy,
        pricing,
        payment_timing: PaymentTiming::OnExit,
        status,
        verification: None,
        created_at: T0,
    }
}

pub fn create_test_session(status: SessionStatus) -> Session {
    Session {
        session_id: 10,
        slot_id: 1,
        vehicle: VehicleNumber::parse("AB12CD3456").unwrap(),
        vehicle_class: VehicleClass::Car,
        vehicle_owner: None,
        checked_in_by: ActorId::new("staff-1").unwrap(),
        checked_out_by: None,
        check_in_at: T0,
        check_out_at: None,
        status,
        calculated_fee: Money::ZERO,
        collected: Money::ZERO,
        payment_method: None,
        payment_status: PaymentStatus::Pending,
        notes: None,
    }
}

pub fn create_test_due(amount_due: i64, amount_paid: i64, status: DueStatus) -> Due {
    Due {
        due_id: 5,
        vehicle: VehicleNumber::parse("AB12CD3456").unwrap(),
        owner: ActorId::new("owner-1").unwrap(),
        session_id: 10,
        amount_due: Money::from_cents(amount_due),
        amount_paid: Money::from_cents(amount_paid),
        status,
        created_at: T0,
        paid_at: None,
        collected_by: None,
        payment_method: None,
        payment_session_id: None,
        notes: None,
    }
}
