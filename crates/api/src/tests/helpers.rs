// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use parkledger_audit::Cause;
use parkledger_domain::{
    ActorId, Money, OrgMembership, OrgRole, OrganizationStatus, PaymentMethod, PricingModel,
    StaffRole, VehicleClass,
};
use parkledger_persistence::{Persistence, PersistenceError};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    AddStaffRequest, ApiError, AuthenticatedActor, CheckInRequest, CheckInResponse,
    CheckOutRequest, CreateSlotRequest, LedgerConfig, MarkEscapedRequest, Role,
    SessionCloseResponse, SessionLookup, VerifySlotRequest, add_staff, check_in, check_out,
    create_slot, mark_escaped, verify_slot,
};

pub const T0: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new("platform-admin", Role::Admin).unwrap()
}

pub fn create_test_owner() -> AuthenticatedActor {
    AuthenticatedActor::new("owner-1", Role::Member).unwrap()
}

pub fn create_test_staff() -> AuthenticatedActor {
    AuthenticatedActor::new("staff-1", Role::Member).unwrap()
}

pub fn create_test_outsider() -> AuthenticatedActor {
    AuthenticatedActor::new("stranger-1", Role::Member).unwrap()
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-123"), String::from("Gate request"))
}

/// `T0` plus the given minutes.
pub fn at(minutes: i64) -> OffsetDateTime {
    T0 + Duration::minutes(minutes)
}

pub fn slot_request(
    name: &str,
    pricing_model: PricingModel,
    pricing_config: Option<Value>,
    capacity: &[(VehicleClass, u32)],
) -> CreateSlotRequest {
    CreateSlotRequest {
        organization_id: None,
        name: name.to_string(),
        description: None,
        address: String::from("1 Harbour Road"),
        latitude: 12.97,
        longitude: 77.59,
        capacity: capacity.iter().copied().collect::<BTreeMap<_, _>>(),
        pricing_model,
        pricing_config,
        payment_timing: None,
    }
}

/// A FREE slot with one car space.
pub fn free_single_car_request() -> CreateSlotRequest {
    slot_request("North Gate", PricingModel::Free, None, &[(VehicleClass::Car, 1)])
}

/// An HOURLY slot: 30.00 for the first two hours, 10.00 per started hour
/// after that, with two car spaces.
pub fn hourly_car_request() -> CreateSlotRequest {
    slot_request(
        "Harbour Lot",
        PricingModel::Hourly,
        Some(json!({ "CAR": { "base": 30, "base_hours": 2, "incremental": 10 } })),
        &[(VehicleClass::Car, 2)],
    )
}

/// A FIXED slot charging 50.00 per car and 20.00 per bike.
pub fn fixed_request() -> CreateSlotRequest {
    slot_request(
        "Market Street Lot",
        PricingModel::Fixed,
        Some(json!({ "CAR": 50, "BIKE": 20 })),
        &[(VehicleClass::Car, 2), (VehicleClass::Bike, 1)],
    )
}

/// Registers a slot as `owner` and approves it.
pub fn create_active_slot_for(
    persistence: &mut Persistence,
    request: &CreateSlotRequest,
    owner: &AuthenticatedActor,
) -> i64 {
    let slot_id: i64 = create_slot(persistence, request, owner, create_test_cause(), T0)
        .unwrap()
        .slot
        .slot_id;
    verify_slot(
        persistence,
        slot_id,
        &VerifySlotRequest {
            approve: true,
            rejection_reason: None,
        },
        &create_test_admin(),
        create_test_cause(),
        T0,
    )
    .unwrap();
    slot_id
}

pub fn create_active_slot(persistence: &mut Persistence, request: &CreateSlotRequest) -> i64 {
    create_active_slot_for(persistence, request, &create_test_owner())
}

pub fn add_test_staff(persistence: &mut Persistence, slot_id: i64, role: StaffRole) -> i64 {
    add_staff(
        persistence,
        slot_id,
        &AddStaffRequest {
            actor_id: create_test_staff().id.to_string(),
            role,
        },
        &create_test_owner(),
        create_test_cause(),
        T0,
    )
    .unwrap()
    .assignment_id
}

pub fn check_in_as(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    slot_id: i64,
    vehicle: &str,
    vehicle_class: VehicleClass,
    now: OffsetDateTime,
) -> Result<CheckInResponse, ApiError> {
    check_in(
        persistence,
        &CheckInRequest {
            slot_id,
            vehicle_number: vehicle.to_string(),
            vehicle_class,
        },
        actor,
        create_test_cause(),
        now,
    )
}

/// Checks a car in as the slot owner.
pub fn check_in_car(
    persistence: &mut Persistence,
    slot_id: i64,
    vehicle: &str,
    now: OffsetDateTime,
) -> Result<CheckInResponse, ApiError> {
    check_in_as(
        persistence,
        &create_test_owner(),
        slot_id,
        vehicle,
        VehicleClass::Car,
        now,
    )
}

pub fn by_session(session_id: i64) -> SessionLookup {
    SessionLookup {
        session_id: Some(session_id),
        ..SessionLookup::default()
    }
}

pub fn check_out_with(
    persistence: &mut Persistence,
    config: &LedgerConfig,
    session_id: i64,
    collected: Money,
    now: OffsetDateTime,
) -> Result<SessionCloseResponse, ApiError> {
    check_out(
        persistence,
        config,
        &CheckOutRequest {
            lookup: by_session(session_id),
            collected,
            payment_method: Some(PaymentMethod::Cash),
            notes: None,
        },
        &create_test_owner(),
        create_test_cause(),
        now,
    )
}

pub fn escape(
    persistence: &mut Persistence,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<SessionCloseResponse, ApiError> {
    mark_escaped(
        persistence,
        &MarkEscapedRequest {
            lookup: by_session(session_id),
            notes: Some(String::from("Drove through the barrier")),
        },
        &create_test_owner(),
        create_test_cause(),
        now,
    )
}

/// Seeds an organization with one member per role.
pub fn seed_organization(persistence: &mut Persistence, status: OrganizationStatus) -> i64 {
    persistence
        .in_transaction(|store| {
            let organization_id: i64 = store.insert_organization("Citywide Parking", status)?;
            for (actor, role) in [
                ("org-admin", OrgRole::OrgAdmin),
                ("area-manager", OrgRole::AreaManager),
                ("ground-staff", OrgRole::GroundStaff),
            ] {
                store.insert_membership(&OrgMembership {
                    organization_id,
                    actor: ActorId::new(actor).unwrap(),
                    role,
                })?;
            }
            Ok::<i64, PersistenceError>(organization_id)
        })
        .unwrap()
}

pub fn member(id: &str) -> AuthenticatedActor {
    AuthenticatedActor::new(id, Role::Member).unwrap()
}
