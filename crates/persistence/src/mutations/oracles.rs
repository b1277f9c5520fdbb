// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seed helpers for the tables the ledger treats as read-only.
//!
//! Organization membership and the vehicle registry are owned by the
//! surrounding platform. These exist for provisioning and tests.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{ActorId, OrgMembership, OrganizationStatus, VehicleNumber};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{organization_members, organizations, registered_vehicles};
use crate::error::PersistenceError;

backend_fn! {
/// Creates an organization.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_organization(
    conn: &mut _,
    name: &str,
    status: OrganizationStatus,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(organizations::table)
        .values((
            organizations::name.eq(name),
            organizations::status.eq(status.as_str()),
        ))
        .execute(conn)?;
    let organization_id: i64 = conn.get_last_insert_rowid()?;
    debug!(organization_id, "Seeded organization");
    Ok(organization_id)
}
}

backend_fn! {
/// Changes an organization's status.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_organization_status(
    conn: &mut _,
    organization_id: i64,
    status: OrganizationStatus,
) -> Result<(), PersistenceError> {
    diesel::update(
        organizations::table.filter(organizations::organization_id.eq(organization_id)),
    )
    .set(organizations::status.eq(status.as_str()))
    .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Adds a member to an organization.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_membership(
    conn: &mut _,
    membership: &OrgMembership,
) -> Result<(), PersistenceError> {
    diesel::insert_into(organization_members::table)
        .values((
            organization_members::organization_id.eq(membership.organization_id),
            organization_members::actor_id.eq(membership.actor.as_str()),
            organization_members::role.eq(membership.role.as_str()),
        ))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Registers a vehicle to an owner.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn register_vehicle(
    conn: &mut _,
    vehicle: &VehicleNumber,
    owner: &ActorId,
) -> Result<(), PersistenceError> {
    diesel::insert_into(registered_vehicles::table)
        .values((
            registered_vehicles::vehicle_number.eq(vehicle.as_str()),
            registered_vehicles::owner_id.eq(owner.as_str()),
        ))
        .execute(conn)?;
    Ok(())
}
}
