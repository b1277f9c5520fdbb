// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lookups against the organization and vehicle registry tables.
//!
//! The ledger only reads these. They are written by the surrounding
//! platform, or by the seed helpers in `mutations::oracles`.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use parkledger_domain::{ActorId, OrgMembership, Organization, VehicleNumber};

use crate::data_models::{MemberRow, OrganizationRow};
use crate::diesel_schema::{organization_members, organizations, registered_vehicles};
use crate::error::PersistenceError;

backend_fn! {
/// Loads an organization.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_organization(
    conn: &mut _,
    organization_id: i64,
) -> Result<Option<Organization>, PersistenceError> {
    organizations::table
        .filter(organizations::organization_id.eq(organization_id))
        .select(OrganizationRow::as_select())
        .first(conn)
        .optional()?
        .map(Organization::try_from)
        .transpose()
}
}

backend_fn! {
/// An actor's membership in an organization, if any.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_membership(
    conn: &mut _,
    organization_id: i64,
    actor: &ActorId,
) -> Result<Option<OrgMembership>, PersistenceError> {
    organization_members::table
        .filter(organization_members::organization_id.eq(organization_id))
        .filter(organization_members::actor_id.eq(actor.as_str()))
        .select(MemberRow::as_select())
        .first(conn)
        .optional()?
        .map(OrgMembership::try_from)
        .transpose()
}
}

backend_fn! {
/// The registered owner of a vehicle, if the vehicle is registered.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_registered_owner(
    conn: &mut _,
    vehicle: &VehicleNumber,
) -> Result<Option<ActorId>, PersistenceError> {
    let owner: Option<String> = registered_vehicles::table
        .filter(registered_vehicles::vehicle_number.eq(vehicle.as_str()))
        .select(registered_vehicles::owner_id)
        .first(conn)
        .optional()?;
    Ok(owner.map(ActorId::new).transpose()?)
}
}
