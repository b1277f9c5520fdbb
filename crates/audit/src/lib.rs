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
    clippy::all
)]

//! Audit trail for ledger mutations.
//!
//! Every committed check-in, check-out, escape, due change, slot transition
//! and staff change produces exactly one [`AuditEvent`], written in the same
//! transaction as the change it describes.

use parkledger_domain::ActorId;
use serde::Serialize;
use time::OffsetDateTime;

/// The entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// The verified identity.
    pub id: ActorId,
    /// How the identity acted (`"user"`, `"admin"`, `"system"`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: ActorId, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// An ordinary user acting on slots they own or staff.
    #[must_use]
    pub fn user(id: ActorId) -> Self {
        Self::new(id, String::from("user"))
    }

    /// A platform administrator.
    #[must_use]
    pub fn admin(id: ActorId) -> Self {
        Self::new(id, String::from("admin"))
    }
}

/// The reason or trigger for an action, usually the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// The name of the action (e.g., "`CheckIn`", "`MarkEscaped`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Serialized state of the affected record at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// JSON text of the record.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot` from already-rendered data.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Captures a record as JSON.
    ///
    /// Records that cannot be serialized fall back to their debug form so
    /// auditing never blocks a transition.
    #[must_use]
    pub fn capture<T>(record: &T) -> Self
    where
        T: Serialize + std::fmt::Debug,
    {
        let data: String =
            serde_json::to_string(record).unwrap_or_else(|_| format!("{record:?}"));
        Self { data }
    }

    /// Snapshot for a record that did not exist yet.
    #[must_use]
    pub fn absent() -> Self {
        Self {
            data: String::from("null"),
        }
    }
}

/// An immutable audit event representing a ledger transition.
///
/// Captures who acted, why, what was done, on which slot, and the affected
/// record before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The slot the change belongs to, if any.
    pub slot_id: Option<i64>,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// When the transition happened.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        slot_id: Option<i64>,
        before: StateSnapshot,
        after: StateSnapshot,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            slot_id,
            before,
            after,
            occurred_at,
        }
    }
}
