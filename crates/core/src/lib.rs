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

//! Pure ledger transitions.
//!
//! Each function here takes the current records, validates the requested
//! change against ledger rules, and returns the records to write together
//! with exactly one audit event. Nothing in this crate touches storage;
//! callers load the inputs and persist the outputs inside one transaction.

mod dues;
mod error;
mod session;
mod slot;
mod staff;
mod state;

#[cfg(test)]
mod tests;

pub use dues::{collect_due, write_off_due};
pub use error::CoreError;
pub use session::{check_out, mark_escaped, open_session};
pub use slot::{
    deactivate_slot, delete_slot, draft_slot, reactivate_slot, update_slot_config, verify_slot,
};
pub use staff::{assign_staff, remove_staff};
pub use state::{
    CheckOutInput, DueCollection, NewSlotInput, SessionClose, SlotConfig, SlotConfigUpdate,
    SlotStatusChange, StaffDraft, TransitionResult, UnderpaymentPolicy, VerificationDecision,
};
