// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! All mutations use Diesel DSL and run unchanged on both backends. The
//! only backend-specific helper is `get_last_insert_rowid()`, reached
//! through the `PersistenceBackend` trait.
//!
//! - `audit`: audit event persistence
//! - `capacity`: the occupancy counters (`try_occupy`, `release`)
//! - `dues`: due creation and payment
//! - `oracles`: seed helpers for the organization and registry tables
//! - `sessions`: session creation and closing
//! - `slots`: slot creation, status, configuration and soft delete
//! - `staff`: legacy staff list changes

pub mod audit;
pub mod capacity;
pub mod dues;
pub mod oracles;
pub mod sessions;
pub mod slots;
pub mod staff;
