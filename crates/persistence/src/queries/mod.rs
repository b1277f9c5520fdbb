// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function is generated in two monomorphic versions by `backend_fn!`,
//! suffixed `_sqlite` and `_mysql`. The `LedgerStore` impls dispatch to
//! the version matching the connection type.
//!
//! - `audit`: audit trail per slot
//! - `dues`: outstanding and historical dues
//! - `oracles`: organization membership and vehicle registry lookups
//! - `sessions`: session lookups, counts and history
//! - `slots`: slots with their capacity ledger rows
//! - `staff`: legacy staff list

pub mod audit;
pub mod dues;
pub mod oracles;
pub mod sessions;
pub mod slots;
pub mod staff;
