// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use parkledger::UnderpaymentPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request_response::PageRequest;

/// Runtime knobs for the ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Open a due when check-out collects less than the fee.
    ///
    /// Off by default: only escapes open dues.
    pub open_due_on_underpayment: bool,
    /// Page size used when a listing does not ask for one.
    pub default_page_size: u32,
    /// Largest page size a listing may ask for.
    pub max_page_size: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            open_due_on_underpayment: false,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// A resolved listing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl PageWindow {
    /// Row limit for the query.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    /// Row offset for the query.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl LedgerConfig {
    /// The check-out underpayment behaviour selected by this config.
    #[must_use]
    pub const fn underpayment_policy(&self) -> UnderpaymentPolicy {
        if self.open_due_on_underpayment {
            UnderpaymentPolicy::OpenDue
        } else {
            UnderpaymentPolicy::RecordOnly
        }
    }

    /// Resolves a page request against the configured sizes.
    ///
    /// Oversized pages are capped at `max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for page 0 or page size 0.
    pub fn page_window(&self, request: &PageRequest) -> Result<PageWindow, ApiError> {
        let page: u32 = request.page.unwrap_or(1);
        if page == 0 {
            return Err(ApiError::InvalidInput {
                code: "INVALID_INPUT",
                field: String::from("page"),
                message: String::from("pages start at 1"),
            });
        }
        let page_size: u32 = request.page_size.unwrap_or(self.default_page_size);
        if page_size == 0 {
            return Err(ApiError::InvalidInput {
                code: "INVALID_INPUT",
                field: String::from("page_size"),
                message: String::from("page size must be positive"),
            });
        }
        Ok(PageWindow {
            page,
            page_size: page_size.min(self.max_page_size),
        })
    }
}
