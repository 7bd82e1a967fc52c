//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the mailbox query service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Page size used when a caller passes a zero limit.
    pub default_page_limit: u32,
    /// Hard cap on any single folder page.
    pub max_page_limit: u32,
    /// How many of the newest index entries thread grouping scans.
    pub thread_scan_window: u32,
    /// Attempts per idempotent index add/remove before giving up.
    pub index_retry_budget: u32,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 50,
            max_page_limit: 500,
            thread_scan_window: 200,
            index_retry_budget: 3,
        }
    }
}

impl MailboxConfig {
    /// Clamp a caller-supplied limit into the configured bounds.
    #[must_use]
    pub const fn normalize_limit(&self, limit: u32) -> u32 {
        if limit == 0 {
            self.default_page_limit
        } else if limit > self.max_page_limit {
            self.max_page_limit
        } else {
            limit
        }
    }
}
