// SPDX-License-Identifier: MIT
//
// Backend configuration.

use serde::{Deserialize, Serialize};

use crate::types::PageSize;

/// Licensing mode for rendering engines that distinguish community and
/// commercial use. An explicit per-backend value, never process-wide
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseMode {
    Community,
    Commercial { key: String },
}

/// Configuration passed into render backend construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Licensing mode forwarded to engines that require one.
    pub license: LicenseMode,
    /// Page size used when `RenderOptions` does not override it.
    pub default_page_size: PageSize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            license: LicenseMode::Community,
            default_page_size: PageSize::A4,
        }
    }
}
