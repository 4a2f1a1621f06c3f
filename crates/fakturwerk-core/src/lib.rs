// SPDX-License-Identifier: MIT
//
// fakturwerk-core — Invoice data model and shared types for Fakturwerk.
//
// Holds the canonical `InvoiceModel`, the financial derivation that is the
// single source of truth for invoice totals, the error taxonomy, and the
// configuration passed into render backends. This crate performs no I/O.

pub mod config;
pub mod error;
pub mod totals;
pub mod types;

pub use config::{BackendConfig, LicenseMode};
pub use error::FakturwerkError;
pub use types::*;
