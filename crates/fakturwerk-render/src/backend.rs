// SPDX-License-Identifier: MIT
//
// The render backend abstraction.
//
// Every concrete renderer implements `RenderBackend` against the same
// read-only model contract, so callers can swap engines without touching
// the invoice data or its derivation. A backend ignores options it cannot
// honour, never alters the numeric content of the model, and either returns
// a complete document or fails whole — no partial output.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use fakturwerk_core::config::BackendConfig;
use fakturwerk_core::error::{FakturwerkError, Result};
use fakturwerk_core::types::{InvoiceModel, PageSize};

use crate::html::HtmlBackend;
use crate::pdf::PdfBackend;

/// Color handling for rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Color,
    Grayscale,
}

/// The recognized rendering knobs.
///
/// `page_size` of `None` falls back to the backend's configured default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    pub page_size: Option<PageSize>,
    pub margin_mm: f32,
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub color_mode: ColorMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: None,
            margin_mm: 15.0,
            header_text: None,
            footer_text: None,
            color_mode: ColorMode::Color,
        }
    }
}

/// Contract implemented by every document renderer.
pub trait RenderBackend {
    /// Stable identifier used for backend lookup.
    fn name(&self) -> &'static str;

    /// Render the invoice into a complete document byte sequence.
    ///
    /// Output depends solely on `model` and `options`; concurrent calls on
    /// distinct invoices share no state. Backend-internal failures surface
    /// as `RenderFailed` — the caller decides whether to retry or fall back
    /// to another backend.
    fn render(&self, model: &InvoiceModel, options: &RenderOptions) -> Result<Vec<u8>>;
}

impl std::fmt::Debug for dyn RenderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBackend").field("name", &self.name()).finish()
    }
}

/// Names accepted by `backend_by_name`.
pub const BACKEND_NAMES: &[&str] = &["pdf", "html"];

/// Look up a backend by name, constructing it with the given configuration.
pub fn backend_by_name(name: &str, config: &BackendConfig) -> Result<Box<dyn RenderBackend>> {
    match name {
        "pdf" => Ok(Box::new(PdfBackend::new(config.clone()))),
        "html" => Ok(Box::new(HtmlBackend::new(config.clone()))),
        other => Err(FakturwerkError::UnknownBackend(other.to_owned())),
    }
}

/// Display formatting for money values, shared by every backend.
///
/// Rounds to two decimal places with the midpoint away from zero (the
/// commercial convention), then formats. `Decimal`'s own `{:.2}` display
/// rounds half to even, which would show `26.125` as `26.12` and let
/// displayed rows disagree with their displayed sum.
pub(crate) fn money(value: &Decimal) -> String {
    format!(
        "${:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_every_advertised_backend() {
        let config = BackendConfig::default();
        for name in BACKEND_NAMES {
            let backend = backend_by_name(name, &config).unwrap();
            assert_eq!(backend.name(), *name);
        }
    }

    #[test]
    fn rejects_unknown_backend_names() {
        let err = backend_by_name("wkhtmltopdf", &BackendConfig::default()).unwrap_err();
        assert!(matches!(err, FakturwerkError::UnknownBackend(_)));
    }

    #[test]
    fn money_rounds_midpoints_away_from_zero() {
        assert_eq!(money(&Decimal::new(26125, 3)), "$26.13");
        assert_eq!(money(&Decimal::new(2375, 3)), "$2.38");
        assert_eq!(money(&Decimal::new(1250, 2)), "$12.50");
        assert_eq!(money(&Decimal::ZERO), "$0.00");
    }

    /// Displayed totals rows must stay additive after rounding.
    #[test]
    fn money_keeps_displayed_rows_consistent() {
        let less_discount = Decimal::new(2375, 2);
        let tax = Decimal::new(2375, 3);
        let balance = less_discount + tax;
        assert_eq!(money(&less_discount), "$23.75");
        assert_eq!(money(&tax), "$2.38");
        assert_eq!(money(&balance), "$26.13");
    }
}
