// SPDX-License-Identifier: MIT
//
// HTML backend — renders an invoice as a standalone HTML document with
// inline styling. Attached assets are emitted directly as data-URL `src`
// attributes, so the output is a single self-contained file.

use askama::Template;
use tracing::{debug, instrument};

use fakturwerk_core::config::BackendConfig;
use fakturwerk_core::error::{FakturwerkError, Result};
use fakturwerk_core::types::InvoiceModel;

use crate::backend::{ColorMode, RenderBackend, RenderOptions};

const ACCENT_COLOR: &str = "#2150a4";
const GRAYSCALE_COLOR: &str = "#404040";

mod filters {
    use rust_decimal::Decimal;

    /// Money display for the template, sharing the backend-wide rounding
    /// policy so HTML and PDF output show identical figures.
    pub fn money(value: impl std::borrow::Borrow<Decimal>) -> askama::Result<String> {
        Ok(crate::backend::money(value.borrow()))
    }
}

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    model: &'a InvoiceModel,
    options: &'a RenderOptions,
    accent: &'static str,
    page_width_mm: u32,
}

/// Alternate `RenderBackend` producing a self-contained HTML document.
pub struct HtmlBackend {
    config: BackendConfig,
}

impl HtmlBackend {
    pub fn new(config: BackendConfig) -> Self {
        debug!(license = ?config.license, "html backend ready");
        Self { config }
    }
}

impl RenderBackend for HtmlBackend {
    fn name(&self) -> &'static str {
        "html"
    }

    #[instrument(skip(self, model, options), fields(invoice = %model.invoice_number))]
    fn render(&self, model: &InvoiceModel, options: &RenderOptions) -> Result<Vec<u8>> {
        let page_size = options.page_size.unwrap_or(self.config.default_page_size);
        let (page_width_mm, _) = page_size.dimensions_mm();
        let accent = match options.color_mode {
            ColorMode::Color => ACCENT_COLOR,
            ColorMode::Grayscale => GRAYSCALE_COLOR,
        };
        let template = InvoiceTemplate {
            model,
            options,
            accent,
            page_width_mm,
        };
        let html = template.render().map_err(|err| FakturwerkError::RenderFailed {
            backend: "html".into(),
            cause: err.to_string(),
        })?;
        debug!(bytes = html.len(), "invoice markup complete");
        Ok(html.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fakturwerk_core::types::{InvoiceDraft, LineItem, Party};
    use rust_decimal::Decimal;

    fn sample_model() -> InvoiceModel {
        InvoiceModel::new(InvoiceDraft {
            invoice_number: "INV-0042".into(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            issuer: Party {
                name: "EasyPOS GmbH".into(),
                ..Default::default()
            },
            recipient: Party {
                name: "Gorczany - Mitchell".into(),
                ..Default::default()
            },
            line_items: vec![LineItem {
                index: 1,
                name: "Handcrafted Widget".into(),
                quantity: 2,
                unit_price: Decimal::new(1250, 2),
            }],
            discount_rate: Decimal::new(5, 2),
            tax_rate: Decimal::new(10, 2),
            notes: "Thank you for your business!".into(),
            terms: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn renders_a_complete_document() {
        let backend = HtmlBackend::new(BackendConfig::default());
        let bytes = backend
            .render(&sample_model(), &RenderOptions::default())
            .unwrap();
        let html = String::from_utf8(bytes).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("INV-0042"));
        assert!(html.contains("Handcrafted Widget"));
        assert!(html.contains("$12.50"));
        // 2 x 12.50 = 25.00, minus 5% discount, plus 10% tax; the exact
        // balance 26.125 displays rounded away from zero.
        assert!(html.contains("$26.13"));
        assert!(html.contains("$2.38"));
        assert!(!html.contains("$26.12<"));
        assert!(html.contains("Discount (5%)"));
        assert!(html.contains("Tax (10%)"));
    }

    #[test]
    fn embeds_assets_as_data_urls() {
        let backend = HtmlBackend::new(BackendConfig::default());
        let mut model = sample_model();
        fakturwerk_symbol::attach_tracking_symbols(&mut model).unwrap();
        let html = String::from_utf8(
            backend.render(&model, &RenderOptions::default()).unwrap(),
        )
        .unwrap();
        assert!(html.contains("src=\"data:image/png;base64,"));
    }

    #[test]
    fn omits_empty_sections() {
        let backend = HtmlBackend::new(BackendConfig::default());
        let html = String::from_utf8(
            backend
                .render(&sample_model(), &RenderOptions::default())
                .unwrap(),
        )
        .unwrap();
        assert!(html.contains("Notes:"));
        assert!(!html.contains("Terms:"));
    }

    #[test]
    fn grayscale_swaps_accent_color() {
        let backend = HtmlBackend::new(BackendConfig::default());
        let options = RenderOptions {
            color_mode: ColorMode::Grayscale,
            ..Default::default()
        };
        let html = String::from_utf8(
            backend.render(&sample_model(), &options).unwrap(),
        )
        .unwrap();
        assert!(html.contains(GRAYSCALE_COLOR));
        assert!(!html.contains(ACCENT_COLOR));
    }
}
