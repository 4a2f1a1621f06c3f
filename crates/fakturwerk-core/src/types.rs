// SPDX-License-Identifier: MIT
//
// Core domain types for the Fakturwerk invoice engine.

use base64::{Engine as _, engine::general_purpose};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FakturwerkError, Result};
use crate::totals::{self, Totals};

/// Postal address block for an invoice party (issuer or recipient).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// A single invoice line.
///
/// `index` is the 1-based display position (the "SL/No." column); insertion
/// order of the containing sequence is display-significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub index: u32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    /// Extended price for this line: `unit_price × quantity`.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Standard page sizes for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PageSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Self-contained embeddable image reference: `data:<mime>;base64,<payload>`.
///
/// This string is the sole contract between the raster pipeline and any
/// consumer (render backend, markup template, test harness). Consumers embed
/// it verbatim; `decode` returns the exact bytes that were encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetString(String);

impl AssetString {
    /// Wrap already-encoded image bytes as a data URL with the given MIME type.
    pub fn from_encoded(mime: &str, bytes: &[u8]) -> Self {
        let payload = general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime};base64,{payload}"))
    }

    /// Validate an existing string as a well-formed embeddable asset.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| FakturwerkError::InvalidAsset("missing data: scheme".into()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| FakturwerkError::InvalidAsset("missing ;base64, marker".into()))?;
        if mime.is_empty() || !mime.contains('/') {
            return Err(FakturwerkError::InvalidAsset(format!(
                "malformed MIME type {mime:?}"
            )));
        }
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| FakturwerkError::InvalidAsset(format!("bad base64 payload: {err}")))?;
        Ok(Self(s.to_owned()))
    }

    /// The MIME type declared by this asset.
    pub fn mime_type(&self) -> &str {
        // Structure is guaranteed by the constructors.
        let rest = &self.0["data:".len()..];
        rest.split(';').next().unwrap_or_default()
    }

    /// Decode the base64 payload back into the contained image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, payload) = self
            .0
            .split_once(";base64,")
            .ok_or_else(|| FakturwerkError::InvalidAsset("missing ;base64, marker".into()))?;
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| FakturwerkError::InvalidAsset(format!("bad base64 payload: {err}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat construction input for an invoice (the external interface shape).
///
/// Every field is optional on the wire: absent strings default to empty,
/// absent rates to zero, absent line items to an empty sequence (which
/// yields all-zero totals).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issuer: Party,
    pub recipient: Party,
    pub line_items: Vec<LineItem>,
    pub discount_rate: Decimal,
    pub tax_rate: Decimal,
    pub notes: String,
    pub terms: String,
}

/// The canonical invoice document entity.
///
/// Constructed once from a validated draft; the financial derivation runs at
/// construction and the resulting totals are immutable afterwards. The three
/// optional raster assets are the only fields mutable post-construction.
/// Every render backend receives this entity read-only.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceModel {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issuer: Party,
    pub recipient: Party,
    line_items: Vec<LineItem>,
    totals: Totals,
    pub notes: String,
    pub terms: String,
    pub qr_code_asset: Option<AssetString>,
    pub barcode_asset: Option<AssetString>,
    pub logo_asset: Option<AssetString>,
}

impl InvoiceModel {
    /// Build an invoice from a flat draft, deriving the totals.
    ///
    /// Fails with `InvalidLineItem` or `InvalidRate` before any rendering is
    /// ever attempted; a successfully constructed model always satisfies the
    /// totals invariants.
    pub fn new(draft: InvoiceDraft) -> Result<Self> {
        let totals = totals::derive(&draft.line_items, draft.discount_rate, draft.tax_rate)?;
        Ok(Self {
            invoice_number: draft.invoice_number,
            invoice_date: draft.invoice_date,
            due_date: draft.due_date,
            issuer: draft.issuer,
            recipient: draft.recipient,
            line_items: draft.line_items,
            totals,
            notes: draft.notes,
            terms: draft.terms,
            qr_code_asset: None,
            barcode_asset: None,
            logo_asset: None,
        })
    }

    /// Line items in display order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Derived financial totals. Never hand-set by callers.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: u32, quantity: u32, unit_price: Decimal) -> LineItem {
        LineItem {
            index,
            name: format!("item {index}"),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn asset_string_round_trips_exact_bytes() {
        let bytes = [0u8, 1, 2, 254, 255, 127, 128, 64];
        let asset = AssetString::from_encoded("image/png", &bytes);

        assert!(asset.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.decode().unwrap(), bytes);
    }

    #[test]
    fn asset_string_parse_accepts_constructor_output() {
        let asset = AssetString::from_encoded("image/jpeg", b"not really a jpeg");
        let reparsed = AssetString::parse(asset.as_str()).unwrap();
        assert_eq!(reparsed, asset);
    }

    #[test]
    fn asset_string_parse_rejects_malformed_input() {
        assert!(AssetString::parse("http://example.com/logo.png").is_err());
        assert!(AssetString::parse("data:image/png,rawpayload").is_err());
        assert!(AssetString::parse("data:;base64,AAAA").is_err());
        assert!(AssetString::parse("data:image/png;base64,!!!not-base64!!!").is_err());
    }

    #[test]
    fn draft_defaults_yield_zero_totals() {
        let model = InvoiceModel::new(InvoiceDraft::default()).unwrap();
        assert!(model.line_items().is_empty());
        assert_eq!(model.totals().subtotal, Decimal::ZERO);
        assert_eq!(model.totals().balance_due, Decimal::ZERO);
        assert!(model.qr_code_asset.is_none());
    }

    #[test]
    fn construction_rejects_bad_line_items() {
        let draft = InvoiceDraft {
            line_items: vec![item(1, 0, Decimal::new(500, 2))],
            ..Default::default()
        };
        assert!(matches!(
            InvoiceModel::new(draft),
            Err(FakturwerkError::InvalidLineItem { index: 1, .. })
        ));
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        let li = item(1, 3, Decimal::new(1250, 2));
        assert_eq!(li.line_total(), Decimal::new(3750, 2));
    }

    #[test]
    fn line_item_order_is_preserved() {
        let draft = InvoiceDraft {
            line_items: vec![
                item(1, 1, Decimal::ONE),
                item(2, 1, Decimal::ONE),
                item(3, 1, Decimal::ONE),
            ],
            ..Default::default()
        };
        let model = InvoiceModel::new(draft).unwrap();
        let indices: Vec<u32> = model.line_items().iter().map(|li| li.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }
}
