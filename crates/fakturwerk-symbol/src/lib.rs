// SPDX-License-Identifier: MIT
//
// fakturwerk-symbol — Symbol encoding and raster assets for Fakturwerk.
//
// Turns a text payload into an abstract QR or Code 128 symbol matrix, then
// into a pixel buffer, then into a self-contained `data:` URL that render
// backends and markup templates embed without external file references.

mod code128;
pub mod encode;
pub mod raster;

pub use encode::{ModulePattern, SymbolMatrix, Symbology, encode};
pub use raster::{AssetFormat, RasterImage, compose_asset, encode_as_asset, rasterize};

use fakturwerk_core::error::Result;
use fakturwerk_core::types::{AssetString, InvoiceModel};
use tracing::info;

/// Default pixel size for invoice QR codes.
const QR_PIXELS: u32 = 200;
/// Default pixel size for invoice barcodes (wide and short).
const BARCODE_WIDTH: u32 = 300;
const BARCODE_HEIGHT: u32 = 80;

/// Produce the QR + Code 128 asset pair for one tracking payload.
pub fn tracking_assets(payload: &str) -> Result<(AssetString, AssetString)> {
    let qr = compose_asset(&encode(payload, Symbology::Qr, QR_PIXELS, QR_PIXELS)?)?;
    let barcode = compose_asset(&encode(
        payload,
        Symbology::Code128,
        BARCODE_WIDTH,
        BARCODE_HEIGHT,
    )?)?;
    Ok((qr, barcode))
}

/// Attach QR and barcode assets keyed on the invoice number.
///
/// The assets are the only fields of the model mutable after construction.
pub fn attach_tracking_symbols(model: &mut InvoiceModel) -> Result<()> {
    let (qr, barcode) = tracking_assets(&model.invoice_number)?;
    model.qr_code_asset = Some(qr);
    model.barcode_asset = Some(barcode);
    info!(
        invoice_number = %model.invoice_number,
        "attached tracking symbols"
    );
    Ok(())
}
