// SPDX-License-Identifier: MIT
//
// Reference PDF backend — native invoice layout using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Raster assets (logo, QR, barcode) are registered as
// XObjects and placed with transforms; `RawImage` takes raw pixel rows, so
// each attached data URL is decoded to RGB8 losslessly — pixel content is
// preserved end to end.

use printpdf::{
    BuiltinFont, Color, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    RawImage, RawImageData, RawImageFormat, Rgb, TextItem, XObjectId, XObjectTransform,
};
use tracing::{debug, info, instrument};

use fakturwerk_core::config::BackendConfig;
use fakturwerk_core::error::{FakturwerkError, Result};
use fakturwerk_core::types::{AssetString, InvoiceModel, Party};

use crate::backend::{money, ColorMode, RenderBackend, RenderOptions};

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 14.0;
/// DPI assumed when translating registered image pixels to page units.
const ASSET_DPI: f32 = 150.0;
/// Rendered edge length of the QR symbol on the page.
const QR_EDGE_PT: f32 = 64.0;
/// Rendered height of the barcode on the page.
const BARCODE_HEIGHT_PT: f32 = 36.0;

/// Native PDF renderer. The reference implementation of `RenderBackend`.
pub struct PdfBackend {
    config: BackendConfig,
}

impl PdfBackend {
    pub fn new(config: BackendConfig) -> Self {
        debug!(license = ?config.license, "pdf backend ready");
        Self { config }
    }

    /// Decode an attached asset and register it with the document as an
    /// RGB8 XObject, returning its id and pixel dimensions.
    fn register_asset(
        &self,
        doc: &mut PdfDocument,
        asset: &AssetString,
    ) -> Result<(XObjectId, u32, u32)> {
        let bytes = asset.decode()?;
        let decoded = image::load_from_memory(&bytes).map_err(|err| {
            backend_failure(format!("failed to decode embedded asset: {err}"))
        })?;

        let width = decoded.width();
        let height = decoded.height();
        let rgb = decoded.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        Ok((doc.add_image(&raw), width, height))
    }
}

impl RenderBackend for PdfBackend {
    fn name(&self) -> &'static str {
        "pdf"
    }

    #[instrument(skip(self, model, options), fields(invoice = %model.invoice_number))]
    fn render(&self, model: &InvoiceModel, options: &RenderOptions) -> Result<Vec<u8>> {
        let page_size = options.page_size.unwrap_or(self.config.default_page_size);
        let (w_mm, h_mm) = page_size.dimensions_mm();
        let page_w = Mm(w_mm as f32);
        let page_h = Mm(h_mm as f32);
        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let margin_pt = Mm(options.margin_mm).into_pt().0;
        let usable_w = page_w_pt - 2.0 * margin_pt;
        let right_edge = page_w_pt - margin_pt;

        let accent = match options.color_mode {
            ColorMode::Color => rgb(0.13, 0.31, 0.64),
            ColorMode::Grayscale => rgb(0.25, 0.25, 0.25),
        };
        let black = rgb(0.0, 0.0, 0.0);

        let mut doc = PdfDocument::new(&format!("Invoice {}", model.invoice_number));

        let logo = match &model.logo_asset {
            Some(asset) => Some(self.register_asset(&mut doc, asset)?),
            None => None,
        };
        let qr = match &model.qr_code_asset {
            Some(asset) => Some(self.register_asset(&mut doc, asset)?),
            None => None,
        };
        let barcode = match &model.barcode_asset {
            Some(asset) => Some(self.register_asset(&mut doc, asset)?),
            None => None,
        };

        let columns = TableColumns::for_width(margin_pt, usable_w);
        let bottom_reserve = margin_pt + 2.0 * LINE_HEIGHT;

        let mut pages: Vec<Vec<Op>> = Vec::new();
        let mut ops: Vec<Op> = Vec::new();
        let top = page_h_pt - margin_pt;
        let mut y = top;

        // -- Header ----------------------------------------------------------

        if let Some(header) = &options.header_text {
            let x = margin_pt + (usable_w - est_width_pt(header, BODY_SIZE)) / 2.0;
            push_text(&mut ops, header, BuiltinFont::Helvetica, BODY_SIZE, x, y);
            y -= 1.5 * LINE_HEIGHT;
        }

        if let Some((id, _, px_h)) = &logo {
            let logo_h_pt: f32 = 40.0;
            place_image(&mut ops, id, *px_h, logo_h_pt, margin_pt, y - logo_h_pt);
            y -= logo_h_pt + 0.5 * LINE_HEIGHT;
        }

        let block_top = y;
        set_color(&mut ops, &accent);
        push_text(
            &mut ops,
            &model.issuer.name,
            BuiltinFont::HelveticaBold,
            TITLE_SIZE,
            margin_pt,
            y,
        );
        set_color(&mut ops, &black);
        let mut left_y = y - 1.3 * LINE_HEIGHT;
        for line in address_lines(&model.issuer) {
            push_text(&mut ops, &line, BuiltinFont::Helvetica, BODY_SIZE, margin_pt, left_y);
            left_y -= LINE_HEIGHT;
        }

        set_color(&mut ops, &accent);
        push_text_right(
            &mut ops,
            "INVOICE",
            BuiltinFont::HelveticaBold,
            TITLE_SIZE,
            right_edge,
            block_top,
        );
        set_color(&mut ops, &black);
        let mut right_y = block_top - 1.3 * LINE_HEIGHT;
        for line in [
            format!("Invoice Number: {}", model.invoice_number),
            format!("Date of Issue: {}", model.invoice_date.format("%Y-%m-%d")),
            format!("Due Date: {}", model.due_date.format("%Y-%m-%d")),
        ] {
            push_text_right(&mut ops, &line, BuiltinFont::Helvetica, BODY_SIZE, right_edge, right_y);
            right_y -= LINE_HEIGHT;
        }

        y = left_y.min(right_y) - LINE_HEIGHT;

        // -- Bill-to block ---------------------------------------------------

        set_color(&mut ops, &accent);
        push_text(&mut ops, "INVOICE TO:", BuiltinFont::HelveticaBold, BODY_SIZE, margin_pt, y);
        set_color(&mut ops, &black);
        y -= LINE_HEIGHT;
        push_text(&mut ops, &model.recipient.name, BuiltinFont::Helvetica, BODY_SIZE, margin_pt, y);
        y -= LINE_HEIGHT;
        for line in address_lines(&model.recipient) {
            push_text(&mut ops, &line, BuiltinFont::Helvetica, BODY_SIZE, margin_pt, y);
            y -= LINE_HEIGHT;
        }
        y -= LINE_HEIGHT;

        // -- Line item table -------------------------------------------------

        push_table_header(&mut ops, &columns, &accent, &black, &mut y);

        for item in model.line_items() {
            if y < bottom_reserve + LINE_HEIGHT {
                pages.push(std::mem::take(&mut ops));
                y = top;
                push_table_header(&mut ops, &columns, &accent, &black, &mut y);
            }
            push_text(
                &mut ops,
                &item.index.to_string(),
                BuiltinFont::Helvetica,
                BODY_SIZE,
                columns.no_x,
                y,
            );
            push_text(&mut ops, &item.name, BuiltinFont::Helvetica, BODY_SIZE, columns.desc_x, y);
            push_text_right(
                &mut ops,
                &item.quantity.to_string(),
                BuiltinFont::Helvetica,
                BODY_SIZE,
                columns.qty_r,
                y,
            );
            push_text_right(
                &mut ops,
                &money(&item.unit_price),
                BuiltinFont::Helvetica,
                BODY_SIZE,
                columns.price_r,
                y,
            );
            push_text_right(
                &mut ops,
                &money(&item.line_total()),
                BuiltinFont::Helvetica,
                BODY_SIZE,
                columns.total_r,
                y,
            );
            y -= LINE_HEIGHT;
        }
        y -= LINE_HEIGHT;

        // -- Totals block ----------------------------------------------------

        let totals = model.totals();
        let totals_rows = [
            ("Subtotal".to_owned(), totals.subtotal),
            (
                format!("Discount ({}%)", totals.discount_rate_percent()),
                totals.discount,
            ),
            (
                "Subtotal Less Discount".to_owned(),
                totals.subtotal_less_discount,
            ),
            (
                format!("Tax ({}%)", totals.tax_rate_percent()),
                totals.tax_total,
            ),
        ];
        let totals_height = (totals_rows.len() as f32 + 2.0) * LINE_HEIGHT;
        if y < bottom_reserve + totals_height {
            pages.push(std::mem::take(&mut ops));
            y = top;
        }

        let label_x = margin_pt + 0.55 * usable_w;
        for (label, value) in &totals_rows {
            push_text(&mut ops, label, BuiltinFont::Helvetica, BODY_SIZE, label_x, y);
            push_text_right(
                &mut ops,
                &money(value),
                BuiltinFont::Helvetica,
                BODY_SIZE,
                columns.total_r,
                y,
            );
            y -= LINE_HEIGHT;
        }
        set_color(&mut ops, &accent);
        push_text(&mut ops, "Balance Due", BuiltinFont::HelveticaBold, BODY_SIZE, label_x, y);
        push_text_right(
            &mut ops,
            &money(&totals.balance_due),
            BuiltinFont::HelveticaBold,
            BODY_SIZE,
            columns.total_r,
            y,
        );
        set_color(&mut ops, &black);
        y -= 2.0 * LINE_HEIGHT;

        // -- Notes, terms, tracking symbols ----------------------------------

        let max_chars = max_chars_per_line(usable_w, BODY_SIZE);
        for (label, text) in [("Notes:", &model.notes), ("Terms:", &model.terms)] {
            if text.is_empty() {
                continue;
            }
            let lines = wrap_text(text, max_chars);
            let needed = (lines.len() as f32 + 1.5) * LINE_HEIGHT;
            if y < bottom_reserve + needed {
                pages.push(std::mem::take(&mut ops));
                y = top;
            }
            push_text(&mut ops, label, BuiltinFont::HelveticaBold, BODY_SIZE, margin_pt, y);
            y -= LINE_HEIGHT;
            for line in lines {
                push_text(&mut ops, &line, BuiltinFont::Helvetica, BODY_SIZE, margin_pt, y);
                y -= LINE_HEIGHT;
            }
            y -= 0.5 * LINE_HEIGHT;
        }

        if qr.is_some() || barcode.is_some() {
            if y < bottom_reserve + QR_EDGE_PT + LINE_HEIGHT {
                pages.push(std::mem::take(&mut ops));
                y = top;
            }
            let image_top = y - QR_EDGE_PT;
            if let Some((id, _, px_h)) = &qr {
                place_image(&mut ops, id, *px_h, QR_EDGE_PT, margin_pt, image_top);
            }
            if let Some((id, _, px_h)) = &barcode {
                let x = margin_pt + QR_EDGE_PT + 2.0 * LINE_HEIGHT;
                place_image(
                    &mut ops,
                    id,
                    *px_h,
                    BARCODE_HEIGHT_PT,
                    x,
                    image_top + (QR_EDGE_PT - BARCODE_HEIGHT_PT) / 2.0,
                );
            }
        }

        pages.push(ops);

        // -- Footer on every page --------------------------------------------

        let footer_y = (margin_pt * 0.5).max(14.0);
        let total_pages = pages.len();
        for (number, page_ops) in pages.iter_mut().enumerate() {
            if let Some(footer) = &options.footer_text {
                let x = margin_pt + (usable_w - est_width_pt(footer, BODY_SIZE)) / 2.0;
                push_text(page_ops, footer, BuiltinFont::Helvetica, BODY_SIZE, x, footer_y);
            }
            let label = format!("Page {} of {}", number + 1, total_pages);
            push_text_right(
                page_ops,
                &label,
                BuiltinFont::Helvetica,
                BODY_SIZE,
                right_edge,
                footer_y,
            );
        }

        let pdf_pages: Vec<PdfPage> = pages
            .into_iter()
            .map(|page_ops| PdfPage::new(page_w, page_h, page_ops))
            .collect();
        doc.with_pages(pdf_pages);

        info!(
            pages = doc.pages.len(),
            line_items = model.line_items().len(),
            "invoice layout complete"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}

// -- Layout helpers -----------------------------------------------------------

/// Column anchors: `*_x` are left edges, `*_r` right edges.
struct TableColumns {
    no_x: f32,
    desc_x: f32,
    qty_r: f32,
    price_r: f32,
    total_r: f32,
}

impl TableColumns {
    fn for_width(margin_pt: f32, usable_w: f32) -> Self {
        Self {
            no_x: margin_pt,
            desc_x: margin_pt + 0.07 * usable_w,
            qty_r: margin_pt + 0.62 * usable_w,
            price_r: margin_pt + 0.81 * usable_w,
            total_r: margin_pt + usable_w,
        }
    }
}

fn push_table_header(
    ops: &mut Vec<Op>,
    columns: &TableColumns,
    accent: &Color,
    black: &Color,
    y: &mut f32,
) {
    set_color(ops, accent);
    push_text(ops, "No.", BuiltinFont::HelveticaBold, BODY_SIZE, columns.no_x, *y);
    push_text(ops, "Description", BuiltinFont::HelveticaBold, BODY_SIZE, columns.desc_x, *y);
    push_text_right(ops, "Qty", BuiltinFont::HelveticaBold, BODY_SIZE, columns.qty_r, *y);
    push_text_right(ops, "Unit Price", BuiltinFont::HelveticaBold, BODY_SIZE, columns.price_r, *y);
    push_text_right(ops, "Total", BuiltinFont::HelveticaBold, BODY_SIZE, columns.total_r, *y);
    set_color(ops, black);
    *y -= 1.3 * LINE_HEIGHT;
}

fn push_text(ops: &mut Vec<Op>, text: &str, font: BuiltinFont, size: f32, x: f32, y: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x),
            y: Pt(y),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_owned())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn push_text_right(
    ops: &mut Vec<Op>,
    text: &str,
    font: BuiltinFont,
    size: f32,
    right_x: f32,
    y: f32,
) {
    push_text(ops, text, font, size, right_x - est_width_pt(text, size), y);
}

fn set_color(ops: &mut Vec<Op>, color: &Color) {
    ops.push(Op::SetFillColor {
        col: color.clone(),
    });
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

/// Place a registered image scaled so its rendered height is `target_h_pt`,
/// with `(x, y)` the bottom-left corner on the page.
fn place_image(
    ops: &mut Vec<Op>,
    id: &XObjectId,
    px_h: u32,
    target_h_pt: f32,
    x: f32,
    y: f32,
) {
    let native_h_pt = px_h as f32 / ASSET_DPI * 72.0;
    let scale = target_h_pt / native_h_pt;
    ops.push(Op::UseXobject {
        id: id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(x)),
            translate_y: Some(Pt(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(ASSET_DPI),
            rotate: None,
        },
    });
}

/// Approximate text width for Helvetica: average glyph width is roughly
/// half the font size.
fn est_width_pt(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * 0.50 * size
}

/// Never below 1: degenerate geometry (margins wider than the page) must
/// still let `wrap_text` consume its input.
fn max_chars_per_line(usable_w_pt: f32, size: f32) -> usize {
    ((usable_w_pt / (0.50 * size)) as usize).max(1)
}

fn address_lines(party: &Party) -> Vec<String> {
    let mut lines = Vec::new();
    if !party.street.is_empty() {
        lines.push(party.street.clone());
    }
    let locality: Vec<&str> = [&party.city, &party.region, &party.postal_code]
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect();
    if !locality.is_empty() {
        lines.push(locality.join(", "));
    }
    if !party.country.is_empty() {
        lines.push(party.country.clone());
    }
    lines
}

fn backend_failure(cause: String) -> FakturwerkError {
    FakturwerkError::RenderFailed {
        backend: "pdf".into(),
        cause,
    }
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
/// Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::with_capacity(max_width);
        for word in words {
            if word.len() > max_width {
                if !current_line.is_empty() {
                    result.push(current_line.clone());
                    current_line.clear();
                }
                let mut remaining = word;
                while remaining.len() > max_width {
                    let (chunk, rest) = remaining.split_at(max_width);
                    result.push(chunk.to_string());
                    remaining = rest;
                }
                current_line.push_str(remaining);
            } else if current_line.is_empty() {
                current_line.push_str(word);
            } else if current_line.len() + 1 + word.len() <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(current_line.clone());
                current_line.clear();
                current_line.push_str(word);
            }
        }
        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
