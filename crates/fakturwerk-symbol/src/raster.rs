// SPDX-License-Identifier: MIT
//
// Raster compositing — symbol matrix to pixel buffer to embeddable asset.
//
// The compositor is the only component that touches raw pixel memory. Each
// `rasterize` call owns a fresh bounds-checked buffer (`image::GrayImage`)
// for its lifetime; no aliasing escapes the call. Module-to-pixel mapping
// is inverse nearest-neighbour with floor rounding: pixel (x, y) samples
// module (x·mw/pw, y·mh/ph). Because x < pw implies x·mw/pw < mw, the
// mapping can never index outside the module grid, for any scale factor,
// and module boundaries always land on whole pixels.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use tracing::debug;

use fakturwerk_core::error::{FakturwerkError, Result};
use fakturwerk_core::types::AssetString;

use crate::encode::{ModulePattern, SymbolMatrix};

/// Upper bound per axis; rejects unbounded-memory requests from untrusted
/// dimension inputs.
const MAX_DIMENSION: u32 = 8192;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Lossless image containers supported for asset encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Png,
}

impl AssetFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
        }
    }
}

/// An 8-bit grayscale pixel buffer produced by `rasterize`.
///
/// Owned exclusively by its creator; the underlying buffer is only reachable
/// through bounds-checked accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: GrayImage,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_luma(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn into_luma(self) -> GrayImage {
        self.pixels
    }
}

/// Render a symbol matrix into a pixel buffer of exactly
/// `pixel_width × pixel_height`.
///
/// `quiet_zone_modules` blank modules surround the symbol (horizontally
/// only for 1-D bars) and render as background. Fails with
/// `BufferAllocationFailed` for zero or oversized dimensions.
pub fn rasterize(
    matrix: &SymbolMatrix,
    pixel_width: u32,
    pixel_height: u32,
    quiet_zone_modules: u32,
) -> Result<RasterImage> {
    check_dimensions(pixel_width, pixel_height)?;

    let quiet = quiet_zone_modules as usize;
    let (symbol_w, symbol_h) = matrix.module_extent();

    let pixels = match matrix.pattern() {
        ModulePattern::Grid {
            width,
            height,
            modules,
        } => {
            let total_w = symbol_w + 2 * quiet;
            let total_h = symbol_h + 2 * quiet;
            GrayImage::from_fn(pixel_width, pixel_height, |x, y| {
                let mx = (x as u64 * total_w as u64 / pixel_width as u64) as usize;
                let my = (y as u64 * total_h as u64 / pixel_height as u64) as usize;
                let in_symbol = mx >= quiet
                    && mx < quiet + width
                    && my >= quiet
                    && my < quiet + height;
                if in_symbol && modules[(my - quiet) * width + (mx - quiet)] {
                    DARK
                } else {
                    LIGHT
                }
            })
        }
        ModulePattern::Bars { widths } => {
            // Expand run lengths into per-module darkness once; bars span the
            // full pixel height, quiet zone applies horizontally.
            let mut columns = Vec::with_capacity(symbol_w);
            let mut dark = true;
            for run in widths {
                for _ in 0..*run {
                    columns.push(dark);
                }
                dark = !dark;
            }
            let total_w = symbol_w + 2 * quiet;
            GrayImage::from_fn(pixel_width, pixel_height, |x, _| {
                let mx = (x as u64 * total_w as u64 / pixel_width as u64) as usize;
                if mx >= quiet && mx < quiet + columns.len() && columns[mx - quiet] {
                    DARK
                } else {
                    LIGHT
                }
            })
        }
    };

    debug!(
        symbology = %matrix.symbology(),
        pixel_width,
        pixel_height,
        "rasterized symbol"
    );

    Ok(RasterImage { pixels })
}

/// Serialize a raster buffer into a lossless container, base64-encode it,
/// and wrap it as a self-contained `data:` URL.
///
/// Decoding the returned asset reproduces the exact pixel buffer.
pub fn encode_as_asset(image: &RasterImage, format: AssetFormat) -> Result<AssetString> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image.pixels.clone())
        .write_to(&mut buffer, format.image_format())
        .map_err(|err| FakturwerkError::EncodingFailed(err.to_string()))?;
    Ok(AssetString::from_encoded(
        format.mime_type(),
        buffer.get_ref(),
    ))
}

/// Full pipeline for one matrix: rasterize at its advisory dimensions and
/// encode as a PNG data URL.
pub fn compose_asset(matrix: &SymbolMatrix) -> Result<AssetString> {
    let image = rasterize(
        matrix,
        matrix.target_width(),
        matrix.target_height(),
        matrix.quiet_zone(),
    )?;
    encode_as_asset(&image, AssetFormat::Png)
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(FakturwerkError::BufferAllocationFailed {
            width,
            height,
            reason: "dimensions must be positive".into(),
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(FakturwerkError::BufferAllocationFailed {
            width,
            height,
            reason: format!("dimensions exceed maximum of {MAX_DIMENSION}"),
        });
    }
    Ok(())
}
