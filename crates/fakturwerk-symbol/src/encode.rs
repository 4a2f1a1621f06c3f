// SPDX-License-Identifier: MIT
//
// Symbol encoding — payload text to abstract symbol matrix.
//
// Encoding is pure and deterministic: the same (payload, symbology) pair
// always yields a bit-identical matrix. Pixel dimensions carried on the
// matrix are advisory hints for the raster compositor; the symbol structure
// itself is resolution-independent.

use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use fakturwerk_core::error::{FakturwerkError, Result};

use crate::code128;

/// Quiet zone required around a QR symbol, in modules.
const QR_QUIET_ZONE: u32 = 4;
/// Quiet zone required on each side of a Code 128 symbol, in modules.
const CODE128_QUIET_ZONE: u32 = 10;

/// Supported symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Qr,
    Code128,
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qr => f.write_str("QR"),
            Self::Code128 => f.write_str("Code128"),
        }
    }
}

/// Module layout of an encoded symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModulePattern {
    /// 2-D grid of dark/light modules, row-major.
    Grid {
        width: usize,
        height: usize,
        modules: Vec<bool>,
    },
    /// 1-D alternating dark/light run lengths, starting with a dark bar.
    Bars { widths: Vec<u8> },
}

/// An encoded symbol prior to pixel rendering. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    symbology: Symbology,
    pattern: ModulePattern,
    quiet_zone: u32,
    target_width: u32,
    target_height: u32,
}

impl SymbolMatrix {
    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    pub fn pattern(&self) -> &ModulePattern {
        &self.pattern
    }

    /// Mandatory blank margin around the symbol, in modules per side.
    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    /// Advisory pixel width hint for the compositor.
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    /// Advisory pixel height hint for the compositor.
    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    /// Symbol extent in modules, excluding the quiet zone.
    pub fn module_extent(&self) -> (usize, usize) {
        match &self.pattern {
            ModulePattern::Grid { width, height, .. } => (*width, *height),
            ModulePattern::Bars { widths } => {
                (widths.iter().map(|w| *w as usize).sum(), 1)
            }
        }
    }
}

/// Encode a payload into a symbol matrix for the given symbology.
///
/// QR symbols are always encoded at error-correction level H so a partially
/// damaged print stays scannable; this is policy, not a caller option.
pub fn encode(
    payload: &str,
    symbology: Symbology,
    target_width: u32,
    target_height: u32,
) -> Result<SymbolMatrix> {
    let (pattern, quiet_zone) = match symbology {
        Symbology::Qr => (encode_qr(payload)?, QR_QUIET_ZONE),
        Symbology::Code128 => (
            ModulePattern::Bars {
                widths: code128::encode_runs(payload)?,
            },
            CODE128_QUIET_ZONE,
        ),
    };

    debug!(%symbology, payload_len = payload.len(), "encoded symbol");

    Ok(SymbolMatrix {
        symbology,
        pattern,
        quiet_zone,
        target_width,
        target_height,
    })
}

fn encode_qr(payload: &str) -> Result<ModulePattern> {
    // Byte-mode QR accepts any payload content; the only reachable failure
    // at a fixed EC level is exceeding symbol capacity.
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H).map_err(
        |_| FakturwerkError::PayloadTooLarge {
            symbology: "QR".into(),
            length: payload.len(),
        },
    )?;

    let width = code.width();
    let modules: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|module| module == Color::Dark)
        .collect();

    Ok(ModulePattern::Grid {
        width,
        height: width,
        modules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_encoding_is_deterministic() {
        let first = encode("INV-0007", Symbology::Qr, 200, 200).unwrap();
        let second = encode("INV-0007", Symbology::Qr, 200, 200).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn qr_grid_is_square_with_quiet_zone_four() {
        let matrix = encode("INV-0007", Symbology::Qr, 200, 200).unwrap();
        let (w, h) = matrix.module_extent();
        assert_eq!(w, h);
        assert_eq!(matrix.quiet_zone(), 4);
        match matrix.pattern() {
            ModulePattern::Grid {
                width,
                height,
                modules,
            } => assert_eq!(modules.len(), width * height),
            ModulePattern::Bars { .. } => panic!("QR must encode as a grid"),
        }
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = "x".repeat(5000);
        let err = encode(&payload, Symbology::Qr, 200, 200).unwrap_err();
        assert!(matches!(
            err,
            FakturwerkError::PayloadTooLarge { length: 5000, .. }
        ));
    }

    #[test]
    fn code128_encodes_as_bars_with_quiet_zone_ten() {
        let matrix = encode("INV-0007", Symbology::Code128, 300, 80).unwrap();
        assert_eq!(matrix.quiet_zone(), 10);
        let (w, h) = matrix.module_extent();
        assert_eq!(h, 1);
        assert_eq!(w, 10 * 11 + 13);
    }

    #[test]
    fn code128_rejects_unsupported_characters() {
        let err = encode("RECHNUNG-ÄÖÜ", Symbology::Code128, 300, 80).unwrap_err();
        assert!(matches!(err, FakturwerkError::UnsupportedCharacter { .. }));
    }

    #[test]
    fn target_dimensions_do_not_affect_structure() {
        let small = encode("INV-0007", Symbology::Qr, 50, 50).unwrap();
        let large = encode("INV-0007", Symbology::Qr, 1000, 1000).unwrap();
        assert_eq!(small.pattern(), large.pattern());
        assert_eq!(small.target_width(), 50);
        assert_eq!(large.target_width(), 1000);
    }
}
