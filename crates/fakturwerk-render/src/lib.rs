// SPDX-License-Identifier: MIT
//
// fakturwerk-render — Output backends for the Fakturwerk invoice engine.
//
// Defines the `RenderBackend` trait plus the two shipped implementations:
// a native PDF renderer (the reference backend) and a self-contained HTML
// renderer. Backends are selected at runtime by name via `backend_by_name`.

pub mod backend;
pub mod html;
pub mod pdf;

// Re-export the primary types so callers can use `fakturwerk_render::PdfBackend` etc.
pub use backend::{backend_by_name, ColorMode, RenderBackend, RenderOptions, BACKEND_NAMES};
pub use html::HtmlBackend;
pub use pdf::PdfBackend;
