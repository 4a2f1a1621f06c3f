// SPDX-License-Identifier: MIT
//
// Fakturwerk — invoice document generator
//
// Entry point. Initialises logging, parses the command line, builds the
// invoice model, attaches tracking symbols, and hands off to the selected
// render backend.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use fakturwerk_core::config::BackendConfig;
use fakturwerk_core::error::Result;
use fakturwerk_core::types::{InvoiceDraft, InvoiceModel, LineItem, PageSize, Party};
use fakturwerk_render::{backend_by_name, ColorMode, RenderOptions, BACKEND_NAMES};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Fakturwerk starting");

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "invoice written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "invoice generation failed");
            ExitCode::FAILURE
        }
    }
}

const USAGE: &str = "\
Usage: fakturwerk [OPTIONS]

Options:
  --backend <NAME>    Output backend: pdf (default) or html
  --draft <FILE>      Read the invoice draft from a JSON file
  --output <FILE>     Output path (default: invoice.<backend>)
  --page-size <SIZE>  a4 (default), a5, letter, legal
  --grayscale         Render without accent colours
  --no-symbols        Skip QR/barcode tracking symbols";

/// What a parsed command line asks for: generate an invoice, or just help.
enum Command {
    Run(CliArgs),
    Help,
}

struct CliArgs {
    backend: String,
    draft: Option<PathBuf>,
    output: Option<PathBuf>,
    page_size: Option<PageSize>,
    grayscale: bool,
    symbols: bool,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> std::result::Result<Command, String> {
        let mut parsed = Self {
            backend: "pdf".to_owned(),
            draft: None,
            output: None,
            page_size: None,
            grayscale: false,
            symbols: true,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--backend" => {
                    parsed.backend = take_value(&mut args, "--backend")?;
                    if !BACKEND_NAMES.contains(&parsed.backend.as_str()) {
                        return Err(format!(
                            "unknown backend '{}' (available: {})",
                            parsed.backend,
                            BACKEND_NAMES.join(", ")
                        ));
                    }
                }
                "--draft" => parsed.draft = Some(take_value(&mut args, "--draft")?.into()),
                "--output" => parsed.output = Some(take_value(&mut args, "--output")?.into()),
                "--page-size" => {
                    let raw = take_value(&mut args, "--page-size")?;
                    parsed.page_size = Some(match raw.to_ascii_lowercase().as_str() {
                        "a4" => PageSize::A4,
                        "a5" => PageSize::A5,
                        "letter" => PageSize::Letter,
                        "legal" => PageSize::Legal,
                        other => return Err(format!("unknown page size '{other}'")),
                    });
                }
                "--grayscale" => parsed.grayscale = true,
                "--no-symbols" => parsed.symbols = false,
                "--help" | "-h" => return Ok(Command::Help),
                other => return Err(format!("unexpected argument '{other}'")),
            }
        }

        Ok(Command::Run(parsed))
    }
}

fn take_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> std::result::Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn run(args: CliArgs) -> Result<PathBuf> {
    let draft = match &args.draft {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        }
        None => sample_draft(),
    };

    let mut model = InvoiceModel::new(draft)?;
    if args.symbols {
        fakturwerk_symbol::attach_tracking_symbols(&mut model)?;
    }

    let config = BackendConfig::default();
    let backend = backend_by_name(&args.backend, &config)?;

    let options = RenderOptions {
        page_size: args.page_size,
        color_mode: if args.grayscale {
            ColorMode::Grayscale
        } else {
            ColorMode::Color
        },
        ..Default::default()
    };

    let bytes = backend.render(&model, &options)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("invoice.{}", backend.name())));
    std::fs::write(&output, &bytes)?;

    Ok(output)
}

/// Built-in demonstration draft used when no `--draft` file is given.
fn sample_draft() -> InvoiceDraft {
    let line_items = vec![
        LineItem {
            index: 1,
            name: "Rustic Cotton Shirt".into(),
            quantity: 2,
            unit_price: Decimal::new(2450, 2),
        },
        LineItem {
            index: 2,
            name: "Handcrafted Granite Table".into(),
            quantity: 1,
            unit_price: Decimal::new(31900, 2),
        },
        LineItem {
            index: 3,
            name: "Small Steel Keyboard".into(),
            quantity: 3,
            unit_price: Decimal::new(4825, 2),
        },
    ];

    InvoiceDraft {
        invoice_number: "INV-0007".into(),
        invoice_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap_or_default(),
        due_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap_or_default(),
        issuer: Party {
            name: "EasyPOS GmbH".into(),
            street: "566 Jovan Shoals".into(),
            city: "East Edythe".into(),
            region: "PA".into(),
            postal_code: "42103".into(),
            country: "Germany".into(),
        },
        recipient: Party {
            name: "Gorczany - Mitchell".into(),
            street: "12 Harbor Lane".into(),
            city: "Port Kiera".into(),
            region: "NV".into(),
            postal_code: "88412".into(),
            country: "United States".into(),
        },
        line_items,
        discount_rate: Decimal::new(5, 2),
        tax_rate: Decimal::new(10, 2),
        notes: "Thank you for your business!".into(),
        terms: "Payment is due within 30 days. Late payments are subject to a 2% monthly fee."
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(raw: &[&str]) -> CliArgs {
        match CliArgs::parse(raw.iter().map(|s| s.to_string())).unwrap() {
            Command::Run(args) => args,
            Command::Help => panic!("expected a run command"),
        }
    }

    #[test]
    fn parses_defaults() {
        let args = parse_run(&[]);
        assert_eq!(args.backend, "pdf");
        assert!(args.symbols);
        assert!(!args.grayscale);
        assert!(args.page_size.is_none());
    }

    #[test]
    fn parses_full_invocation() {
        let args = parse_run(&[
            "--backend",
            "html",
            "--output",
            "out.html",
            "--page-size",
            "letter",
            "--grayscale",
            "--no-symbols",
        ]);
        assert_eq!(args.backend, "html");
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out.html")));
        assert_eq!(args.page_size, Some(PageSize::Letter));
        assert!(args.grayscale);
        assert!(!args.symbols);
    }

    #[test]
    fn rejects_unknown_backend() {
        let raw = ["--backend", "wkhtmltopdf"];
        assert!(CliArgs::parse(raw.iter().map(|s| s.to_string())).is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        for flag in ["--help", "-h"] {
            assert!(matches!(
                CliArgs::parse(std::iter::once(flag.to_string())),
                Ok(Command::Help)
            ));
        }
    }

    #[test]
    fn rejects_missing_value() {
        let raw = ["--output"];
        assert!(CliArgs::parse(raw.iter().map(|s| s.to_string())).is_err());
    }

    #[test]
    fn sample_draft_builds_a_model() {
        let model = InvoiceModel::new(sample_draft()).unwrap();
        assert_eq!(model.line_items().len(), 3);
        assert!(model.totals().balance_due > Decimal::ZERO);
    }

    #[test]
    fn run_writes_an_html_invoice() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("invoice.html");
        let args = CliArgs {
            backend: "html".into(),
            draft: None,
            output: Some(output.clone()),
            page_size: None,
            grayscale: false,
            symbols: true,
        };
        let written = run(args).unwrap();
        assert_eq!(written, output);
        let html = std::fs::read_to_string(&written).unwrap();
        assert!(html.contains("INV-0007"));
        assert!(html.contains("data:image/png;base64,"));
    }
}
