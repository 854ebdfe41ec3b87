//! # Receipt Rendering
//!
//! Plain-text rendering of a finalized sale, plus best-effort file
//! export. Rendering is pure; it reads only the persisted receipt and
//! line-item snapshots, so the output is stable no matter how the
//! catalog changes afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minimart_core::{SaleLineItem, SaleReceipt};

const RULE: &str =
    "--------------------------------------------------";

/// Renders a receipt as display text.
pub fn render_receipt(sale: &SaleReceipt, items: &[SaleLineItem]) -> String {
    let mut out = String::new();

    out.push_str(&sale.store_name);
    out.push('\n');
    out.push_str("SALES RECEIPT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("No:   {}\n", sale.receipt_number));
    out.push_str(&format!(
        "Date: {}\n",
        sale.issued_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(RULE);
    out.push('\n');

    for item in items {
        out.push_str(&format!(
            "{} x{} @ {} = {}\n",
            item.product_name,
            item.quantity,
            item.unit_price(),
            item.line_total()
        ));
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Subtotal: {}\n", sale.subtotal()));
    out.push_str(&format!("Tax:      {}\n", sale.tax()));
    out.push_str(&format!("Total:    {}\n", sale.grand_total()));

    out
}

/// Writes the rendered receipt to `<dir>/<receipt_number>.pdf`.
///
/// The file carries a `.pdf` extension for operator familiarity but
/// holds the plain-text rendering; there is no PDF engine behind it.
/// Creates `dir` if needed. Callers treat failures as non-fatal.
pub fn export_receipt(
    dir: &Path,
    sale: &SaleReceipt,
    items: &[SaleLineItem],
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.pdf", sale.receipt_number));
    fs::write(&path, render_receipt(sale, items))?;
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================
