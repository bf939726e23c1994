use std::path::Path;
use std::process::Command;

use crate::billing::InvoiceDocument;
use crate::error::{Result, SolarError};

/// Embedded Typst template for the GST tax invoice.
/// Uses a placeholder that gets replaced with the actual JSON file path
const INVOICE_TEMPLATE: &str = r##"// Tax Invoice Template
// Data is loaded from JSON file; amounts arrive preformatted

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 18mm, bottom: 18mm, left: 16mm, right: 16mm),
)

#set text(font: "Helvetica", size: 9.5pt)

#let party(p) = [
  #text(weight: "bold")[#p.name] \
  #p.address \
  #p.city \
  Ph: #p.phone \
  #p.email
  #if p.gstin != none [
    \ GSTIN: #p.gstin
  ]
]

// Header with company info and invoice details
#grid(
  columns: (1fr, auto),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[#data.seller.name]
    #if data.seller.tagline != none [
      \ #text(size: 9pt, fill: gray)[#data.seller.tagline]
    ]
    #v(0.3em)
    #data.seller.address, #data.seller.city \
    Ph: #data.seller.phone | #data.seller.email
    #if data.seller.gstin != none [
      \ *GSTIN:* #data.seller.gstin
    ]
  ],
  [
    #text(size: 20pt, weight: "bold")[TAX INVOICE]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Date:*], [#data.date],
      [*Due Date:*], [#data.due_date],
      [*Status:*], [#data.status],
    )
  ]
)

#v(0.8em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(0.8em)

// Bill To section
#text(weight: "bold", size: 11pt)[Bill To:]
#v(0.3em)
#party(data.buyer)

#v(1.2em)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto, auto),
  align: (center, left, center, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 7pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  // Header
  [*\#*], [*Description*], [*HSN/SAC*], [*Qty*], [*Rate*], [*Amount*],

  // Items
  ..data.items.map(item => (
    str(item.index),
    item.name,
    item.hsn,
    item.quantity,
    item.rate,
    item.amount,
  )).flatten()
)

#v(0.8em)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 5pt,

    [Subtotal:], [#data.subtotal],
    [CGST (9%):], [#data.cgst],
    [SGST (9%):], [#data.sgst],

    table.hline(stroke: 1pt),
    [*Total:*], [*#data.total*],
  )
]

#text(weight: "bold")[Amount in words:] #data.amount_in_words

#if data.notes != none [
  #v(0.8em)
  #text(weight: "bold")[Notes:] #data.notes
]

#v(1.5em)

// Payment details
#grid(
  columns: (1fr, 1fr),
  [
    #if data.bank != none [
      #text(weight: "bold", size: 10.5pt)[Bank Details]
      #v(0.2em)
      #data.bank.account_name \
      #data.bank.bank, #data.bank.branch \
      A/c: #data.bank.account \
      IFSC: #data.bank.ifsc
    ]
  ],
  [
    #if data.upi_id != none [
      #text(weight: "bold", size: 10.5pt)[Pay via UPI]
      #v(0.2em)
      #data.upi_id
    ]
  ],
)

#v(2em)
#align(right)[
  For *#data.seller.name* \
  #v(2.5em)
  Authorised Signatory
]

#v(1fr)
#align(center)[
  #text(size: 8pt, fill: gray)[This is a computer generated invoice.]
]
"##;

/// Generate PDF using Typst CLI
pub fn generate_pdf(document: &InvoiceDocument, output_path: &Path) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(SolarError::TypstNotFound);
    }

    // One scratch directory per process so concurrent runs do not clash
    let temp_dir = std::env::temp_dir().join(format!("solarbook-{}", std::process::id()));
    std::fs::create_dir_all(&temp_dir)?;

    let json_data =
        serde_json::to_string(document).map_err(|e| SolarError::PdfGeneration(e.to_string()))?;
    let json_path = temp_dir.join("data.json");
    std::fs::write(&json_path, &json_data)?;

    // Template with relative JSON path (data.json is in same directory)
    let template_content = INVOICE_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
    let template_path = temp_dir.join("invoice.typ");
    std::fs::write(&template_path, &template_content)?;

    tracing::debug!(
        template = %template_path.display(),
        output = %output_path.display(),
        "running typst compile"
    );
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output();

    // Clean up temp files
    let _ = std::fs::remove_dir_all(&temp_dir);

    let output = output?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SolarError::PdfGeneration(stderr.trim().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_reads_every_document_section() {
        for field in [
            "data.seller.gstin",
            "data.buyer",
            "item.hsn",
            "data.cgst",
            "data.sgst",
            "data.amount_in_words",
            "data.bank.ifsc",
            "data.upi_id",
            "data.notes",
        ] {
            assert!(INVOICE_TEMPLATE.contains(field), "template misses {field}");
        }
        assert!(INVOICE_TEMPLATE.contains("DATA_JSON_PATH"));
    }
}
