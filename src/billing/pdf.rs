//! Invoice rendering. Produces a single-page Letter document: company
//! header, invoice metadata, customer block, pickup details, itemized
//! charges and terms, returned as raw PDF bytes.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::error::AppError;
use crate::models::invoice::{format_paise, Invoice};
use crate::models::pickup::PickupRequest;

const PAGE_WIDTH_MM: f64 = 215.9;
const PAGE_HEIGHT_MM: f64 = 279.4;
const MARGIN_MM: f64 = 12.7;

struct Page {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl Page {
    fn heading(&mut self, text: &str) {
        self.y -= 4.0;
        self.layer
            .use_text(text, 12.0, Mm(MARGIN_MM), Mm(self.y), &self.bold);
        self.y -= 6.0;
    }

    fn field(&mut self, label: &str, value: &str) {
        self.layer
            .use_text(label, 10.0, Mm(MARGIN_MM), Mm(self.y), &self.bold);
        self.layer
            .use_text(value, 10.0, Mm(MARGIN_MM + 45.0), Mm(self.y), &self.regular);
        self.y -= 5.5;
    }

    fn charge_row(&mut self, description: &str, amount: i64, emphasized: bool) {
        let font = if emphasized { &self.bold } else { &self.regular };
        self.layer
            .use_text(description, 10.0, Mm(MARGIN_MM), Mm(self.y), font);
        self.layer.use_text(
            format_paise(amount),
            10.0,
            Mm(PAGE_WIDTH_MM - MARGIN_MM - 30.0),
            Mm(self.y),
            font,
        );
        self.y -= 5.5;
    }

    fn text(&mut self, text: &str, size: f64) {
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), &self.regular);
        self.y -= 4.5;
    }

    fn rule(&mut self) {
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(self.y + 1.5)), false),
                (
                    Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(self.y + 1.5)),
                    false,
                ),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        };
        self.layer.add_shape(line);
        self.y -= 2.0;
    }
}

pub fn render_invoice_pdf(
    pickup: &PickupRequest,
    invoice: &Invoice,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, AppError> {
    let (doc, page_idx, layer_idx) = PdfDocument::new(
        format!("Invoice {}", invoice.invoice_number),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "invoice",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| AppError::Internal(format!("pdf font error: {err}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| AppError::Internal(format!("pdf font error: {err}")))?;

    let mut page = Page {
        layer: doc.get_page(page_idx).get_layer(layer_idx),
        regular,
        bold,
        y: PAGE_HEIGHT_MM - MARGIN_MM - 10.0,
    };

    // Company header
    page.layer.use_text(
        "MERIDIAN LOGISTICS",
        24.0,
        Mm(MARGIN_MM),
        Mm(page.y),
        &page.bold,
    );
    page.y -= 8.0;
    page.text("Doorstep Parcel Pickup Service", 12.0);
    page.y -= 4.0;
    page.rule();

    // Invoice metadata
    page.heading("INVOICE");
    page.field("Invoice #:", &invoice.invoice_number);
    page.field("Date:", &invoice.generated_at.format("%d-%m-%Y").to_string());
    page.field("Request #:", &pickup.id.to_string());

    // Customer block
    page.heading("CUSTOMER INFORMATION");
    page.field("Name:", &pickup.full_name);
    page.field("Email:", &pickup.email);
    page.field("Phone:", &pickup.phone_number);
    page.field(
        "Address:",
        &format!(
            "{}, {}, {} {}",
            pickup.address, pickup.city, pickup.state, pickup.pincode
        ),
    );

    // Pickup details
    page.heading("PICKUP DETAILS");
    page.field(
        "Pickup Date:",
        &pickup.preferred_pickup_date.format("%d-%m-%Y").to_string(),
    );
    page.field(
        "Pickup Time:",
        &pickup.preferred_pickup_time.format("%H:%M").to_string(),
    );
    page.field("Parcel Weight:", &pickup.parcel_weight);
    page.field("Description:", &truncate(&pickup.parcel_description, 100));
    if let Some(value) = pickup.estimated_value_paise {
        page.field("Estimated Value:", &format_paise(value));
    }

    // Charges table; tax is split into two half-rate lines, the second
    // taking the rounding remainder.
    let half_tax = invoice.tax_amount / 2;
    page.heading("CHARGES & AMOUNT");
    page.rule();
    page.charge_row("Base Pickup Charge", invoice.base_charge, false);
    page.charge_row("Weight-based Charge", invoice.weight_charge, false);
    page.charge_row("Subtotal", invoice.subtotal(), false);
    page.charge_row(
        &format!("CGST ({}%)", invoice.tax_percent / 2),
        half_tax,
        false,
    );
    page.charge_row(
        &format!("SGST ({}%)", invoice.tax_percent - invoice.tax_percent / 2),
        invoice.tax_amount - half_tax,
        false,
    );
    page.rule();
    page.charge_row("TOTAL AMOUNT", invoice.total_amount, true);
    page.rule();

    // Terms
    page.heading("TERMS & CONDITIONS");
    for term in [
        "1. This invoice confirms that your pickup request has been accepted.",
        "2. Our representative will arrive at the specified date and time;",
        "   please ensure someone is available to hand over the parcel.",
        "3. Payment can be made at the time of pickup or online.",
        "4. Please ensure the parcel is properly packed and protected.",
        "5. Maximum liability is limited to the declared parcel value.",
        "6. For inquiries contact support@meridianlogistics.example.",
    ] {
        page.text(term, 9.0);
    }

    // Footer
    page.y -= 4.0;
    page.text(
        &format!("Generated on: {}", now.format("%d-%m-%Y %H:%M:%S")),
        8.0,
    );

    let mut buffer = Vec::new();
    doc.save(&mut BufWriter::new(&mut buffer))
        .map_err(|err| AppError::Internal(format!("pdf render failed: {err}")))?;
    Ok(buffer)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    use super::{render_invoice_pdf, truncate};
    use crate::models::invoice::Invoice;
    use crate::models::pickup::{PickupRequest, PickupStatus};

    #[test]
    fn renders_a_pdf_byte_stream() {
        let now = Utc::now();
        let pickup = PickupRequest {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            full_name: "Asha Raman".to_string(),
            email: "asha@example.com".to_string(),
            phone_number: "9876543210".to_string(),
            address: "12 Canal Street".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600001".to_string(),
            parcel_description: "Books".to_string(),
            parcel_weight: "2.5 kg".to_string(),
            estimated_value_paise: Some(50_000),
            preferred_pickup_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            preferred_pickup_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            status: PickupStatus::Accepted,
            admin_notes: None,
            requested_at: now,
            reviewed_at: Some(now),
            completed_at: None,
            updated_at: now,
        };
        let mut invoice = Invoice {
            pickup_request_id: pickup.id,
            invoice_number: "INV-20260829-001".to_string(),
            base_charge: 10_000,
            weight_charge: 10_000,
            tax_percent: 18,
            tax_amount: 0,
            total_amount: 0,
            generated_at: now,
            updated_at: now,
        };
        invoice.recompute_totals();

        let bytes = render_invoice_pdf(&pickup, &invoice, now).expect("pdf renders");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(150);
        let out = truncate(&long, 100);
        assert_eq!(out.chars().count(), 103);
        assert!(out.ends_with("..."));
        assert_eq!(truncate("short", 100), "short");
    }
}
