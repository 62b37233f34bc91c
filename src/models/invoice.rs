use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Computed bill for an accepted pickup request, one-to-one by request id.
/// All amounts are integer paise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub pickup_request_id: Uuid,
    pub invoice_number: String,
    pub base_charge: i64,
    pub weight_charge: i64,
    pub tax_percent: u32,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn subtotal(&self) -> i64 {
        self.base_charge + self.weight_charge
    }

    /// Recomputes tax and total from the stored charges; never accumulates.
    pub fn recompute_totals(&mut self) {
        self.tax_amount = self.subtotal() * i64::from(self.tax_percent) / 100;
        self.total_amount = self.subtotal() + self.tax_amount;
    }
}

/// Formats paise as a rupee amount, e.g. 23_600 -> "236.00".
pub fn format_paise(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{format_paise, Invoice};

    fn invoice(base: i64, weight: i64, tax_percent: u32) -> Invoice {
        let mut inv = Invoice {
            pickup_request_id: Uuid::new_v4(),
            invoice_number: "INV-20260829-001".to_string(),
            base_charge: base,
            weight_charge: weight,
            tax_percent,
            tax_amount: 0,
            total_amount: 0,
            generated_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inv.recompute_totals();
        inv
    }

    #[test]
    fn totals_follow_base_plus_weight_plus_tax() {
        let inv = invoice(10_000, 10_000, 18);
        assert_eq!(inv.subtotal(), 20_000);
        assert_eq!(inv.tax_amount, 3_600);
        assert_eq!(inv.total_amount, 23_600);
    }

    #[test]
    fn recompute_does_not_accumulate() {
        let mut inv = invoice(10_000, 4_000, 18);
        let first_total = inv.total_amount;
        inv.recompute_totals();
        inv.recompute_totals();
        assert_eq!(inv.total_amount, first_total);
    }

    #[test]
    fn paise_formatting() {
        assert_eq!(format_paise(23_600), "236.00");
        assert_eq!(format_paise(5), "0.05");
        assert_eq!(format_paise(-150), "-1.50");
    }
}
