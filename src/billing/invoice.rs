use chrono::Utc;
use dashmap::mapref::entry::Entry;

use crate::billing::charges::weight_charge_paise;
use crate::models::invoice::Invoice;
use crate::models::pickup::PickupRequest;
use crate::state::AppState;

/// Creates the invoice for a pickup request, or recomputes the existing one.
/// Idempotent by request id: re-invocation updates totals in place and keeps
/// the invoice number and generation timestamp.
pub fn build_invoice(state: &AppState, pickup: &PickupRequest) -> Invoice {
    let now = Utc::now();
    let weight_charge = weight_charge_paise(&pickup.parcel_weight);

    let invoice = match state.invoices.entry(pickup.id) {
        Entry::Occupied(mut existing) => {
            let invoice = existing.get_mut();
            invoice.base_charge = state.config.base_charge_paise;
            invoice.weight_charge = weight_charge;
            invoice.tax_percent = state.config.tax_percent;
            invoice.recompute_totals();
            invoice.updated_at = now;
            invoice.clone()
        }
        Entry::Vacant(slot) => {
            let mut invoice = Invoice {
                pickup_request_id: pickup.id,
                invoice_number: next_invoice_number(state),
                base_charge: state.config.base_charge_paise,
                weight_charge,
                tax_percent: state.config.tax_percent,
                tax_amount: 0,
                total_amount: 0,
                generated_at: now,
                updated_at: now,
            };
            invoice.recompute_totals();
            slot.insert(invoice.clone());
            invoice
        }
    };

    state.metrics.invoices_generated_total.inc();
    invoice
}

/// INV-<YYYYMMDD>-<seq>, where seq restarts at 1 each day. The sequence is
/// advanced through the DashMap entry API, so concurrent acceptances on the
/// same day cannot observe the same value.
fn next_invoice_number(state: &AppState) -> String {
    let day = Utc::now().format("%Y%m%d").to_string();
    let seq = {
        let mut counter = state.invoice_day_seq.entry(day.clone()).or_insert(0);
        *counter += 1;
        *counter
    };
    format!("INV-{day}-{seq:03}")
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    use super::build_invoice;
    use crate::config::Config;
    use crate::models::pickup::{PickupRequest, PickupStatus};
    use crate::notify::mailer::Mailer;
    use crate::state::AppState;

    fn test_state() -> AppState {
        let (state, _rx) = AppState::new(Config::default(), Mailer::Log);
        state
    }

    fn pickup(weight: &str) -> PickupRequest {
        let now = Utc::now();
        PickupRequest {
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
            parcel_weight: weight.to_string(),
            estimated_value_paise: Some(50_000),
            preferred_pickup_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            preferred_pickup_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            status: PickupStatus::Accepted,
            admin_notes: None,
            requested_at: now,
            reviewed_at: Some(now),
            completed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn totals_for_two_and_a_half_kg() {
        let state = test_state();
        let invoice = build_invoice(&state, &pickup("2.5 kg"));

        assert_eq!(invoice.base_charge, 10_000);
        assert_eq!(invoice.weight_charge, 10_000);
        assert_eq!(invoice.tax_amount, 3_600);
        assert_eq!(invoice.total_amount, 23_600);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let state = test_state();
        let p = pickup("1kg");

        let first = build_invoice(&state, &p);
        let second = build_invoice(&state, &p);

        assert_eq!(state.invoices.len(), 1);
        assert_eq!(first.invoice_number, second.invoice_number);
        assert_eq!(first.generated_at, second.generated_at);
        assert_eq!(first.total_amount, second.total_amount);
    }

    #[test]
    fn rebuild_recomputes_rather_than_accumulates() {
        let state = test_state();
        let mut p = pickup("1kg");

        let first = build_invoice(&state, &p);
        p.parcel_weight = "2kg".to_string();
        let second = build_invoice(&state, &p);

        assert_eq!(first.weight_charge, 4_000);
        assert_eq!(second.weight_charge, 8_000);
        assert_eq!(second.total_amount, (10_000 + 8_000) * 118 / 100);
    }

    #[test]
    fn invoice_numbers_are_daily_sequential() {
        let state = test_state();
        let day = Utc::now().format("%Y%m%d").to_string();

        let a = build_invoice(&state, &pickup("1kg"));
        let b = build_invoice(&state, &pickup("1kg"));

        assert_eq!(a.invoice_number, format!("INV-{day}-001"));
        assert_eq!(b.invoice_number, format!("INV-{day}-002"));
    }

    #[test]
    fn concurrent_builds_get_distinct_numbers() {
        let state = std::sync::Arc::new(test_state());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(std::thread::spawn(move || {
                build_invoice(&state, &pickup("1kg")).invoice_number
            }));
        }

        let mut numbers: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().expect("builder thread"))
            .collect();
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 8);
    }
}
