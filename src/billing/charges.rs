//! Weight-based charge computation. The weight field is free text supplied
//! by the customer ("2.5 kg", "500g"), so this is deliberately fail-soft:
//! anything unparseable gets the default charge, never an error.

/// Rate per 500 g or part thereof, in paise.
const RATE_PER_UNIT: i64 = 2_000;
/// Grams covered by one rate unit.
const UNIT_GRAMS: i64 = 500;
/// Charge cap, in paise.
const CHARGE_CAP: i64 = 20_000;
/// Fallback when the weight string has no usable number, in paise.
const DEFAULT_CHARGE: i64 = 5_000;

/// Maps a declared weight string to a charge in paise.
pub fn weight_charge_paise(weight: &str) -> i64 {
    let normalized = weight.trim().to_lowercase();

    let Some(value) = first_number(&normalized) else {
        return DEFAULT_CHARGE;
    };

    let grams = if normalized.contains("kg") {
        value * 1000.0
    } else {
        value
    };

    // Whole grams, rounding partial grams up. Non-finite or oversized
    // values already exceed the cap, so they short-circuit before the
    // integer conversion can overflow.
    let grams = grams.ceil();
    if !grams.is_finite() || grams >= (CHARGE_CAP / RATE_PER_UNIT * UNIT_GRAMS) as f64 {
        return CHARGE_CAP;
    }

    let units = (grams as i64).div_ceil(UNIT_GRAMS);
    (units * RATE_PER_UNIT).clamp(0, CHARGE_CAP)
}

/// First numeric token: a run of digits with at most one embedded decimal
/// point, e.g. "2.5" out of "approx 2.5 kg".
fn first_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;

    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot && end + 1 < bytes.len() && bytes[end + 1].is_ascii_digit() => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    s[start..end].parse::<f64>().ok()
}
