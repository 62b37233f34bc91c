use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact and address defaults for a registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 10-digit mobile number starting with 6-9.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10
        && phone.chars().all(|c| c.is_ascii_digit())
        && matches!(phone.as_bytes()[0], b'6'..=b'9')
}

/// 6-digit postal code.
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{is_valid_phone, is_valid_pincode};

    #[test]
    fn phone_must_be_ten_digits_starting_six_to_nine() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("6000000000"));
        assert!(!is_valid_phone("5876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765432100"));
        assert!(!is_valid_phone("98765abc10"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn pincode_must_be_six_digits() {
        assert!(is_valid_pincode("600001"));
        assert!(!is_valid_pincode("60001"));
        assert!(!is_valid_pincode("6000011"));
        assert!(!is_valid_pincode("60000a"));
    }
}
