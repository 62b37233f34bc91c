use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token proving control of an email address, valid for a fixed
/// window after issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationToken {
    pub token: String,
    pub customer_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
}

impl EmailVerificationToken {
    pub fn issue(customer_id: Uuid, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            token: generate_token(),
            customer_id,
            email: email.to_string(),
            created_at: now,
            verified_at: None,
            is_verified: false,
        }
    }

    pub fn is_expired(&self, ttl_hours: i64, now: DateTime<Utc>) -> bool {
        now > self.created_at + Duration::hours(ttl_hours)
    }
}

/// 64 hex chars of random material.
fn generate_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::EmailVerificationToken;

    #[test]
    fn token_is_64_chars_and_unique() {
        let now = Utc::now();
        let a = EmailVerificationToken::issue(Uuid::new_v4(), "a@example.com", now);
        let b = EmailVerificationToken::issue(Uuid::new_v4(), "b@example.com", now);
        assert_eq!(a.token.len(), 64);
        assert_ne!(a.token, b.token);
        assert!(!a.is_verified);
    }

    #[test]
    fn expires_after_ttl() {
        let issued = Utc::now() - Duration::hours(25);
        let token = EmailVerificationToken::issue(Uuid::new_v4(), "a@example.com", issued);
        assert!(token.is_expired(24, Utc::now()));
        assert!(!token.is_expired(48, Utc::now()));
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let token = EmailVerificationToken::issue(Uuid::new_v4(), "a@example.com", Utc::now());
        assert!(!token.is_expired(24, Utc::now()));
    }
}
