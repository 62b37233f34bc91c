//! Customer registration and email verification.
//!
//! Profiles start with `email_verified = false`; submitting a pickup request
//! is gated on the flag, and redeeming a verification token is the only way
//! to set it. Marking the token and updating the profile are two explicit
//! steps; a missing profile is surfaced, not swallowed.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::models::customer::{is_valid_phone, is_valid_pincode, CustomerProfile};
use crate::models::verification::EmailVerificationToken;
use crate::notify::{queue, Notification};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Creates a profile, issues a verification token and queues the welcome
/// and verification mails.
pub async fn register_customer(
    state: &AppState,
    form: RegistrationForm,
) -> Result<CustomerProfile, AppError> {
    if form.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full name cannot be empty".to_string()));
    }
    if !form.email.contains('@') {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }
    if !is_valid_phone(&form.phone_number) {
        return Err(AppError::BadRequest(
            "phone number must be 10 digits starting with 6-9".to_string(),
        ));
    }
    if !is_valid_pincode(&form.pincode) {
        return Err(AppError::BadRequest("pincode must be 6 digits".to_string()));
    }

    let email = form.email.trim().to_lowercase();
    let now = Utc::now();
    let customer = CustomerProfile {
        id: Uuid::new_v4(),
        full_name: form.full_name,
        email: email.clone(),
        phone_number: form.phone_number,
        address: form.address,
        city: form.city,
        state: form.state,
        pincode: form.pincode,
        email_verified: false,
        created_at: now,
        updated_at: now,
    };

    // Reserve the address through the entry API; holding the entry makes
    // the check-and-claim a single step.
    match state.email_index.entry(email.clone()) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!(
                "an account with email {email} already exists"
            )));
        }
        Entry::Vacant(slot) => {
            slot.insert(customer.id);
        }
    }
    state.customers.insert(customer.id, customer.clone());

    let token = EmailVerificationToken::issue(customer.id, &customer.email, now);
    let token_value = token.token.clone();
    state
        .verification_tokens
        .insert(token.token.clone(), token);

    info!(customer_id = %customer.id, "customer registered");
    queue::enqueue(state, Notification::Welcome { customer_id: customer.id }).await;
    queue::enqueue(
        state,
        Notification::VerifyEmail {
            customer_id: customer.id,
            token: token_value,
        },
    )
    .await;

    Ok(customer)
}

/// Redeems a verification token and flips the profile flag. Distinct
/// outcomes for unknown, already-verified and expired tokens so callers can
/// present a precise message.
pub fn verify_email(state: &AppState, token: &str) -> Result<CustomerProfile, AppError> {
    let customer_id = {
        let mut entry = state
            .verification_tokens
            .get_mut(token)
            .ok_or_else(|| AppError::NotFound("verification token not found".to_string()))?;

        if entry.is_verified {
            return Err(AppError::AlreadyVerified);
        }
        if entry.is_expired(state.config.verification_ttl_hours, Utc::now()) {
            return Err(AppError::TokenExpired);
        }

        entry.is_verified = true;
        entry.verified_at = Some(Utc::now());
        entry.customer_id
    };

    let mut customer = state.customers.get_mut(&customer_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "customer profile {customer_id} not found for verified token"
        ))
    })?;
    customer.email_verified = true;
    customer.updated_at = Utc::now();

    info!(customer_id = %customer_id, "email verified");
    Ok(customer.clone())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{register_customer, verify_email, RegistrationForm};
    use crate::config::Config;
    use crate::error::AppError;
    use crate::models::verification::EmailVerificationToken;
    use crate::notify::mailer::Mailer;
    use crate::state::AppState;

    fn test_state() -> AppState {
        let (state, _rx) = AppState::new(Config::default(), Mailer::Log);
        state
    }

    fn registration(email: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: "Asha Raman".to_string(),
            email: email.to_string(),
            phone_number: "9876543210".to_string(),
            address: "12 Canal Street".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600001".to_string(),
        }
    }

    fn issued_token(state: &AppState, customer_id: Uuid) -> String {
        state
            .verification_tokens
            .iter()
            .find(|entry| entry.value().customer_id == customer_id)
            .map(|entry| entry.key().clone())
            .expect("token issued at registration")
    }

    #[tokio::test]
    async fn registration_issues_an_unverified_profile_and_token() {
        let state = test_state();
        let customer = register_customer(&state, registration("asha@example.com"))
            .await
            .unwrap();

        assert!(!customer.email_verified);
        let token = issued_token(&state, customer.id);
        assert_eq!(token.len(), 64);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let state = test_state();
        register_customer(&state, registration("asha@example.com"))
            .await
            .unwrap();

        let err = register_customer(&state, registration("Asha@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_registrations_claim_an_email_once() {
        let state = std::sync::Arc::new(test_state());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                register_customer(&state, registration("asha@example.com")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.expect("registration task").is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(state.customers.len(), 1);
        assert_eq!(state.email_index.len(), 1);
    }

    #[tokio::test]
    async fn verification_flips_the_profile_flag() {
        let state = test_state();
        let customer = register_customer(&state, registration("asha@example.com"))
            .await
            .unwrap();
        let token = issued_token(&state, customer.id);

        let verified = verify_email(&state, &token).unwrap();
        assert!(verified.email_verified);

        let stored = state.verification_tokens.get(&token).unwrap();
        assert!(stored.is_verified);
        assert!(stored.verified_at.is_some());
    }

    #[tokio::test]
    async fn second_redemption_is_already_verified() {
        let state = test_state();
        let customer = register_customer(&state, registration("asha@example.com"))
            .await
            .unwrap();
        let token = issued_token(&state, customer.id);

        verify_email(&state, &token).unwrap();
        assert!(matches!(
            verify_email(&state, &token).unwrap_err(),
            AppError::AlreadyVerified
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = test_state();
        let customer = register_customer(&state, registration("asha@example.com"))
            .await
            .unwrap();
        let token = issued_token(&state, customer.id);

        state
            .verification_tokens
            .get_mut(&token)
            .unwrap()
            .created_at = Utc::now() - Duration::hours(25);

        assert!(matches!(
            verify_email(&state, &token).unwrap_err(),
            AppError::TokenExpired
        ));
    }

    #[test]
    fn missing_profile_is_an_explicit_error() {
        let state = test_state();
        let orphan = EmailVerificationToken::issue(Uuid::new_v4(), "ghost@example.com", Utc::now());
        let token = orphan.token.clone();
        state.verification_tokens.insert(token.clone(), orphan);

        assert!(matches!(
            verify_email(&state, &token).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn unknown_token_is_not_found() {
        let state = test_state();
        assert!(matches!(
            verify_email(&state, "no-such-token").unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
