//! Plain-text mail composition. Every template is a pure function of the
//! records it is given.

use crate::models::customer::CustomerProfile;
use crate::models::invoice::{format_paise, Invoice};
use crate::models::pickup::PickupRequest;

const COMPANY: &str = "Meridian Logistics";
const SUPPORT_EMAIL: &str = "support@meridianlogistics.example";

pub fn submission_confirmation(pickup: &PickupRequest) -> (String, String) {
    let subject = format!("Pickup Request Received - #{} - {COMPANY}", pickup.id);
    let body = format!(
        "Dear {name},\n\n\
         Thank you for submitting your parcel pickup request with {COMPANY}.\n\n\
         REQUEST CONFIRMATION\n\
         Request ID: {id}\n\
         Submitted: {submitted}\n\
         Status: {status}\n\n\
         PICKUP INFORMATION\n\
         Address: {address}, {city}, {state} {pincode}\n\
         Preferred Date: {date}\n\
         Preferred Time: {time}\n\
         Parcel Weight: {weight}\n\n\
         DESCRIPTION\n\
         {description}\n\n\
         Our team will review your request and you will receive an acceptance\n\
         or rejection email. Questions? Contact {SUPPORT_EMAIL}.\n\n\
         Best regards,\n{COMPANY} Team",
        name = pickup.full_name,
        id = pickup.id,
        submitted = pickup.requested_at.format("%d-%m-%Y at %H:%M"),
        status = pickup.status,
        address = pickup.address,
        city = pickup.city,
        state = pickup.state,
        pincode = pickup.pincode,
        date = pickup.preferred_pickup_date.format("%d-%m-%Y"),
        time = pickup.preferred_pickup_time.format("%H:%M"),
        weight = pickup.parcel_weight,
        description = pickup.parcel_description,
    );
    (subject, body)
}

pub fn admin_alert(pickup: &PickupRequest) -> (String, String) {
    let subject = format!("New Pickup Request - {}", pickup.full_name);
    let body = format!(
        "New pickup request received.\n\n\
         Request ID: {id}\n\
         Customer: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\n\
         Address: {address}, {city}, {state} {pincode}\n\
         Preferred Date: {date}\n\
         Preferred Time: {time}\n\
         Weight: {weight}\n\n\
         PARCEL DESCRIPTION\n\
         {description}\n\n\
         Please review this request in the dashboard.",
        id = pickup.id,
        name = pickup.full_name,
        email = pickup.email,
        phone = pickup.phone_number,
        address = pickup.address,
        city = pickup.city,
        state = pickup.state,
        pincode = pickup.pincode,
        date = pickup.preferred_pickup_date,
        time = pickup.preferred_pickup_time,
        weight = pickup.parcel_weight,
        description = pickup.parcel_description,
    );
    (subject, body)
}

pub fn acceptance_notice(pickup: &PickupRequest, invoice: &Invoice) -> (String, String) {
    let subject = format!(
        "Your Pickup Request Accepted - #{} - Invoice Enclosed",
        pickup.id
    );
    let estimated = match pickup.estimated_value_paise {
        Some(v) => format_paise(v),
        None => "Not Declared".to_string(),
    };
    let body = format!(
        "Dear {name},\n\n\
         Your parcel pickup request has been ACCEPTED.\n\n\
         REQUEST CONFIRMATION\n\
         Request ID: {id}\n\
         Invoice Number: {invoice_number}\n\n\
         PICKUP SCHEDULE\n\
         Pickup Date: {date}\n\
         Pickup Time: {time} (approximate)\n\
         Location: {address}, {city}, {state} {pincode}\n\n\
         PARCEL DETAILS\n\
         Description: {description}\n\
         Weight: {weight}\n\
         Estimated Value: {estimated}\n\n\
         YOUR INVOICE\n\
         Total Amount: {total}\n\
         A detailed invoice is attached to this email, showing all charges\n\
         and applicable taxes. Payment is due at pickup or online.\n\n\
         Please ensure the parcel is packed and someone is available at the\n\
         address to hand it over.\n\n\
         Thank you for choosing {COMPANY}.\n\n\
         Best regards,\n{COMPANY} Team",
        name = pickup.full_name,
        id = pickup.id,
        invoice_number = invoice.invoice_number,
        date = pickup.preferred_pickup_date.format("%d-%m-%Y"),
        time = pickup.preferred_pickup_time.format("%H:%M"),
        address = pickup.address,
        city = pickup.city,
        state = pickup.state,
        pincode = pickup.pincode,
        description = pickup.parcel_description,
        weight = pickup.parcel_weight,
        estimated = estimated,
        total = format_paise(invoice.total_amount),
    );
    (subject, body)
}

pub fn rejection_notice(pickup: &PickupRequest) -> (String, String) {
    let subject = format!("Your Pickup Request Status Update - #{}", pickup.id);
    let reason = pickup
        .admin_notes
        .as_deref()
        .unwrap_or("Not specified");
    let body = format!(
        "Dear {name},\n\n\
         We regret to inform you that your parcel pickup request has been\n\
         declined.\n\n\
         Request ID: {id}\n\
         Status: REJECTED\n\n\
         REASON\n\
         {reason}\n\n\
         If you believe this is an error, or would like to provide additional\n\
         information, please contact us at {SUPPORT_EMAIL}. You can also\n\
         submit a new pickup request with any necessary adjustments.\n\n\
         Best regards,\n{COMPANY} Team",
        name = pickup.full_name,
        id = pickup.id,
        reason = reason,
    );
    (subject, body)
}

pub fn welcome(customer: &CustomerProfile) -> (String, String) {
    let subject = format!("Welcome to {COMPANY} Pickup Service");
    let body = format!(
        "Dear {name},\n\n\
         Welcome to the {COMPANY} doorstep parcel pickup service. Your\n\
         account has been created.\n\n\
         Once your email address is verified you can submit pickup requests,\n\
         track their status and receive notifications at every step.\n\n\
         Best regards,\n{COMPANY} Team",
        name = customer.full_name,
    );
    (subject, body)
}

pub fn verify_email(customer: &CustomerProfile, token: &str, base_url: &str) -> (String, String) {
    let subject = format!("Verify your email address - {COMPANY}");
    let body = format!(
        "Dear {name},\n\n\
         Please verify your email address to activate pickup requests on your\n\
         account. Open the link below, or submit the token to the\n\
         verification endpoint:\n\n\
         {base_url}/customers/verify?token={token}\n\n\
         The token expires 24 hours after it was issued. If you did not\n\
         register with {COMPANY}, you can ignore this mail.\n\n\
         Best regards,\n{COMPANY} Team",
        name = customer.full_name,
    );
    (subject, body)
}
