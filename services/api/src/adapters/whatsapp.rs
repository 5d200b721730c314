//! services/api/src/adapters/whatsapp.rs
//!
//! Builds the click-to-chat link that hands a lead over to the academy's
//! WhatsApp account.

const SEND_ENDPOINT: &str = "https://api.whatsapp.com/send";

/// Returns a `https://api.whatsapp.com/send` URL with the message pre-filled.
pub fn send_url(phone_number: &str, text: &str) -> String {
    format!(
        "{}?phone={}&text={}",
        SEND_ENDPOINT,
        urlencoding::encode(phone_number),
        urlencoding::encode(text)
    )
}
