//! Contact actions: turning an emergency contact into a dialable link.

use crate::models::{ContactKind, EmergencyContact};
use crate::utils::digits_only;

/// Base for chat links; the bare international number is appended.
const WHATSAPP_BASE_URL: &str = "https://wa.me/";

impl EmergencyContact {
    /// URI that starts the contact's action.
    ///
    /// Phone contacts dial the raw value; WhatsApp contacts open a chat with
    /// every non-digit stripped from the value.
    pub fn href(&self) -> String {
        match self.kind {
            ContactKind::Phone => format!("tel:{}", self.value),
            ContactKind::Whatsapp => format!("{}{}", WHATSAPP_BASE_URL, digits_only(&self.value)),
        }
    }
}

impl ContactKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ContactKind::Phone => "Phone",
            ContactKind::Whatsapp => "WhatsApp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(kind: ContactKind, value: &str) -> EmergencyContact {
        EmergencyContact {
            label: "Host".into(),
            kind,
            value: value.to_string(),
            icon: None,
        }
    }

    #[test]
    fn test_phone_href_keeps_raw_value() {
        assert_eq!(contact(ContactKind::Phone, "+47 112").href(), "tel:+47 112");
    }

    #[test]
    fn test_whatsapp_href_strips_non_digits() {
        assert_eq!(
            contact(ContactKind::Whatsapp, "+47 (912) 34-567").href(),
            "https://wa.me/4791234567"
        );
    }
}
