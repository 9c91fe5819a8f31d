//! Wire types of the AI-edit endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitegen_document::{Contact, Document};

/// `POST /api/ai-edit` body
///
/// Every field is optional on the wire so a missing one can be reported
/// as a 400 instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEditRequest {
    /// Natural-language edit instruction
    #[serde(default)]
    pub instruction: Option<String>,
    /// Document to edit
    #[serde(default)]
    pub current_site_data: Option<Value>,
    /// Authoritative contact, overriding the document's
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

/// Contact override; blank fields fall back to the document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// City / region
    #[serde(default)]
    pub location: Option<String>,
    /// Company name
    #[serde(default)]
    pub company_name: Option<String>,
}

impl ContactInfo {
    /// Overlay the non-blank fields onto `contact`
    pub fn apply_to(&self, contact: &mut Contact) {
        let overlay = [
            (&self.phone, &mut contact.phone),
            (&self.location, &mut contact.location),
            (&self.company_name, &mut contact.company_name),
        ];
        for (value, field) in overlay {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                value.clone_into(field);
            }
        }
    }
}

/// Success body
#[derive(Debug, Clone, Serialize)]
pub struct AiEditResponse {
    /// Always `true`
    pub success: bool,
    /// Edited document
    pub data: Document,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

impl ErrorBody {
    /// Create error body
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            phone: "5125550101".into(),
            location: "Austin, TX".into(),
            company_name: "GreenPath".into(),
        }
    }

    #[test]
    fn blank_override_fields_fall_back() {
        let info: ContactInfo =
            serde_json::from_str(r#"{"phone": "", "location": "Round Rock, TX"}"#).unwrap();
        let mut contact = contact();
        info.apply_to(&mut contact);

        assert_eq!(contact.phone, "5125550101");
        assert_eq!(contact.location, "Round Rock, TX");
        assert_eq!(contact.company_name, "GreenPath");
    }

    #[test]
    fn request_fields_are_optional() {
        let request: AiEditRequest = serde_json::from_str("{}").unwrap();
        assert!(request.instruction.is_none());
        assert!(request.current_site_data.is_none());
    }
}
