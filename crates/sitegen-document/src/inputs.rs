//! Generator inputs

use crate::document::Contact;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

/// User-supplied business parameters that seed generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorInputs {
    /// Trade, e.g. "landscaping"
    pub industry: String,
    /// Business name
    pub company_name: String,
    /// Service area
    pub location: String,
    /// Phone number used in every call-to-action
    pub phone: String,
    /// Hex color used in image prompts
    #[serde(default)]
    pub brand_color: String,
}

impl GeneratorInputs {
    /// Create inputs with the default brand color
    #[must_use]
    pub fn new(
        industry: impl Into<String>,
        company_name: impl Into<String>,
        location: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            industry: industry.into(),
            company_name: company_name.into(),
            location: location.into(),
            phone: phone.into(),
            brand_color: "#2563eb".to_string(),
        }
    }

    /// With brand color
    #[inline]
    #[must_use]
    pub fn with_brand_color(mut self, color: impl Into<String>) -> Self {
        self.brand_color = color.into();
        self
    }

    /// Reject blank required inputs
    ///
    /// # Errors
    /// `DocumentError::InvalidInput` naming the first blank field
    pub fn validate(&self) -> Result<(), DocumentError> {
        let fields = [
            ("industry", &self.industry),
            ("companyName", &self.company_name),
            ("location", &self.location),
            ("phone", &self.phone),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(DocumentError::InvalidInput(format!("{name} is required")));
            }
        }
        Ok(())
    }

    /// Contact block derived verbatim from the inputs
    #[must_use]
    pub fn contact(&self) -> Contact {
        Contact {
            phone: self.phone.clone(),
            location: self.location.clone(),
            company_name: self.company_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_phone_is_rejected() {
        let inputs = GeneratorInputs::new("landscaping", "GreenPath", "Austin, TX", "  ");
        let err = inputs.validate().unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn contact_copies_inputs_verbatim() {
        let inputs = GeneratorInputs::new("landscaping", "GreenPath", "Austin, TX", "5125550101");
        let contact = inputs.contact();
        assert_eq!(contact.phone, "5125550101");
        assert_eq!(contact.location, "Austin, TX");
        assert_eq!(contact.company_name, "GreenPath");
    }
}
