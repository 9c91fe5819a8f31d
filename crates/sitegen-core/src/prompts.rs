//! Prompt templates for text and image generation

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sitegen_document::{Contact, GeneratorInputs, ImageSlot};

/// Copywriter template for initial generation
pub const GENERATION_TEMPLATE: &str = r##"
You are a conversion-focused copywriter for home-service contractors.
Write the copy for a single landing page.

RULES:
1. No superlatives: never use "elite", "top", "best", "premium", "#1" or "luxury".
2. Plain, practical tone: prefer "trusted", "local", "reliable", "honest".
3. No promotional claims: no pricing, discounts, percentages, financing or guarantees.
4. No invented numbers, certifications, awards, reviews or testimonials.
5. Mention the company name 3 to 4 times across the whole page.
6. Every call-to-action includes the literal phone number {phone}.
7. Icons are Lucide names in dash-case, e.g. "wrench", "shield-check", "clock".
8. Sections:
   - services: exactly 4 cards
   - repairBenefits: a title and exactly 3 items about professional repairs
   - aboutUs: a grounded summary of the local presence
   - whyItMatters: why this kind of service matters in general
   - additionalBenefits: exactly 3 cards
   - benefits: 3 to 6 short items
   - faqs: exactly 4 common-sense questions (getting started, duration, preparation, next steps)

Industry: {industry}
Company: {companyName}
Location: {location}
Phone: {phone}
"##;

/// System instruction for natural-language edits
pub const EDIT_SYSTEM_PROMPT: &str = r#"
You edit the content of a home-service business website. You receive the
current site data as JSON and an instruction describing a change.

Return the COMPLETE JSON document with the change applied, never a diff.

RULES:
- Change only what the instruction asks for; leave every other value exactly as it is.
- Never change image fields (heroImage, image, valueImage). Values shown as "[PRESERVED]" must be returned unchanged.
- Never change contact.phone, contact.location or contact.companyName.
- Keep the same structure and every required field.
- Keep array sizes (4 service cards, 3 repair benefit items, 3 additional benefit cards, 4 FAQs) unless the instruction explicitly asks otherwise.

COMPLIANCE (same as generation):
- No guarantees or superlatives.
- No invented numbers, certifications, awards, reviews or testimonials.
- Every call-to-action includes the literal phone number.
"#;

/// Render the generation template for `inputs`
#[must_use]
pub fn generation_prompt(inputs: &GeneratorInputs) -> String {
    GENERATION_TEMPLATE
        .replace("{industry}", &inputs.industry)
        .replace("{companyName}", &inputs.company_name)
        .replace("{location}", &inputs.location)
        .replace("{phone}", &inputs.phone)
}

/// Render the user prompt for an edit
///
/// `redacted` is the current document with image payloads replaced.
#[must_use]
pub fn edit_prompt(redacted: &Value, instruction: &str, contact: &Contact) -> String {
    let data = serde_json::to_string_pretty(redacted).unwrap_or_else(|_| redacted.to_string());
    format!(
        "Current site data:\n{data}\n\n\
         Instruction: \"{instruction}\"\n\n\
         Contact info that MUST be preserved exactly:\n\
         - Phone: {phone}\n\
         - Location: {location}\n\
         - Company: {company}\n\n\
         Return the complete JSON document with only the requested change applied.",
        phone = contact.phone,
        location = contact.location,
        company = contact.company_name,
    )
}

/// Slot-specific photo prompt
#[must_use]
pub fn image_prompt(slot: ImageSlot, inputs: &GeneratorInputs) -> String {
    let industry = &inputs.industry;
    let location = &inputs.location;
    match slot {
        ImageSlot::Hero => format!(
            "Candid high-end professional photography of {industry} technicians working at a \
             job site in {location}. Cinematic lighting, natural environment, 8k resolution. No text."
        ),
        ImageSlot::IndustryValue => format!(
            "Authentic photo showing the high quality results of professional {industry} work \
             in a residential setting in {location}. Natural lighting. No text."
        ),
        ImageSlot::AboutUs => format!(
            "A professional {industry} contractor or a clean service vehicle in a {location} \
             residential area. Friendly and local vibe. No text."
        ),
        ImageSlot::RepairBenefits => format!(
            "A realistic photo of a professional technician performing detailed {industry} \
             repairs. Authentic work environment, high quality focus. No text."
        ),
    }
}

static PEOPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:technicians?|people|persons?|men|man|women|woman|contractors?|workers?)\b")
        .expect("valid static regex")
});

static STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:candid|authentic|realistic)\b")
        .expect("valid static regex")
});

/// Rewrite a refused image prompt into one less likely to trip safety filters
#[must_use]
pub fn sanitize_image_prompt(prompt: &str) -> String {
    let without_people = PEOPLE.replace_all(prompt, "equipment");
    let softened = STYLE.replace_all(&without_people, "high quality");
    format!("{} No people.", softened.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> GeneratorInputs {
        GeneratorInputs::new("landscaping", "GreenPath", "Austin, TX", "5125550101")
    }

    #[test]
    fn generation_prompt_substitutes_every_placeholder() {
        let prompt = generation_prompt(&inputs());
        assert!(prompt.contains("Industry: landscaping"));
        assert!(prompt.contains("Company: GreenPath"));
        assert!(prompt.contains("Location: Austin, TX"));
        assert!(prompt.contains("literal phone number 5125550101"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn edit_prompt_repeats_contact_block() {
        let contact = inputs().contact();
        let prompt = edit_prompt(&serde_json::json!({"bannerText": "x"}), "shorter", &contact);
        assert!(prompt.contains("Instruction: \"shorter\""));
        assert!(prompt.contains("MUST be preserved exactly"));
        assert!(prompt.contains("- Phone: 5125550101"));
        assert!(prompt.contains("- Company: GreenPath"));
    }

    #[test]
    fn image_prompts_mention_industry() {
        for slot in ImageSlot::ALL {
            let prompt = image_prompt(slot, &inputs());
            assert!(prompt.contains("landscaping"), "{slot}: {prompt}");
            assert!(prompt.ends_with("No text."));
        }
    }

    #[test]
    fn sanitizer_removes_people_and_style_words() {
        let prompt = image_prompt(ImageSlot::Hero, &inputs());
        let safe = sanitize_image_prompt(&prompt);

        assert!(!safe.to_lowercase().contains("technician"));
        assert!(!safe.to_lowercase().contains("candid"));
        assert!(safe.contains("landscaping equipment"));
        assert!(safe.starts_with("high quality high-end"));
        assert!(safe.ends_with("No people."));
    }

    #[test]
    fn sanitizer_keeps_unrelated_words() {
        assert_eq!(
            sanitize_image_prompt("A manicured lawn at dusk."),
            "A manicured lawn at dusk. No people."
        );
    }
}
