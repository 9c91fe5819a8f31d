//! Markdown fence stripping for JSON responses

/// Remove markdown code fences (```` ```json ```` / ```` ``` ````) and
/// surrounding whitespace from a model response
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "  ```\n{}\n```  ";
        assert_eq!(strip_code_fences(raw), "{}");
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
