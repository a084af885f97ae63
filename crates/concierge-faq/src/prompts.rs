// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instruction templates sent to the text generator.

/// Asks for a single JSON object labelling `message`.
pub fn classification(message: &str) -> String {
    format!(
        r#"Analyze this message: "{message}"

Return ONLY a JSON object in this EXACT format:
{{
    "language": "en or th or ja or zh",
    "query_type": "location or menu or hours or booking or parking or other",
    "original_message": "the original message"
}}

Rules:
- language must EXACTLY match the user's language
- If message contains Thai script, language MUST be "th"
- If message contains Japanese characters, language MUST be "ja"
- If message contains only Chinese characters, language MUST be "zh"
- query_type must match the most relevant category
- For greetings or unclear messages, use query_type "other"

Reply with ONLY the JSON object, no other text."#
    )
}

/// Asks for a warmer rendition of `base` in the same language.
pub fn personality(base: &str) -> String {
    format!(
        r#"Make this response more friendly and conversational, keeping the same information but adding warmth:

Original response: {base}

Rules:
- Keep the same language as original
- Maintain all factual information
- Add friendly tone and warmth
- For Thai: use polite particles ค่ะ/ครับ appropriately
- For Japanese: maintain formal politeness
- Keep it concise

Response:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_embeds_message_and_fields() {
        let prompt = classification("Where are you?");
        assert!(prompt.contains(r#"Analyze this message: "Where are you?""#));
        assert!(prompt.contains(r#""query_type""#));
        assert!(prompt.contains("{\n    \"language\""));
    }

    #[test]
    fn personality_embeds_base_text() {
        let prompt = personality("We open at 9.");
        assert!(prompt.contains("Original response: We open at 9."));
        assert!(prompt.ends_with("Response:"));
    }
}
