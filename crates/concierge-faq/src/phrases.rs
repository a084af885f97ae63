// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed user-facing replies that do not come from the catalog.

use concierge_core::Language;

/// Greeting used when the catalog has nothing for a query.
pub fn greeting(language: Language) -> &'static str {
    match language {
        Language::En => "Hello! How can I help you today?",
        Language::Th => "สวัสดีค่ะ มีอะไรให้ช่วยไหมคะ?",
        Language::Ja => "いらっしゃいませ。ご用件は何でしょうか？",
        Language::Zh => "您好！请问有什么可以帮您？",
    }
}

/// Reply sent once a conversation reaches the handoff threshold.
pub fn handoff(language: Language) -> &'static str {
    match language {
        Language::En => {
            "I'd love to help you more! Let me have our staff contact you directly with more detailed information."
        }
        Language::Th => "ยินดีให้ข้อมูลเพิ่มเติมค่ะ ขออนุญาตให้พนักงานของเราติดต่อกลับนะคะ",
        Language::Ja => {
            "より詳しい情報をご提供させていただきたく、スタッフから直接ご連絡させていただきます。"
        }
        Language::Zh => "很乐意为您提供更多帮助！让我们的工作人员直接联系您，提供更详细的信息。",
    }
}

/// Reply sent when answering failed.
pub fn apology(language: Language) -> &'static str {
    match language {
        Language::En => "I apologize, but I'm having trouble right now. Please try again!",
        Language::Th => "ขออภัยค่ะ ระบบขัดข้องชั่วคราว กรุณาลองใหม่อีกครั้งนะคะ",
        Language::Ja => {
            "申し訳ございませんが、一時的なエラーが発生しました。もう一度お試しください。"
        }
        Language::Zh => "抱歉，系统暂时出现问题。请稍后再试！",
    }
}

/// Reply sent in relay mode when the model produced nothing usable.
pub const RELAY_ERROR: &str = "Sorry, I encountered an error processing your request.";

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_language_has_every_phrase() {
        for language in Language::iter() {
            assert!(!greeting(language).is_empty());
            assert!(!handoff(language).is_empty());
            assert!(!apology(language).is_empty());
        }
    }

    #[test]
    fn phrases_are_distinct_per_language() {
        assert_ne!(handoff(Language::En), handoff(Language::Th));
        assert_ne!(apology(Language::Ja), apology(Language::Zh));
    }
}
