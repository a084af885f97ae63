// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language detection from Unicode script ranges.
//!
//! Used to override model labels on input whose script is unambiguous.
//! Priority is Thai, then Japanese, then Chinese.

use concierge_core::Language;

fn is_thai(c: char) -> bool {
    matches!(c, '\u{0E00}'..='\u{0E7F}')
}

/// Hiragana, katakana, katakana phonetic extensions, and half-width katakana.
fn is_kana(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9F}'
    )
}

/// CJK unified ideographs, extension A, and compatibility ideographs.
fn is_han(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}'
    )
}

/// The language `text` must be in, judging by script alone.
///
/// Returns `None` when the script does not settle the question, for example
/// Latin text or Han mixed with Latin letters.
pub fn detect(text: &str) -> Option<Language> {
    let mut has_kana = false;
    let mut has_han = false;
    let mut has_other_letters = false;

    for c in text.chars() {
        if is_thai(c) {
            return Some(Language::Th);
        }
        if is_kana(c) {
            has_kana = true;
        } else if is_han(c) {
            has_han = true;
        } else if c.is_alphabetic() {
            has_other_letters = true;
        }
    }

    if has_kana {
        Some(Language::Ja)
    } else if has_han && !has_other_letters {
        Some(Language::Zh)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_script_is_thai() {
        assert_eq!(detect("ที่ตั้งร้านอยู่ที่ไหน"), Some(Language::Th));
    }

    #[test]
    fn thai_wins_over_kana() {
        assert_eq!(detect("こんにちは สวัสดี"), Some(Language::Th));
    }

    #[test]
    fn kana_is_japanese_even_with_kanji() {
        assert_eq!(detect("営業時間は何時ですか？"), Some(Language::Ja));
        assert_eq!(detect("ﾒﾆｭｰ"), Some(Language::Ja));
    }

    #[test]
    fn han_only_is_chinese() {
        assert_eq!(detect("营业时间？"), Some(Language::Zh));
        assert_eq!(detect("停车 123"), Some(Language::Zh));
    }

    #[test]
    fn han_with_latin_is_undecided() {
        assert_eq!(detect("Do you have 停车?"), None);
    }

    #[test]
    fn latin_and_empty_are_undecided() {
        assert_eq!(detect("What time do you open?"), None);
        assert_eq!(detect(""), None);
        assert_eq!(detect("123 !?"), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ascii_is_never_decided(text in "[ -~]{0,64}") {
                prop_assert_eq!(detect(&text), None);
            }

            #[test]
            fn any_thai_character_decides_thai(
                before in "\\PC{0,16}",
                after in "\\PC{0,16}",
                thai in proptest::char::range('\u{0E01}', '\u{0E2E}'),
            ) {
                let text = format!("{before}{thai}{after}");
                prop_assert_eq!(detect(&text), Some(Language::Th));
            }
        }
    }
}
