//! Character reference decoding for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The reference is read by looking ahead from the `&`, so the named and
//! numeric sub-states of § 13.2.5.73 - § 13.2.5.80 collapse into plain
//! functions. Every defect is reported at the position of the `&`.

use encoding_rs::WINDOWS_1252;
use kempt_common::MessageCode;
use kempt_config::BadCharRefs;

use super::core::{HtmlTokenizer, TokenizerState};
use super::named_character_references::lookup_entity;

impl HtmlTokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        match self.current_input_character {
            // "ASCII alphanumeric"
            // "Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.consume_named_reference(c);
                self.finish_reference();
            }
            // "U+0023 NUMBER SIGN (#)"
            // "Switch to the numeric character reference state."
            Some('#') => {
                self.consume_numeric_reference();
                self.finish_reference();
            }
            // "Anything else"
            // "Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_reference_text("&");
                let return_state = self.return_state.take().unwrap_or(TokenizerState::Data);
                self.reconsume_in(return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// Reads the whole alphanumeric run after `&`. Only an exact match counts;
    /// an unknown name is kept as written.
    fn consume_named_reference(&mut self, first: char) {
        let mut name = String::from(first);
        while let Some(c) = self.peek_codepoint(0).filter(char::is_ascii_alphanumeric) {
            let _ = self.consume();
            name.push(c);
        }

        let next = self.peek_codepoint(0);
        let semicolon = next == Some(';');
        if semicolon {
            let _ = self.consume();
        }
        let text = if semicolon {
            format!("&{name};")
        } else {
            format!("&{name}")
        };

        match lookup_entity(&name) {
            Some(c) if semicolon => self.flush_reference_char(c),
            // "If the character reference was consumed as part of an attribute, and
            // the last character matched is not a U+003B SEMICOLON character (;), and
            // the next input character is either a U+003D EQUALS SIGN character (=) or
            // an ASCII alphanumeric, then, for historical reasons, flush code points
            // consumed as a character reference."
            Some(_) if self.is_consumed_as_part_of_attribute() && next == Some('=') => {
                self.flush_reference_text(&text);
            }
            // "missing-semicolon-after-character-reference"
            Some(c) => {
                self.report_at(MessageCode::MissingSemicolon, self.reference_start, vec![text]);
                self.flush_reference_char(c);
            }
            None => {
                self.report_at(
                    MessageCode::UnknownEntity,
                    self.reference_start,
                    vec![text.clone()],
                );
                self.flush_reference_text(&text);
            }
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    ///
    /// The `#` is the current input character.
    fn consume_numeric_reference(&mut self) {
        let mut text = String::from("&#");
        // "U+0078 LATIN SMALL LETTER X, U+0058 LATIN CAPITAL LETTER X"
        let hexadecimal = matches!(self.peek_codepoint(0), Some('x' | 'X'));
        if hexadecimal && let Some(x) = self.consume() {
            text.push(x);
        }
        let radix = if hexadecimal { 16 } else { 10 };

        // "Set the character reference code to zero (0)."
        let mut code: u32 = 0;
        let mut digits = 0usize;
        while let Some(c) = self.peek_codepoint(0).filter(|c| c.is_digit(radix)) {
            let _ = self.consume();
            text.push(c);
            digits += 1;
            // "Multiply the character reference code by 16 (or 10). Add a numeric
            // version of the current input character to the character reference code."
            // Saturates so that overlong references stay out of range.
            code = code
                .checked_mul(radix)
                .and_then(|v| v.checked_add(c.to_digit(radix).unwrap_or(0)))
                .unwrap_or(u32::MAX);
        }

        // "absence-of-digits-in-numeric-character-reference"
        if digits == 0 {
            self.malformed_at(
                "absence-of-digits-in-numeric-character-reference",
                self.reference_start,
            );
            self.flush_reference_text(&text);
            return;
        }

        if self.peek_codepoint(0) == Some(';') {
            let _ = self.consume();
            text.push(';');
        } else {
            self.report_at(
                MessageCode::MissingSemicolon,
                self.reference_start,
                vec![text.clone()],
            );
        }

        self.resolve_numeric_reference(code, &text);
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    fn resolve_numeric_reference(&mut self, code: u32, text: &str) {
        let start = self.reference_start;
        match code {
            // "null-character-reference", "surrogate-character-reference",
            // "character-reference-outside-unicode-range"
            0 | 0xD800..=0xDFFF | 0x11_0000..=u32::MAX => self.invalid_reference(text),
            // "If the number is one of the numbers in the first column of the
            // following table, then find the row with that number in the first
            // column, and set the character reference code to the number in the
            // second column of that row."
            0x80..=0x9F => match windows_1252_replacement(code) {
                Some(c) => {
                    self.report_at(
                        MessageCode::VendorSpecificChars,
                        start,
                        vec![text.to_owned(), format!("U+{:04X}", u32::from(c))],
                    );
                    self.flush_reference_char(c);
                }
                None => self.invalid_reference(text),
            },
            _ => {
                let Some(c) = char::from_u32(code) else {
                    self.invalid_reference(text);
                    return;
                };
                if is_noncharacter(code) {
                    self.malformed_at("noncharacter-character-reference", start);
                } else if is_control(code) {
                    self.malformed_at("control-character-reference", start);
                }
                self.flush_reference_char(c);
            }
        }
    }

    /// A reference to a code point that may not appear in a document.
    fn invalid_reference(&mut self, text: &str) {
        let start = self.reference_start;
        match self.options.bad_char_refs {
            BadCharRefs::Replace => {
                self.report_at(
                    MessageCode::InvalidCharRef,
                    start,
                    vec![text.to_owned(), "(replaced with U+FFFD)".to_owned()],
                );
                self.flush_reference_char('\u{FFFD}');
            }
            BadCharRefs::Discard => {
                self.report_at(
                    MessageCode::InvalidCharRef,
                    start,
                    vec![text.to_owned(), "(dropped)".to_owned()],
                );
            }
        }
    }

    /// "Switch to the return state."
    fn finish_reference(&mut self) {
        let return_state = self.return_state.take().unwrap_or(TokenizerState::Data);
        self.switch_to(return_state);
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// Returns true if the return state is an attribute value state.
    /// Per spec: "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    fn flush_reference_text(&mut self, text: &str) {
        for c in text.chars() {
            self.flush_reference_char(c);
        }
    }

    fn flush_reference_char(&mut self, c: char) {
        if self.is_consumed_as_part_of_attribute() {
            if let Some(ref mut token) = self.current_token {
                token.append_to_current_attribute_value(c);
            }
        } else {
            self.emit_character_token_at(c, self.reference_start);
        }
    }
}

/// The windows-1252 character a C1 control reference stands for, if any.
fn windows_1252_replacement(code: u32) -> Option<char> {
    let bytes = [u8::try_from(code).ok()?];
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
    let c = decoded.chars().next()?;
    (u32::from(c) != code).then_some(c)
}

/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ... U+10FFFE, or U+10FFFF."
const fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || code & 0xFFFE == 0xFFFE
}

/// C0 controls other than tab, line feed and form feed, plus DELETE.
const fn is_control(code: u32) -> bool {
    (code < 0x20 && !matches!(code, 0x09 | 0x0A | 0x0C)) || code == 0x7F
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c1_controls_map_through_windows_1252() {
        assert_eq!(windows_1252_replacement(0x80), Some('\u{20AC}'));
        assert_eq!(windows_1252_replacement(0x99), Some('\u{2122}'));
        assert_eq!(windows_1252_replacement(0x81), None);
        assert_eq!(windows_1252_replacement(0x9D), None);
    }

    #[test]
    fn noncharacters_and_controls() {
        assert!(is_noncharacter(0xFDD0));
        assert!(is_noncharacter(0x1FFFF));
        assert!(!is_noncharacter(0xFFFD));
        assert!(is_control(0x01));
        assert!(is_control(0x0D));
        assert!(!is_control(0x0A));
        assert!(!is_control(0x41));
    }
}
