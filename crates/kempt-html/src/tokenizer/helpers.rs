//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - RCDATA/RAWTEXT helpers for raw text elements
//! - Diagnostics

use kempt_common::{Message, MessageCode, SourcePos};

use super::core::{HtmlTokenizer, TokenizerState};
use super::token::{Attribute, LocatedToken, Token};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// Move the input cursor back to `offset`, whose source position is `pos`.
    pub(super) const fn rewind_to(&mut self, offset: usize, pos: SourcePos) {
        self.current_pos = offset;
        self.location = pos;
        self.reconsume = false;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        self.current_char_location = self.location;
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        self.location.advance(c);
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it. Used for lookahead operations like "the next few characters are".
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(target))
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) fn consume_string(&mut self, target: &str) {
        for _ in target.chars() {
            let _ = self.consume();
        }
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: CR never reaches the tokenizer; line breaks are normalized first.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current token" - adds the token to the output stream,
    /// located at the start of the markup that produced it.
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };
        let start = self.token_start;

        match &mut token {
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                for dropped in drop_duplicate_attributes(attributes) {
                    self.report_at(
                        MessageCode::DuplicateAttribute,
                        start,
                        vec![name.clone(), dropped.name, dropped.value],
                    );
                }
                self.last_start_tag_name = Some(name.clone());

                // [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
                // [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
                // The tree builder never switches our state, so the elements
                // whose content is not markup are recognized here.
                if !*self_closing {
                    match name.as_str() {
                        "title" | "textarea" => self.switch_to(TokenizerState::RCDATA),
                        "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                            self.switch_to(TokenizerState::RAWTEXT);
                        }
                        "script" => self.switch_to(TokenizerState::ScriptData),
                        "plaintext" => self.switch_to(TokenizerState::PLAINTEXT),
                        _ => {}
                    }
                }
            }
            Token::EndTag { name, attributes } if !attributes.is_empty() => {
                self.report_at(MessageCode::EndTagWithAttributes, start, vec![name.clone()]);
            }
            _ => {}
        }

        self.pending.push_back(LocatedToken { token, pos: start });
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.emit_character_token_at(c, self.current_char_location);
    }

    /// Emit a character token that belongs to an earlier source position,
    /// e.g. the `<` of something that turned out not to be a tag.
    pub(super) fn emit_character_token_at(&mut self, c: char, pos: SourcePos) {
        self.pending.push_back(LocatedToken {
            token: Token::new_character(c),
            pos,
        });
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.pending.push_back(LocatedToken {
            token: Token::EndOfFile,
            pos: self.location,
        });
        self.at_eof = true;
    }
}

/// Remove every attribute whose name already appeared earlier on the tag.
/// The first occurrence wins. Returns the removed attributes in order.
fn drop_duplicate_attributes(attributes: &mut Vec<Attribute>) -> Vec<Attribute> {
    let mut kept: Vec<Attribute> = Vec::with_capacity(attributes.len());
    let mut dropped = Vec::new();
    for attr in attributes.drain(..) {
        if kept.iter().any(|k| k.name == attr.name) {
            dropped.push(attr);
        } else {
            kept.push(attr);
        }
    }
    *attributes = kept;
    dropped
}

// =============================================================================
// RCDATA/RAWTEXT Helpers
// =============================================================================

impl HtmlTokenizer {
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name, .. })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer... Reconsume in the RCDATA state."
    ///
    /// Shared by the RAWTEXT and script data states, which differ only in the
    /// state they reconsume in.
    pub(super) fn emit_end_tag_name_anything_else(&mut self, content: TokenizerState) {
        let start = self.token_start;
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        self.emit_character_token_at('<', start);
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.emit_character_token_at('/', start);
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token_at(c, start);
        }
        // STEP 4: Discard the current end tag token
        self.current_token = None;
        // STEP 5: "Reconsume in the content state"
        self.reconsume_in(content);
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

impl HtmlTokenizer {
    /// Record a lexer message at `pos`.
    pub(super) fn report_at(&mut self, code: MessageCode, pos: SourcePos, args: Vec<String>) {
        self.messages.push(Message::new(code, Some(pos), args));
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record a recoverable defect at the current input character. `detail`
    /// is the WHATWG parse error name.
    pub(super) fn malformed(&mut self, detail: &str) {
        self.malformed_at(detail, self.current_char_location);
    }

    /// Record a recoverable defect at `pos`.
    pub(super) fn malformed_at(&mut self, detail: &str, pos: SourcePos) {
        self.report_at(MessageCode::MalformedMarkup, pos, vec![detail.to_owned()]);
    }
}
