//! Markup declarations: comments, DOCTYPEs, CDATA sections and processing
//! instructions.
//!
//! [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
//!
//! Comments do not follow the WHATWG comment states exactly. `-- >` still
//! closes a comment, and end of input inside a comment does not swallow the
//! rest of the document: the comment is cut at its first `--` (or `>`) and
//! tokenizing resumes after it.

use kempt_common::{MessageCode, SourcePos};

use super::core::{HtmlTokenizer, TokenizerState};
use super::token::Token;

/// Longest stretch of comment text quoted in an unterminated comment message.
const QUOTED_COMMENT_CHARS: usize = 32;

impl HtmlTokenizer {
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Entered with nothing consumed past `<!`.
    pub(super) fn handle_markup_declaration_open_state(&mut self) {
        // "If the next two characters are both U+002D HYPHEN-MINUS characters (-),
        // consume those two characters, create a comment token whose data is the empty
        // string, and switch to the comment start state."
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            self.current_token = Some(Token::new_comment());
            self.comment_body = Some((self.current_pos, self.location));
            self.switch_to(TokenizerState::CommentStart);
        }
        // "Otherwise, if the next seven characters are an ASCII case-insensitive
        // match for the word 'DOCTYPE', consume those characters and switch to the
        // DOCTYPE state."
        else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.temporary_buffer.clear();
            self.switch_to(TokenizerState::DOCTYPE);
        }
        // "[CDATA[" opens a CDATA section wherever it appears.
        else if self.next_few_characters_are("[CDATA[") {
            self.consume_string("[CDATA[");
            self.current_token = Some(Token::CData {
                data: String::new(),
            });
            self.switch_to(TokenizerState::CDATASection);
        }
        // "Otherwise, this is an incorrectly-opened-comment parse error. Create a
        // comment token whose data is the empty string. Switch to the bogus comment state
        // (don't consume anything in the current state)."
        else {
            self.malformed_at("incorrectly-opened-comment", self.token_start);
            self.current_token = Some(Token::new_comment());
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    pub(super) fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            Some('\0') => {
                self.malformed("unexpected-null-character");
                self.append_to_current_comment('\u{FFFD}');
            }
            Some(c) => self.append_to_current_comment(c),
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
            // parse error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.malformed("abrupt-closing-of-empty-comment");
                self.finish_comment();
            }
            // `<!--->`
            Some('-') if self.peek_codepoint(0) == Some('>') => {
                let _ = self.consume();
                self.malformed("abrupt-closing-of-empty-comment");
                self.finish_comment();
            }
            // "Anything else - Reconsume in the comment state."
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') if self.peek_codepoint(0) == Some('-') => self.handle_comment_dashes(),
            // "U+0000 NULL - This is an unexpected-null-character parse error."
            Some('\0') => {
                self.malformed("unexpected-null-character");
                self.append_to_current_comment('\u{FFFD}');
            }
            None => self.eof_in_comment(),
            // "Anything else - Append the current input character to the comment token's data."
            Some(c) => self.append_to_current_comment(c),
        }
    }

    /// The current character is `-` and so is the next one.
    fn handle_comment_dashes(&mut self) {
        // In a run of three or more dashes only the last two can close the
        // comment; the ones before are text.
        if self.peek_codepoint(1) == Some('-') {
            self.append_to_current_comment('-');
            return;
        }

        let mut ahead = 1;
        while self
            .peek_codepoint(ahead)
            .is_some_and(Self::is_whitespace_char)
        {
            ahead += 1;
        }

        match self.peek_codepoint(ahead) {
            // `-->`, or `-- >` with whitespace before the `>`.
            Some('>') => {
                if ahead > 1 {
                    self.malformed("whitespace-in-comment-end");
                }
                for _ in 0..ahead {
                    let _ = self.consume();
                }
                let _ = self.consume();
                self.finish_comment();
            }
            // `--!>`
            Some('!') if ahead == 1 && self.peek_codepoint(2) == Some('>') => {
                self.malformed("incorrectly-closed-comment");
                self.consume_string("-!>");
                self.finish_comment();
            }
            // Adjacent hyphens inside the comment text.
            _ => {
                self.report_at(
                    MessageCode::MalformedComment,
                    self.current_char_location,
                    Vec::new(),
                );
                let _ = self.consume();
                self.append_str_to_current_comment("--");
            }
        }
    }

    fn finish_comment(&mut self) {
        self.comment_body = None;
        self.switch_to(TokenizerState::Data);
        self.emit_token();
    }

    /// End of input inside a comment.
    ///
    /// The comment is cut at the first `--` in its body, or else at the first
    /// `>`, and everything after that point is tokenized again as content.
    /// With neither present the whole body becomes the comment.
    fn eof_in_comment(&mut self) {
        let Some((body_start, body_pos)) = self.comment_body.take() else {
            self.emit_token();
            self.emit_eof_token();
            return;
        };

        let body = &self.input[body_start..];
        let cut = body
            .find("--")
            .map(|at| (at, 2))
            .or_else(|| body.find('>').map(|at| (at, 1)));

        let (data, resume) = match cut {
            Some((at, terminator)) => {
                let pos = position_after(body_pos, &body[..at + terminator]);
                (body[..at].to_owned(), Some((body_start + at + terminator, pos)))
            }
            None => (body.to_owned(), None),
        };

        let quoted: String = data.trim().chars().take(QUOTED_COMMENT_CHARS).collect();
        self.report_at(MessageCode::UnterminatedComment, self.token_start, vec![quoted]);
        self.current_token = Some(Token::Comment { data });
        self.emit_token();

        match resume {
            Some((offset, pos)) => {
                self.rewind_to(offset, pos);
                self.switch_to(TokenizerState::Data);
            }
            None => self.emit_eof_token(),
        }
    }

    fn append_to_current_comment(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_comment(c);
        }
    }

    fn append_str_to_current_comment(&mut self, s: &str) {
        if let Some(ref mut token) = self.current_token {
            token.append_str_to_comment(s);
        }
    }

    // =========================================================================
    // CDATA sections
    // =========================================================================

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    pub(super) fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            // "]]>" ends the section.
            Some(']') if self.next_few_characters_are("]>") => {
                self.consume_string("]>");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-cdata parse error. Emit an end-of-file token."
            None => {
                self.malformed("eof-in-cdata");
                self.emit_token();
                self.emit_eof_token();
            }
            Some(c) => self.append_to_current_comment(c),
        }
    }

    // =========================================================================
    // Processing instructions
    // =========================================================================

    /// `<?target data?>` and `<?xml ...?>`, collected up to the first `>`.
    pub(super) fn handle_processing_instruction_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.current_token = Some(processing_instruction(&self.temporary_buffer));
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.malformed("eof-in-processing-instruction");
                self.current_token = Some(processing_instruction(&self.temporary_buffer));
                self.emit_token();
                self.emit_eof_token();
            }
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    // =========================================================================
    // DOCTYPE
    // =========================================================================

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    ///
    /// The declaration is collected up to its `>` and then split into name and
    /// identifiers by [`parse_doctype`].
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.emit_doctype();
                self.switch_to(TokenizerState::Data);
            }
            // "EOF - This is an eof-in-doctype parse error. Set the current DOCTYPE
            // token's force-quirks flag to on. Emit the current DOCTYPE token. Emit an
            // end-of-file token."
            None => {
                self.emit_doctype();
                if let Some(located) = self.pending.back_mut() {
                    located.token.set_force_quirks();
                }
                self.emit_eof_token();
            }
            Some('\0') => {
                self.malformed("unexpected-null-character");
                self.temporary_buffer.push('\u{FFFD}');
            }
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    fn emit_doctype(&mut self) {
        let (token, well_formed) = parse_doctype(&self.temporary_buffer);
        if !well_formed || self.current_input_character.is_none() {
            self.report_at(MessageCode::MalformedDoctype, self.token_start, Vec::new());
        }
        self.current_token = Some(token);
        self.emit_token();
    }
}

/// Build the token for the text between `<?` and `>`.
fn processing_instruction(raw: &str) -> Token {
    let text = raw.strip_suffix('?').unwrap_or(raw);
    let (target, data) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    if target.eq_ignore_ascii_case("xml") {
        Token::XmlDeclaration {
            data: data.trim().to_owned(),
        }
    } else {
        Token::ProcessingInstruction {
            target: target.to_owned(),
            data: data.trim().to_owned(),
        }
    }
}

/// Split the text between `<!DOCTYPE` and `>` into a DOCTYPE token.
///
/// Returns the token and whether the declaration was well formed. A
/// declaration with no name, an unknown keyword, or an identifier that is
/// not quoted sets the force-quirks flag, as § 13.2.5.56 - § 13.2.5.67 do.
#[must_use]
pub fn parse_doctype(body: &str) -> (Token, bool) {
    let mut token = Token::new_doctype();
    // "missing-whitespace-before-doctype-name"
    let mut well_formed = body.starts_with(char::is_whitespace);

    let rest = body.trim_start();
    let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (name, rest) = rest.split_at(name_end);
    if name.is_empty() {
        // "missing-doctype-name"
        token.set_force_quirks();
        return (token, false);
    }
    for c in name.chars() {
        token.append_to_doctype_name(c.to_ascii_lowercase());
    }

    let rest = rest.trim_start();
    if rest.is_empty() {
        return (token, well_formed);
    }

    let keyword_end = rest.find(['"', '\'']).unwrap_or(rest.len());
    let keyword = rest[..keyword_end].trim_end();
    let mut rest = &rest[keyword_end..];

    let public = if keyword.eq_ignore_ascii_case("public") {
        true
    } else if keyword.eq_ignore_ascii_case("system") {
        false
    } else {
        // "invalid-character-sequence-after-doctype-name"
        token.set_force_quirks();
        return (token, false);
    };

    // The PUBLIC keyword takes a public identifier and an optional system
    // identifier; SYSTEM takes only the system identifier.
    let identifiers: &[bool] = if public { &[true, false] } else { &[false] };
    for (index, &is_public) in identifiers.iter().enumerate() {
        match take_quoted(rest) {
            Some((value, after, closed)) => {
                token.start_doctype_identifier(is_public);
                for c in value.chars() {
                    token.append_to_doctype_identifier(is_public, c);
                }
                well_formed &= closed;
                if !closed {
                    token.set_force_quirks();
                }
                rest = after.trim_start();
            }
            None if index == 0 => {
                // "missing-quote-before-doctype-public-identifier"
                token.set_force_quirks();
                return (token, false);
            }
            None => break,
        }
    }

    // "unexpected-character-after-doctype-system-identifier"
    well_formed &= rest.trim().is_empty();
    (token, well_formed)
}

/// Read a quoted identifier at the start of `text`. Returns the identifier,
/// the text after it, and whether the closing quote was found.
fn take_quoted(text: &str) -> Option<(&str, &str, bool)> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let inner = &text[1..];
    Some(match inner.find(quote) {
        Some(end) => (&inner[..end], &inner[end + 1..], true),
        None => (inner, "", false),
    })
}

/// Source position reached by walking `text` from `start`.
fn position_after(start: SourcePos, text: &str) -> SourcePos {
    let mut pos = start;
    for c in text.chars() {
        pos.advance(c);
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifiers(token: &Token) -> (Option<&str>, Option<&str>, Option<&str>, bool) {
        match token {
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => (
                name.as_deref(),
                public_identifier.as_deref(),
                system_identifier.as_deref(),
                *force_quirks,
            ),
            other => panic!("not a doctype: {other}"),
        }
    }

    #[test]
    fn html5_doctype() {
        let (token, ok) = parse_doctype(" html");
        assert!(ok);
        assert_eq!(identifiers(&token), (Some("html"), None, None, false));
    }

    #[test]
    fn public_doctype_with_system_identifier() {
        let (token, ok) = parse_doctype(
            r#" HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd""#,
        );
        assert!(ok);
        assert_eq!(
            identifiers(&token),
            (
                Some("html"),
                Some("-//W3C//DTD HTML 4.01//EN"),
                Some("http://www.w3.org/TR/html4/strict.dtd"),
                false
            )
        );
    }

    #[test]
    fn system_doctype() {
        let (token, ok) = parse_doctype(" html SYSTEM 'about:legacy-compat'");
        assert!(ok);
        assert_eq!(
            identifiers(&token),
            (Some("html"), None, Some("about:legacy-compat"), false)
        );
    }

    #[test]
    fn defects_are_flagged() {
        assert!(!parse_doctype("").1);
        assert!(!parse_doctype("html").1);
        assert!(!parse_doctype(" html BOGUS").1);
        assert!(!parse_doctype(" html PUBLIC \"unterminated").1);
        assert!(!parse_doctype(" html SYSTEM \"a\" junk").1);
        assert!(identifiers(&parse_doctype(" html PUBLIC nope").0).3);
    }

    #[test]
    fn processing_instruction_targets() {
        assert_eq!(
            processing_instruction("xml version=\"1.0\"?"),
            Token::XmlDeclaration {
                data: "version=\"1.0\"".into()
            }
        );
        assert_eq!(
            processing_instruction("php echo 1; ?"),
            Token::ProcessingInstruction {
                target: "php".into(),
                data: "echo 1;".into()
            }
        );
    }
}
