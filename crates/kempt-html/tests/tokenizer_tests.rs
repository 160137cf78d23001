//! Integration tests for the HTML tokenizer.

use kempt_common::{Message, MessageCode, SourcePos};
use kempt_config::BadCharRefs;
use kempt_html::{HtmlTokenizer, LocatedToken, Token, TokenizerOptions};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    tokenize_located(input)
        .0
        .into_iter()
        .map(|located| located.token)
        .collect()
}

fn tokenize_located(input: &str) -> (Vec<LocatedToken>, Vec<Message>) {
    tokenize_with(input, TokenizerOptions::default())
}

fn tokenize_with(input: &str, options: TokenizerOptions) -> (Vec<LocatedToken>, Vec<Message>) {
    let mut tokenizer = HtmlTokenizer::new(input, options);
    tokenizer.run();
    let messages = tokenizer.take_messages();
    (tokenizer.into_tokens(), messages)
}

/// Concatenate the character tokens.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

fn codes(messages: &[Message]) -> Vec<MessageCode> {
    messages.iter().map(|m| m.code).collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[4], Token::Character { data: 'o' }));
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize("<DIV Class=\"a\" id='b' hidden>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            let pairs: Vec<_> = attributes
                .iter()
                .map(|a| (a.name.as_str(), a.value.as_str()))
                .collect();
            assert_eq!(pairs, vec![("class", "a"), ("id", "b"), ("hidden", "")]);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag {
            self_closing: true,
            ..
        }
    ));
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::EndTag { name, .. } => assert_eq!(name, "div"),
        _ => panic!("Expected EndTag token"),
    }
}

#[test]
fn test_end_tag_with_attributes_is_reported() {
    let (_, messages) = tokenize_located("</div class=x>");
    assert_eq!(codes(&messages), vec![MessageCode::EndTagWithAttributes]);
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, messages) = tokenize_located("<p id=a id=b>");
    match &tokens[0].token {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].value, "a");
        }
        _ => panic!("Expected StartTag token"),
    }
    assert_eq!(codes(&messages), vec![MessageCode::DuplicateAttribute]);
    assert_eq!(messages[0].args, vec!["p", "id", "b"]);
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_owned()
        }
    );
}

#[test]
fn test_adjacent_hyphens_inside_comment() {
    let (tokens, messages) = tokenize_located("<!-- a -- b -->");
    assert_eq!(
        tokens[0].token,
        Token::Comment {
            data: " a -- b ".to_owned()
        }
    );
    assert_eq!(codes(&messages), vec![MessageCode::MalformedComment]);
}

#[test]
fn test_comment_closed_with_space_before_gt() {
    let (tokens, messages) = tokenize_located("<!-- a -- >x");
    let tokens: Vec<Token> = tokens.into_iter().map(|located| located.token).collect();
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " a ".to_owned()
        }
    );
    assert_eq!(text_of(&tokens), "x");
    assert_eq!(codes(&messages), vec![MessageCode::MalformedMarkup]);
    assert_eq!(messages[0].args, vec!["whitespace-in-comment-end"]);
}

#[test]
fn test_unterminated_comment_is_cut_at_first_double_hyphen() {
    let (tokens, messages) = tokenize_located("<!-- a -- b");
    let tokens: Vec<Token> = tokens.into_iter().map(|located| located.token).collect();
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " a ".to_owned()
        }
    );
    assert_eq!(text_of(&tokens), " b");
    assert!(matches!(tokens.last(), Some(Token::EndOfFile)));
    assert_eq!(
        codes(&messages),
        vec![MessageCode::MalformedComment, MessageCode::UnterminatedComment]
    );
    assert_eq!(messages[1].args, vec!["a"]);
}

#[test]
fn test_unterminated_comment_resumes_after_gt() {
    let (tokens, messages) = tokenize_located("<!-- a > <b>x");
    let tokens: Vec<Token> = tokens.into_iter().map(|located| located.token).collect();
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " a ".to_owned()
        }
    );
    assert!(tokens.iter().any(|token| matches!(
        token,
        Token::StartTag { name, .. } if name == "b"
    )));
    assert_eq!(codes(&messages), vec![MessageCode::UnterminatedComment]);
}

#[test]
fn test_cdata_section() {
    let tokens = tokenize("<![CDATA[a<b]]>");
    assert_eq!(
        tokens[0],
        Token::CData {
            data: "a<b".to_owned()
        }
    );
}

#[test]
fn test_processing_instruction_and_xml_declaration() {
    let tokens = tokenize("<?xml version=\"1.0\"?><?php echo 1 ?>");
    assert_eq!(
        tokens[0],
        Token::XmlDeclaration {
            data: "version=\"1.0\"".to_owned()
        }
    );
    assert_eq!(
        tokens[1],
        Token::ProcessingInstruction {
            target: "php".to_owned(),
            data: "echo 1".to_owned()
        }
    );
}

#[test]
fn test_named_character_references() {
    let (tokens, messages) = tokenize_located("a &amp; b &copy; c");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "a & b \u{a9} c");
    assert!(messages.is_empty());
}

#[test]
fn test_missing_semicolon_still_decodes() {
    let (tokens, messages) = tokenize_located("x &amp y");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "x & y");
    assert_eq!(codes(&messages), vec![MessageCode::MissingSemicolon]);
    assert_eq!(messages[0].pos, Some(SourcePos::new(1, 3)));
}

#[test]
fn test_unknown_entity_kept_verbatim() {
    let (tokens, messages) = tokenize_located("&bogus;");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "&bogus;");
    assert_eq!(codes(&messages), vec![MessageCode::UnknownEntity]);
}

#[test]
fn test_numeric_references() {
    let tokens = tokenize("&#65;&#x42;&#X43;");
    assert_eq!(text_of(&tokens), "ABC");
}

#[test]
fn test_c1_reference_maps_through_windows_1252() {
    let (tokens, messages) = tokenize_located("&#128;");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "\u{20AC}");
    assert_eq!(codes(&messages), vec![MessageCode::VendorSpecificChars]);
}

#[test]
fn test_invalid_reference_policy() {
    let (tokens, messages) = tokenize_located("a&#0;b");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "a\u{FFFD}b");
    assert_eq!(codes(&messages), vec![MessageCode::InvalidCharRef]);

    let options = TokenizerOptions {
        bad_char_refs: BadCharRefs::Discard,
    };
    let (tokens, messages) = tokenize_with("a&#0;b", options);
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "ab");
    assert_eq!(codes(&messages), vec![MessageCode::InvalidCharRef]);
}

#[test]
fn test_attribute_references() {
    let tokens = tokenize("<a href=\"?a=1&amp;b=2\" title='&lt;x&gt;'>");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes[0].value, "?a=1&b=2");
            assert_eq!(attributes[1].value, "<x>");
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_rcdata_in_title() {
    let tokens = tokenize("<title>a <b> &amp; c</title>");
    assert_eq!(text_of(&tokens), "a <b> & c");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag { name, .. } if name == "title"));
}

#[test]
fn test_script_is_raw_text() {
    let tokens = tokenize("<script>if (a</b) {}</script>");
    assert_eq!(text_of(&tokens), "if (a</b) {}");
}

#[test]
fn test_positions_track_lines_and_columns() {
    let (tokens, _) = tokenize_located("a\n  <b>");
    assert_eq!(tokens[0].pos, SourcePos::new(1, 1));
    let tag = tokens
        .iter()
        .find(|t| matches!(t.token, Token::StartTag { .. }))
        .unwrap();
    assert_eq!(tag.pos, SourcePos::new(2, 3));
}

#[test]
fn test_carriage_returns_are_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(text_of(&tokens), "a\nb\nc");
}

#[test]
fn test_lone_less_than_is_text() {
    let (tokens, messages) = tokenize_located("a < b");
    let tokens: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(text_of(&tokens), "a < b");
    assert_eq!(codes(&messages), vec![MessageCode::MalformedMarkup]);
}

#[test]
fn test_exactly_one_end_of_file() {
    let mut tokenizer = HtmlTokenizer::new("<p>x", TokenizerOptions::default());
    let eofs = tokenizer.by_ref().filter(|t| t.token.is_eof()).count();
    assert_eq!(eofs, 1);
    assert!(tokenizer.next().is_none());
}
