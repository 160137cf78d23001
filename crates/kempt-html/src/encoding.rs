//! Input decoding.
//!
//! 1. A byte order mark decides the encoding outright.
//! 2. Otherwise the configured input encoding is used. A `<meta charset>` or
//!    `http-equiv` declaration in the first 1024 bytes is compared against it
//!    and a disagreement is reported, not acted on.
//! 3. Bytes that are invalid in the chosen encoding become U+FFFD and are
//!    counted in one `INVALID_BYTE_SEQUENCE` warning.

use encoding_rs::{DecoderResult, Encoding as RsEncoding};
use kempt_common::{Message, MessageCode};
use kempt_config::Encoding;

/// How far into the input the `<meta>` prescan looks.
const PRESCAN_LIMIT: usize = 1024;

/// The result of decoding raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded text, without any byte order mark.
    pub text: String,
    /// The encoding actually used.
    pub encoding: Encoding,
    /// The encoding named by a `<meta>` declaration, if any.
    pub declared: Option<Encoding>,
    /// Lexer messages about the encoding.
    pub messages: Vec<Message>,
}

/// Detect a byte order mark. Returns the encoding and the number of bytes
/// to skip.
#[must_use]
pub fn detect_bom(bytes: &[u8]) -> Option<(Encoding, usize)> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((Encoding::Utf8, 3))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some((Encoding::Utf16le, 2))
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some((Encoding::Utf16be, 2))
    } else {
        None
    }
}

/// The `encoding_rs` codec for an encoding, or `None` for the encodings
/// decoded by hand.
#[must_use]
pub fn codec(encoding: Encoding) -> Option<&'static RsEncoding> {
    match encoding {
        Encoding::Raw | Encoding::Ascii | Encoding::Latin1 => None,
        Encoding::Utf8 => Some(encoding_rs::UTF_8),
        Encoding::Win1252 => Some(encoding_rs::WINDOWS_1252),
        Encoding::Utf16le => Some(encoding_rs::UTF_16LE),
        Encoding::Utf16be => Some(encoding_rs::UTF_16BE),
        Encoding::Mac => Some(encoding_rs::MACINTOSH),
        Encoding::Shiftjis => Some(encoding_rs::SHIFT_JIS),
        Encoding::Big5 => Some(encoding_rs::BIG5),
    }
}

/// Map a charset label to one of the supported encodings.
#[must_use]
pub fn encoding_for_label(label: &str) -> Option<Encoding> {
    let label = label.trim().to_ascii_lowercase();
    // encoding_rs folds these into windows-1252; keep them apart.
    match label.as_str() {
        "us-ascii" | "ascii" => return Some(Encoding::Ascii),
        "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => return Some(Encoding::Latin1),
        _ => {}
    }
    let found = RsEncoding::for_label(label.as_bytes())?;
    [
        Encoding::Utf8,
        Encoding::Win1252,
        Encoding::Utf16le,
        Encoding::Utf16be,
        Encoding::Mac,
        Encoding::Shiftjis,
        Encoding::Big5,
    ]
    .into_iter()
    .find(|candidate| codec(*candidate) == Some(found))
}

/// Encodings that decode the same ASCII-only document identically are not
/// worth a mismatch warning when one is declared and the other configured.
fn compatible(configured: Encoding, declared: Encoding) -> bool {
    configured == declared
        || matches!(
            (configured, declared),
            (Encoding::Utf8, Encoding::Ascii)
                | (Encoding::Latin1 | Encoding::Win1252, Encoding::Ascii)
                | (Encoding::Latin1, Encoding::Win1252)
                | (Encoding::Win1252, Encoding::Latin1)
        )
}

/// Decode raw input bytes.
#[must_use]
pub fn decode(bytes: &[u8], configured: Encoding) -> Decoded {
    let mut messages = Vec::new();
    let declared = prescan_meta_charset(bytes);

    let (encoding, body) = match detect_bom(bytes) {
        Some((detected, skip)) => {
            if configured != detected && configured != Encoding::Raw {
                messages.push(mismatch(configured, detected));
            }
            (detected, &bytes[skip..])
        }
        None => {
            if let Some(declared) = declared
                && configured != Encoding::Raw
                && !compatible(configured, declared)
            {
                messages.push(mismatch(configured, declared));
            }
            (configured, bytes)
        }
    };

    let (text, invalid) = decode_with(body, encoding);
    if invalid > 0 {
        log::debug!("{invalid} invalid byte sequence(s) in {encoding} input");
        messages.push(Message::new(
            MessageCode::InvalidByteSequence,
            None,
            vec![invalid.to_string(), encoding.to_string()],
        ));
    }

    Decoded {
        text,
        encoding,
        declared,
        messages,
    }
}

fn mismatch(configured: Encoding, detected: Encoding) -> Message {
    Message::new(
        MessageCode::EncodingMismatch,
        None,
        vec![configured.to_string(), detected.to_string()],
    )
}

/// Decode `bytes` and count the malformed sequences replaced with U+FFFD.
fn decode_with(bytes: &[u8], encoding: Encoding) -> (String, usize) {
    match encoding {
        Encoding::Raw | Encoding::Latin1 => (bytes.iter().map(|&b| char::from(b)).collect(), 0),
        Encoding::Ascii => {
            let mut invalid = 0;
            let text = bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        invalid += 1;
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect();
            (text, invalid)
        }
        other => match codec(other) {
            Some(codec) => decode_counting(bytes, codec),
            None => (String::from_utf8_lossy(bytes).into_owned(), 0),
        },
    }
}

fn decode_counting(bytes: &[u8], codec: &'static RsEncoding) -> (String, usize) {
    let mut decoder = codec.new_decoder_without_bom_handling();
    let mut text = String::with_capacity(bytes.len());
    let mut src = bytes;
    let mut invalid = 0;
    loop {
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(src.len())
            .unwrap_or(src.len().saturating_mul(3));
        text.reserve(needed);
        let (result, read) = decoder.decode_to_string_without_replacement(src, &mut text, true);
        src = &src[read..];
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => {}
            DecoderResult::Malformed(_, _) => {
                invalid += 1;
                text.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }
    (text, invalid)
}

/// [§ 13.2.3.2 Determining the character encoding](https://html.spec.whatwg.org/multipage/parsing.html#prescan-a-byte-stream-to-determine-its-encoding)
///
/// A reduced prescan: look for `charset=` inside the first `<meta` tags of
/// the first 1024 bytes, which covers both `<meta charset="x">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=x">`.
#[must_use]
pub fn prescan_meta_charset(bytes: &[u8]) -> Option<Encoding> {
    let window = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    let lower: Vec<u8> = window.iter().map(u8::to_ascii_lowercase).collect();

    let mut from = 0;
    while let Some(offset) = find(&lower[from..], b"<meta") {
        let start = from + offset;
        let end = find(&lower[start..], b">").map_or(lower.len(), |e| start + e);
        let tag = &lower[start..end];
        if let Some(at) = find(tag, b"charset") {
            let rest = skip_while(&tag[at + b"charset".len()..], |b| b.is_ascii_whitespace());
            if let Some(rest) = rest.strip_prefix(b"=") {
                let rest = skip_while(rest, |b| {
                    b.is_ascii_whitespace() || b == b'"' || b == b'\''
                });
                let label_len = rest
                    .iter()
                    .position(|&b| {
                        b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b';' | b'/' | b'>')
                    })
                    .unwrap_or(rest.len());
                let label = String::from_utf8_lossy(&rest[..label_len]);
                return encoding_for_label(&label);
            }
        }
        from = end;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn skip_while(bytes: &[u8], pred: impl Fn(u8) -> bool) -> &[u8] {
    let skip = bytes.iter().take_while(|&&b| pred(b)).count();
    &bytes[skip..]
}

/// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// "Before the tokenization stage, the input stream must be preprocessed by
/// normalizing newlines." CR LF pairs and lone CRs both become LF.
#[must_use]
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                let _ = chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bom_wins_and_reports_mismatch() {
        let decoded = decode(b"\xFF\xFEh\x00i\x00", Encoding::Utf8);
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding, Encoding::Utf16le);
        assert_eq!(decoded.messages[0].code, MessageCode::EncodingMismatch);
        assert_eq!(decoded.messages[0].args, vec!["utf8", "utf16le"]);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let decoded = decode(b"\xEF\xBB\xBF<p>", Encoding::Utf8);
        assert_eq!(decoded.text, "<p>");
        assert!(decoded.messages.is_empty());
    }

    #[test]
    fn test_meta_charset_prescan() {
        assert_eq!(
            prescan_meta_charset(b"<head><META charset=\"ISO-8859-1\"></head>"),
            Some(Encoding::Latin1)
        );
        assert_eq!(
            prescan_meta_charset(
                b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\">"
            ),
            Some(Encoding::Shiftjis)
        );
        assert_eq!(prescan_meta_charset(b"<meta name=x>"), None);
    }

    #[test]
    fn test_declared_mismatch_is_reported_but_configured_is_used() {
        let decoded = decode(b"<meta charset=big5>\xC3\xA9", Encoding::Utf8);
        assert_eq!(decoded.encoding, Encoding::Utf8);
        assert_eq!(decoded.declared, Some(Encoding::Big5));
        assert!(decoded.text.ends_with('\u{e9}'));
        assert_eq!(decoded.messages[0].code, MessageCode::EncodingMismatch);
    }

    #[test]
    fn test_invalid_bytes_are_counted_once() {
        let decoded = decode(b"a\xFFb\xFEc", Encoding::Utf8);
        assert_eq!(decoded.text, "a\u{FFFD}b\u{FFFD}c");
        assert_eq!(decoded.messages.len(), 1);
        assert_eq!(decoded.messages[0].code, MessageCode::InvalidByteSequence);
        assert_eq!(decoded.messages[0].args[0], "2");
    }

    #[test]
    fn test_ascii_and_raw() {
        let ascii = decode(b"caf\xE9", Encoding::Ascii);
        assert_eq!(ascii.text, "caf\u{FFFD}");
        assert_eq!(ascii.messages.len(), 1);

        let raw = decode(b"caf\xE9", Encoding::Raw);
        assert_eq!(raw.text, "caf\u{e9}");
        assert!(raw.messages.is_empty());
    }

    #[test]
    fn test_windows_1252_decodes_c1_range() {
        let decoded = decode(b"\x80", Encoding::Win1252);
        assert_eq!(decoded.text, "\u{20AC}");
    }

    #[test]
    fn test_newline_normalization() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
