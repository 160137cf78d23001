//! Output sinks: newline style and character encoding.
//!
//! Encoding goes through `encoding_rs` where it has an encoder. ASCII and
//! Latin-1 are narrow enough to do by hand, and UTF-16 has to be: the
//! `encoding_rs` encoders for the UTF-16 labels produce UTF-8. Characters
//! the target encoding cannot represent are written as character
//! references.

use std::io::{self, Write};

use encoding_rs::EncoderResult;
use kempt_config::{Encoding, Newline, OptionId, OptionStore};
use kempt_html::encoding::codec;
use kempt_html::tokenizer::named_character_references::entity_name;
use thiserror::Error;

/// Failures while writing output.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The destination refused the bytes.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Converts printed text into the bytes that are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSink {
    /// Line ending.
    pub newline: Newline,
    /// Target encoding.
    pub encoding: Encoding,
    /// Write unmappable characters as `&#N;` even when a name exists.
    pub numeric_entities: bool,
}

impl OutputSink {
    /// The sink described by `newline`, `output-encoding` and
    /// `numeric-entities`.
    #[must_use]
    pub fn from_store(store: &OptionStore) -> Self {
        Self {
            newline: store.get_choice(OptionId::Newline),
            encoding: store.get_choice(OptionId::OutputEncoding),
            numeric_entities: store.get_bool(OptionId::NumericEntities),
        }
    }

    /// The bytes for `text`.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let text = match self.newline {
            Newline::Lf => text.to_owned(),
            other => text.replace('\n', other.as_str()),
        };
        match self.encoding {
            Encoding::Utf8 => text.into_bytes(),
            Encoding::Raw => self.encode_narrow(&text, u32::MAX),
            Encoding::Latin1 => self.encode_narrow(&text, 0xFF),
            Encoding::Ascii => self.encode_narrow(&text, 0x7F),
            Encoding::Utf16le => encode_utf16(&text, u16::to_le_bytes),
            Encoding::Utf16be => encode_utf16(&text, u16::to_be_bytes),
            other => match codec(other) {
                Some(codec) => self.encode_with(codec, &text),
                None => text.into_bytes(),
            },
        }
    }

    /// Encode `text` and write it to `out`.
    ///
    /// # Errors
    ///
    /// [`PrintError::Io`] when the writer fails.
    pub fn write<W: Write>(&self, text: &str, out: &mut W) -> Result<(), PrintError> {
        let bytes = self.encode(text);
        log::debug!("writing {} bytes as {}", bytes.len(), self.encoding);
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// One byte per character up to `limit`. `Raw` writes anything above a
    /// byte as UTF-8.
    fn encode_narrow(&self, text: &str, limit: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            let code = u32::from(c);
            match u8::try_from(code) {
                Ok(byte) if code <= limit => out.push(byte),
                _ if limit == u32::MAX => {
                    let mut buf = [0; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                _ => out.extend_from_slice(self.reference(c).as_bytes()),
            }
        }
        out
    }

    fn encode_with(&self, codec: &'static encoding_rs::Encoding, text: &str) -> Vec<u8> {
        let mut encoder = codec.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut rest = text;
        loop {
            let needed = encoder
                .max_buffer_length_from_utf8_without_replacement(rest.len())
                .unwrap_or(rest.len() * 4 + 16);
            out.reserve(needed);
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(c) => {
                    out.extend_from_slice(self.reference(c).as_bytes());
                }
            }
        }
        out
    }

    fn reference(&self, c: char) -> String {
        match entity_name(c) {
            Some(name) if !self.numeric_entities => format!("&{name};"),
            _ => format!("&#{};", u32::from(c)),
        }
    }
}

/// UTF-16 with a byte order mark.
fn encode_utf16(text: &str, to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    std::iter::once(0xFEFF)
        .chain(text.encode_utf16())
        .flat_map(to_bytes)
        .collect()
}
