// THEORY:
// Browsers and scripts hand us images as base64 text in every flavor imaginable:
// wrapped in a `data:image/png;base64,` URI, line-wrapped at 76 columns, encoded with
// the URL-safe alphabet, with or without `=` padding. The `payload` module is the
// forgiving front door that turns all of those into raw bytes.
//
// Normalization, in order:
// 1.  Trim surrounding whitespace.
// 2.  If the text starts with `data:` (any case) and has a comma, drop everything up
//     to and including the first comma.
// 3.  Remove every '\n', '\r' and ' '.
//
// Decoding then walks a fixed list of strategies and returns the first success:
//     standard alphabet, padded
//     URL-safe characters mapped to standard ('-' -> '+', '_' -> '/'), padded
//     the same mapped text, padding optional
// These are three parameterizations tried once each, not retries. Non-zero trailing
// bits are tolerated throughout; plenty of encoders in the wild emit them.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

const DATA_URI_SCHEME: &str = "data:";

const PADDED: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

const PADDING_OPTIONAL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The text is not base64 under any of the accepted strategies.
#[derive(Debug, Error)]
#[error("base64 decode failed: {source}")]
pub struct EncodingError {
    #[source]
    source: base64::DecodeError,
}

impl EncodingError {
    /// Error reported by the last strategy attempted.
    pub fn last_attempt(&self) -> &base64::DecodeError {
        &self.source
    }
}

impl From<base64::DecodeError> for EncodingError {
    fn from(source: base64::DecodeError) -> Self {
        Self { source }
    }
}

/// Drops a leading `data:...,` header; other text is returned untouched.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    let text = text.trim();
    let has_scheme = text
        .get(..DATA_URI_SCHEME.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(DATA_URI_SCHEME));
    match text.find(',') {
        Some(comma) if has_scheme => &text[comma + 1..],
        _ => text,
    }
}

fn strip_line_breaks_and_spaces(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ' '))
        .collect()
}

fn to_standard_alphabet(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect()
}

/// Turns a loosely formatted base64 image payload into raw bytes.
pub fn decode_image_payload(text: &str) -> Result<Vec<u8>, EncodingError> {
    let compact = strip_line_breaks_and_spaces(strip_data_uri_prefix(text));

    if let Ok(bytes) = PADDED.decode(&compact) {
        return Ok(bytes);
    }
    let standard = to_standard_alphabet(&compact);
    if let Ok(bytes) = PADDED.decode(&standard) {
        tracing::debug!("payload decoded after mapping url-safe alphabet");
        return Ok(bytes);
    }
    let bytes = PADDING_OPTIONAL.decode(&standard)?;
    tracing::debug!("payload decoded without padding");
    Ok(bytes)
}

/// Strict variant: data URI header and line breaks removed, then standard padded
/// base64 only. Spaces and the URL-safe alphabet are still errors.
pub fn decode_strict_payload(text: &str) -> Result<Vec<u8>, EncodingError> {
    let unwrapped: String = strip_data_uri_prefix(text)
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .collect();
    Ok(PADDED.decode(unwrapped)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};

    // High byte runs encode to '+' and '/', i.e. '-' and '_' in the URL-safe alphabet.
    fn sample_bytes() -> Vec<u8> {
        (0u8..=255).rev().chain(0u8..=250).collect()
    }

    #[test]
    fn canonical_base64_decodes() {
        let bytes = sample_bytes();
        let decoded = decode_image_payload(&STANDARD.encode(&bytes)).expect("canonical payload");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn messy_data_uri_matches_canonical_encoding() {
        let bytes = sample_bytes();
        let canonical = STANDARD.encode(&bytes);
        let url_safe = URL_SAFE_NO_PAD.encode(&bytes);
        assert!(url_safe.contains('-') || url_safe.contains('_'));

        let wrapped: Vec<&str> = url_safe
            .as_bytes()
            .chunks(60)
            .map(|line| std::str::from_utf8(line).expect("ascii"))
            .collect();
        let messy = format!("  \r\nDATA:image/png;base64,{}\r\n ", wrapped.join("\r\n "));

        assert_eq!(
            decode_image_payload(&messy).expect("messy payload"),
            decode_image_payload(&canonical).expect("canonical payload"),
        );
    }

    #[test]
    fn url_safe_with_padding_decodes() {
        let bytes = vec![0xfb, 0xff, 0xbf];
        let padded_url_safe = "-_-_";
        assert_eq!(decode_image_payload(padded_url_safe).expect("url-safe"), bytes);

        let two_bytes = URL_SAFE.encode([0xfb, 0xf0]);
        assert!(two_bytes.ends_with('='));
        assert_eq!(decode_image_payload(&two_bytes).expect("padded url-safe"), vec![0xfb, 0xf0]);
    }

    #[test]
    fn missing_padding_is_accepted() {
        assert_eq!(decode_image_payload("aGk").expect("unpadded"), b"hi");
    }

    #[test]
    fn non_zero_trailing_bits_are_tolerated() {
        // "aGl=" carries stray low bits in its last symbol.
        assert_eq!(decode_image_payload("aGl=").expect("trailing bits"), b"hi");
    }

    #[test]
    fn garbage_is_an_encoding_error() {
        for text in ["***", "a", "aGk=aGk=x", "data:image/png;base64,!!!!"] {
            let err = decode_image_payload(text).expect_err(text);
            assert!(err.to_string().starts_with("base64 decode failed"), "{err}");
        }
    }

    #[test]
    fn empty_payload_decodes_to_no_bytes() {
        assert!(decode_image_payload("   ").expect("empty").is_empty());
        assert!(decode_image_payload("data:,").expect("empty data uri").is_empty());
    }

    #[test]
    fn data_uri_prefix_needs_both_scheme_and_comma() {
        assert_eq!(strip_data_uri_prefix(" data:image/png;base64,QUJD "), "QUJD");
        assert_eq!(strip_data_uri_prefix("Data:text/plain,a,b"), "a,b");
        assert_eq!(strip_data_uri_prefix("data:QUJD"), "data:QUJD");
        assert_eq!(strip_data_uri_prefix("QU,JD"), "QU,JD");
    }

    #[test]
    fn strict_decoding_rejects_url_safe_payloads() {
        assert_eq!(decode_strict_payload("data:image/png;base64,QUJD").expect("strict"), b"ABC");
        assert!(decode_strict_payload("-_-_").is_err());
        assert!(decode_strict_payload("aGk").is_err());
        assert!(decode_strict_payload("aG k=").is_err());
    }

    #[test]
    fn strict_decoding_skips_line_breaks() {
        assert_eq!(decode_strict_payload("aG\nk=").expect("wrapped"), b"hi");
        assert_eq!(decode_strict_payload("data:text/plain;base64,QU\r\nJD").expect("crlf"), b"ABC");
    }
}
