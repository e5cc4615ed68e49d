// THEORY:
// When a client swears it sent a PNG and the engine says otherwise, somebody needs to
// look at the bytes. `inspect_payload` is that look: it decodes the payload the strict
// way (data URI header and line breaks removed, standard padded base64, nothing
// else), then reports what came out without judging it. A payload that decodes to
// garbage is still a successful inspection; only text that is not base64 at all is an
// error.

use crate::core_modules::decoder::{DecodeLimits, decode_raster, guess_mime_type};
use crate::core_modules::payload::{EncodingError, decode_strict_payload};
use crate::core_modules::raster::Raster;

const PREVIEW_BYTES: usize = 8;

/// Hint shown next to every report.
pub const INSPECTION_NOTE: &str =
    "payloads produced by canvas.toDataURL('image/png') should report decode_ok=true";

/// What a payload turned out to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadReport {
    pub decoded_len: usize,
    /// First eight decoded bytes as lowercase hex.
    pub first8_hex: String,
    pub mime_guess: &'static str,
    pub decode_ok: bool,
    /// Empty when `decode_ok`.
    pub decode_err: String,
    pub width: u32,
    pub height: u32,
    pub note: &'static str,
}

/// Decodes `text` strictly and describes the resulting bytes.
pub fn inspect_payload(text: &str, limits: &DecodeLimits) -> Result<PayloadReport, EncodingError> {
    let bytes = decode_strict_payload(text)?;

    let first8_hex = bytes
        .iter()
        .take(PREVIEW_BYTES)
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();

    let (decode_ok, decode_err, (width, height)) = match decode_raster(&bytes, limits) {
        Ok(raster) => (true, String::new(), raster.dimensions()),
        Err(err) => (false, err.to_string(), (0, 0)),
    };

    Ok(PayloadReport {
        decoded_len: bytes.len(),
        first8_hex,
        mime_guess: guess_mime_type(&bytes),
        decode_ok,
        decode_err,
        width,
        height,
        note: INSPECTION_NOTE,
    })
}
