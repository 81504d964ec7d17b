use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::errors::{StatementParseError, StatementResult};

/// Text decoded from raw statement bytes, with the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decodes `bytes` with the first encoding in `labels` that accepts them.
///
/// Single-byte code pages map every byte, so a legacy decode that yields C1
/// control characters (bytes the code page leaves undefined) counts as failed.
pub fn decode(bytes: &[u8], labels: &[String]) -> StatementResult<DecodedText> {
    for label in labels {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            debug!(label = %label, "skipping unknown encoding label");
            continue;
        };

        let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
        else {
            debug!(encoding = encoding.name(), "decode failed");
            continue;
        };

        if encoding != UTF_8 && text.chars().any(is_c1_control) {
            debug!(encoding = encoding.name(), "decode produced undefined code points");
            continue;
        }

        let text = text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string();
        return Ok(DecodedText {
            text,
            encoding: encoding.name(),
        });
    }

    Err(StatementParseError::UndecodableEncoding)
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn default_labels() -> Vec<String> {
        crate::config::ParsingConfig::default().encodings
    }

    #[test]
    fn test_utf8_wins_first() {
        let decoded = decode("Składka członkowska".as_bytes(), &default_labels()).unwrap();
        assert_eq!(decoded.text, "Składka członkowska");
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_windows_1250_fallback() {
        // "Wartość" in windows-1250: ś = 0x9C, ć = 0xE6
        let bytes = b"Warto\x9c\xe6";
        let decoded = decode(bytes, &default_labels()).unwrap();
        assert_eq!(decoded.text, "Wartość");
        assert_eq!(decoded.encoding, "windows-1250");
    }

    #[test]
    fn test_bom_is_removed() {
        let decoded = decode(b"\xef\xbb\xbfKwota", &default_labels()).unwrap();
        assert_eq!(decoded.text, "Kwota");
    }

    #[rstest]
    #[case(b"\x81\x98".as_slice())]
    #[case(b"abc\x83def".as_slice())]
    fn test_undecodable_in_all_encodings(#[case] bytes: &[u8]) {
        let result = decode(bytes, &default_labels());
        assert!(matches!(result, Err(StatementParseError::UndecodableEncoding)));
    }

    #[test]
    fn test_utf8_only_rejects_legacy_bytes() {
        let result = decode(b"Warto\x9c\xe6", &["utf-8".to_string()]);
        assert!(matches!(result, Err(StatementParseError::UndecodableEncoding)));
    }

    #[test]
    fn test_unknown_label_is_skipped() {
        let labels = vec!["klingon".to_string(), "utf-8".to_string()];
        let decoded = decode(b"Kwota", &labels).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
    }
}
