//! Transfer encodings: Base64 and RFC 2045 Quoted-Printable.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length for Quoted-Printable and Base64 bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes data as Base64 wrapped at 76 columns with CRLF line breaks,
/// as required for MIME body parts.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        // Chunks of an ASCII string are valid UTF-8.
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (`\n` or `\r\n`) are normalized to hard CRLF
/// breaks in the output. Other bytes outside printable ASCII are escaped as
/// `=XX`, lines are soft-wrapped at 76 columns, and trailing whitespace
/// before a line break is escaped so it survives transport.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let lines: Vec<&[u8]> = text
        .as_bytes()
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        encode_qp_line(&mut out, line);
    }

    out
}

fn encode_qp_line(out: &mut String, line: &[u8]) {
    let mut width = 0;
    for (pos, &byte) in line.iter().enumerate() {
        let at_line_end = pos == line.len() - 1;
        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            // Space and tab stay literal except at the end of a line.
            b' ' | b'\t' => !at_line_end,
            _ => false,
        };

        let token_len = if literal { 1 } else { 3 };
        // Soft break, leaving room for the '=' marker.
        if width + token_len > MAX_LINE_LENGTH - 1 {
            out.push_str("=\r\n");
            width = 0;
        }

        if literal {
            out.push(byte as char);
        } else {
            out.push('=');
            let _ = write!(out, "{byte:02X}");
        }
        width += token_len;
    }
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let mut result = Vec::new();
    let mut bytes = text.bytes().peekable();

    while let Some(b) = bytes.next() {
        if b != b'=' {
            result.push(b);
            continue;
        }

        // Soft line break: '=' immediately before CRLF or LF.
        if bytes.peek() == Some(&b'\r') {
            bytes.next();
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
                continue;
            }
            return Err(Error::InvalidEncoding("bare CR after '='".to_string()));
        }
        if bytes.peek() == Some(&b'\n') {
            bytes.next();
            continue;
        }

        let hex: Vec<u8> = bytes.by_ref().take(2).collect();
        if hex.len() != 2 {
            return Err(Error::InvalidEncoding(
                "incomplete escape sequence".to_string(),
            ));
        }
        let hex_str = std::str::from_utf8(&hex)
            .map_err(|_| Error::InvalidEncoding("non-ASCII escape sequence".to_string()))?;
        let byte = u8::from_str_radix(hex_str, 16)
            .map_err(|e| Error::InvalidEncoding(format!("invalid hex: {e}")))?;
        result.push(byte);
    }

    String::from_utf8(result).map_err(Into::into)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base64_round_trip() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn base64_wrapped_lines() {
        let data = vec![0xAB_u8; 200];
        let encoded = encode_base64_wrapped(&data);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= 76);
        }
        let joined: String = encoded.split("\r\n").collect();
        assert_eq!(decode_base64(&joined).unwrap(), data);
    }

    #[test]
    fn qp_plain_ascii_unchanged() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn qp_escapes_non_ascii() {
        let encoded = encode_quoted_printable("Héllo");
        assert_eq!(encoded, "H=C3=A9llo");
    }

    #[test]
    fn qp_normalizes_line_breaks() {
        assert_eq!(
            encode_quoted_printable("this is a test\n12345\n"),
            "this is a test\r\n12345\r\n"
        );
        assert_eq!(encode_quoted_printable("a\r\nb"), "a\r\nb");
    }

    #[test]
    fn qp_escapes_trailing_space() {
        assert_eq!(encode_quoted_printable("trailing \nnext"), "trailing=20\r\nnext");
        assert_eq!(encode_quoted_printable("tab\t\nnext"), "tab=09\r\nnext");
    }

    #[test]
    fn qp_escapes_equals_sign() {
        assert_eq!(encode_quoted_printable("a=b"), "a=3Db");
    }

    #[test]
    fn qp_soft_wraps_long_lines() {
        let long = "x".repeat(200);
        let encoded = encode_quoted_printable(&long);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= 76, "line too long: {}", line.len());
        }
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), long);
    }

    #[test]
    fn qp_decode_soft_break() {
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld").unwrap(), "HelloWorld");
    }

    #[test]
    fn qp_decode_rejects_truncated_escape() {
        assert!(decode_quoted_printable("abc=4").is_err());
        assert!(decode_quoted_printable("abc=zz").is_err());
    }

    proptest! {
        // The encoding is not required to preserve the exact line-ending
        // convention, only to decode to equivalent content.
        #[test]
        fn qp_decodes_to_equivalent_content(s in "[ -~àéß❤\t]{0,200}") {
            let encoded = encode_quoted_printable(&s);
            let decoded = decode_quoted_printable(&encoded).unwrap();
            prop_assert_eq!(decoded, s);
        }

        #[test]
        fn base64_wrapped_round_trips(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let encoded = encode_base64_wrapped(&data);
            let joined: String = encoded.split("\r\n").collect();
            prop_assert_eq!(decode_base64(&joined).unwrap(), data);
        }
    }
}
