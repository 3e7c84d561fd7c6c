//! Percent-decoding for URL paths.

/// Bytes that stay encoded after decoding: decoding them would change how
/// the URL splits (`?`, `#`) or let a second pass decode again (`%`).
const KEEP_ENCODED: &[u8] = b"%?#";

/// Percent-decodes a URL path into UTF-8.
///
/// `%25`, `%3F` and `%23` are left encoded, and a stray `%` that does not
/// start a valid escape is written as `%25`, so decoding an already decoded
/// string is a no-op. Decoded bytes that are not valid UTF-8 are written
/// back as uppercase `%XX` escapes, keeping distinct names distinct.
pub fn percent_decode_path(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'%' {
            out.push(b);
            i += 1;
            continue;
        }
        let escape = bytes
            .get(i + 1)
            .copied()
            .and_then(hex_digit)
            .zip(bytes.get(i + 2).copied().and_then(hex_digit));
        match escape {
            Some((high, low)) => {
                let decoded = high << 4 | low;
                if KEEP_ENCODED.contains(&decoded) {
                    out.push(b'%');
                    out.extend_from_slice(&[hex_upper(high), hex_upper(low)]);
                } else {
                    out.push(decoded);
                }
                i += 3;
            }
            None => {
                out.extend_from_slice(b"%25");
                i += 1;
            }
        }
    }
    let mut decoded = String::with_capacity(out.len());
    for chunk in out.utf8_chunks() {
        decoded.push_str(chunk.valid());
        for &b in chunk.invalid() {
            decoded.push('%');
            decoded.push(char::from(hex_upper(b >> 4)));
            decoded.push(char::from(hex_upper(b)));
        }
    }
    decoded
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn hex_upper(nibble: u8) -> u8 {
    b"0123456789ABCDEF"[(nibble & 0x0f) as usize]
}
