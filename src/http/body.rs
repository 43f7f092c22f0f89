//! Request body decoding
//!
//! The body is read as text, split into lines and joined again with `\n`.
//! Line terminators are `\n`, `\r` and `\r\n`; a terminator at the very end
//! does not produce an empty last line.

/// Turn a raw request body into the candidate file path
pub fn decode_path(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    split_lines(&text).join("\n")
}

fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}
