//! Splitting file content into lines and back.

/// Control bytes that never appear in text files.
const BINARY_MARKERS: &[u8] = &[
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15,
    0x16, 0x17, 0x18, 0x19, 0x1a, 0x1c, 0x1d, 0x1e, 0x1f,
];

/// Heuristic: does this content look like a binary file?
pub fn guess_binary(data: &[u8]) -> bool {
    data.iter().any(|b| BINARY_MARKERS.contains(b))
}

/// Split content on `\n`. The terminator is not part of the line; a final
/// unterminated fragment is kept as its own line.
pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    body.split(|b| *b == b'\n').collect()
}

/// Join lines back into content, terminating every line with `\n`.
pub fn join_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<u8> {
    let total = lines.iter().map(|l| l.as_ref().len() + 1).sum();
    let mut out = Vec::with_capacity(total);
    for line in lines {
        out.extend_from_slice(line.as_ref());
        out.push(b'\n');
    }
    out
}
