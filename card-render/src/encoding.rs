//! WinAnsi (Windows-1252) text encoding for the standard PDF fonts
//!
//! The 14 standard Type1 fonts only cover a single-byte encoding. French
//! text (é, è, ô, ç, œ, «») fits in Windows-1252; anything outside it is
//! replaced with `?` rather than failing the whole document.

/// Encode text for a `WinAnsiEncoding` font
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for c in s.chars() {
        let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&cow);
        }
    }
    out
}
