//! Byte-level character classification for the tokenizer.
//!
//! Veld source is scanned byte-wise; identifiers and keywords are ASCII, and
//! multi-byte UTF-8 sequences only appear inside strings and comments where
//! they are consumed opaquely.

/// Byte constants used throughout the tokenizer.
pub struct CharCodes;

impl CharCodes {
    pub const LINE_FEED: u8 = b'\n';
    pub const CARRIAGE_RETURN: u8 = b'\r';
    pub const SPACE: u8 = b' ';
    pub const TAB: u8 = b'\t';

    pub const SINGLE_QUOTE: u8 = b'\'';
    pub const DOUBLE_QUOTE: u8 = b'"';
    pub const BACKSLASH: u8 = b'\\';
    pub const OPEN_BRACE: u8 = b'{';
    pub const CLOSE_BRACE: u8 = b'}';
    pub const HASH: u8 = b'#';
}

#[inline]
pub fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

#[inline]
pub fn is_octal_digit(ch: u8) -> bool {
    (b'0'..=b'7').contains(&ch)
}

#[inline]
pub fn is_binary_digit(ch: u8) -> bool {
    ch == b'0' || ch == b'1'
}

/// Identifiers start with an ASCII letter.
#[inline]
pub fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic()
}

/// Identifiers continue with letters, digits, or `_`.
#[inline]
pub fn is_ident_part(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// Inter-token whitespace consumed silently (newline is a token of its own).
#[inline]
pub fn is_inline_whitespace(ch: u8) -> bool {
    ch == CharCodes::SPACE || ch == CharCodes::TAB || ch == CharCodes::CARRIAGE_RETURN
}
