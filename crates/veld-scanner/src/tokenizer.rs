//! Tokenizer implementation - the lexical analyzer for Veld.
//!
//! Tokens are appended to a caller-owned array so the parser can retain its
//! buffers across parses. The tokenizer is a small state machine: `Start`
//! measures indentation at the beginning of each physical line, `Token` emits
//! one free token per step, and the two template states manage string
//! interpolation (`'a {expr} b'`).
//!
//! All positions are byte offsets. Identifiers and keywords are ASCII;
//! multi-byte UTF-8 only occurs inside strings and comments, where bytes are
//! consumed opaquely.

use memchr::memchr;
use veld_common::Diagnostic;

use crate::char_codes::{
    is_binary_digit, is_digit, is_hex_digit, is_ident_part, is_ident_start, is_inline_whitespace,
    is_octal_digit, CharCodes,
};
use crate::{text_to_keyword, OperatorKind, Token, TokenKind, TokenPayload, INDENT_TAB_OFFSET};

/// Options for a tokenize run.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizeOptions {
    /// When set, unrecognized input produces an `Err` token and tokenizing
    /// continues instead of aborting at the first lexical error.
    pub ignore_errors: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Start of a physical line: measure indentation.
    Start,
    /// Free tokens.
    Token,
    /// Inside a string or string template, scanning a segment.
    TemplateString,
    /// Inside a `{expr}` interpolation of a string template.
    TemplateExprToken,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum StringDelim {
    #[default]
    Single,
    Double,
    TripleSingle,
}

impl StringDelim {
    fn len(self) -> usize {
        match self {
            StringDelim::Single | StringDelim::Double => 1,
            StringDelim::TripleSingle => 3,
        }
    }

    fn allows_newline(self) -> bool {
        self == StringDelim::TripleSingle
    }
}

/// Book-keeping for the string template currently being scanned.
#[derive(Clone, Copy, Debug, Default)]
struct TemplateState {
    delim: StringDelim,
    /// Byte offset of the opening delimiter, for unterminated-string errors.
    string_start: usize,
    /// `{`/`}` nesting inside the current interpolation.
    brace_depth: u32,
    /// Whether any interpolation occurred in this string.
    had_expr: bool,
}

/// The tokenizer state machine.
pub struct Tokenizer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: State,
    template: TemplateState,
    ignore_errors: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            state: State::Start,
            template: TemplateState::default(),
            ignore_errors: false,
        }
    }

    /// Tokenize the whole source, appending to `tokens`.
    ///
    /// On a lexical error the byte position and message are returned and the
    /// token array is left with everything scanned so far, unless
    /// `ignore_errors` is set, in which case an `Err` token is emitted and
    /// scanning continues.
    pub fn tokenize(
        &mut self,
        tokens: &mut Vec<Token>,
        options: TokenizeOptions,
    ) -> Result<(), Diagnostic> {
        self.ignore_errors = options.ignore_errors;
        self.pos = 0;
        self.state = State::Start;
        self.template = TemplateState::default();

        // A leading `#!` line is consumed without emitting tokens.
        if self.bytes.starts_with(b"#!") {
            self.pos = match memchr(CharCodes::LINE_FEED, self.bytes) {
                Some(i) => i + 1,
                None => self.bytes.len(),
            };
        }

        loop {
            let step = match self.state {
                State::Start => {
                    self.tokenize_start(tokens);
                    Ok(())
                }
                State::Token => self.tokenize_token(tokens),
                State::TemplateString => self.tokenize_template_string(tokens),
                State::TemplateExprToken => self.tokenize_template_expr_token(tokens),
                State::End => return Ok(()),
            };
            if let Err(diag) = step {
                if !self.ignore_errors {
                    return Err(diag);
                }
                // Forgiving mode: cover the offending input with an `err`
                // token and pick the scan back up as free tokens.
                let start = diag.pos as usize;
                let end = self.pos.max(start + 1).min(self.bytes.len());
                tokens.push(Token::new(
                    TokenKind::Err,
                    diag.pos,
                    TokenPayload::End(self.offset(end)),
                ));
                self.pos = end;
                self.state = if self.pos >= self.bytes.len() {
                    State::End
                } else {
                    State::Token
                };
            }
        }
    }

    // =========================================================================
    // States
    // =========================================================================

    /// Measure leading spaces or tabs and emit one `indent` token.
    ///
    /// Spaces encode as the raw count, tabs as `count + 100`. A line that
    /// mixes both is not diagnosed here; the parser reports mixing when it
    /// compares sibling indent tokens.
    fn tokenize_start(&mut self, tokens: &mut Vec<Token>) {
        if self.pos >= self.bytes.len() {
            self.state = State::End;
            return;
        }
        let start = self.pos;
        let mut count = 0u32;
        let encoded = match self.bytes[self.pos] {
            CharCodes::SPACE => {
                while self.pos < self.bytes.len() && self.bytes[self.pos] == CharCodes::SPACE {
                    self.pos += 1;
                    count += 1;
                }
                count
            }
            CharCodes::TAB => {
                while self.pos < self.bytes.len() && self.bytes[self.pos] == CharCodes::TAB {
                    self.pos += 1;
                    count += 1;
                }
                count + INDENT_TAB_OFFSET
            }
            _ => 0,
        };
        tokens.push(Token::new(
            TokenKind::Indent,
            self.offset(start),
            TokenPayload::Indent(encoded),
        ));
        self.state = State::Token;
    }

    /// Emit one free token.
    fn tokenize_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        self.skip_inline_whitespace();
        if self.pos >= self.bytes.len() {
            self.state = State::End;
            return Ok(());
        }
        let start = self.pos;
        let ch = self.bytes[self.pos];
        match ch {
            CharCodes::LINE_FEED => {
                self.pos += 1;
                tokens.push(Token::new(
                    TokenKind::NewLine,
                    self.offset(start),
                    TokenPayload::None,
                ));
                self.state = State::Start;
                Ok(())
            }
            CharCodes::SINGLE_QUOTE | CharCodes::DOUBLE_QUOTE => {
                self.begin_string();
                Ok(())
            }
            CharCodes::HASH => self.scan_symbol(tokens),
            b'-' if self.peek_byte(1) == Some(b'-') => {
                // `--` single-line comment, consumed up to the newline.
                self.pos += 2;
                self.pos = match memchr(CharCodes::LINE_FEED, &self.bytes[self.pos..]) {
                    Some(i) => self.pos + i,
                    None => self.bytes.len(),
                };
                Ok(())
            }
            c if is_ident_start(c) => {
                self.scan_identifier(tokens);
                Ok(())
            }
            c if is_digit(c) => self.scan_number(tokens),
            _ => self.scan_operator_or_punct(tokens),
        }
    }

    /// Scan one segment of a string or string template.
    fn tokenize_template_string(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let seg_start = self.pos;
        loop {
            if self.pos >= self.bytes.len() {
                return Err(self.unterminated_string());
            }
            let ch = self.bytes[self.pos];
            if ch == CharCodes::BACKSLASH {
                // Escapes pass through raw; un-escaping happens after
                // tokenizing (`unescape_string`).
                self.pos = (self.pos + 2).min(self.bytes.len());
                continue;
            }
            if ch == CharCodes::LINE_FEED && !self.template.delim.allows_newline() {
                return Err(self.unterminated_string());
            }
            if ch == CharCodes::OPEN_BRACE {
                tokens.push(Token::new(
                    TokenKind::TemplateString,
                    self.offset(seg_start),
                    TokenPayload::End(self.offset(self.pos)),
                ));
                tokens.push(Token::new(
                    TokenKind::TemplateExprStart,
                    self.offset(self.pos),
                    TokenPayload::None,
                ));
                self.pos += 1;
                self.template.had_expr = true;
                self.template.brace_depth = 0;
                self.state = State::TemplateExprToken;
                return Ok(());
            }
            if self.at_close_delim() {
                let kind = if self.template.had_expr {
                    TokenKind::TemplateString
                } else {
                    TokenKind::String
                };
                tokens.push(Token::new(
                    kind,
                    self.offset(seg_start),
                    TokenPayload::End(self.offset(self.pos)),
                ));
                self.pos += self.template.delim.len();
                self.state = State::Token;
                return Ok(());
            }
            self.pos += 1;
        }
    }

    /// Emit one token inside a `{expr}` interpolation.
    ///
    /// Tracks `{`/`}` nesting; the `}` that closes the interpolation hands
    /// control back to the template-string state.
    fn tokenize_template_expr_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        self.skip_inline_whitespace();
        if self.pos >= self.bytes.len() {
            return Err(self.unterminated_string());
        }
        let start = self.pos;
        let ch = self.bytes[self.pos];
        match ch {
            CharCodes::LINE_FEED => Err(Diagnostic::tokenizer(
                self.offset(start),
                "Unterminated template expression.",
            )),
            CharCodes::OPEN_BRACE => {
                self.pos += 1;
                self.template.brace_depth += 1;
                tokens.push(Token::new(
                    TokenKind::LeftBrace,
                    self.offset(start),
                    TokenPayload::None,
                ));
                Ok(())
            }
            CharCodes::CLOSE_BRACE => {
                self.pos += 1;
                tokens.push(Token::new(
                    TokenKind::RightBrace,
                    self.offset(start),
                    TokenPayload::None,
                ));
                if self.template.brace_depth == 0 {
                    self.state = State::TemplateString;
                } else {
                    self.template.brace_depth -= 1;
                }
                Ok(())
            }
            // A quoted string nested in a template expression is scanned as
            // a plain string; nested interpolation is not supported.
            CharCodes::SINGLE_QUOTE | CharCodes::DOUBLE_QUOTE => self.scan_nested_string(tokens),
            CharCodes::HASH => self.scan_symbol(tokens),
            c if is_ident_start(c) => {
                self.scan_identifier(tokens);
                Ok(())
            }
            c if is_digit(c) => self.scan_number(tokens),
            _ => self.scan_operator_or_punct(tokens),
        }
    }

    // =========================================================================
    // Lexeme scanners
    // =========================================================================

    fn scan_identifier(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() && is_ident_part(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        let kind = text_to_keyword(text).unwrap_or(TokenKind::Ident);
        tokens.push(Token::new(
            kind,
            self.offset(start),
            TokenPayload::End(self.offset(self.pos)),
        ));
    }

    /// `#` followed by identifier characters is a symbol literal.
    fn scan_symbol(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let start = self.pos;
        if self
            .peek_byte(1)
            .map(is_ident_part)
            .unwrap_or(false)
        {
            self.pos += 2;
            while self.pos < self.bytes.len() && is_ident_part(self.bytes[self.pos]) {
                self.pos += 1;
            }
            tokens.push(Token::new(
                TokenKind::Symbol,
                self.offset(start),
                TokenPayload::End(self.offset(self.pos)),
            ));
            Ok(())
        } else {
            Err(Diagnostic::tokenizer(
                self.offset(start),
                "Unrecognized character `#`.",
            ))
        }
    }

    fn scan_number(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let start = self.pos;
        if self.bytes[self.pos] == b'0' {
            match self.peek_byte(1) {
                Some(b'x') => return self.scan_radix_digits(tokens, is_hex_digit),
                Some(b'o') => return self.scan_radix_digits(tokens, is_octal_digit),
                Some(b'b') => return self.scan_radix_digits(tokens, is_binary_digit),
                Some(b'u') if self.peek_byte(2) == Some(CharCodes::SINGLE_QUOTE) => {
                    return self.scan_rune(tokens);
                }
                _ => {}
            }
        }

        while self.pos < self.bytes.len() && is_digit(self.bytes[self.pos]) {
            self.pos += 1;
        }
        // A `.` is only part of the number when a digit follows; otherwise it
        // belongs to the `..` range operator or a member access.
        if self.bytes.get(self.pos) == Some(&b'.')
            && self.peek_byte(1).map(is_digit).unwrap_or(false)
        {
            self.pos += 1;
            while self.pos < self.bytes.len() && is_digit(self.bytes[self.pos]) {
                self.pos += 1;
            }
        }
        if self.bytes.get(self.pos) == Some(&b'e') {
            self.pos += 1;
            if self.bytes.get(self.pos) == Some(&b'-') {
                self.pos += 1;
            }
            if !self.bytes.get(self.pos).copied().map(is_digit).unwrap_or(false) {
                return Err(Diagnostic::tokenizer(
                    self.offset(self.pos.min(self.bytes.len())),
                    "Invalid exponent.",
                ));
            }
            while self.pos < self.bytes.len() && is_digit(self.bytes[self.pos]) {
                self.pos += 1;
            }
        }
        tokens.push(Token::new(
            TokenKind::Number,
            self.offset(start),
            TokenPayload::End(self.offset(self.pos)),
        ));
        Ok(())
    }

    /// `0x…` / `0o…` / `0b…` integer forms.
    fn scan_radix_digits(
        &mut self,
        tokens: &mut Vec<Token>,
        is_valid_digit: fn(u8) -> bool,
    ) -> Result<(), Diagnostic> {
        let start = self.pos;
        self.pos += 2;
        let digits_start = self.pos;
        while self.pos < self.bytes.len() && is_valid_digit(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(Diagnostic::tokenizer(
                self.offset(start),
                "Invalid number literal.",
            ));
        }
        tokens.push(Token::new(
            TokenKind::NonDecimalInt,
            self.offset(start),
            TokenPayload::End(self.offset(self.pos)),
        ));
        Ok(())
    }

    /// `0u'…'` rune literal. `\` escapes one byte; the value fits the
    /// non-decimal-int token kind.
    fn scan_rune(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let start = self.pos;
        self.pos += 3;
        loop {
            if self.pos >= self.bytes.len() {
                return Err(Diagnostic::tokenizer(
                    self.offset(start),
                    "Invalid rune literal.",
                ));
            }
            match self.bytes[self.pos] {
                CharCodes::BACKSLASH => self.pos = (self.pos + 2).min(self.bytes.len()),
                CharCodes::SINGLE_QUOTE => {
                    self.pos += 1;
                    break;
                }
                CharCodes::LINE_FEED => {
                    return Err(Diagnostic::tokenizer(
                        self.offset(start),
                        "Invalid rune literal.",
                    ));
                }
                _ => self.pos += 1,
            }
        }
        tokens.push(Token::new(
            TokenKind::NonDecimalInt,
            self.offset(start),
            TokenPayload::End(self.offset(self.pos)),
        ));
        Ok(())
    }

    /// Operators and punctuation. Multi-character operators match greedily.
    fn scan_operator_or_punct(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let start = self.pos;
        let ch = self.bytes[self.pos];
        match ch {
            b'=' => match self.peek_byte(1) {
                Some(b'=') => self.push_operator(tokens, start, OperatorKind::EqualEqual, 2),
                Some(b'>') => self.push_punct(tokens, TokenKind::EqualGreater, start, 2),
                _ => self.push_punct(tokens, TokenKind::Equal, start, 1),
            },
            b'!' => match self.peek_byte(1) {
                Some(b'=') => self.push_operator(tokens, start, OperatorKind::BangEqual, 2),
                _ => self.push_operator(tokens, start, OperatorKind::Bang, 1),
            },
            b'<' => match self.peek_byte(1) {
                Some(b'=') => self.push_operator(tokens, start, OperatorKind::LessEqual, 2),
                Some(b'<') => self.push_operator(tokens, start, OperatorKind::LessLess, 2),
                _ => self.push_operator(tokens, start, OperatorKind::Less, 1),
            },
            b'>' => match self.peek_byte(1) {
                Some(b'=') => self.push_operator(tokens, start, OperatorKind::GreaterEqual, 2),
                Some(b'>') => self.push_operator(tokens, start, OperatorKind::GreaterGreater, 2),
                _ => self.push_operator(tokens, start, OperatorKind::Greater, 1),
            },
            b'|' => match self.peek_byte(1) {
                Some(b'|') => self.push_operator(tokens, start, OperatorKind::DoubleVerticalBar, 2),
                _ => self.push_operator(tokens, start, OperatorKind::VerticalBar, 1),
            },
            b'.' => match self.peek_byte(1) {
                Some(b'.') => self.push_punct(tokens, TokenKind::DotDot, start, 2),
                _ => self.push_punct(tokens, TokenKind::Dot, start, 1),
            },
            b'+' => self.push_operator(tokens, start, OperatorKind::Plus, 1),
            b'-' => self.push_operator(tokens, start, OperatorKind::Minus, 1),
            b'*' => self.push_operator(tokens, start, OperatorKind::Star, 1),
            b'/' => self.push_operator(tokens, start, OperatorKind::Slash, 1),
            b'%' => self.push_operator(tokens, start, OperatorKind::Percent, 1),
            b'^' => self.push_operator(tokens, start, OperatorKind::Caret, 1),
            b'&' => self.push_operator(tokens, start, OperatorKind::Ampersand, 1),
            b'~' => self.push_operator(tokens, start, OperatorKind::Tilde, 1),
            b'(' => self.push_punct(tokens, TokenKind::LeftParen, start, 1),
            b')' => self.push_punct(tokens, TokenKind::RightParen, start, 1),
            b'[' => self.push_punct(tokens, TokenKind::LeftBracket, start, 1),
            b']' => self.push_punct(tokens, TokenKind::RightBracket, start, 1),
            b'{' => self.push_punct(tokens, TokenKind::LeftBrace, start, 1),
            b'}' => self.push_punct(tokens, TokenKind::RightBrace, start, 1),
            b',' => self.push_punct(tokens, TokenKind::Comma, start, 1),
            b':' => self.push_punct(tokens, TokenKind::Colon, start, 1),
            b'@' => self.push_punct(tokens, TokenKind::At, start, 1),
            _ => {
                let ch = self.src[start..].chars().next().unwrap_or('\u{FFFD}');
                Err(Diagnostic::tokenizer(
                    self.offset(start),
                    format!("Unrecognized character `{ch}`."),
                ))
            }
        }
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    fn begin_string(&mut self) {
        let start = self.pos;
        let delim = if self.bytes[self.pos] == CharCodes::DOUBLE_QUOTE {
            StringDelim::Double
        } else if self.peek_byte(1) == Some(CharCodes::SINGLE_QUOTE)
            && self.peek_byte(2) == Some(CharCodes::SINGLE_QUOTE)
        {
            StringDelim::TripleSingle
        } else {
            StringDelim::Single
        };
        self.pos += delim.len();
        self.template = TemplateState {
            delim,
            string_start: start,
            brace_depth: 0,
            had_expr: false,
        };
        self.state = State::TemplateString;
    }

    /// Plain (non-interpolating) string nested inside a template expression.
    fn scan_nested_string(&mut self, tokens: &mut Vec<Token>) -> Result<(), Diagnostic> {
        let quote_pos = self.pos;
        let delim = self.bytes[self.pos];
        self.pos += 1;
        let seg_start = self.pos;
        loop {
            if self.pos >= self.bytes.len() || self.bytes[self.pos] == CharCodes::LINE_FEED {
                return Err(Diagnostic::tokenizer(
                    self.offset(quote_pos),
                    "Unterminated string.",
                ));
            }
            let ch = self.bytes[self.pos];
            if ch == CharCodes::BACKSLASH {
                self.pos = (self.pos + 2).min(self.bytes.len());
                continue;
            }
            if ch == delim {
                tokens.push(Token::new(
                    TokenKind::String,
                    self.offset(seg_start),
                    TokenPayload::End(self.offset(self.pos)),
                ));
                self.pos += 1;
                return Ok(());
            }
            self.pos += 1;
        }
    }

    fn at_close_delim(&self) -> bool {
        match self.template.delim {
            StringDelim::Single => self.bytes[self.pos] == CharCodes::SINGLE_QUOTE,
            StringDelim::Double => self.bytes[self.pos] == CharCodes::DOUBLE_QUOTE,
            StringDelim::TripleSingle => {
                self.bytes[self.pos] == CharCodes::SINGLE_QUOTE
                    && self.peek_byte(1) == Some(CharCodes::SINGLE_QUOTE)
                    && self.peek_byte(2) == Some(CharCodes::SINGLE_QUOTE)
            }
        }
    }

    fn unterminated_string(&self) -> Diagnostic {
        Diagnostic::tokenizer(self.offset(self.template.string_start), "Unterminated string.")
    }

    fn skip_inline_whitespace(&mut self) {
        while self.pos < self.bytes.len() && is_inline_whitespace(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    #[inline]
    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn push_operator(
        &mut self,
        tokens: &mut Vec<Token>,
        start: usize,
        op: OperatorKind,
        len: usize,
    ) -> Result<(), Diagnostic> {
        self.pos += len;
        tokens.push(Token::new(
            TokenKind::Operator,
            self.offset(start),
            TokenPayload::Operator(op),
        ));
        Ok(())
    }

    fn push_punct(
        &mut self,
        tokens: &mut Vec<Token>,
        kind: TokenKind,
        start: usize,
        len: usize,
    ) -> Result<(), Diagnostic> {
        self.pos += len;
        tokens.push(Token::new(kind, self.offset(start), TokenPayload::None));
        Ok(())
    }

    #[inline]
    fn offset(&self, pos: usize) -> u32 {
        u32::try_from(pos).expect("source offsets must fit in u32")
    }
}
