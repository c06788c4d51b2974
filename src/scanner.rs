//! Turns the characters of a circuit description file into a stream of tokens.
//!
//! The whole file is read into memory once at construction, together with a line-offset
//! table, so that diagnostics never need to reopen the file (see the module design notes).
//! Token classification is a small hand-written character-class dispatch rather than a
//! `regex` crate dependency — the patterns involved are simple enough that a table-driven
//! scanner is both clearer and cheaper.

use std::path::Path;

use crate::devices::DeviceKind;
use crate::names::{NameId, Names};

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Error,
    Init,
    Connect,
    Monitor,
    DeviceType,
    Number,
    DeviceName,
    DeviceIn,
    DeviceOut,
    InitIs,
    InitWith,
    InitGate,
    InitSwitch,
    InitClk,
    Connection,
    InitMonitor,
    Semicolon,
    SiggenWave,
    Eof,
}

/// One scanned token: its kind, source position, and whatever payload its kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme text (device/number/siggen-pattern text; empty for punctuation/keywords).
    pub text: String,
    /// Id of the interned device-name part, for `DeviceName`/`DeviceIn`/`DeviceOut`.
    pub name_id: Option<NameId>,
    /// Port part of a `DeviceIn`/`DeviceOut` token (e.g. "I1", "DATA", "Q").
    pub port_text: Option<String>,
    /// Device kind, for a `DeviceType` token.
    pub device_kind: Option<DeviceKind>,
    /// Byte offset of the first character of the token.
    pub start: usize,
    /// Byte offset of the last character of the token.
    pub pos: usize,
    /// Byte offset of the first character of the line the token is on.
    pub line_pos: usize,
}

impl Token {
    fn new(kind: TokenKind, start: usize, pos: usize, line_pos: usize) -> Self {
        Token { kind, text: String::new(), name_id: None, port_text: None, device_kind: None, start, pos, line_pos }
    }
}

/// Where a diagnostic caret should point, relative to a token.
#[derive(Debug, Clone, Copy)]
pub enum CaretAnchor {
    EndOfToken,
    StartOfToken,
    StartOfLine,
    /// Points just past the end of some earlier token (e.g. the previous statement's `;`).
    Behind(usize),
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("INIT", TokenKind::Init),
    ("CONNECT", TokenKind::Connect),
    ("MONITOR", TokenKind::Monitor),
    ("is", TokenKind::InitIs),
    ("with", TokenKind::InitWith),
    ("input", TokenKind::InitGate),
    ("inputs", TokenKind::InitGate),
    ("initially_at", TokenKind::InitSwitch),
    ("with_simulation_cycles", TokenKind::InitClk),
    ("connect_to", TokenKind::Connection),
    ("Initial_monitor_at", TokenKind::InitMonitor),
];

const DEVICE_KIND_WORDS: &[&str] =
    &["AND", "NAND", "OR", "NOR", "XOR", "SWITCH", "DTYPE", "CLOCK", "RC", "SIGGEN"];

/// Reads a circuit description file and produces a token stream for the parser.
pub struct Scanner {
    source: String,
    line_offsets: Vec<usize>,
    pos: usize,
    invalid_comment_reported: bool,
}

impl Scanner {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::from_source(source))
    }

    /// Builds a scanner directly from in-memory source text (used by tests and by callers
    /// that already hold the file contents).
    #[must_use]
    pub fn from_source(source: String) -> Self {
        let mut line_offsets = vec![0usize];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_offsets.push(i + 1);
            }
        }
        Scanner { source, line_offsets, pos: 0, invalid_comment_reported: false }
    }

    /// Restarts scanning from the beginning of the file.
    pub fn restart(&mut self) {
        self.pos = 0;
        self.invalid_comment_reported = false;
    }

    fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn current_line_start(&self) -> usize {
        match self.line_offsets.binary_search(&self.pos) {
            Ok(idx) => self.line_offsets[idx],
            Err(idx) => self.line_offsets[idx.saturating_sub(1)],
        }
    }

    /// 1-based line number containing byte offset `pos`.
    #[must_use]
    pub fn line_number_at(&self, pos: usize) -> usize {
        match self.line_offsets.binary_search(&pos) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// The full text of the line starting at `line_pos` (no trailing newline).
    #[must_use]
    pub fn line_text_at(&self, line_pos: usize) -> &str {
        let end = self.source[line_pos..].find('\n').map_or(self.source.len(), |i| line_pos + i);
        &self.source[line_pos..end]
    }

    /// Builds the two-line "source excerpt + caret" diagnostic block for `token`.
    #[must_use]
    pub fn pointer_block(&self, token: &Token, anchor: CaretAnchor) -> String {
        let line_text = self.line_text_at(token.line_pos);
        let column = match anchor {
            CaretAnchor::EndOfToken => token.pos.saturating_sub(token.line_pos),
            CaretAnchor::StartOfToken => token.start.saturating_sub(token.line_pos),
            CaretAnchor::StartOfLine => 0,
            CaretAnchor::Behind(pos) => pos.saturating_sub(token.line_pos),
        };
        let caret = format!("{}^", " ".repeat(column.min(line_text.len().max(column))));
        format!("{line_text}\n{caret}")
    }

    fn skip_spaces_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if (b as char).is_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'/') && self.bytes().get(self.pos + 1) == Some(&b'*') {
                self.skip_comment();
                continue;
            }
            break;
        }
    }

    fn skip_comment(&mut self) {
        let start = self.pos;
        self.pos += 2; // consume "/*"
        loop {
            match (self.bytes().get(self.pos), self.bytes().get(self.pos + 1)) {
                (Some(b'*'), Some(b'/')) => {
                    self.pos += 2;
                    return;
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => {
                    if !self.invalid_comment_reported {
                        self.invalid_comment_reported = true;
                    }
                    self.pos = self.source.len();
                    let _ = start;
                    return;
                }
            }
        }
    }

    /// Whether an unterminated comment was encountered (INVALID_COMMENT fires once per file).
    #[must_use]
    pub fn had_invalid_comment(&self) -> bool {
        self.invalid_comment_reported
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> (usize, usize) {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.pos += 1;
        }
        (start, self.pos)
    }

    /// Scans and returns the next token, interning any device-name component into `names`.
    pub fn get_symbol(&mut self, names: &mut Names) -> Token {
        self.skip_spaces_and_comments();
        let line_pos = self.current_line_start();

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, self.pos, self.pos, line_pos);
        };

        if c == b';' {
            self.pos += 1;
            return Token::new(TokenKind::Semicolon, self.pos - 1, self.pos - 1, line_pos);
        }

        if c == b'"' {
            return self.scan_siggen_wave(line_pos);
        }

        if c.is_ascii_digit() {
            let (start, end) = self.read_while(|b| b.is_ascii_digit());
            let mut token = Token::new(TokenKind::Number, start, end - 1, line_pos);
            token.text = self.source[start..end].to_string();
            return token;
        }

        if c.is_ascii_alphabetic() {
            let (start, end) = self.read_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            let word = self.source[start..end].to_string();

            if let Some((_, kind)) = KEYWORDS.iter().find(|(kw, _)| *kw == word) {
                let mut token = Token::new(*kind, start, end - 1, line_pos);
                token.text = word;
                return token;
            }
            if let Some(kind) = DeviceKind::from_str(&word) {
                let mut token = Token::new(TokenKind::DeviceType, start, end - 1, line_pos);
                token.text = word;
                token.device_kind = Some(kind);
                return token;
            }

            // Optional `.PORT` suffix.
            if self.peek() == Some(b'.') {
                let dot_pos = self.pos;
                self.pos += 1;
                let (pstart, pend) = self.read_while(|b| b.is_ascii_alphanumeric());
                let port = self.source[pstart..pend].to_string();
                let end_pos = pend.saturating_sub(1).max(dot_pos);
                if is_device_name(&word) && is_input_port_text(&port) {
                    let mut token = Token::new(TokenKind::DeviceIn, start, end_pos, line_pos);
                    token.text = format!("{word}.{port}");
                    token.port_text = Some(port);
                    token.name_id = names.intern_one(&word).ok();
                    return token;
                }
                if is_device_name(&word) && is_output_port_text(&port) {
                    let mut token = Token::new(TokenKind::DeviceOut, start, end_pos, line_pos);
                    token.text = format!("{word}.{port}");
                    token.port_text = Some(port);
                    token.name_id = names.intern_one(&word).ok();
                    return token;
                }
                let mut token = Token::new(TokenKind::Error, start, end_pos, line_pos);
                token.text = format!("{word}.{port}");
                return token;
            }

            if is_device_name(&word) {
                let mut token = Token::new(TokenKind::DeviceName, start, end - 1, line_pos);
                token.text = word.clone();
                token.name_id = names.intern_one(&word).ok();
                return token;
            }

            let mut token = Token::new(TokenKind::Error, start, end - 1, line_pos);
            token.text = word;
            return token;
        }

        // Unrecognized character: consume it alone as an ERROR token.
        self.pos += 1;
        let mut token = Token::new(TokenKind::Error, self.pos - 1, self.pos - 1, line_pos);
        token.text = (c as char).to_string();
        token
    }

    fn scan_siggen_wave(&mut self, line_pos: usize) -> Token {
        let start = self.pos;
        self.pos += 1; // opening quote
        let bits_start = self.pos;
        while matches!(self.peek(), Some(b'0') | Some(b'1')) {
            self.pos += 1;
        }
        let bits_end = self.pos;
        if self.peek() == Some(b'"') && bits_end > bits_start {
            self.pos += 1;
            let mut token = Token::new(TokenKind::SiggenWave, start, self.pos - 1, line_pos);
            token.text = self.source[bits_start..bits_end].to_string();
            token
        } else {
            // Not a valid "[01]+" literal; consume through the next quote or line end.
            while !matches!(self.peek(), None | Some(b'"') | Some(b'\n')) {
                self.pos += 1;
            }
            if self.peek() == Some(b'"') {
                self.pos += 1;
            }
            let mut token = Token::new(TokenKind::Error, start, self.pos.saturating_sub(1), line_pos);
            token.text = self.source[start..self.pos].to_string();
            token
        }
    }
}

/// A device name is one or more uppercase letters followed by one or more digits (e.g. `A1`,
/// `SW12`) — nothing else matches.
fn is_device_name(word: &str) -> bool {
    let letters_len = word.chars().take_while(|c| c.is_ascii_uppercase()).count();
    letters_len > 0 && letters_len < word.len() && word[letters_len..].chars().all(|c| c.is_ascii_digit())
}

fn is_input_port_text(port: &str) -> bool {
    matches!(port, "DATA" | "CLK" | "CLEAR" | "SET")
        || (port.starts_with('I') && port.len() > 1 && port[1..].chars().all(|c| c.is_ascii_digit()))
}

fn is_output_port_text(port: &str) -> bool {
    matches!(port, "Q" | "QBAR")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<TokenKind> {
        let mut names = Names::new();
        let mut scanner = Scanner::from_source(source.to_string());
        let mut kinds = Vec::new();
        loop {
            let token = scanner.get_symbol(&mut names);
            let done = token.kind == TokenKind::Eof;
            kinds.push(token.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn keywords_and_semicolons() {
        let kinds = scan_all("INIT; CONNECT;");
        assert_eq!(
            kinds,
            vec![TokenKind::Init, TokenKind::Semicolon, TokenKind::Connect, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn device_name_and_device_in() {
        let kinds = scan_all("SW1 connect_to A1.I1;");
        assert_eq!(
            kinds,
            vec![TokenKind::DeviceName, TokenKind::Connection, TokenKind::DeviceIn, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn device_out_requires_dotted_suffix() {
        let mut names = Names::new();
        let mut scanner = Scanner::from_source("D1.Q".to_string());
        let token = scanner.get_symbol(&mut names);
        assert_eq!(token.kind, TokenKind::DeviceOut);
        assert_eq!(token.port_text.as_deref(), Some("Q"));
    }

    #[test]
    fn bare_capitalised_identifier_is_device_name_not_device_out() {
        let mut names = Names::new();
        let mut scanner = Scanner::from_source("A1".to_string());
        let token = scanner.get_symbol(&mut names);
        assert_eq!(token.kind, TokenKind::DeviceName);
    }

    #[test]
    fn siggen_wave_literal() {
        let mut names = Names::new();
        let mut scanner = Scanner::from_source("\"0110\"".to_string());
        let token = scanner.get_symbol(&mut names);
        assert_eq!(token.kind, TokenKind::SiggenWave);
        assert_eq!(token.text, "0110");
    }

    #[test]
    fn unterminated_comment_is_reported_once() {
        let mut names = Names::new();
        let mut scanner = Scanner::from_source("/* never closes".to_string());
        let token = scanner.get_symbol(&mut names);
        assert_eq!(token.kind, TokenKind::Eof);
        assert!(scanner.had_invalid_comment());
    }

    #[test]
    fn comments_are_skipped() {
        let kinds = scan_all("INIT /* comment */ ;");
        assert_eq!(kinds, vec![TokenKind::Init, TokenKind::Semicolon, TokenKind::Eof]);
    }
}
