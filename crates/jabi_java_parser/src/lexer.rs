//! Lexical analysis of Java source text.
//!
//! Produces [`Token`]s for the declaration-level parser. Whitespace and
//! comments are dropped. Literals are lexed only well enough to skip them
//! correctly; their values are never needed for an ABI stub.

use crate::token::{lookup_keyword, JavaToken, Token};
use jabi_diagnostics::code::{Category, DiagnosticCode};
use jabi_diagnostics::{Diagnostic, DiagnosticSink};
use jabi_source::{FileId, Span};

/// Code for lexical errors.
pub const LEX_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Error, 100);

/// Lexes `source` into tokens. The result always ends with [`JavaToken::Eof`].
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: JavaToken::Eof,
                    span: self.span_from(self.pos),
                });
                return tokens;
            }
            tokens.push(self.next_token());
        }
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(LEX_ERROR, msg, span));
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        let kind = if is_ident_start(b) {
            self.lex_word(start)
        } else if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
            self.lex_number();
            JavaToken::NumberLiteral
        } else if b == b'"' {
            self.lex_string(start)
        } else if b == b'\'' {
            self.lex_char(start)
        } else {
            self.lex_punct()
        };

        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn lex_word(&mut self, start: usize) -> JavaToken {
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        lookup_keyword(text).unwrap_or(JavaToken::Identifier)
    }

    /// Consumes decimal, hex, octal and binary literals with underscores,
    /// fractions, exponents and type suffixes.
    fn lex_number(&mut self) {
        let hex = self.peek() == b'0' && matches!(self.peek_at(1), b'x' | b'X');
        loop {
            let b = self.peek();
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
                let exponent = if hex {
                    matches!(b, b'p' | b'P')
                } else {
                    matches!(b, b'e' | b'E')
                };
                if exponent && matches!(self.peek(), b'+' | b'-') {
                    self.pos += 1;
                }
            } else if b == b'.' && self.peek_at(1) != b'.' {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> JavaToken {
        if self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
            self.pos += 3;
            while self.pos < self.source.len() {
                if self.peek() == b'\\' {
                    self.pos += 2;
                    continue;
                }
                if self.peek() == b'"' && self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
                    self.pos += 3;
                    return JavaToken::StringLiteral;
                }
                self.pos += 1;
            }
            self.pos = self.source.len();
            self.error("unterminated text block", self.span_from(start));
            return JavaToken::Error;
        }
        self.lex_quoted(start, b'"', "unterminated string literal", JavaToken::StringLiteral)
    }

    fn lex_char(&mut self, start: usize) -> JavaToken {
        self.lex_quoted(start, b'\'', "unterminated character literal", JavaToken::CharLiteral)
    }

    fn lex_quoted(&mut self, start: usize, quote: u8, msg: &str, kind: JavaToken) -> JavaToken {
        self.pos += 1;
        while self.pos < self.source.len() {
            match self.peek() {
                b'\\' => self.pos += 2,
                b'\n' => break,
                b if b == quote => {
                    self.pos += 1;
                    return kind;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.source.len());
        self.error(msg, self.span_from(start));
        JavaToken::Error
    }

    fn lex_punct(&mut self) -> JavaToken {
        let b = self.peek();
        if b == b'.' && self.peek_at(1) == b'.' && self.peek_at(2) == b'.' {
            self.pos += 3;
            return JavaToken::Ellipsis;
        }
        self.pos += 1;
        match b {
            b'{' => JavaToken::LeftBrace,
            b'}' => JavaToken::RightBrace,
            b'(' => JavaToken::LeftParen,
            b')' => JavaToken::RightParen,
            b'[' => JavaToken::LeftBracket,
            b']' => JavaToken::RightBracket,
            b';' => JavaToken::Semicolon,
            b',' => JavaToken::Comma,
            b'.' => JavaToken::Dot,
            b'@' => JavaToken::At,
            b'?' => JavaToken::Question,
            b'<' => JavaToken::Less,
            b'>' => JavaToken::Greater,
            b'&' => JavaToken::Ampersand,
            b'=' => JavaToken::Assign,
            b'-' => JavaToken::Minus,
            b'+' | b'*' | b'/' | b'%' | b'!' | b'~' | b'|' | b'^' | b':' => JavaToken::Operator,
            _ => {
                // Resynchronize on a UTF-8 boundary before reporting.
                while self.pos < self.source.len() && (self.source[self.pos] & 0xC0) == 0x80 {
                    self.pos += 1;
                }
                let start = self.pos - 1;
                self.error("unexpected character", Span::new(self.file, start as u32, self.pos as u32));
                JavaToken::Error
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<JavaToken> {
        let sink = DiagnosticSink::new();
        let tokens = lex(source, FileId::from_raw(0), &sink);
        assert!(!sink.has_errors(), "unexpected lex errors: {:?}", sink.take_all());
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn class_header() {
        assert_eq!(
            kinds("public class Foo extends Bar {}"),
            vec![
                JavaToken::Public,
                JavaToken::Class,
                JavaToken::Identifier,
                JavaToken::Extends,
                JavaToken::Identifier,
                JavaToken::LeftBrace,
                JavaToken::RightBrace,
                JavaToken::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line\n/* block\n */ class /** doc */ A"),
            vec![JavaToken::Class, JavaToken::Identifier, JavaToken::Eof]
        );
    }

    #[test]
    fn nested_generics_close_singly() {
        assert_eq!(
            kinds("Map<K, List<V>>"),
            vec![
                JavaToken::Identifier,
                JavaToken::Less,
                JavaToken::Identifier,
                JavaToken::Comma,
                JavaToken::Identifier,
                JavaToken::Less,
                JavaToken::Identifier,
                JavaToken::Greater,
                JavaToken::Greater,
                JavaToken::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        for lit in ["0", "42L", "0x1F", "1_000", "3.14", "1e-9", "2.5f", ".5", "0x1.8p3", "0b1010"] {
            assert_eq!(
                kinds(lit),
                vec![JavaToken::NumberLiteral, JavaToken::Eof],
                "literal {lit}"
            );
        }
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(
            kinds(r#""a \" b" 'c' '\n'"#),
            vec![
                JavaToken::StringLiteral,
                JavaToken::CharLiteral,
                JavaToken::CharLiteral,
                JavaToken::Eof,
            ]
        );
    }

    #[test]
    fn text_block() {
        assert_eq!(
            kinds("\"\"\"\n  hello \"quoted\"\n  \"\"\";"),
            vec![JavaToken::StringLiteral, JavaToken::Semicolon, JavaToken::Eof]
        );
    }

    #[test]
    fn ellipsis_and_dot() {
        assert_eq!(
            kinds("String... a.b"),
            vec![
                JavaToken::Identifier,
                JavaToken::Ellipsis,
                JavaToken::Identifier,
                JavaToken::Dot,
                JavaToken::Identifier,
                JavaToken::Eof,
            ]
        );
    }

    #[test]
    fn unicode_identifiers() {
        assert_eq!(
            kinds("class Größe {}"),
            vec![
                JavaToken::Class,
                JavaToken::Identifier,
                JavaToken::LeftBrace,
                JavaToken::RightBrace,
                JavaToken::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports() {
        let sink = DiagnosticSink::new();
        let tokens = lex("\"abc\nclass", FileId::from_raw(0), &sink);
        assert!(sink.has_errors());
        assert_eq!(tokens[0].kind, JavaToken::Error);
        assert_eq!(tokens[1].kind, JavaToken::Class);
    }

    #[test]
    fn unterminated_comment_reports() {
        let sink = DiagnosticSink::new();
        let tokens = lex("class /* never closed", FileId::from_raw(0), &sink);
        assert!(sink.has_errors());
        assert_eq!(tokens.last().unwrap().kind, JavaToken::Eof);
    }

    #[test]
    fn stray_character_reports() {
        let sink = DiagnosticSink::new();
        let tokens = lex("class # A", FileId::from_raw(0), &sink);
        assert_eq!(sink.error_count(), 1);
        assert_eq!(tokens[1].kind, JavaToken::Error);
        assert_eq!(tokens[2].kind, JavaToken::Identifier);
    }
}
