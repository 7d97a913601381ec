//! Token kinds produced by the Java lexer.
//!
//! Only the keywords that shape declarations are distinguished. Everything
//! else inside method bodies and initializers is skipped by the parser, so
//! statement keywords lex as plain identifiers and multi-character operators
//! lex as a run of [`JavaToken::Operator`] tokens.

use jabi_source::Span;
use serde::{Deserialize, Serialize};

/// A Java token kind. Text is recovered from the source through the span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum JavaToken {
    // === Declaration keywords ===
    /// `package`
    Package,
    /// `import`
    Import,
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `extends`
    Extends,
    /// `implements`
    Implements,
    /// `super`
    Super,

    // === Modifiers ===
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `static`
    Static,
    /// `abstract`
    Abstract,
    /// `final`
    Final,
    /// `native`
    Native,
    /// `synchronized`
    Synchronized,
    /// `transient`
    Transient,
    /// `volatile`
    Volatile,
    /// `strictfp`
    Strictfp,
    /// `default`
    Default,

    // === Primitive types ===
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `char`
    Char,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `void`
    Void,

    // === Punctuation ===
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `@`
    At,
    /// `?`
    Question,
    /// `<`
    Less,
    /// `>` (always lexed singly so nested type arguments close correctly)
    Greater,
    /// `&`
    Ampersand,
    /// `=`
    Assign,
    /// `-`
    Minus,
    /// Any other operator character.
    Operator,

    // === Literals and names ===
    /// An identifier, including contextual keywords such as `record`.
    Identifier,
    /// Integer or floating-point literal.
    NumberLiteral,
    /// Character literal.
    CharLiteral,
    /// String literal or text block.
    StringLiteral,

    // === Special ===
    /// A character the lexer could not handle.
    Error,
    /// End of input.
    Eof,
}

impl JavaToken {
    /// Returns `true` for keywords that are declaration modifiers.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            JavaToken::Public
                | JavaToken::Protected
                | JavaToken::Private
                | JavaToken::Static
                | JavaToken::Abstract
                | JavaToken::Final
                | JavaToken::Native
                | JavaToken::Synchronized
                | JavaToken::Transient
                | JavaToken::Volatile
                | JavaToken::Strictfp
                | JavaToken::Default
        )
    }

    /// Returns `true` for primitive type keywords (not `void`).
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            JavaToken::Boolean
                | JavaToken::Byte
                | JavaToken::Short
                | JavaToken::Int
                | JavaToken::Long
                | JavaToken::Char
                | JavaToken::Float
                | JavaToken::Double
        )
    }
}

/// A token with its location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Kind of token.
    pub kind: JavaToken,
    /// Where it appears.
    pub span: Span,
}

/// Maps reserved words to their token kinds.
pub fn lookup_keyword(text: &str) -> Option<JavaToken> {
    let kind = match text {
        "package" => JavaToken::Package,
        "import" => JavaToken::Import,
        "class" => JavaToken::Class,
        "interface" => JavaToken::Interface,
        "enum" => JavaToken::Enum,
        "extends" => JavaToken::Extends,
        "implements" => JavaToken::Implements,
        "super" => JavaToken::Super,
        "public" => JavaToken::Public,
        "protected" => JavaToken::Protected,
        "private" => JavaToken::Private,
        "static" => JavaToken::Static,
        "abstract" => JavaToken::Abstract,
        "final" => JavaToken::Final,
        "native" => JavaToken::Native,
        "synchronized" => JavaToken::Synchronized,
        "transient" => JavaToken::Transient,
        "volatile" => JavaToken::Volatile,
        "strictfp" => JavaToken::Strictfp,
        "default" => JavaToken::Default,
        "boolean" => JavaToken::Boolean,
        "byte" => JavaToken::Byte,
        "short" => JavaToken::Short,
        "int" => JavaToken::Int,
        "long" => JavaToken::Long,
        "char" => JavaToken::Char,
        "float" => JavaToken::Float,
        "double" => JavaToken::Double,
        "void" => JavaToken::Void,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(lookup_keyword("class"), Some(JavaToken::Class));
        assert_eq!(lookup_keyword("Class"), None);
    }

    #[test]
    fn contextual_keywords_are_identifiers() {
        assert_eq!(lookup_keyword("record"), None);
        assert_eq!(lookup_keyword("sealed"), None);
        assert_eq!(lookup_keyword("permits"), None);
    }

    #[test]
    fn classification() {
        assert!(JavaToken::Static.is_modifier());
        assert!(JavaToken::Default.is_modifier());
        assert!(!JavaToken::Class.is_modifier());
        assert!(JavaToken::Int.is_primitive());
        assert!(!JavaToken::Void.is_primitive());
    }
}
