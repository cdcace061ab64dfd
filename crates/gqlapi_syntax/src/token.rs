//! Token kinds and structures for GraphQL documents.

use gqlapi_core::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TokenKind {
    // Special tokens
    Eof,
    Error,

    // Literals
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BlockStringLiteral,

    // Keywords - Operations
    Query,
    Mutation,
    Subscription,
    Fragment,
    On,

    // Keywords - Type system
    Type,
    Interface,
    Union,
    Enum,
    Input,
    Scalar,
    Schema,
    Extend,
    Implements,
    Directive,
    Repeatable,

    // Keywords - Values
    True,
    False,
    Null,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Spread,
    Eq,
    Pipe,
    Amp,
    At,
    Bang,
    Dollar,
}

impl TokenKind {
    /// Words the lexer classifies specially. They are still valid names.
    pub const KEYWORDS: [Self; 19] = [
        Self::Query,
        Self::Mutation,
        Self::Subscription,
        Self::Fragment,
        Self::On,
        Self::Type,
        Self::Interface,
        Self::Union,
        Self::Enum,
        Self::Input,
        Self::Scalar,
        Self::Schema,
        Self::Extend,
        Self::Implements,
        Self::Directive,
        Self::Repeatable,
        Self::True,
        Self::False,
        Self::Null,
    ];

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        // keywords are declared contiguously
        self as u8 >= Self::Query as u8 && self as u8 <= Self::Null as u8
    }

    /// Returns true if the token can be read as a name.
    #[must_use]
    pub const fn is_name(self) -> bool {
        matches!(self, Self::Ident) || self.is_keyword()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "<eof>",
            Self::Error => "<error>",
            Self::Ident => "<name>",
            Self::IntLiteral => "<int>",
            Self::FloatLiteral => "<float>",
            Self::StringLiteral => "<string>",
            Self::BlockStringLiteral => "<block-string>",
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Fragment => "fragment",
            Self::On => "on",
            Self::Type => "type",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Input => "input",
            Self::Scalar => "scalar",
            Self::Schema => "schema",
            Self::Extend => "extend",
            Self::Implements => "implements",
            Self::Directive => "directive",
            Self::Repeatable => "repeatable",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Colon => ":",
            Self::Spread => "...",
            Self::Eq => "=",
            Self::Pipe => "|",
            Self::Amp => "&",
            Self::At => "@",
            Self::Bang => "!",
            Self::Dollar => "$",
        }
    }

    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::KEYWORDS.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    #[inline]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Directive locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DirectiveLocation {
    // Executable
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,

    // Type system
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    pub const ALL: [Self; 19] = [
        Self::Query,
        Self::Mutation,
        Self::Subscription,
        Self::Field,
        Self::FragmentDefinition,
        Self::FragmentSpread,
        Self::InlineFragment,
        Self::VariableDefinition,
        Self::Schema,
        Self::Scalar,
        Self::Object,
        Self::FieldDefinition,
        Self::ArgumentDefinition,
        Self::Interface,
        Self::Union,
        Self::Enum,
        Self::EnumValue,
        Self::InputObject,
        Self::InputFieldDefinition,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }

    /// Parses a directive location from its `SCREAMING_CASE` spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|location| location.as_str() == s)
    }
}
