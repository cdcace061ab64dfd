//! Recursive descent parser for GraphQL documents.
//!
//! The parser never aborts: problems are recorded in a [`DiagnosticBag`] and
//! parsing resumes at the next token, so callers always get a document back.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{DirectiveLocation, Token, TokenKind};
use gqlapi_core::{diagnostics::codes, DiagnosticBag, Interner, Span, Text};

/// Parser for GraphQL documents.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_end: u32,
    diagnostics: DiagnosticBag,
}

/// Result of parsing.
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    pub diagnostics: DiagnosticBag,
}

/// Parses a source string into a document.
pub fn parse<'a>(source: &'a str, interner: &'a Interner) -> ParseResult<'a> {
    let mut parser = Parser::new(source, interner);
    let document = parser.parse_document();
    ParseResult {
        document,
        diagnostics: parser.diagnostics,
    }
}

impl<'a> Parser<'a> {
    /// Creates a new parser.
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source, interner),
            current: Token::new(TokenKind::Eof, Span::empty(0)),
            prev_end: 0,
            diagnostics: DiagnosticBag::new(),
        };
        parser.current = parser.next_significant();
        parser
    }

    #[inline]
    fn at(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Pulls the next token, reporting and skipping lexical errors.
    fn next_significant(&mut self) -> Token {
        loop {
            let token = self.lexer.next_token();
            if token.kind != TokenKind::Error {
                return token;
            }
            let text = self.lexer.span_text(token.span);
            if text.starts_with('"') {
                self.diagnostics.error(
                    codes::UNTERMINATED_STRING,
                    "unterminated string",
                    token.span,
                    "string literal is missing its closing quote",
                );
            } else {
                self.diagnostics.error(
                    codes::INVALID_CHARACTER,
                    "invalid character",
                    token.span,
                    format!("unexpected character `{text}`"),
                );
            }
        }
    }

    fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = self.next_significant();
    }

    /// Consumes the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_expected(kind.as_str());
            false
        }
    }

    /// Advances past the current token when a list item made no progress.
    fn recover_if_stuck(&mut self, before: u32) {
        if self.current.span.start == before && !self.at_kind(TokenKind::Eof) {
            self.advance();
        }
    }

    fn current_text(&self) -> &'a str {
        self.lexer.span_text(self.current.span)
    }

    fn intern_current(&self) -> Text {
        self.lexer.intern_span(self.current.span)
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn error(&mut self, message: &str) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::INVALID_SYNTAX
        };
        self.diagnostics
            .error(code, message, self.current.span, message.to_string());
    }

    fn error_expected(&mut self, expected: &str) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::UNEXPECTED_TOKEN
        };
        self.diagnostics.error(
            code,
            "unexpected token",
            self.current.span,
            format!("expected {}, found {}", expected, self.at()),
        );
    }

    /// Parses a document.
    pub fn parse_document(&mut self) -> Document<'a> {
        let start = self.current.span.start;
        let mut definitions = Vec::new();

        while !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            }
            self.recover_if_stuck(before);
        }

        Document {
            definitions,
            span: self.span_from(start),
        }
    }

    fn parse_definition(&mut self) -> Option<Definition<'a>> {
        let description = self.try_parse_description();

        match self.at() {
            TokenKind::Query | TokenKind::Mutation | TokenKind::Subscription | TokenKind::LBrace => {
                Some(Definition::Operation(self.parse_operation()))
            }
            TokenKind::Fragment => Some(Definition::Fragment(self.parse_fragment_definition())),
            TokenKind::Schema => Some(Definition::Schema(
                self.parse_schema_definition(description),
            )),
            TokenKind::Directive => Some(Definition::Directive(
                self.parse_directive_definition(description),
            )),
            TokenKind::Extend => {
                self.advance();
                match self.parse_type_definition(None) {
                    Some(ty) => Some(Definition::TypeExtension(ty)),
                    None => {
                        self.error("expected type definition after `extend`");
                        None
                    }
                }
            }
            _ => {
                if let Some(ty) = self.parse_type_definition(description) {
                    Some(Definition::Type(ty))
                } else {
                    self.error("expected definition");
                    None
                }
            }
        }
    }

    fn parse_type_definition(
        &mut self,
        description: Option<Description<'a>>,
    ) -> Option<TypeDefinition<'a>> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        let ty = match self.at() {
            TokenKind::Scalar => {
                self.advance();
                let name = self.parse_name();
                let directives = self.parse_directives();
                TypeDefinition::Scalar(ScalarTypeDefinition {
                    description,
                    name,
                    directives,
                    span: self.span_from(start),
                })
            }
            TokenKind::Type => {
                self.advance();
                let name = self.parse_name();
                let implements = self.parse_implements();
                let directives = self.parse_directives();
                let fields = self.parse_field_definitions();
                TypeDefinition::Object(ObjectTypeDefinition {
                    description,
                    name,
                    implements,
                    directives,
                    fields,
                    span: self.span_from(start),
                })
            }
            TokenKind::Interface => {
                self.advance();
                let name = self.parse_name();
                let implements = self.parse_implements();
                let directives = self.parse_directives();
                let fields = self.parse_field_definitions();
                TypeDefinition::Interface(InterfaceTypeDefinition {
                    description,
                    name,
                    implements,
                    directives,
                    fields,
                    span: self.span_from(start),
                })
            }
            TokenKind::Union => {
                self.advance();
                let name = self.parse_name();
                let directives = self.parse_directives();
                let mut members = Vec::new();
                if self.eat(TokenKind::Eq) {
                    self.eat(TokenKind::Pipe);
                    members.push(self.parse_name());
                    while self.eat(TokenKind::Pipe) {
                        members.push(self.parse_name());
                    }
                }
                TypeDefinition::Union(UnionTypeDefinition {
                    description,
                    name,
                    directives,
                    members,
                    span: self.span_from(start),
                })
            }
            TokenKind::Enum => {
                self.advance();
                let name = self.parse_name();
                let directives = self.parse_directives();
                let values = self.parse_enum_values();
                TypeDefinition::Enum(EnumTypeDefinition {
                    description,
                    name,
                    directives,
                    values,
                    span: self.span_from(start),
                })
            }
            TokenKind::Input => {
                self.advance();
                let name = self.parse_name();
                let directives = self.parse_directives();
                let fields = if self.at_kind(TokenKind::LBrace) {
                    self.parse_input_value_definitions(TokenKind::LBrace, TokenKind::RBrace)
                } else {
                    Vec::new()
                };
                TypeDefinition::Input(InputObjectTypeDefinition {
                    description,
                    name,
                    directives,
                    fields,
                    span: self.span_from(start),
                })
            }
            _ => return None,
        };
        Some(ty)
    }

    fn try_parse_description(&mut self) -> Option<Description<'a>> {
        let text = match self.at() {
            TokenKind::StringLiteral => {
                let text = self.current_text();
                &text[1..text.len() - 1]
            }
            TokenKind::BlockStringLiteral => {
                let text = self.current_text();
                &text[3..text.len() - 3]
            }
            _ => return None,
        };
        let span = self.current.span;
        self.advance();
        Some(Description::new(text, span))
    }

    fn parse_name(&mut self) -> Name {
        let span = self.current.span;
        if self.at().is_name() {
            let value = self.intern_current();
            self.advance();
            Name::new(value, span)
        } else {
            self.error_expected("name");
            Name::new(self.lexer.intern_span(Span::empty(span.start)), Span::empty(span.start))
        }
    }

    fn parse_schema_definition(
        &mut self,
        description: Option<Description<'a>>,
    ) -> SchemaDefinition<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // schema
        let directives = self.parse_directives();

        let mut operations = Vec::new();
        self.expect(TokenKind::LBrace);
        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let op_start = self.current.span.start;
            let operation = match self.at() {
                TokenKind::Query => Some(OperationType::Query),
                TokenKind::Mutation => Some(OperationType::Mutation),
                TokenKind::Subscription => Some(OperationType::Subscription),
                _ => {
                    self.error("expected `query`, `mutation` or `subscription`");
                    None
                }
            };
            if let Some(operation) = operation {
                self.advance();
                self.expect(TokenKind::Colon);
                let type_name = self.parse_name();
                operations.push(OperationTypeDefinition {
                    operation,
                    type_name,
                    span: self.span_from(op_start),
                });
            }
            self.recover_if_stuck(before);
        }
        self.expect(TokenKind::RBrace);

        SchemaDefinition {
            description,
            directives,
            operations,
            span: self.span_from(start),
        }
    }

    fn parse_enum_values(&mut self) -> Vec<EnumValueDefinition<'a>> {
        let mut values = Vec::new();
        if !self.eat(TokenKind::LBrace) {
            return values;
        }
        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let description = self.try_parse_description();
            let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
            let name = self.parse_name();
            let directives = self.parse_directives();
            values.push(EnumValueDefinition {
                description,
                name,
                directives,
                span: self.span_from(start),
            });
            self.recover_if_stuck(before);
        }
        self.expect(TokenKind::RBrace);
        values
    }

    fn parse_directive_definition(
        &mut self,
        description: Option<Description<'a>>,
    ) -> DirectiveDefinitionNode<'a> {
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // directive
        self.expect(TokenKind::At);
        let name = self.parse_name();

        let arguments = if self.at_kind(TokenKind::LParen) {
            self.parse_input_value_definitions(TokenKind::LParen, TokenKind::RParen)
        } else {
            Vec::new()
        };

        let repeatable = self.eat(TokenKind::Repeatable);
        self.expect(TokenKind::On);

        let mut locations = Vec::new();
        self.eat(TokenKind::Pipe);
        loop {
            let location_span = self.current.span;
            let location = self.current_text();
            match DirectiveLocation::parse(location) {
                Some(location) => {
                    self.advance();
                    locations.push(location);
                }
                None => {
                    self.diagnostics.error(
                        codes::INVALID_SYNTAX,
                        "unknown directive location",
                        location_span,
                        format!("`{location}` is not a directive location"),
                    );
                    break;
                }
            }
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }

        DirectiveDefinitionNode {
            description,
            name,
            arguments,
            repeatable,
            locations,
            span: self.span_from(start),
        }
    }

    fn parse_implements(&mut self) -> Vec<Name> {
        let mut interfaces = Vec::new();
        if self.eat(TokenKind::Implements) {
            self.eat(TokenKind::Amp);
            interfaces.push(self.parse_name());
            while self.eat(TokenKind::Amp) {
                interfaces.push(self.parse_name());
            }
        }
        interfaces
    }

    fn parse_field_definitions(&mut self) -> Vec<FieldDefinition<'a>> {
        let mut fields = Vec::new();
        if !self.eat(TokenKind::LBrace) {
            return fields;
        }
        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            fields.push(self.parse_field_definition());
            self.recover_if_stuck(before);
        }
        self.expect(TokenKind::RBrace);
        fields
    }

    fn parse_field_definition(&mut self) -> FieldDefinition<'a> {
        let description = self.try_parse_description();
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        let name = self.parse_name();
        let arguments = if self.at_kind(TokenKind::LParen) {
            self.parse_input_value_definitions(TokenKind::LParen, TokenKind::RParen)
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let directives = self.parse_directives();

        FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_input_value_definitions(
        &mut self,
        open: TokenKind,
        close: TokenKind,
    ) -> Vec<InputValueDefinition<'a>> {
        let mut values = Vec::new();
        self.expect(open);
        while !self.at_kind(close) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            values.push(self.parse_input_value_definition());
            self.recover_if_stuck(before);
        }
        self.expect(close);
        values
    }

    fn parse_input_value_definition(&mut self) -> InputValueDefinition<'a> {
        let description = self.try_parse_description();
        let start = description.as_ref().map_or(self.current.span.start, |d| d.span.start);
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_value())
        } else {
            None
        };
        let directives = self.parse_directives();

        InputValueDefinition {
            description,
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_type(&mut self) -> Type {
        let start = self.current.span.start;

        let base = if self.eat(TokenKind::LBracket) {
            let inner = self.parse_type();
            self.expect(TokenKind::RBracket);
            Type::List(Box::new(inner), self.span_from(start))
        } else {
            let name = self.parse_name();
            Type::Named(NamedType {
                name: name.value,
                span: name.span,
            })
        };

        if self.eat(TokenKind::Bang) {
            Type::NonNull(Box::new(base), self.span_from(start))
        } else {
            base
        }
    }

    fn parse_directives(&mut self) -> Vec<Directive> {
        let mut directives = Vec::new();
        while self.at_kind(TokenKind::At) {
            directives.push(self.parse_directive());
        }
        directives
    }

    fn parse_directive(&mut self) -> Directive {
        let start = self.current.span.start;
        self.advance(); // @
        let name = self.parse_name();
        let arguments = self.parse_arguments();
        Directive {
            name,
            arguments,
            span: self.span_from(start),
        }
    }

    fn parse_arguments(&mut self) -> Vec<Argument> {
        let mut args = Vec::new();
        if !self.eat(TokenKind::LParen) {
            return args;
        }
        while !self.at_kind(TokenKind::RParen) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let start = self.current.span.start;
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let value = self.parse_value();
            args.push(Argument {
                name,
                value,
                span: self.span_from(start),
            });
            self.recover_if_stuck(before);
        }
        self.expect(TokenKind::RParen);
        args
    }

    fn parse_value(&mut self) -> Value {
        let start = self.current.span.start;

        match self.at() {
            TokenKind::Dollar => {
                self.advance();
                Value::Variable(self.parse_name())
            }
            TokenKind::IntLiteral => {
                let value = self.current_text().parse().unwrap_or_default();
                self.advance();
                Value::Int(value, self.span_from(start))
            }
            TokenKind::FloatLiteral => {
                let value = self.current_text().parse().unwrap_or_default();
                self.advance();
                Value::Float(value, self.span_from(start))
            }
            TokenKind::StringLiteral => {
                let text = self.current_text();
                let value = unescape(&text[1..text.len() - 1]);
                self.advance();
                Value::String(value, self.span_from(start))
            }
            TokenKind::BlockStringLiteral => {
                let text = self.current_text();
                let value = text[3..text.len() - 3].replace("\\\"\"\"", "\"\"\"");
                self.advance();
                Value::String(value, self.span_from(start))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at_kind(TokenKind::True);
                self.advance();
                Value::Boolean(value, self.span_from(start))
            }
            TokenKind::Null => {
                self.advance();
                Value::Null(self.span_from(start))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut values = Vec::new();
                while !self.at_kind(TokenKind::RBracket) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    values.push(self.parse_value());
                    self.recover_if_stuck(before);
                }
                self.expect(TokenKind::RBracket);
                Value::List(values, self.span_from(start))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    let name = self.parse_name();
                    self.expect(TokenKind::Colon);
                    let value = self.parse_value();
                    fields.push((name, value));
                    self.recover_if_stuck(before);
                }
                self.expect(TokenKind::RBrace);
                Value::Object(fields, self.span_from(start))
            }
            kind if kind.is_name() => Value::Enum(self.parse_name()),
            _ => {
                self.error("expected value");
                Value::Null(Span::empty(start))
            }
        }
    }

    /// Parses an operation definition.
    fn parse_operation(&mut self) -> OperationDefinition {
        let start = self.current.span.start;

        let (operation, name) = if self.at_kind(TokenKind::LBrace) {
            // Shorthand `{ ... }` is an anonymous query.
            (OperationType::Query, None)
        } else {
            let operation = match self.at() {
                TokenKind::Mutation => OperationType::Mutation,
                TokenKind::Subscription => OperationType::Subscription,
                _ => OperationType::Query,
            };
            self.advance();
            let name = if self.at().is_name() {
                Some(self.parse_name())
            } else {
                None
            };
            (operation, name)
        };

        let variables = if self.at_kind(TokenKind::LParen) {
            self.parse_variable_definitions()
        } else {
            Vec::new()
        };
        let directives = self.parse_directives();
        let selection_set = self.parse_selection_set();

        OperationDefinition {
            operation,
            name,
            variables,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_variable_definitions(&mut self) -> Vec<VariableDefinition> {
        let mut vars = Vec::new();
        self.advance(); // (
        while !self.at_kind(TokenKind::RParen) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            vars.push(self.parse_variable_definition());
            self.recover_if_stuck(before);
        }
        self.expect(TokenKind::RParen);
        vars
    }

    fn parse_variable_definition(&mut self) -> VariableDefinition {
        let start = self.current.span.start;
        self.expect(TokenKind::Dollar);
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_value())
        } else {
            None
        };
        let directives = self.parse_directives();

        VariableDefinition {
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_fragment_definition(&mut self) -> FragmentDefinition {
        let start = self.current.span.start;
        self.advance(); // fragment

        let name = self.parse_name();
        self.expect(TokenKind::On);
        let type_condition = self.parse_name();
        let directives = self.parse_directives();
        let selection_set = self.parse_selection_set();

        FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_selection_set(&mut self) -> SelectionSet {
        let start = self.current.span.start;
        let mut selections = Vec::new();

        if self.expect(TokenKind::LBrace) {
            while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                let before = self.current.span.start;
                selections.push(self.parse_selection());
                self.recover_if_stuck(before);
            }
            self.expect(TokenKind::RBrace);

            if selections.is_empty() {
                self.diagnostics.warning(
                    codes::EMPTY_SELECTION_SET,
                    "empty selection set",
                    self.span_from(start),
                    "a selection set should select at least one field",
                );
            }
        }

        SelectionSet {
            selections,
            span: self.span_from(start),
        }
    }

    fn parse_selection(&mut self) -> Selection {
        let start = self.current.span.start;
        if !self.eat(TokenKind::Spread) {
            return Selection::Field(self.parse_field_selection());
        }

        if self.eat(TokenKind::On) {
            let type_condition = Some(self.parse_name());
            let directives = self.parse_directives();
            let selection_set = self.parse_selection_set();
            Selection::InlineFragment(InlineFragment {
                type_condition,
                directives,
                selection_set,
                span: self.span_from(start),
            })
        } else if self.at_kind(TokenKind::LBrace) || self.at_kind(TokenKind::At) {
            let directives = self.parse_directives();
            let selection_set = self.parse_selection_set();
            Selection::InlineFragment(InlineFragment {
                type_condition: None,
                directives,
                selection_set,
                span: self.span_from(start),
            })
        } else {
            let name = self.parse_name();
            let directives = self.parse_directives();
            Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                span: self.span_from(start),
            })
        }
    }

    fn parse_field_selection(&mut self) -> FieldSelection {
        let start = self.current.span.start;

        let first_name = self.parse_name();
        let (alias, name) = if self.eat(TokenKind::Colon) {
            (Some(first_name), self.parse_name())
        } else {
            (None, first_name)
        };

        let arguments = self.parse_arguments();
        let directives = self.parse_directives();
        let selection_set = if self.at_kind(TokenKind::LBrace) {
            Some(self.parse_selection_set())
        } else {
            None
        };

        FieldSelection {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }
}

/// Resolves escape sequences in a quoted string body.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
