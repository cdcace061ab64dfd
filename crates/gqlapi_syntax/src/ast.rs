//! Abstract syntax tree for GraphQL documents.
//!
//! Both executable documents (operations, fragments) and type-system
//! documents (schemas) share one tree so a single parser serves every input.

use crate::token::DirectiveLocation;
use gqlapi_core::{Span, Text};

/// A complete document.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub definitions: Vec<Definition<'a>>,
    pub span: Span,
}

impl<'a> Document<'a> {
    /// Iterates the operation definitions in source order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
    }

    /// Iterates type definitions and extensions in source order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition<'a>> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Type(ty) | Definition::TypeExtension(ty) => Some(ty),
            _ => None,
        })
    }
}

/// A top-level definition.
#[derive(Debug, Clone)]
pub enum Definition<'a> {
    Schema(SchemaDefinition<'a>),
    Type(TypeDefinition<'a>),
    TypeExtension(TypeDefinition<'a>),
    Directive(DirectiveDefinitionNode<'a>),
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
}

/// Schema definition.
#[derive(Debug, Clone)]
pub struct SchemaDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub directives: Vec<Directive>,
    pub operations: Vec<OperationTypeDefinition>,
    pub span: Span,
}

/// Root operation type in a schema definition.
#[derive(Debug, Clone)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: Name,
    pub span: Span,
}

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// Returns the keyword that introduces this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }

    /// Returns the conventional root type name (`Query`, `Mutation`, ...).
    #[must_use]
    pub const fn root_type_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type definitions.
#[derive(Debug, Clone)]
pub enum TypeDefinition<'a> {
    Object(ObjectTypeDefinition<'a>),
    Interface(InterfaceTypeDefinition<'a>),
    Union(UnionTypeDefinition<'a>),
    Enum(EnumTypeDefinition<'a>),
    Input(InputObjectTypeDefinition<'a>),
    Scalar(ScalarTypeDefinition<'a>),
}

impl TypeDefinition<'_> {
    /// Returns the defined type's name.
    #[must_use]
    pub fn name(&self) -> Name {
        match self {
            Self::Object(def) => def.name,
            Self::Interface(def) => def.name,
            Self::Union(def) => def.name,
            Self::Enum(def) => def.name,
            Self::Input(def) => def.name,
            Self::Scalar(def) => def.name,
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone)]
pub struct ObjectTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub implements: Vec<Name>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition<'a>>,
    pub span: Span,
}

/// Interface type definition.
#[derive(Debug, Clone)]
pub struct InterfaceTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub implements: Vec<Name>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition<'a>>,
    pub span: Span,
}

/// Union type definition.
#[derive(Debug, Clone)]
pub struct UnionTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub members: Vec<Name>,
    pub span: Span,
}

/// Enum type definition.
#[derive(Debug, Clone)]
pub struct EnumTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition<'a>>,
    pub span: Span,
}

/// Enum value definition.
#[derive(Debug, Clone)]
pub struct EnumValueDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input object type definition.
#[derive(Debug, Clone)]
pub struct InputObjectTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition<'a>>,
    pub span: Span,
}

/// Scalar type definition.
#[derive(Debug, Clone)]
pub struct ScalarTypeDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Field definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition<'a>>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input value definition (arguments, input fields).
#[derive(Debug, Clone)]
pub struct InputValueDefinition<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Type reference.
#[derive(Debug, Clone)]
pub enum Type {
    /// Named type: `Profile`
    Named(NamedType),
    /// List type: `[Profile]`
    List(Box<Type>, Span),
    /// Non-null type: `Profile!`
    NonNull(Box<Type>, Span),
}

impl Type {
    /// Returns the innermost named type.
    #[must_use]
    pub fn named(&self) -> &NamedType {
        match self {
            Self::Named(named) => named,
            Self::List(inner, _) | Self::NonNull(inner, _) => inner.named(),
        }
    }
}

/// Named type.
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: Text,
    pub span: Span,
}

/// Directive definition.
#[derive(Debug, Clone)]
pub struct DirectiveDefinitionNode<'a> {
    pub description: Option<Description<'a>>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition<'a>>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
    pub span: Span,
}

/// Directive usage.
#[derive(Debug, Clone)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// Argument.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub span: Span,
}

/// Operation definition.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub operation: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Variable definition.
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Fragment definition.
#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Selection set.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub span: Span,
}

/// Selection.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

/// Field selection.
#[derive(Debug, Clone)]
pub struct FieldSelection {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub selection_set: Option<SelectionSet>,
    pub span: Span,
}

impl FieldSelection {
    /// The key this field occupies in the response: the alias if present,
    /// otherwise the field name.
    #[must_use]
    pub fn response_key(&self) -> Name {
        self.alias.unwrap_or(self.name)
    }
}

/// Fragment spread.
#[derive(Debug, Clone)]
pub struct FragmentSpread {
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Inline fragment.
#[derive(Debug, Clone)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// Value.
#[derive(Debug, Clone)]
pub enum Value {
    Variable(Name),
    Int(i64, Span),
    Float(f64, Span),
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
    Enum(Name),
    List(Vec<Value>, Span),
    Object(Vec<(Name, Value)>, Span),
}

/// Name with span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub value: Text,
    pub span: Span,
}

impl Name {
    pub fn new(value: Text, span: Span) -> Self {
        Self { value, span }
    }
}

/// Description (documentation string).
#[derive(Debug, Clone)]
pub struct Description<'a> {
    pub value: &'a str,
    pub span: Span,
}

impl<'a> Description<'a> {
    pub fn new(value: &'a str, span: Span) -> Self {
        Self { value, span }
    }
}
