//! Calling conventions for generated functions.

use gqlapi_syntax::OperationType;

/// Type name of the client every generated function talks to.
pub const CLIENT_TYPE: &str = "GenericGraphQLClient";

/// How a generated function receives its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// A method on the object returned by `getAPI`; the client is captured
    /// when the object is built.
    Method,
    /// A standalone exported function taking the client as its first
    /// parameter.
    FreeFunction,
}

impl CallingConvention {
    /// Resolves the convention from the `withWrapper` option.
    #[must_use]
    pub const fn from_wrapper(with_wrapper: bool) -> Self {
        if with_wrapper {
            Self::Method
        } else {
            Self::FreeFunction
        }
    }

    /// Returns the exported identifier for an operation.
    ///
    /// Methods keep the operation name. Free queries become `fetch<Pascal>`,
    /// free subscriptions `subscribe<Pascal>`, and free mutations keep the
    /// operation name.
    #[must_use]
    pub fn identifier(self, operation: OperationType, name: &str, pascal_case_name: &str) -> String {
        match (self, operation) {
            (Self::Method, _) | (Self::FreeFunction, OperationType::Mutation) => name.to_string(),
            (Self::FreeFunction, OperationType::Query) => format!("fetch{pascal_case_name}"),
            (Self::FreeFunction, OperationType::Subscription) => {
                format!("subscribe{pascal_case_name}")
            }
        }
    }

    /// Returns the declaration head up to the parameter list, e.g.
    /// `async function fetchProfile` or `async profile`.
    ///
    /// Subscriptions return an iterable synchronously and are never `async`.
    #[must_use]
    pub fn head(self, operation: OperationType, name: &str, pascal_case_name: &str) -> String {
        let identifier = self.identifier(operation, name, pascal_case_name);
        let asyncness = match operation {
            OperationType::Query | OperationType::Mutation => "async ",
            OperationType::Subscription => "",
        };
        match self {
            Self::Method => format!("{asyncness}{identifier}"),
            Self::FreeFunction => format!("{asyncness}function {identifier}"),
        }
    }

    /// Returns the leading client parameter, empty for methods.
    #[must_use]
    pub fn client_parameter(self) -> String {
        match self {
            Self::Method => String::new(),
            Self::FreeFunction => format!("client: {CLIENT_TYPE}, "),
        }
    }
}
