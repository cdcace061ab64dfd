//! Program assembly.

use crate::convention::CallingConvention;

/// Import lines the consumer places ahead of the generated content.
pub const PREPEND: &str = "import { TypedDocumentNode } from '@graphql-typed-document-node/core';\nimport { DocumentNode } from 'graphql';\n";

/// Client contract every generated function is written against.
pub const CLIENT_INTERFACE: &str = r#"export type RequestOptions = {
  requestHeaders?: HeadersInit;
  signal?: RequestInit["signal"];
};

export type GenericGraphQLClient = {
  request<TData = any, V = any>(
    document: string | DocumentNode | TypedDocumentNode<TData, V>,
    variables?: V,
    options?: RequestOptions
  ): Promise<TData>;
  subscribeAsync<TData = any, V = any>(
    document: string | DocumentNode | TypedDocumentNode<TData, V>,
    variables?: V,
    onUnexpectedClose?: () => void
  ): AsyncIterable<TData>;
};
"#;

/// Joins emitted functions into one program.
///
/// Empty fragments are dropped. Methods are gathered into the object returned
/// by `getAPI`; free functions are exported one after another.
#[must_use]
pub fn assemble_program(functions: &[String], convention: CallingConvention) -> String {
    let functions: Vec<&str> = functions
        .iter()
        .map(String::as_str)
        .filter(|function| !function.is_empty())
        .collect();

    let mut program = String::from(CLIENT_INTERFACE);
    program.push('\n');

    match convention {
        CallingConvention::Method => {
            let methods = functions
                .iter()
                .map(|function| indent(function, 2))
                .collect::<Vec<_>>()
                .join(",\n");
            program.push_str("export function getAPI(client: GenericGraphQLClient) {\n");
            program.push_str("  return {\n");
            if !methods.is_empty() {
                program.push_str(&methods);
                program.push('\n');
            }
            program.push_str("  };\n");
            program.push_str("}\n\n");
            program.push_str("export type GraphQLAPI = ReturnType<typeof getAPI>;\n");
        }
        CallingConvention::FreeFunction => {
            let exports = functions
                .iter()
                .map(|function| format!("export {function}\n"))
                .collect::<Vec<_>>()
                .join("\n");
            program.push_str(&exports);
        }
    }

    program
}

fn indent(text: &str, level: usize) -> String {
    let pad = "  ".repeat(level);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
