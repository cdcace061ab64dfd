//! Formatting of generated source text.
//!
//! The bundled [`TypeScriptFormatter`] is a layout normalizer rather than a
//! pretty printer: it re-indents every line by bracket depth, trims trailing
//! whitespace and collapses runs of blank lines. It never joins or wraps
//! lines. While doing so it checks that brackets balance and that string,
//! template and comment literals are closed, which is enough to reject
//! malformed assembled output.

use async_trait::async_trait;
use thiserror::Error;

/// Language of the source handed to a formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceLanguage {
    TypeScript,
}

/// Errors returned by a [`SourceFormatter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The source could not be parsed.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl FormatError {
    fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Formats generated source text.
#[async_trait]
pub trait SourceFormatter: Send + Sync {
    /// Formats `source`, or fails if it is not well-formed.
    async fn format(&self, source: &str, language: SourceLanguage) -> Result<String, FormatError>;
}

/// Formatting options.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Number of spaces for indentation.
    pub indent_size: usize,
    /// Use tabs instead of spaces.
    pub use_tabs: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            use_tabs: false,
        }
    }
}

/// Bracket-depth formatter for TypeScript.
#[derive(Debug, Clone, Default)]
pub struct TypeScriptFormatter {
    options: FormatOptions,
}

impl TypeScriptFormatter {
    /// Creates a formatter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with the given options.
    #[must_use]
    pub fn with_options(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Formats source text synchronously.
    pub fn format_source(&self, source: &str) -> Result<String, FormatError> {
        Printer::new(&self.options).print(source)
    }
}

#[async_trait]
impl SourceFormatter for TypeScriptFormatter {
    async fn format(&self, source: &str, language: SourceLanguage) -> Result<String, FormatError> {
        tracing::trace!(?language, bytes = source.len(), "formatting generated source");
        self.format_source(source)
    }
}

/// Lexical state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    /// Inside a template literal opened at (line, column).
    Template(usize, usize),
    /// Inside a block comment opened at (line, column).
    BlockComment(usize, usize),
}

struct OpenBracket {
    ch: char,
    line: usize,
    column: usize,
}

struct Printer<'o> {
    options: &'o FormatOptions,
    output: String,
    mode: Mode,
    brackets: Vec<OpenBracket>,
    /// Brackets still open per indentation level. A line that opens several
    /// brackets indents the following lines only once.
    levels: Vec<usize>,
    pending_blank: bool,
}

impl<'o> Printer<'o> {
    fn new(options: &'o FormatOptions) -> Self {
        Self {
            options,
            output: String::new(),
            mode: Mode::Code,
            brackets: Vec::new(),
            levels: Vec::new(),
            pending_blank: false,
        }
    }

    fn print(mut self, source: &str) -> Result<String, FormatError> {
        for (index, line) in source.lines().enumerate() {
            self.print_line(index + 1, line)?;
        }

        match self.mode {
            Mode::Code => {}
            Mode::Template(line, column) => {
                return Err(FormatError::syntax(line, column, "unterminated template literal"));
            }
            Mode::BlockComment(line, column) => {
                return Err(FormatError::syntax(line, column, "unterminated comment"));
            }
        }
        if let Some(open) = self.brackets.last() {
            return Err(FormatError::syntax(
                open.line,
                open.column,
                format!("`{}` is never closed", open.ch),
            ));
        }

        Ok(self.output)
    }

    fn print_line(&mut self, line_no: usize, raw: &str) -> Result<(), FormatError> {
        let starts_in_code = self.mode == Mode::Code;
        let text = if starts_in_code { raw.trim() } else { raw.trim_end() };

        if text.is_empty() {
            if starts_in_code {
                self.pending_blank = !self.output.is_empty();
            } else {
                self.output.push('\n');
            }
            return Ok(());
        }

        let indent = self.scan(line_no, raw, text)?;

        if self.pending_blank {
            self.output.push('\n');
            self.pending_blank = false;
        }
        if starts_in_code {
            self.push_indent(indent);
        }
        self.output.push_str(text);
        self.output.push('\n');
        Ok(())
    }

    /// Updates bracket and literal state for one line and returns the
    /// indentation level the line should be printed at.
    fn scan(&mut self, line_no: usize, raw: &str, text: &str) -> Result<usize, FormatError> {
        // Columns are reported against the untrimmed line.
        let offset = raw.chars().count() - raw.trim_start().chars().count();
        let offset = if self.mode == Mode::Code { offset } else { 0 };

        let mut indent = None;
        let mut opened_here = 0usize;
        let mut chars = text.chars().enumerate().peekable();

        while let Some((index, c)) = chars.next() {
            let column = offset + index + 1;

            match self.mode {
                Mode::Template(..) => {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '`' => self.mode = Mode::Code,
                        _ => {}
                    }
                    continue;
                }
                Mode::BlockComment(..) => {
                    if c == '*' && chars.peek().is_some_and(|&(_, next)| next == '/') {
                        chars.next();
                        self.mode = Mode::Code;
                    }
                    continue;
                }
                Mode::Code => {}
            }

            if !matches!(c, '}' | ')' | ']') && indent.is_none() {
                indent = Some(self.levels.len());
            }

            match c {
                '{' | '(' | '[' => {
                    self.brackets.push(OpenBracket {
                        ch: c,
                        line: line_no,
                        column,
                    });
                    opened_here += 1;
                }
                '}' | ')' | ']' => {
                    let expected = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match self.brackets.pop() {
                        Some(open) if open.ch == expected => {}
                        Some(open) => {
                            return Err(FormatError::syntax(
                                line_no,
                                column,
                                format!(
                                    "unexpected `{c}`, `{}` opened at {}:{} is still open",
                                    open.ch, open.line, open.column
                                ),
                            ));
                        }
                        None => {
                            return Err(FormatError::syntax(
                                line_no,
                                column,
                                format!("unexpected `{c}`"),
                            ));
                        }
                    }
                    if opened_here > 0 {
                        opened_here -= 1;
                    } else if let Some(top) = self.levels.last_mut() {
                        *top -= 1;
                        if *top == 0 {
                            self.levels.pop();
                        }
                    }
                }
                '"' | '\'' => {
                    let mut closed = false;
                    while let Some((_, next)) = chars.next() {
                        if next == '\\' {
                            chars.next();
                        } else if next == c {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(FormatError::syntax(
                            line_no,
                            column,
                            "unterminated string literal",
                        ));
                    }
                }
                '`' => self.mode = Mode::Template(line_no, column),
                '/' => match chars.peek() {
                    Some(&(_, '/')) => break,
                    Some(&(_, '*')) => {
                        chars.next();
                        self.mode = Mode::BlockComment(line_no, column);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let indent = indent.unwrap_or(self.levels.len());
        if opened_here > 0 {
            self.levels.push(opened_here);
        }
        Ok(indent)
    }

    fn push_indent(&mut self, level: usize) {
        if self.options.use_tabs {
            for _ in 0..level {
                self.output.push('\t');
            }
        } else {
            for _ in 0..level * self.options.indent_size {
                self.output.push(' ');
            }
        }
    }
}
