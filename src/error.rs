//! Error types for template parsing, rendering and palette construction

use thiserror::Error;

/// Malformed template syntax.
///
/// `offset` is the byte offset of the offending character; `line` and
/// `column` are 1-based and count characters, for messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(source: &str, offset: usize, kind: ParseErrorKind) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            kind,
            offset,
            line,
            column,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unterminated placeholder")]
    Unterminated,
    #[error("expected a name, found {found:?}")]
    ExpectedName { found: Option<char> },
    #[error("unexpected {found:?} in placeholder")]
    UnexpectedChar { found: char },
    #[error("invalid modifier argument {arg:?}")]
    InvalidArgument { arg: String },
    #[error("single '}}' outside a placeholder, write '}}}}' for a literal brace")]
    UnmatchedClose,
}

/// Failure while substituting values into a parsed template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("unknown key '{key}'")]
    UnknownKey { key: String },
    #[error("unknown modifier '{name}'")]
    UnknownModifier { name: String },
    #[error("modifier '{modifier}' cannot be applied to {value:?}: {reason}")]
    InvalidValue {
        modifier: String,
        value: String,
        reason: String,
    },
}

/// Either half of a one-shot parse + render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("palette is missing required key '{0}'")]
    MissingKey(String),
    #[error("invalid colors.json: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_on_first_line() {
        let err = ParseError::at("abc {", 4, ParseErrorKind::Unterminated);
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn position_after_newlines() {
        let source = "one\ntwo\n  }";
        let err = ParseError::at(source, 10, ParseErrorKind::UnmatchedClose);
        assert_eq!((err.line, err.column), (3, 3));
    }

    #[test]
    fn message_mentions_position() {
        let err = ParseError::at("x\n{", 2, ParseErrorKind::Unterminated);
        assert_eq!(
            err.to_string(),
            "unterminated placeholder at line 2, column 1"
        );
    }
}
