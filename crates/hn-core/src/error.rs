use thiserror::Error;

pub type HnResult<T> = Result<T, HnError>;

/// Every failure the core reports, one variant per error kind.
#[derive(Error, Debug)]
pub enum HnError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HnError {
    pub fn is_format(&self) -> bool {
        matches!(self, HnError::Format(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, HnError::Reference(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, HnError::Validation(_))
    }
}

/// Malformed input syntax, in the network description or in JSON text.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("[{section}] line {line}: invalid {field} '{token}'")]
    InvalidToken {
        section: &'static str,
        line: usize,
        field: &'static str,
        token: String,
    },

    #[error("[{section}] line {line}: missing {field}")]
    MissingField {
        section: &'static str,
        line: usize,
        field: &'static str,
    },

    #[error("[{section}] line {line}: unexpected trailing field '{token}'")]
    TrailingField {
        section: &'static str,
        line: usize,
        token: String,
    },

    #[error("line {line}: malformed section tag '{tag}'")]
    MalformedSection { line: usize, tag: String },

    #[error("line {line}: unknown section '{tag}'")]
    UnknownSection { line: usize, tag: String },

    #[error("line {line}: data outside of any section")]
    OutsideSection { line: usize },

    #[error("line {line}: data is not valid UTF-8")]
    InvalidEncoding { line: usize },

    #[error("JSON syntax error at line {line}, column {column}: {source}")]
    Json {
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl FormatError {
    /// 1-based line of the offending input, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            FormatError::InvalidToken { line, .. }
            | FormatError::MissingField { line, .. }
            | FormatError::TrailingField { line, .. }
            | FormatError::MalformedSection { line, .. }
            | FormatError::UnknownSection { line, .. }
            | FormatError::OutsideSection { line }
            | FormatError::InvalidEncoding { line }
            | FormatError::Json { line, .. } => Some(*line),
            FormatError::Encode(_) => None,
        }
    }
}

/// What kind of entity a dangling reference was expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Node,
    Junction,
    Link,
    Pattern,
    Curve,
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RefKind::Node => "node",
            RefKind::Junction => "junction",
            RefKind::Link => "link",
            RefKind::Pattern => "pattern",
            RefKind::Curve => "curve",
        };
        f.write_str(s)
    }
}

/// A referenced id that does not exist in the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{referrer} references missing {kind} '{target}'")]
pub struct ReferenceError {
    pub referrer: String,
    pub target: String,
    pub kind: RefKind,
}

impl ReferenceError {
    pub fn new(referrer: impl Into<String>, target: impl Into<String>, kind: RefKind) -> Self {
        Self {
            referrer: referrer.into(),
            target: target.into(),
            kind,
        }
    }
}

/// A field violates a range or consistency rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: &'static str },

    #[error("Invalid value: {element} {field} = {value} ({reason})")]
    InvalidValue {
        element: String,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Inconsistent {element}: {rule}")]
    Inconsistent { element: String, rule: String },
}

impl ValidationError {
    /// Id of the element that failed validation.
    pub fn element(&self) -> &str {
        match self {
            ValidationError::DuplicateId { id, .. } => id,
            ValidationError::InvalidValue { element, .. } => element,
            ValidationError::Inconsistent { element, .. } => element,
        }
    }

    pub fn inconsistent(element: impl Into<String>, rule: impl Into<String>) -> Self {
        ValidationError::Inconsistent {
            element: element.into(),
            rule: rule.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_names_section_line_and_token() {
        let err = FormatError::InvalidToken {
            section: "PIPES",
            line: 12,
            field: "length",
            token: "12x".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PIPES"));
        assert!(msg.contains("12"));
        assert!(msg.contains("12x"));
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn reference_error_display() {
        let err = ReferenceError::new("P1", "J9", RefKind::Node);
        assert_eq!(err.to_string(), "P1 references missing node 'J9'");
    }

    #[test]
    fn kinds_convert_into_hn_error() {
        let err: HnError = ValidationError::inconsistent("T1", "bad").into();
        assert!(err.is_validation());
        let err: HnError = ReferenceError::new("a", "b", RefKind::Curve).into();
        assert!(err.is_reference());
        assert_eq!(
            ValidationError::DuplicateId {
                id: "J1".into(),
                context: "nodes"
            }
            .element(),
            "J1"
        );
    }
}
