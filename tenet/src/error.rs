use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Detailed error information with source location
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub message: String,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// The three error families reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed expression text
    Syntax,
    /// Resolution-time problems: names, types, references, imports
    Semantic,
    /// Evaluation-time problems
    Runtime,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Runtime => "runtime",
        }
    }
}

/// Error types for the Tenet engine
///
/// Errors are values: almost every stage accumulates them and keeps going,
/// so the same type doubles as the entries of `EvalResult::errors`.
#[derive(Debug, Clone, PartialEq)]
pub enum TenetError {
    /// Malformed expression text
    Syntax(Box<ErrorDetails>),

    /// Resolution-time error (names, types, references, imports)
    Semantic(Box<ErrorDetails>),

    /// Evaluation-time error
    Runtime(Box<ErrorDetails>),
}

impl TenetError {
    fn details(message: impl Into<String>) -> Box<ErrorDetails> {
        Box::new(ErrorDetails {
            message: message.into(),
            line: None,
            suggestion: None,
        })
    }

    /// Create a syntax error
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(Self::details(message))
    }

    /// Create a semantic error
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic(Self::details(message))
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(Self::details(message))
    }

    /// Attach a source line (ignored when `None`)
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        if line.is_some() {
            self.details_mut().line = line;
        }
        self
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.details_mut().suggestion = Some(suggestion.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TenetError::Syntax(_) => ErrorKind::Syntax,
            TenetError::Semantic(_) => ErrorKind::Semantic,
            TenetError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    pub fn message(&self) -> &str {
        &self.details_ref().message
    }

    pub fn line(&self) -> Option<usize> {
        self.details_ref().line
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.details_ref().suggestion.as_deref()
    }

    fn details_ref(&self) -> &ErrorDetails {
        match self {
            TenetError::Syntax(details)
            | TenetError::Semantic(details)
            | TenetError::Runtime(details) => details,
        }
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        match self {
            TenetError::Syntax(details)
            | TenetError::Semantic(details)
            | TenetError::Runtime(details) => details,
        }
    }
}

impl fmt::Display for TenetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TenetError::Syntax(_) => "Syntax error",
            TenetError::Semantic(_) => "Semantic error",
            TenetError::Runtime(_) => "Runtime error",
        };
        let details = self.details_ref();
        write!(f, "{}: {}", label, details.message)?;
        if let Some(suggestion) = &details.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        if let Some(line) = details.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for TenetError {}

impl Serialize for TenetError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let details = self.details_ref();
        let mut fields = 2;
        if details.suggestion.is_some() {
            fields += 1;
        }
        if details.line.is_some() {
            fields += 1;
        }

        let mut state = serializer.serialize_struct("TenetError", fields)?;
        state.serialize_field("type", self.kind().name())?;
        state.serialize_field("message", &details.message)?;
        if let Some(suggestion) = &details.suggestion {
            state.serialize_field("suggestedFix", suggestion)?;
        }
        if let Some(line) = details.line {
            state.serialize_field("line", &line)?;
        }
        state.end()
    }
}
