use std::backtrace::Backtrace;
use std::path::PathBuf;

use super::Error;

/// A `(line, column)` location inside a settings or journal file, used to
/// point at the offending entry when a [`super::DomainError::Config`] or
/// journal-parse failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug)]
pub struct ErrorContext {
    pub file_path: PathBuf,
    pub span: Option<SourceSpan>,
    pub detail: Option<String>,
    pub backtrace: Option<Backtrace>,
}

impl ErrorContext {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            span: None,
            detail: None,
            backtrace: Some(Backtrace::capture()),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextualError {
    #[error("{source}\nContext: {context:?}")]
    WithContext {
        #[source]
        source: Box<Error>,
        context: ErrorContext,
    },
}

/// Attaches file/location context to a fallible operation, for errors that
/// originate from reading a settings or journal file.
pub trait ContextExt<T> {
    fn with_context(self, file_path: PathBuf) -> Result<T, ContextualError>;
}

impl<T, E: Into<Error>> ContextExt<T> for Result<T, E> {
    fn with_context(self, file_path: PathBuf) -> Result<T, ContextualError> {
        self.map_err(|e| ContextualError::WithContext {
            source: Box::new(e.into()),
            context: ErrorContext::new(file_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_context_wraps_source() {
        let result: Result<(), Error> = Err(Error::from(super::super::DomainError::NotFound {
            message: "route 7".to_string(),
        }));
        let wrapped = result.with_context(PathBuf::from("routes.json"));
        assert!(wrapped.is_err());
    }
}
