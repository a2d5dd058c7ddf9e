#![doc = r#"
intent-error — Workspace-wide error types, severity, and policy-driven emission.

Overview
- A single Error enum shared across crates.
- Severity classification for coarse, programmatic handling.
- DomainError for structured, non-fatal domain failures.
- Result alias for ergonomic propagation.
- Context and iterator extensions to reduce boilerplate.
- Policy-driven emission via ErrorPolicy so libraries stay side-effect free.

Quickstart
- Library code should:
  - return intent_error::Result<T>
  - create structured errors (Fatal/Internal/Domain/Warning)
  - use ContextExt and ResultExt helpers when helpful
- Application code (the HTTP server) should:
  - choose an ErrorPolicy (e.g., NoopPolicy or TracingPolicy)
  - emit errors at boundaries without interleaving side-effects in core logic

Example: return Result and propagate with ?
```rust,ignore
use intent_error::{Result, DomainError};

fn validate_threshold(value: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(intent_error::Error::from(DomainError::Validation {
            message: format!("score_threshold {value} is out of range [0, 1]"),
        }))
    }
}
```

Example: policy-driven emission at the boundary
```rust,ignore
use intent_error::{Result, ErrorPolicy, ResultExt, policy::NoopPolicy};

fn handle_request(policy: &impl ErrorPolicy) -> Result<()> {
    validate_threshold(0.6).emit_event(policy)?;
    Ok(())
}
```

Example: iterator ergonomics
```rust,ignore
use intent_error::{Result, result_ext::IterResultExt, DomainError};

fn parse_counts(values: &[&str]) -> Result<Vec<usize>> {
    let iter = values.iter().map(|s| {
        s.parse::<usize>().map_err(|e| {
            intent_error::Error::from(DomainError::Validation { message: e.to_string() })
        })
    });
    iter.collect_ok()
}
```

Feature flags
- tracing: enables TracingPolicy
- serde: enables Serialize/Deserialize on a subset of types (Severity, DomainError, WarningError)

Guidance
- Prefer structured Error variants and DomainError over ad-hoc strings.
- Use ErrorPolicy to classify/emit; avoid logging in library code.
- ContextExt captures context lazily; add it only where it improves diagnosability.
"#]

pub mod context;
pub mod domain;
pub mod fatal;
pub mod internal;
pub mod policy;
#[cfg(feature = "serde")]
pub mod pretty;
pub mod result_ext;
pub mod severity;
pub mod warning;

// public exports
pub use context::{ContextExt, ContextualError, ErrorContext, SourceSpan};
pub use domain::DomainError;
pub use fatal::FatalError;
pub use internal::InternalError;
#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
pub use policy::{ErrorPolicy, NoopPolicy};
#[cfg(feature = "serde")]
pub use pretty::PrettyDebug;
pub use result_ext::{IterResultExt, ResultExt};
pub use severity::Severity;
pub use warning::WarningError;

/// Workspace-wide result alias used by all crates in the project.
/// The default error type is this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type shared across the Intent Hub workspace.
///
/// Variants group failures into coarse classes; see [`Error::severity`] for
/// programmatic classification. Prefer returning `Result<T>` from functions
/// and let callers decide how to emit via an [`policy::ErrorPolicy`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fatal(#[from] FatalError),
    #[error(transparent)]
    Warning(#[from] WarningError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Context(#[from] ContextualError),
}

impl Error {
    /// Returns true if this error is a Warning variant.
    ///
    /// Useful for quick classification when a caller wants to continue
    /// processing while recording non-fatal issues.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::Warning(_))
    }

    /// Coarse severity classification for programmatic handling.
    ///
    /// Typical usage:
    /// - map severity to logging level
    /// - decide whether to continue or abort a loop
    /// - route errors to different channels/handlers in the HTTP layer
    pub fn severity(&self) -> Severity {
        match self {
            Error::Warning(_) => Severity::Warning,
            Error::Fatal(_) => Severity::Fatal,
            Error::Internal(_) | Error::Domain(_) | Error::Context(_) => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_has_error_severity() {
        let err = Error::from(DomainError::NotFound {
            message: "route 7".to_string(),
        });
        assert_eq!(err.severity(), Severity::Error);
        assert!(!err.is_warning());
    }

    #[test]
    fn warning_error_has_warning_severity() {
        let err = Error::from(WarningError::StaleCache("overlap cache".to_string()));
        assert_eq!(err.severity(), Severity::Warning);
        assert!(err.is_warning());
    }
}
