//! Diagnostics collected during a composition pass.

use std::fmt;

use mixin_foundation::{DeclKey, Error};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Severity {
    /// Informational; composition output is unaffected.
    Warning,
    /// The named target produced no output.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message about one target or directive.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// The declaration at fault.
    pub target: Option<DeclKey>,
    /// The directive at fault, as written.
    pub directive: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error diagnostic from an error and its context.
    #[must_use]
    pub fn from_error(target: Option<&DeclKey>, error: &Error) -> Self {
        Self {
            severity: Severity::Error,
            target: target.cloned(),
            directive: error.context.as_ref().and_then(|c| c.directive.clone()),
            message: error.to_string(),
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(target: &DeclKey, directive: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            target: Some(target.clone()),
            directive: directive.map(String::from),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(target) = &self.target {
            write!(f, " in {target}")?;
        }
        if let Some(directive) = &self.directive {
            write!(f, " [{directive}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// All diagnostics in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Returns true if any error was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Diagnostics about `target`. The iterator does not borrow `target`.
    pub fn for_target<'a>(&'a self, target: &DeclKey) -> impl Iterator<Item = &'a Diagnostic> + use<'a> {
        let target = target.clone();
        self.entries.iter().filter(move |d| d.target.as_ref() == Some(&target))
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixin_foundation::ErrorContext;

    #[test]
    fn error_diagnostic_carries_directive() {
        let target = DeclKey::parse_metadata("Demo.Target");
        let err = Error::unresolved_template("Missing")
            .with_context(ErrorContext::new().with_declaration("Demo.Target").with_directive("Missing"));
        let diagnostic = Diagnostic::from_error(Some(&target), &err);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.directive.as_deref(), Some("Missing"));
        assert_eq!(
            diagnostic.to_string(),
            "error in Demo.Target [Missing]: unresolved template: Missing"
        );
    }

    #[test]
    fn filtering() {
        let a = DeclKey::parse_metadata("A");
        let b = DeclKey::parse_metadata("B");
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning(&a, None, "left unresolved: Foo"));
        diagnostics.push(Diagnostic::from_error(Some(&b), &Error::unresolved_template("X")));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.for_target(&a).count(), 1);
        let about_b: Vec<_> = diagnostics.for_target(&DeclKey::parse_metadata("B")).collect();
        assert_eq!(about_b.len(), 1);
        assert_eq!(about_b[0].severity, Severity::Error);
        assert_eq!(diagnostics.len(), 2);
    }
}
