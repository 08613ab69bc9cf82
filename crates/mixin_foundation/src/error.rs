//! Error types for the mixin composition engine.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::name::DeclKey;

/// The main error type for composition operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a circular dependency error for the declaration at which the
    /// cycle was detected. `cycle` lists the declarations on the cycle.
    #[must_use]
    pub fn circular_dependency(declaration: &DeclKey, cycle: Vec<DeclKey>) -> Self {
        Self::new(ErrorKind::CircularDependency {
            declaration: declaration.clone(),
            cycle,
        })
    }

    /// Creates a binding arity error.
    #[must_use]
    pub fn binding_arity(template: &DeclKey, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::BindingArity {
            template: template.clone(),
            expected,
            actual,
        })
    }

    /// Creates an unresolved template error.
    #[must_use]
    pub fn unresolved_template(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvedTemplate(name.into()))
    }

    /// Creates a foreign annotation error.
    #[must_use]
    pub fn foreign_annotation(
        annotation: &DeclKey,
        expected_module: impl Into<String>,
        actual_module: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::ForeignAnnotation {
            annotation: annotation.clone(),
            expected_module: expected_module.into(),
            actual_module: actual_module.into(),
        })
    }

    /// Creates a missing annotation error.
    #[must_use]
    pub fn missing_annotation(annotation: &DeclKey, expected_module: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingAnnotation {
            annotation: annotation.clone(),
            expected_module: expected_module.into(),
        })
    }

    /// Creates a member conflict error.
    #[must_use]
    pub fn member_conflict(target: &DeclKey, member: impl Into<String>) -> Self {
        Self::new(ErrorKind::MemberConflict {
            target: target.clone(),
            member: member.into(),
        })
    }

    /// Creates a dependency failed error.
    #[must_use]
    pub fn dependency_failed(target: &DeclKey, dependency: &DeclKey) -> Self {
        Self::new(ErrorKind::DependencyFailed {
            target: target.clone(),
            dependency: dependency.clone(),
        })
    }

    /// Returns true if this error invalidates the whole composition pass
    /// rather than a single target.
    #[must_use]
    pub fn is_pass_fatal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::CircularDependency { .. }
                | ErrorKind::ForeignAnnotation { .. }
                | ErrorKind::MissingAnnotation { .. }
                | ErrorKind::ParseError { .. }
                | ErrorKind::Internal(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The composition graph contains a cycle.
    #[error("circular dependency at {declaration}: {}", format_cycle(.cycle))]
    CircularDependency {
        /// The declaration at which the cycle was detected.
        declaration: DeclKey,
        /// Declarations on the cycle, in dependency order.
        cycle: Vec<DeclKey>,
    },

    /// A directive supplies the wrong number of type arguments.
    #[error("binding arity mismatch for {template}: expected {expected} type argument(s), got {actual}")]
    BindingArity {
        /// The template being bound.
        template: DeclKey,
        /// Number of type parameters the template declares.
        expected: usize,
        /// Number of type arguments supplied.
        actual: usize,
    },

    /// A directive names a template that cannot be found.
    #[error("unresolved template: {0}")]
    UnresolvedTemplate(String),

    /// The directive annotation resolved to a type from an unexpected module.
    #[error("annotation {annotation} loaded from module '{actual_module}', expected '{expected_module}'")]
    ForeignAnnotation {
        /// The annotation type.
        annotation: DeclKey,
        /// The module the annotation must come from.
        expected_module: String,
        /// The module it actually came from.
        actual_module: String,
    },

    /// The directive annotation is not declared anywhere in the universe.
    #[error("annotation {annotation} is not declared; expected it from module '{expected_module}'")]
    MissingAnnotation {
        /// The annotation type.
        annotation: DeclKey,
        /// The module the annotation must come from.
        expected_module: String,
    },

    /// Two directives contribute the same member to one target.
    #[error("member {member} contributed more than once to {target}")]
    MemberConflict {
        /// The target declaration.
        target: DeclKey,
        /// Signature of the conflicting member.
        member: String,
    },

    /// A target could not be composed because a template it depends on failed.
    #[error("{target} skipped: dependency {dependency} failed")]
    DependencyFailed {
        /// The skipped target.
        target: DeclKey,
        /// The failed dependency.
        dependency: DeclKey,
    },

    /// Syntax error in declaration source.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_cycle(cycle: &[DeclKey]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The declaration being composed.
    pub declaration: Option<String>,
    /// The directive at fault, as written.
    pub directive: Option<String>,
    /// Source file or unit name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<u32>,
    /// Column number in source.
    pub column: Option<u32>,
    /// Composition steps leading to the error, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declaration being composed.
    #[must_use]
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// Sets the directive at fault.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(declaration) = &self.declaration {
            write!(f, "in {declaration}")?;
            if let Some(directive) = &self.directive {
                write!(f, " [{directive}]")?;
            }
        }
        if let Some(source) = &self.source {
            write!(f, " at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        for frame in &self.stack {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, Error>;
