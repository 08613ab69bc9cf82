//! Configuration for a composition pass.

use mixin_syntax::pretty::PrettyConfig;

/// Fully qualified metadata name of the directive annotation.
pub const DEFAULT_DIRECTIVE_ANNOTATION: &str = "Mixin.MixinAttribute";

/// Fully qualified metadata name of the member substitution marker.
pub const DEFAULT_SUBSTITUTE_ANNOTATION: &str = "Mixin.SubstituteAttribute";

/// Module the annotations must be loaded from.
pub const DEFAULT_ANNOTATION_MODULE: &str = "Mixin";

/// Generator name written into provenance tags.
pub const DEFAULT_GENERATOR_NAME: &str = "Mixin Task";

/// What happens to the rest of the pass when one target fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The failing target (and targets depending on it) produce no output;
    /// every other target is still composed.
    #[default]
    Isolate,
    /// The first target failure aborts the whole pass.
    AbortPass,
}

/// What happens when two directives contribute a member with the same signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Report a member conflict for the target.
    #[default]
    Error,
    /// The member from the later directive replaces the earlier one.
    LastWins,
}

/// Configuration for a composition pass.
#[derive(Clone, Debug)]
pub struct ComposeConfig {
    /// Metadata name of the directive annotation.
    pub directive_annotation: String,
    /// Metadata name of the substitution marker.
    pub substitute_annotation: String,
    /// Module both annotations must come from.
    pub annotation_module: String,
    /// Generator name in provenance tags.
    pub generator_name: String,
    /// Generator version in provenance tags.
    pub generator_version: String,
    /// Failure isolation policy.
    pub failure_policy: FailurePolicy,
    /// Member conflict policy.
    pub conflict_policy: ConflictPolicy,
    /// Settings for rendering synthesized declarations.
    pub pretty: PrettyConfig,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            directive_annotation: DEFAULT_DIRECTIVE_ANNOTATION.to_string(),
            substitute_annotation: DEFAULT_SUBSTITUTE_ANNOTATION.to_string(),
            annotation_module: DEFAULT_ANNOTATION_MODULE.to_string(),
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            failure_policy: FailurePolicy::Isolate,
            conflict_policy: ConflictPolicy::Error,
            pretty: PrettyConfig::default(),
        }
    }
}

impl ComposeConfig {
    /// Any failure aborts the pass; conflicts are errors.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            failure_policy: FailurePolicy::AbortPass,
            conflict_policy: ConflictPolicy::Error,
            ..Self::default()
        }
    }

    /// Failures are isolated; conflicting members silently overwrite.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            conflict_policy: ConflictPolicy::LastWins,
            ..Self::default()
        }
    }

    /// Builder method to set the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Builder method to set the conflict policy.
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Builder method to set the module annotations must come from.
    #[must_use]
    pub fn with_annotation_module(mut self, module: impl Into<String>) -> Self {
        self.annotation_module = module.into();
        self
    }

    /// Builder method to set the provenance generator name and version.
    #[must_use]
    pub fn with_generator(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.generator_name = name.into();
        self.generator_version = version.into();
        self
    }

    /// Builder method to set the printer configuration.
    #[must_use]
    pub fn with_pretty(mut self, pretty: PrettyConfig) -> Self {
        self.pretty = pretty;
        self
    }
}
