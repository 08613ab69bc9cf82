//! Qualified names and value-equality identity keys.
//!
//! Declarations and type parameters are compared by derived keys rather than
//! by object identity: the same logical declaration can be looked up from
//! several snapshots of a growing symbol universe, and all of them must agree.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Root-anchoring prefix used in emitted references.
pub const GLOBAL_PREFIX: &str = "global::";

// =============================================================================
// NamespaceName
// =============================================================================

/// A qualified namespace name like `Demo.Collections`.
///
/// The global namespace has no segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamespaceName {
    /// Path segments (e.g., `["Demo", "Collections"]`).
    pub segments: Vec<String>,
}

impl NamespaceName {
    /// Creates a namespace name from segments.
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The global namespace.
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// Creates a namespace name from a dotted string. The empty string is the
    /// global namespace.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix(GLOBAL_PREFIX).unwrap_or(s);
        if s.is_empty() {
            return Self::global();
        }
        Self {
            segments: s.split('.').map(String::from).collect(),
        }
    }

    /// Returns the dotted name, empty for the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.segments.join(".")
    }

    /// Returns true for the global namespace.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the namespace nested in this one.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Returns the enclosing namespace, or `None` for the global namespace.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_global() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Iterates this namespace and every enclosing one, innermost first,
    /// ending with the global namespace.
    pub fn ancestors(&self) -> impl Iterator<Item = NamespaceName> + '_ {
        (0..=self.segments.len())
            .rev()
            .map(|len| Self::new(self.segments[..len].to_vec()))
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            write!(f, "<global>")
        } else {
            write!(f, "{}", self.full_name())
        }
    }
}

// =============================================================================
// DeclKey
// =============================================================================

/// One type level of a declaration path: a name and its generic arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeSegment {
    /// Simple name.
    pub name: String,
    /// Number of type parameters declared at this level.
    pub arity: usize,
}

impl TypeSegment {
    /// Creates a type segment.
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Metadata form: `Name` or ``Name`N``.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        if self.arity == 0 {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.arity)
        }
    }
}

/// Identity of a type declaration: namespace plus the chain of containing
/// types ending with the declaration itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeclKey {
    /// The containing namespace.
    pub namespace: NamespaceName,
    /// Containing types, outermost first, followed by this type.
    pub path: Vec<TypeSegment>,
}

impl DeclKey {
    /// Creates a key for a top-level type.
    #[must_use]
    pub fn new(namespace: NamespaceName, name: impl Into<String>, arity: usize) -> Self {
        Self {
            namespace,
            path: vec![TypeSegment::new(name, arity)],
        }
    }

    /// Parses a metadata name like ``Demo.Box`1`` or `Demo.Outer+Inner`.
    ///
    /// The last dotted segment before any `+` is the outermost type; everything
    /// before it is the namespace.
    #[must_use]
    pub fn parse_metadata(s: &str) -> Self {
        let s = s.strip_prefix(GLOBAL_PREFIX).unwrap_or(s);
        let (outer, nested) = match s.split_once('+') {
            Some((outer, nested)) => (outer, Some(nested)),
            None => (s, None),
        };
        let (namespace, first) = match outer.rsplit_once('.') {
            Some((ns, ty)) => (NamespaceName::parse(ns), ty),
            None => (NamespaceName::global(), outer),
        };
        let mut path = vec![parse_segment(first)];
        if let Some(nested) = nested {
            path.extend(nested.split('+').map(parse_segment));
        }
        Self { namespace, path }
    }

    /// Returns the key of a type nested in this one.
    #[must_use]
    pub fn nested(&self, name: impl Into<String>, arity: usize) -> Self {
        let mut path = self.path.clone();
        path.push(TypeSegment::new(name, arity));
        Self {
            namespace: self.namespace.clone(),
            path,
        }
    }

    /// Returns the containing type's key, if this type is nested.
    #[must_use]
    pub fn containing_type(&self) -> Option<Self> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Self {
            namespace: self.namespace.clone(),
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Returns true if `self` is (transitively) nested inside `other`.
    #[must_use]
    pub fn is_nested_in(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.path.len() > other.path.len()
            && self.path[..other.path.len()] == other.path[..]
    }

    /// Simple name of the declared type.
    #[must_use]
    pub fn name(&self) -> &str {
        self.last().name.as_str()
    }

    /// Generic arity of the declared type (not counting containing types).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.last().arity
    }

    fn last(&self) -> &TypeSegment {
        // Keys are always built with at least one segment.
        &self.path[self.path.len() - 1]
    }

    /// Metadata name: ``Demo.Outer`1+Inner``.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        let types = self
            .path
            .iter()
            .map(TypeSegment::metadata_name)
            .collect::<Vec<_>>()
            .join("+");
        if self.namespace.is_global() {
            types
        } else {
            format!("{}.{types}", self.namespace.full_name())
        }
    }

    /// Dotted source path without generic arguments: `Demo.Outer.Inner`.
    #[must_use]
    pub fn source_path(&self) -> Vec<String> {
        self.namespace
            .segments
            .iter()
            .cloned()
            .chain(self.path.iter().map(|s| s.name.clone()))
            .collect()
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.metadata_name())
    }
}

fn parse_segment(s: &str) -> TypeSegment {
    match s.split_once('`') {
        Some((name, arity)) => TypeSegment::new(name, arity.parse().unwrap_or(0)),
        None => TypeSegment::new(s, 0),
    }
}

// =============================================================================
// TypeParamKey
// =============================================================================

/// Identity of a type parameter: the declaring type plus the parameter name.
///
/// Two equally named parameters on unrelated generic declarations never
/// compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeParamKey {
    /// The declaring type.
    pub declaring: DeclKey,
    /// The parameter name.
    pub name: String,
}

impl TypeParamKey {
    /// Creates a type parameter key.
    #[must_use]
    pub fn new(declaring: DeclKey, name: impl Into<String>) -> Self {
        Self {
            declaring,
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring, self.name)
    }
}

// =============================================================================
// Tests
// =============================================================================
