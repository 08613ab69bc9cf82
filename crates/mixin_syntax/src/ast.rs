//! Syntax tree for declaration sources.
//!
//! The tree covers what composition needs to see: compilation units,
//! namespaces, type declarations, their members, and a statement/expression
//! subset rich enough that every place a type can be named is represented
//! explicitly.

use mixin_foundation::{GLOBAL_PREFIX, NamespaceName};

use crate::span::Span;

// =============================================================================
// Compilation units and namespaces
// =============================================================================

/// A parsed source file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CompilationUnit {
    /// `using` directives at file level.
    pub usings: Vec<UsingDirective>,
    /// Namespaces and types at file level.
    pub members: Vec<NamespaceMember>,
}

/// Something that can appear directly in a namespace body.
#[derive(Clone, Debug, PartialEq)]
pub enum NamespaceMember {
    /// A nested namespace.
    Namespace(NamespaceDecl),
    /// A type declaration.
    Type(TypeDecl),
}

/// `namespace A.B { ... }` or the file-scoped `namespace A.B;`.
#[derive(Clone, Debug, PartialEq)]
pub struct NamespaceDecl {
    /// The name as written (relative to the enclosing namespace).
    pub name: NamespaceName,
    /// `using` directives inside the namespace body.
    pub usings: Vec<UsingDirective>,
    /// Members of the namespace.
    pub members: Vec<NamespaceMember>,
    /// True for `namespace A.B;`.
    pub file_scoped: bool,
    /// Source span.
    pub span: Span,
}

/// `using A.B;`, `using static A.B;`, or `using X = A.B;`.
#[derive(Clone, Debug, PartialEq)]
pub struct UsingDirective {
    /// Alias name for `using X = ...;`.
    pub alias: Option<String>,
    /// True for `using static`.
    pub is_static: bool,
    /// The imported namespace or type.
    pub target: TypeName,
    /// Source span.
    pub span: Span,
}

// =============================================================================
// Type declarations
// =============================================================================

/// Declaration kind. Classes and interfaces have reference semantics,
/// structs have value semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
}

impl TypeKind {
    /// The declaring keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
        }
    }

    /// True for value-semantics declarations.
    #[must_use]
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct)
    }
}

/// A type declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers in source order.
    pub modifiers: Vec<Modifier>,
    /// Declaration kind.
    pub kind: TypeKind,
    /// Simple name.
    pub name: String,
    /// Type parameters.
    pub type_params: Vec<TypeParam>,
    /// Base class and interfaces.
    pub bases: Vec<TypeRef>,
    /// `where` clauses.
    pub constraints: Vec<ConstraintClause>,
    /// Members.
    pub members: Vec<Member>,
    /// Source span.
    pub span: Span,
}

impl TypeDecl {
    /// Creates an empty declaration.
    #[must_use]
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            modifiers: Vec::new(),
            kind,
            name: name.into(),
            type_params: Vec::new(),
            bases: Vec::new(),
            constraints: Vec::new(),
            members: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Returns true if the modifier is present.
    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        Accessibility::from_modifiers(&self.modifiers)
    }

    /// Generic arity.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// Iterates all attributes in all lists.
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|list| list.attributes.iter())
    }
}

/// A type parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeParam {
    /// `in` / `out` variance keyword, if any.
    pub variance: Option<String>,
    /// Parameter name.
    pub name: String,
}

impl TypeParam {
    /// Creates an invariant type parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            variance: None,
            name: name.into(),
        }
    }
}

/// `where T : ...`
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintClause {
    /// The constrained type parameter.
    pub param: String,
    /// The constraints.
    pub constraints: Vec<Constraint>,
}

/// A single generic constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `new()`
    New,
    /// A type bound.
    Type(TypeRef),
}

/// Declaration modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `public`
    Public,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// `internal`
    Internal,
    /// `static`
    Static,
    /// `partial`
    Partial,
    /// `abstract`
    Abstract,
    /// `virtual`
    Virtual,
    /// `override`
    Override,
    /// `sealed`
    Sealed,
    /// `readonly`
    Readonly,
    /// `const`
    Const,
    /// `new`
    New,
    /// `extern`
    Extern,
    /// `unsafe`
    Unsafe,
    /// `volatile`
    Volatile,
    /// `async`
    Async,
}

impl Modifier {
    const ALL: [Self; 17] = [
        Self::Public,
        Self::Private,
        Self::Protected,
        Self::Internal,
        Self::Static,
        Self::Partial,
        Self::Abstract,
        Self::Virtual,
        Self::Override,
        Self::Sealed,
        Self::Readonly,
        Self::Const,
        Self::New,
        Self::Extern,
        Self::Unsafe,
        Self::Volatile,
        Self::Async,
    ];

    /// The modifier keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Static => "static",
            Self::Partial => "partial",
            Self::Abstract => "abstract",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Sealed => "sealed",
            Self::Readonly => "readonly",
            Self::Const => "const",
            Self::New => "new",
            Self::Extern => "extern",
            Self::Unsafe => "unsafe",
            Self::Volatile => "volatile",
            Self::Async => "async",
        }
    }

    /// Parses a modifier keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.keyword() == word)
    }
}

/// Declared accessibility, derived from modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accessibility {
    /// No accessibility modifier.
    NotApplicable,
    /// `private`
    Private,
    /// `private protected`
    ProtectedAndInternal,
    /// `protected`
    Protected,
    /// `internal`
    Internal,
    /// `protected internal`
    ProtectedOrInternal,
    /// `public`
    Public,
}

impl Accessibility {
    /// Derives accessibility from a modifier list.
    #[must_use]
    pub fn from_modifiers(modifiers: &[Modifier]) -> Self {
        let has = |m| modifiers.contains(&m);
        match (
            has(Modifier::Public),
            has(Modifier::Protected),
            has(Modifier::Internal),
            has(Modifier::Private),
        ) {
            (true, ..) => Self::Public,
            (_, true, true, _) => Self::ProtectedOrInternal,
            (_, true, _, true) => Self::ProtectedAndInternal,
            (_, true, ..) => Self::Protected,
            (_, _, true, _) => Self::Internal,
            (.., true) => Self::Private,
            _ => Self::NotApplicable,
        }
    }

    /// Modifiers that express this accessibility.
    #[must_use]
    pub fn modifiers(self) -> &'static [Modifier] {
        match self {
            Self::NotApplicable => &[],
            Self::Private => &[Modifier::Private],
            Self::ProtectedAndInternal => &[Modifier::Private, Modifier::Protected],
            Self::Protected => &[Modifier::Protected],
            Self::Internal => &[Modifier::Internal],
            Self::ProtectedOrInternal => &[Modifier::Protected, Modifier::Internal],
            Self::Public => &[Modifier::Public],
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// `[target: A, B(x)]`
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeList {
    /// Explicit target (`return`, `field`, ...).
    pub target: Option<String>,
    /// The attributes.
    pub attributes: Vec<Attribute>,
    /// Source span.
    pub span: Span,
}

impl AttributeList {
    /// Creates an untargeted list with one attribute.
    #[must_use]
    pub fn single(attribute: Attribute) -> Self {
        Self {
            target: None,
            attributes: vec![attribute],
            span: Span::synthetic(),
        }
    }

    /// True if this list targets the return value.
    #[must_use]
    pub fn targets_return(&self) -> bool {
        self.target.as_deref() == Some("return")
    }
}

/// A single attribute application.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    /// Attribute type name as written.
    pub name: TypeName,
    /// Arguments.
    pub args: Vec<AttributeArg>,
    /// Source span.
    pub span: Span,
}

/// An attribute argument, optionally named (`Name = value`).
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeArg {
    /// Argument name for named arguments.
    pub name: Option<String>,
    /// The argument value.
    pub value: Expr,
}

// =============================================================================
// Members
// =============================================================================

/// A member of a type declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    /// Field declaration.
    Field(FieldDecl),
    /// Property declaration.
    Property(PropertyDecl),
    /// Indexer declaration.
    Indexer(IndexerDecl),
    /// Method declaration.
    Method(MethodDecl),
    /// Constructor declaration.
    Constructor(ConstructorDecl),
    /// Destructor declaration.
    Destructor(DestructorDecl),
    /// Operator declaration.
    Operator(OperatorDecl),
    /// Conversion operator declaration.
    Conversion(ConversionDecl),
    /// Event field declaration.
    Event(EventDecl),
    /// Nested type declaration.
    Type(TypeDecl),
}

impl Member {
    /// Attribute lists of this member.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeList] {
        match self {
            Self::Field(m) => &m.attributes,
            Self::Property(m) => &m.attributes,
            Self::Indexer(m) => &m.attributes,
            Self::Method(m) => &m.attributes,
            Self::Constructor(m) => &m.attributes,
            Self::Destructor(m) => &m.attributes,
            Self::Operator(m) => &m.attributes,
            Self::Conversion(m) => &m.attributes,
            Self::Event(m) => &m.attributes,
            Self::Type(m) => &m.attributes,
        }
    }

    /// Mutable attribute lists of this member.
    pub fn attributes_mut(&mut self) -> &mut Vec<AttributeList> {
        match self {
            Self::Field(m) => &mut m.attributes,
            Self::Property(m) => &mut m.attributes,
            Self::Indexer(m) => &mut m.attributes,
            Self::Method(m) => &mut m.attributes,
            Self::Constructor(m) => &mut m.attributes,
            Self::Destructor(m) => &mut m.attributes,
            Self::Operator(m) => &mut m.attributes,
            Self::Conversion(m) => &mut m.attributes,
            Self::Event(m) => &mut m.attributes,
            Self::Type(m) => &mut m.attributes,
        }
    }

    /// Names this member introduces into the type's scope.
    #[must_use]
    pub fn declared_names(&self) -> Vec<&str> {
        match self {
            Self::Field(m) => m.declarators.iter().map(|d| d.name.as_str()).collect(),
            Self::Event(m) => m.declarators.iter().map(|d| d.name.as_str()).collect(),
            Self::Property(m) => vec![m.name.as_str()],
            Self::Method(m) => vec![m.name.as_str()],
            Self::Indexer(_)
            | Self::Constructor(_)
            | Self::Destructor(_)
            | Self::Operator(_)
            | Self::Conversion(_)
            | Self::Type(_) => Vec::new(),
        }
    }

    /// Source span.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Field(m) => m.span,
            Self::Property(m) => m.span,
            Self::Indexer(m) => m.span,
            Self::Method(m) => m.span,
            Self::Constructor(m) => m.span,
            Self::Destructor(m) => m.span,
            Self::Operator(m) => m.span,
            Self::Conversion(m) => m.span,
            Self::Event(m) => m.span,
            Self::Type(m) => m.span,
        }
    }
}

/// `int x = 1, y;`
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Declared type.
    pub ty: TypeRef,
    /// Declared variables.
    pub declarators: Vec<VariableDeclarator>,
    /// Source span.
    pub span: Span,
}

/// `name = init`
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclarator {
    /// Variable name.
    pub name: String,
    /// Initializer.
    pub init: Option<Expr>,
}

/// Property declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Declared type.
    pub ty: TypeRef,
    /// Property name.
    pub name: String,
    /// Accessors or expression body.
    pub body: PropertyBody,
    /// `= value;` initializer.
    pub init: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// Body of a property, indexer, or event.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyBody {
    /// `{ get; set; }`
    Accessors(Vec<Accessor>),
    /// `=> expr;`
    Expr(Expr),
}

/// `get { ... }`, `set;`, `init => ...;`
#[derive(Clone, Debug, PartialEq)]
pub struct Accessor {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// `get`, `set`, `init`, `add`, or `remove`.
    pub kind: String,
    /// Body, absent for auto-accessors.
    pub body: Option<Body>,
}

/// `T this[int i] { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct IndexerDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Declared type.
    pub ty: TypeRef,
    /// Index parameters.
    pub params: Vec<Parameter>,
    /// Accessors or expression body.
    pub body: PropertyBody,
    /// Source span.
    pub span: Span,
}

/// Method declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Return type.
    pub return_type: TypeRef,
    /// Method name.
    pub name: String,
    /// Method type parameters.
    pub type_params: Vec<TypeParam>,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// `where` clauses.
    pub constraints: Vec<ConstraintClause>,
    /// Body; `None` for `;`.
    pub body: Option<Body>,
    /// Source span.
    pub span: Span,
}

/// Constructor declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Constructor name (always the declaring type's name).
    pub name: String,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// `: base(...)` or `: this(...)`.
    pub initializer: Option<ConstructorInitializer>,
    /// Body; `None` for `;`.
    pub body: Option<Body>,
    /// Source span.
    pub span: Span,
}

/// `: base(args)` / `: this(args)`
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorInitializer {
    /// `base` or `this`.
    pub keyword: String,
    /// Arguments.
    pub args: Vec<Argument>,
}

/// `~Name() { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct DestructorDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Destructor name (always the declaring type's name).
    pub name: String,
    /// Body.
    pub body: Option<Body>,
    /// Source span.
    pub span: Span,
}

/// `public static T operator +(T a, T b) { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Return type.
    pub return_type: TypeRef,
    /// Operator token (`+`, `==`, `true`, ...).
    pub operator: String,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// Body.
    pub body: Option<Body>,
    /// Source span.
    pub span: Span,
}

/// `public static implicit operator T(U value) { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// True for `implicit`, false for `explicit`.
    pub implicit: bool,
    /// Conversion target type.
    pub ty: TypeRef,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// Body.
    pub body: Option<Body>,
    /// Source span.
    pub span: Span,
}

/// `event Handler Changed;`
#[derive(Clone, Debug, PartialEq)]
pub struct EventDecl {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// Modifiers.
    pub modifiers: Vec<Modifier>,
    /// Delegate type.
    pub ty: TypeRef,
    /// Declared events.
    pub declarators: Vec<VariableDeclarator>,
    /// Source span.
    pub span: Span,
}

/// A formal parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Attribute lists.
    pub attributes: Vec<AttributeList>,
    /// `ref`, `out`, `in`, `params`, or `this`.
    pub modifier: Option<String>,
    /// Parameter type.
    pub ty: TypeRef,
    /// Parameter name.
    pub name: String,
    /// Default value.
    pub default: Option<Expr>,
}

/// A member body.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// `{ ... }`
    Block(Block),
    /// `=> expr;`
    Expr(Expr),
}

/// `{ statements }`
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    /// Statements.
    pub stmts: Vec<Stmt>,
    /// Source span.
    pub span: Span,
}

// =============================================================================
// Types
// =============================================================================

/// A reference to a type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    /// Keyword type like `int` or `string`.
    Predefined(PredefinedType, Span),
    /// Named type, possibly qualified and generic.
    Named(TypeName),
    /// `T[]`, `T[,]` (rank is the number of dimensions).
    Array(Box<TypeRef>, usize),
    /// `T?`
    Nullable(Box<TypeRef>),
    /// `var`
    Var(Span),
}

impl TypeRef {
    /// A simple, unqualified, non-generic name.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Named(TypeName::simple(name))
    }

    /// Returns the named type, if this is one.
    #[must_use]
    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// Keyword types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredefinedType {
    /// `bool`
    Bool,
    /// `byte`
    Byte,
    /// `sbyte`
    SByte,
    /// `char`
    Char,
    /// `decimal`
    Decimal,
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int`
    Int,
    /// `uint`
    UInt,
    /// `long`
    Long,
    /// `ulong`
    ULong,
    /// `short`
    Short,
    /// `ushort`
    UShort,
    /// `object`
    Object,
    /// `string`
    String,
    /// `void`
    Void,
}

impl PredefinedType {
    const ALL: [Self; 16] = [
        Self::Bool,
        Self::Byte,
        Self::SByte,
        Self::Char,
        Self::Decimal,
        Self::Double,
        Self::Float,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Short,
        Self::UShort,
        Self::Object,
        Self::String,
        Self::Void,
    ];

    /// The keyword spelling.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Char => "char",
            Self::Decimal => "decimal",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Object => "object",
            Self::String => "string",
            Self::Void => "void",
        }
    }

    /// The metadata name of the underlying system type.
    #[must_use]
    pub const fn metadata_name(self) -> &'static str {
        match self {
            Self::Bool => "System.Boolean",
            Self::Byte => "System.Byte",
            Self::SByte => "System.SByte",
            Self::Char => "System.Char",
            Self::Decimal => "System.Decimal",
            Self::Double => "System.Double",
            Self::Float => "System.Single",
            Self::Int => "System.Int32",
            Self::UInt => "System.UInt32",
            Self::Long => "System.Int64",
            Self::ULong => "System.UInt64",
            Self::Short => "System.Int16",
            Self::UShort => "System.UInt16",
            Self::Object => "System.Object",
            Self::String => "System.String",
            Self::Void => "System.Void",
        }
    }

    /// Parses a keyword type.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == word)
    }
}

/// A possibly qualified, possibly generic name: `global::A.B<C>.D`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeName {
    /// True when anchored with `global::`.
    pub global: bool,
    /// Name segments.
    pub segments: Vec<NameSegment>,
    /// Source span.
    pub span: Span,
}

impl TypeName {
    /// A single-segment name.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            global: false,
            segments: vec![NameSegment::new(name)],
            span: Span::synthetic(),
        }
    }

    /// A root-qualified name built from plain segments.
    #[must_use]
    pub fn global(segments: Vec<NameSegment>) -> Self {
        Self {
            global: true,
            segments,
            span: Span::synthetic(),
        }
    }

    /// The last segment.
    #[must_use]
    pub fn last(&self) -> Option<&NameSegment> {
        self.segments.last()
    }

    /// Returns true if this is a single identifier without type arguments.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        !self.global && self.segments.len() == 1 && self.segments[0].args == TypeArgs::None
    }

    /// Dotted text without type arguments (`global::` included when present).
    #[must_use]
    pub fn dotted(&self) -> String {
        let path = self
            .segments
            .iter()
            .map(|s| s.ident.as_str())
            .collect::<Vec<_>>()
            .join(".");
        if self.global {
            format!("{GLOBAL_PREFIX}{path}")
        } else {
            path
        }
    }
}

/// One identifier of a name with its type arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct NameSegment {
    /// The identifier.
    pub ident: String,
    /// Type arguments.
    pub args: TypeArgs,
}

impl NameSegment {
    /// A segment without type arguments.
    #[must_use]
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            args: TypeArgs::None,
        }
    }

    /// A segment with type arguments.
    #[must_use]
    pub fn generic(ident: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            ident: ident.into(),
            args: if args.is_empty() {
                TypeArgs::None
            } else {
                TypeArgs::Bound(args)
            },
        }
    }

    /// Number of type arguments (bound or open).
    #[must_use]
    pub fn arity(&self) -> usize {
        match &self.args {
            TypeArgs::None => 0,
            TypeArgs::Bound(args) => args.len(),
            TypeArgs::Open(n) => *n,
        }
    }
}

/// Type arguments of a name segment.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeArgs {
    /// No argument list.
    None,
    /// `<A, B>`
    Bound(Vec<TypeRef>),
    /// `<>` or `<,>`: an open generic with this many parameters.
    Open(usize),
}

// =============================================================================
// Statements
// =============================================================================

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// `T x = e, y;`
    Local {
        /// True for `const`.
        is_const: bool,
        /// Declared type (possibly `var`).
        ty: TypeRef,
        /// Declared variables.
        declarators: Vec<VariableDeclarator>,
        /// Source span.
        span: Span,
    },
    /// `expr;`
    Expr(Expr, Span),
    /// `return expr;`
    Return(Option<Expr>, Span),
    /// `throw expr;`
    Throw(Option<Expr>, Span),
    /// `if (c) s else s`
    If {
        /// Condition.
        cond: Expr,
        /// Then branch.
        then: Box<Stmt>,
        /// Else branch.
        otherwise: Option<Box<Stmt>>,
        /// Source span.
        span: Span,
    },
    /// `while (c) s`
    While(Expr, Box<Stmt>, Span),
    /// `for (init; cond; step) s`
    For {
        /// Initializer statement.
        init: Option<Box<Stmt>>,
        /// Condition.
        cond: Option<Expr>,
        /// Step expressions.
        step: Vec<Expr>,
        /// Loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// `foreach (T x in e) s`
    Foreach {
        /// Element type (possibly `var`).
        ty: TypeRef,
        /// Loop variable.
        name: String,
        /// Iterated expression.
        iter: Expr,
        /// Loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// `try { } catch (T e) { } finally { }`
    Try {
        /// Protected block.
        body: Block,
        /// Catch clauses.
        catches: Vec<CatchClause>,
        /// Finally block.
        finally: Option<Block>,
        /// Source span.
        span: Span,
    },
    /// `{ ... }`
    Block(Block),
    /// `break;`
    Break(Span),
    /// `continue;`
    Continue(Span),
    /// `;`
    Empty(Span),
}

/// `catch (T name) { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    /// Caught exception type.
    pub ty: Option<TypeRef>,
    /// Exception variable.
    pub name: Option<String>,
    /// Handler block.
    pub body: Block,
}

// =============================================================================
// Expressions
// =============================================================================

/// Literal kinds; the text is kept as written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// Numeric literal.
    Number,
    /// String literal.
    String,
    /// Character literal.
    Char,
    /// `true` / `false`
    Bool,
    /// `null`
    Null,
}

/// A call or constructor argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    /// `ref`, `out`, or `in`.
    pub modifier: Option<String>,
    /// The argument value.
    pub value: Expr,
}

impl Argument {
    /// A plain positional argument.
    #[must_use]
    pub fn new(value: Expr) -> Self {
        Self {
            modifier: None,
            value,
        }
    }
}

/// A lambda parameter, optionally typed.
#[derive(Clone, Debug, PartialEq)]
pub struct LambdaParam {
    /// Explicit type.
    pub ty: Option<TypeRef>,
    /// Parameter name.
    pub name: String,
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Literal kept as written.
    Literal(LiteralKind, String, Span),
    /// A name: simple (`x`, `List<T>`) or `global::`-anchored.
    Name(TypeName),
    /// `expr.Name<T>`
    Member(Box<Expr>, NameSegment, Span),
    /// `expr(args)`
    Call(Box<Expr>, Vec<Argument>, Span),
    /// `expr[args]`
    Index(Box<Expr>, Vec<Argument>, Span),
    /// `new T(args) { init }`
    New {
        /// Constructed type.
        ty: TypeRef,
        /// Constructor arguments; `None` when only an initializer is given.
        args: Option<Vec<Argument>>,
        /// Object or collection initializer entries.
        init: Option<Vec<Expr>>,
        /// Source span.
        span: Span,
    },
    /// `new T[n] { ... }`
    NewArray {
        /// Element type.
        elem: TypeRef,
        /// Dimension sizes (empty for `new T[] { ... }`).
        sizes: Vec<Expr>,
        /// Rank when no sizes are given.
        rank: usize,
        /// Initializer entries.
        init: Option<Vec<Expr>>,
        /// Source span.
        span: Span,
    },
    /// `typeof(T)`
    Typeof(TypeRef, Span),
    /// `default(T)` or `default`
    Default(Option<TypeRef>, Span),
    /// `(T)expr`
    Cast(TypeRef, Box<Expr>, Span),
    /// `expr is T`
    Is(Box<Expr>, TypeRef, Span),
    /// `expr as T`
    As(Box<Expr>, TypeRef, Span),
    /// Prefix operator.
    Unary(String, Box<Expr>, Span),
    /// Postfix `++` / `--`.
    Postfix(String, Box<Expr>, Span),
    /// Binary operator.
    Binary(String, Box<Expr>, Box<Expr>, Span),
    /// Assignment (`=`, `+=`, ...).
    Assign(String, Box<Expr>, Box<Expr>, Span),
    /// `c ? a : b`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>, Span),
    /// `x => body` or `(T x, U y) => body`
    Lambda(Vec<LambdaParam>, Box<Body>, Span),
    /// `this`
    This(Span),
    /// `base`
    Base(Span),
    /// `(expr)`
    Paren(Box<Expr>, Span),
}

impl Expr {
    /// A simple identifier expression.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Name(TypeName::simple(name))
    }

    /// Source span of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Name(name) => name.span,
            Self::Literal(_, _, s)
            | Self::Member(_, _, s)
            | Self::Call(_, _, s)
            | Self::Index(_, _, s)
            | Self::New { span: s, .. }
            | Self::NewArray { span: s, .. }
            | Self::Typeof(_, s)
            | Self::Default(_, s)
            | Self::Cast(_, _, s)
            | Self::Is(_, _, s)
            | Self::As(_, _, s)
            | Self::Unary(_, _, s)
            | Self::Postfix(_, _, s)
            | Self::Binary(_, _, _, s)
            | Self::Assign(_, _, _, s)
            | Self::Conditional(_, _, _, s)
            | Self::Lambda(_, _, s)
            | Self::This(s)
            | Self::Base(s)
            | Self::Paren(_, s) => *s,
        }
    }
}
