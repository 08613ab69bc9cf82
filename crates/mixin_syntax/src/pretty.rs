//! Pretty-printer for syntax trees.
//!
//! Converts compilation units, declarations, members, types, and expressions
//! back into source text. Output is deterministic: the same tree always
//! prints the same way.
//!
//! # Example
//!
//! ```
//! use mixin_syntax::parse_expr;
//! use mixin_syntax::pretty::pretty_print_expr;
//!
//! let expr = parse_expr("new List<int>(capacity)").unwrap();
//! assert_eq!(pretty_print_expr(&expr), "new List<int>(capacity)");
//! ```

use crate::ast::{
    Argument, Attribute, AttributeList, Block, Body, CompilationUnit, Constraint,
    ConstraintClause, Expr, Member, Modifier, NameSegment, NamespaceDecl, NamespaceMember,
    Parameter, PropertyBody, Stmt, TypeArgs, TypeDecl, TypeName, TypeParam, TypeRef,
    UsingDirective, VariableDeclarator,
};

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
    /// Whether to separate members with a blank line.
    pub blank_line_between_members: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            blank_line_between_members: true,
        }
    }
}

/// Pretty-print a compilation unit.
#[must_use]
pub fn pretty_print_unit(unit: &CompilationUnit) -> String {
    pretty_print_unit_with_config(unit, PrettyConfig::default())
}

/// Pretty-print a compilation unit with custom configuration.
#[must_use]
pub fn pretty_print_unit_with_config(unit: &CompilationUnit, config: PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config);
    printer.print_namespace_body(&unit.usings, &unit.members);
    printer.output
}

/// Pretty-print a type declaration.
#[must_use]
pub fn pretty_print_type_decl(decl: &TypeDecl) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.print_type_decl(decl);
    printer.output
}

/// Pretty-print a single member.
#[must_use]
pub fn pretty_print_member(member: &Member) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.print_member(member);
    printer.output
}

/// Pretty-print a type reference.
#[must_use]
pub fn pretty_print_type_ref(ty: &TypeRef) -> String {
    type_ref(ty)
}

/// Pretty-print an expression on one line (block lambdas span lines).
#[must_use]
pub fn pretty_print_expr(expr: &Expr) -> String {
    PrettyPrinter::new(PrettyConfig::default()).expr(expr)
}

/// Pretty-printer state.
struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    indent_level: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&self) -> String {
        " ".repeat(self.indent_level * self.config.indent_width)
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.output.push('\n');
            return;
        }
        let indent = self.indent();
        self.output.push_str(&indent);
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent_level += 1;
        f(self);
        self.indent_level -= 1;
    }

    // =========================================================================
    // Namespaces and declarations
    // =========================================================================

    fn print_namespace_body(&mut self, usings: &[UsingDirective], members: &[NamespaceMember]) {
        for using in usings {
            self.line(&using_directive(using));
        }
        if !usings.is_empty() && !members.is_empty() {
            self.line("");
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.line("");
            }
            match member {
                NamespaceMember::Namespace(ns) => self.print_namespace(ns),
                NamespaceMember::Type(decl) => self.print_type_decl(decl),
            }
        }
    }

    fn print_namespace(&mut self, ns: &NamespaceDecl) {
        let name = ns.name.full_name();
        if ns.file_scoped {
            self.line(&format!("namespace {name};"));
            self.line("");
            self.print_namespace_body(&ns.usings, &ns.members);
            return;
        }
        self.line(&format!("namespace {name}"));
        self.line("{");
        self.indented(|p| p.print_namespace_body(&ns.usings, &ns.members));
        self.line("}");
    }

    fn print_type_decl(&mut self, decl: &TypeDecl) {
        self.print_attribute_lists(&decl.attributes);
        let mut header = format!(
            "{}{} {}{}",
            modifiers(&decl.modifiers),
            decl.kind.keyword(),
            decl.name,
            type_params(&decl.type_params)
        );
        if !decl.bases.is_empty() {
            header.push_str(" : ");
            header.push_str(&join(decl.bases.iter().map(type_ref)));
        }
        self.line(&header);
        self.indented(|p| {
            for clause in &decl.constraints {
                p.line(&constraint_clause(clause));
            }
        });
        self.line("{");
        self.indented(|p| {
            for (i, member) in decl.members.iter().enumerate() {
                if i > 0 && p.config.blank_line_between_members {
                    p.line("");
                }
                p.print_member(member);
            }
        });
        self.line("}");
    }

    fn print_attribute_lists(&mut self, lists: &[AttributeList]) {
        for list in lists {
            self.line(&attribute_list(list));
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn print_member(&mut self, member: &Member) {
        if let Member::Type(decl) = member {
            self.print_type_decl(decl);
            return;
        }
        self.print_attribute_lists(member.attributes());
        match member {
            Member::Field(field) => {
                let text = format!(
                    "{}{} {};",
                    modifiers(&field.modifiers),
                    type_ref(&field.ty),
                    self.declarators(&field.declarators)
                );
                self.line(&text);
            }
            Member::Event(event) => {
                let text = format!(
                    "{}event {} {};",
                    modifiers(&event.modifiers),
                    type_ref(&event.ty),
                    self.declarators(&event.declarators)
                );
                self.line(&text);
            }
            Member::Property(prop) => {
                let header = format!(
                    "{}{} {}",
                    modifiers(&prop.modifiers),
                    type_ref(&prop.ty),
                    prop.name
                );
                let init = prop
                    .init
                    .as_ref()
                    .map(|e| format!(" = {};", self.expr(e)))
                    .unwrap_or_default();
                self.print_property_body(&header, &prop.body, &init);
            }
            Member::Indexer(indexer) => {
                let header = format!(
                    "{}{} this[{}]",
                    modifiers(&indexer.modifiers),
                    type_ref(&indexer.ty),
                    self.params(&indexer.params)
                );
                self.print_property_body(&header, &indexer.body, "");
            }
            Member::Method(method) => {
                let mut header = format!(
                    "{}{} {}{}({})",
                    modifiers(&method.modifiers),
                    type_ref(&method.return_type),
                    method.name,
                    type_params(&method.type_params),
                    self.params(&method.params)
                );
                for clause in &method.constraints {
                    header.push(' ');
                    header.push_str(&constraint_clause(clause));
                }
                self.print_body(&header, method.body.as_ref());
            }
            Member::Constructor(ctor) => {
                let mut header = format!(
                    "{}{}({})",
                    modifiers(&ctor.modifiers),
                    ctor.name,
                    self.params(&ctor.params)
                );
                if let Some(init) = &ctor.initializer {
                    header.push_str(&format!(" : {}({})", init.keyword, self.args(&init.args)));
                }
                self.print_body(&header, ctor.body.as_ref());
            }
            Member::Destructor(dtor) => {
                self.print_body(&format!("~{}()", dtor.name), dtor.body.as_ref());
            }
            Member::Operator(op) => {
                let header = format!(
                    "{}{} operator {}({})",
                    modifiers(&op.modifiers),
                    type_ref(&op.return_type),
                    op.operator,
                    self.params(&op.params)
                );
                self.print_body(&header, op.body.as_ref());
            }
            Member::Conversion(conv) => {
                let header = format!(
                    "{}{} operator {}({})",
                    modifiers(&conv.modifiers),
                    if conv.implicit { "implicit" } else { "explicit" },
                    type_ref(&conv.ty),
                    self.params(&conv.params)
                );
                self.print_body(&header, conv.body.as_ref());
            }
            Member::Type(_) => {}
        }
    }

    fn print_property_body(&mut self, header: &str, body: &PropertyBody, init: &str) {
        let accessors = match body {
            PropertyBody::Expr(expr) => {
                let text = format!("{header} => {};", self.expr(expr));
                self.line(&text);
                return;
            }
            PropertyBody::Accessors(accessors) => accessors,
        };

        let compact = accessors
            .iter()
            .all(|a| a.body.is_none() && a.attributes.is_empty());
        if compact {
            let list = accessors
                .iter()
                .map(|a| format!("{}{};", modifiers(&a.modifiers), a.kind))
                .collect::<Vec<_>>()
                .join(" ");
            self.line(&format!("{header} {{ {list} }}{init}"));
            return;
        }

        self.line(header);
        self.line("{");
        self.indented(|p| {
            for accessor in accessors {
                p.print_attribute_lists(&accessor.attributes);
                let head = format!("{}{}", modifiers(&accessor.modifiers), accessor.kind);
                p.print_body(&head, accessor.body.as_ref());
            }
        });
        self.line(&format!("}}{init}"));
    }

    fn print_body(&mut self, header: &str, body: Option<&Body>) {
        match body {
            None => self.line(&format!("{header};")),
            Some(Body::Expr(expr)) => {
                let text = format!("{header} => {};", self.expr(expr));
                self.line(&text);
            }
            Some(Body::Block(block)) => {
                self.line(header);
                self.print_block(block);
            }
        }
    }

    fn declarators(&self, declarators: &[VariableDeclarator]) -> String {
        join(declarators.iter().map(|d| match &d.init {
            Some(init) => format!("{} = {}", d.name, self.expr(init)),
            None => d.name.clone(),
        }))
    }

    fn params(&self, params: &[Parameter]) -> String {
        join(params.iter().map(|p| {
            let mut text = String::new();
            for list in &p.attributes {
                text.push_str(&attribute_list(list));
                text.push(' ');
            }
            if let Some(modifier) = &p.modifier {
                text.push_str(modifier);
                text.push(' ');
            }
            text.push_str(&type_ref(&p.ty));
            text.push(' ');
            text.push_str(&p.name);
            if let Some(default) = &p.default {
                text.push_str(" = ");
                text.push_str(&self.expr(default));
            }
            text
        }))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn print_block(&mut self, block: &Block) {
        self.line("{");
        self.indented(|p| {
            for stmt in &block.stmts {
                p.print_stmt(stmt);
            }
        });
        self.line("}");
    }

    /// Prints the body of `if`/`while`/`for`/`foreach`.
    fn print_embedded(&mut self, stmt: &Stmt) {
        if let Stmt::Block(block) = stmt {
            self.print_block(block);
        } else {
            self.indented(|p| p.print_stmt(stmt));
        }
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local { .. } | Stmt::Expr(..) => {
                let text = format!("{};", self.inline_stmt(stmt));
                self.line(&text);
            }
            Stmt::Return(expr, _) => {
                let text = match expr {
                    Some(e) => format!("return {};", self.expr(e)),
                    None => "return;".to_string(),
                };
                self.line(&text);
            }
            Stmt::Throw(expr, _) => {
                let text = match expr {
                    Some(e) => format!("throw {};", self.expr(e)),
                    None => "throw;".to_string(),
                };
                self.line(&text);
            }
            Stmt::If { .. } => self.print_if(stmt, "if"),
            Stmt::While(cond, body, _) => {
                let text = format!("while ({})", self.expr(cond));
                self.line(&text);
                self.print_embedded(body);
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                let init = init
                    .as_deref()
                    .map(|s| self.inline_stmt(s))
                    .unwrap_or_default();
                let cond = cond.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                let step = join(step.iter().map(|e| self.expr(e)));
                self.line(&format!("for ({init}; {cond}; {step})"));
                self.print_embedded(body);
            }
            Stmt::Foreach {
                ty,
                name,
                iter,
                body,
                ..
            } => {
                let text = format!("foreach ({} {name} in {})", type_ref(ty), self.expr(iter));
                self.line(&text);
                self.print_embedded(body);
            }
            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                self.line("try");
                self.print_block(body);
                for catch in catches {
                    let head = match (&catch.ty, &catch.name) {
                        (Some(ty), Some(name)) => format!("catch ({} {name})", type_ref(ty)),
                        (Some(ty), None) => format!("catch ({})", type_ref(ty)),
                        _ => "catch".to_string(),
                    };
                    self.line(&head);
                    self.print_block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.line("finally");
                    self.print_block(finally);
                }
            }
            Stmt::Block(block) => self.print_block(block),
            Stmt::Break(_) => self.line("break;"),
            Stmt::Continue(_) => self.line("continue;"),
            Stmt::Empty(_) => self.line(";"),
        }
    }

    fn print_if(&mut self, stmt: &Stmt, keyword: &str) {
        let Stmt::If {
            cond,
            then,
            otherwise,
            ..
        } = stmt
        else {
            return;
        };
        let text = format!("{keyword} ({})", self.expr(cond));
        self.line(&text);
        self.print_embedded(then);
        match otherwise.as_deref() {
            Some(nested @ Stmt::If { .. }) => self.print_if(nested, "else if"),
            Some(other) => {
                self.line("else");
                self.print_embedded(other);
            }
            None => {}
        }
    }

    /// A local declaration or expression statement without the trailing `;`.
    fn inline_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Local {
                is_const,
                ty,
                declarators,
                ..
            } => format!(
                "{}{} {}",
                if *is_const { "const " } else { "" },
                type_ref(ty),
                self.declarators(declarators)
            ),
            Stmt::Expr(expr, _) => self.expr(expr),
            other => {
                let mut nested = PrettyPrinter::new(self.config.clone());
                nested.print_stmt(other);
                nested.output.trim_end().to_string()
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(_, text, _) => text.clone(),
            Expr::Name(name) => type_name(name),
            Expr::Member(inner, segment, _) => {
                format!("{}.{}", self.expr(inner), name_segment(segment))
            }
            Expr::Call(callee, args, _) => format!("{}({})", self.expr(callee), self.args(args)),
            Expr::Index(target, args, _) => format!("{}[{}]", self.expr(target), self.args(args)),
            Expr::New { ty, args, init, .. } => {
                let mut text = format!("new {}", type_ref(ty));
                if let Some(args) = args {
                    text.push_str(&format!("({})", self.args(args)));
                }
                if let Some(items) = init {
                    text.push_str(&self.initializer(items));
                }
                text
            }
            Expr::NewArray {
                elem,
                sizes,
                rank,
                init,
                ..
            } => {
                let dims = if sizes.is_empty() {
                    ",".repeat(rank.saturating_sub(1))
                } else {
                    join(sizes.iter().map(|e| self.expr(e)))
                };
                let mut text = format!("new {}[{dims}]", type_ref(elem));
                if let Some(items) = init {
                    text.push_str(&self.initializer(items));
                }
                text
            }
            Expr::Typeof(ty, _) => format!("typeof({})", type_ref(ty)),
            Expr::Default(Some(ty), _) => format!("default({})", type_ref(ty)),
            Expr::Default(None, _) => "default".to_string(),
            Expr::Cast(ty, inner, _) => format!("({}){}", type_ref(ty), self.expr(inner)),
            Expr::Is(inner, ty, _) => format!("{} is {}", self.expr(inner), type_ref(ty)),
            Expr::As(inner, ty, _) => format!("{} as {}", self.expr(inner), type_ref(ty)),
            Expr::Unary(op, inner, _) => format!("{op}{}", self.expr(inner)),
            Expr::Postfix(op, inner, _) => format!("{}{op}", self.expr(inner)),
            Expr::Binary(op, left, right, _) | Expr::Assign(op, left, right, _) => {
                format!("{} {op} {}", self.expr(left), self.expr(right))
            }
            Expr::Conditional(cond, then, otherwise, _) => format!(
                "{} ? {} : {}",
                self.expr(cond),
                self.expr(then),
                self.expr(otherwise)
            ),
            Expr::Lambda(params, body, _) => {
                let params = match params.as_slice() {
                    [single] if single.ty.is_none() => single.name.clone(),
                    _ => format!(
                        "({})",
                        join(params.iter().map(|p| match &p.ty {
                            Some(ty) => format!("{} {}", type_ref(ty), p.name),
                            None => p.name.clone(),
                        }))
                    ),
                };
                let body = match body.as_ref() {
                    Body::Expr(expr) => self.expr(expr),
                    Body::Block(block) => self.inline_block(block),
                };
                format!("{params} => {body}")
            }
            Expr::This(_) => "this".to_string(),
            Expr::Base(_) => "base".to_string(),
            Expr::Paren(inner, _) => format!("({})", self.expr(inner)),
        }
    }

    fn args(&self, args: &[Argument]) -> String {
        join(args.iter().map(|a| match &a.modifier {
            Some(modifier) => format!("{modifier} {}", self.expr(&a.value)),
            None => self.expr(&a.value),
        }))
    }

    fn initializer(&self, items: &[Expr]) -> String {
        if items.is_empty() {
            " { }".to_string()
        } else {
            format!(" {{ {} }}", join(items.iter().map(|e| self.expr(e))))
        }
    }

    /// A block inside an expression, indented one level past the current line.
    fn inline_block(&self, block: &Block) -> String {
        let mut nested = PrettyPrinter::new(self.config.clone());
        nested.indent_level = self.indent_level + 1;
        for stmt in &block.stmts {
            nested.print_stmt(stmt);
        }
        format!("{{\n{}{}}}", nested.output, self.indent())
    }
}

// =============================================================================
// Context-free pieces
// =============================================================================

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn modifiers(modifiers: &[Modifier]) -> String {
    modifiers
        .iter()
        .map(|m| format!("{} ", m.keyword()))
        .collect()
}

fn type_params(params: &[TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let list = join(params.iter().map(|p| match &p.variance {
        Some(variance) => format!("{variance} {}", p.name),
        None => p.name.clone(),
    }));
    format!("<{list}>")
}

fn constraint_clause(clause: &ConstraintClause) -> String {
    let constraints = join(clause.constraints.iter().map(|c| match c {
        Constraint::Class => "class".to_string(),
        Constraint::Struct => "struct".to_string(),
        Constraint::New => "new()".to_string(),
        Constraint::Type(ty) => type_ref(ty),
    }));
    format!("where {} : {constraints}", clause.param)
}

fn using_directive(using: &UsingDirective) -> String {
    let mut text = String::from("using ");
    if using.is_static {
        text.push_str("static ");
    }
    if let Some(alias) = &using.alias {
        text.push_str(alias);
        text.push_str(" = ");
    }
    text.push_str(&type_name(&using.target));
    text.push(';');
    text
}

fn attribute_list(list: &AttributeList) -> String {
    let target = list
        .target
        .as_ref()
        .map(|t| format!("{t}: "))
        .unwrap_or_default();
    format!("[{target}{}]", join(list.attributes.iter().map(attribute)))
}

fn attribute(attribute: &Attribute) -> String {
    let name = type_name(&attribute.name);
    if attribute.args.is_empty() {
        return name;
    }
    let printer = PrettyPrinter::new(PrettyConfig::default());
    let args = join(attribute.args.iter().map(|arg| match &arg.name {
        Some(n) => format!("{n} = {}", printer.expr(&arg.value)),
        None => printer.expr(&arg.value),
    }));
    format!("{name}({args})")
}

fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Predefined(predefined, _) => predefined.keyword().to_string(),
        TypeRef::Named(name) => type_name(name),
        TypeRef::Array(elem, rank) => {
            format!("{}[{}]", type_ref(elem), ",".repeat(rank.saturating_sub(1)))
        }
        TypeRef::Nullable(inner) => format!("{}?", type_ref(inner)),
        TypeRef::Var(_) => "var".to_string(),
    }
}

fn type_name(name: &TypeName) -> String {
    let path = name
        .segments
        .iter()
        .map(name_segment)
        .collect::<Vec<_>>()
        .join(".");
    if name.global {
        format!("{}{path}", mixin_foundation::GLOBAL_PREFIX)
    } else {
        path
    }
}

fn name_segment(segment: &NameSegment) -> String {
    match &segment.args {
        TypeArgs::None => segment.ident.clone(),
        TypeArgs::Bound(args) => format!("{}<{}>", segment.ident, join(args.iter().map(type_ref))),
        TypeArgs::Open(arity) => {
            format!("{}<{}>", segment.ident, ",".repeat(arity.saturating_sub(1)))
        }
    }
}
