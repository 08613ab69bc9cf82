//! Assembly of the merged declaration for one target.

use std::collections::BTreeMap;

use mixin_foundation::{DeclKey, Error, Result};
use mixin_syntax::ast::{
    CompilationUnit, Member, Modifier, NamespaceDecl, NamespaceMember, Parameter, TypeDecl, TypeKind,
    TypeParam, TypeRef,
};
use mixin_syntax::pretty::pretty_print_type_ref;
use mixin_syntax::Span;
use tracing::debug;

use crate::config::ConflictPolicy;
use crate::provenance::Attributor;
use crate::universe::Universe;

/// Members one directive contributes, already rewritten.
#[derive(Clone, Debug, Default)]
pub struct Contribution {
    /// The directive's template, as written.
    pub directive: String,
    /// Rewritten members.
    pub members: Vec<Member>,
    /// Rewritten interface bases.
    pub bases: Vec<TypeRef>,
}

/// Signatures a member occupies in its declaring type. Two members with a
/// common signature cannot coexist.
#[must_use]
pub fn member_signatures(member: &Member) -> Vec<String> {
    match member {
        Member::Field(m) => m.declarators.iter().map(|d| d.name.clone()).collect(),
        Member::Event(m) => m.declarators.iter().map(|d| d.name.clone()).collect(),
        Member::Property(m) => vec![m.name.clone()],
        Member::Indexer(m) => vec![format!("this[{}]", param_types(&m.params))],
        Member::Method(m) => vec![format!(
            "{}`{}({})",
            m.name,
            m.type_params.len(),
            param_types(&m.params)
        )],
        Member::Constructor(m) => {
            let kind = if m.modifiers.contains(&Modifier::Static) { ".cctor" } else { ".ctor" };
            vec![format!("{kind}({})", param_types(&m.params))]
        }
        Member::Destructor(_) => vec!["~".to_string()],
        Member::Operator(m) => vec![format!("operator {}({})", m.operator, param_types(&m.params))],
        Member::Conversion(m) => vec![format!(
            "{} operator {}({})",
            if m.implicit { "implicit" } else { "explicit" },
            pretty_print_type_ref(&m.ty),
            param_types(&m.params)
        )],
        Member::Type(decl) => vec![format!("{}`{}", decl.name, decl.arity())],
    }
}

fn param_types(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| match &p.modifier {
            Some(modifier) if modifier != "this" && modifier != "params" => {
                format!("{modifier} {}", pretty_print_type_ref(&p.ty))
            }
            _ => pretty_print_type_ref(&p.ty),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Merges contributions in directive order.
///
/// # Errors
///
/// Under [`ConflictPolicy::Error`], returns `MemberConflict` when two
/// directives contribute a member with the same signature.
pub fn merge_contributions(
    target: &DeclKey,
    contributions: &[Contribution],
    policy: ConflictPolicy,
) -> Result<(Vec<Member>, Vec<TypeRef>)> {
    let mut members: Vec<Option<Member>> = Vec::new();
    let mut owners: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for (directive_index, contribution) in contributions.iter().enumerate() {
        for member in &contribution.members {
            let slot = members.len();
            for signature in member_signatures(member) {
                if let Some(&(owner, previous)) = owners.get(&signature) {
                    if owner != directive_index {
                        match policy {
                            ConflictPolicy::Error => return Err(Error::member_conflict(target, signature)),
                            ConflictPolicy::LastWins => {
                                debug!(target_decl = %target, member = %signature, "member replaced by later directive");
                                members[previous] = None;
                            }
                        }
                    }
                }
                owners.insert(signature, (directive_index, slot));
            }
            members.push(Some(member.clone()));
        }
    }

    let mut bases: Vec<TypeRef> = Vec::new();
    for base in contributions.iter().flat_map(|c| c.bases.iter()) {
        if !bases.contains(base) {
            bases.push(base.clone());
        }
    }
    Ok((members.into_iter().flatten().collect(), bases))
}

/// Builds the synthesized partial declaration for `target`.
#[must_use]
pub fn synthesize(target: &TypeDecl, members: Vec<Member>, bases: Vec<TypeRef>, attributor: &mut Attributor) -> TypeDecl {
    TypeDecl {
        attributes: Vec::new(),
        modifiers: shell_modifiers(target),
        kind: target.kind,
        name: target.name.clone(),
        type_params: target.type_params.iter().map(|tp| TypeParam::new(tp.name.clone())).collect(),
        bases,
        constraints: Vec::new(),
        members: attributor.attribute_members(members),
        span: Span::synthetic(),
    }
}

fn shell_modifiers(decl: &TypeDecl) -> Vec<Modifier> {
    let mut modifiers = decl.accessibility().modifiers().to_vec();
    if decl.has_modifier(Modifier::Static) {
        modifiers.push(Modifier::Static);
    }
    modifiers.push(Modifier::Partial);
    modifiers
}

/// Wraps a synthesized declaration in partial shells of its containing types
/// and its namespace.
#[must_use]
pub fn wrap_in_scope(universe: &Universe, key: &DeclKey, decl: TypeDecl) -> CompilationUnit {
    let mut current = decl;
    let mut outer = key.containing_type();
    while let Some(container) = outer {
        let mut shell = match universe.primary_part(&container) {
            Some(part) => TypeDecl {
                modifiers: shell_modifiers(&part.decl),
                type_params: part.decl.type_params.iter().map(|tp| TypeParam::new(tp.name.clone())).collect(),
                ..TypeDecl::new(part.decl.kind, part.decl.name.clone())
            },
            None => TypeDecl {
                modifiers: vec![Modifier::Partial],
                ..TypeDecl::new(TypeKind::Class, container.name())
            },
        };
        shell.members.push(Member::Type(current));
        current = shell;
        outer = container.containing_type();
    }

    let members = vec![NamespaceMember::Type(current)];
    if key.namespace.is_global() {
        return CompilationUnit {
            usings: Vec::new(),
            members,
        };
    }
    CompilationUnit {
        usings: Vec::new(),
        members: vec![NamespaceMember::Namespace(NamespaceDecl {
            name: key.namespace.clone(),
            usings: Vec::new(),
            members,
            file_scoped: false,
            span: Span::synthetic(),
        })],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixin_foundation::ErrorKind;
    use mixin_syntax::pretty::{pretty_print_type_decl, pretty_print_unit};

    fn decl(source: &str) -> TypeDecl {
        let unit = mixin_syntax::parse(source).unwrap();
        match &unit.members[0] {
            NamespaceMember::Type(decl) => decl.clone(),
            NamespaceMember::Namespace(ns) => match &ns.members[0] {
                NamespaceMember::Type(decl) => decl.clone(),
                NamespaceMember::Namespace(_) => panic!("expected a type"),
            },
        }
    }

    fn contribution(source: &str) -> Contribution {
        Contribution {
            directive: "T".to_string(),
            members: decl(source).members,
            bases: Vec::new(),
        }
    }

    fn key() -> DeclKey {
        DeclKey::parse_metadata("Demo.Target")
    }

    #[test]
    fn signatures() {
        let d = decl(
            "class X { int a, b; void M<T>(ref int x, string y) { } X(int v) { } int this[int i] => i; static implicit operator int(X x) => 0; }",
        );
        let all: Vec<_> = d.members.iter().flat_map(member_signatures).collect();
        assert_eq!(
            all,
            vec![
                "a",
                "b",
                "M`1(ref int, string)",
                ".ctor(int)",
                "this[int]",
                "implicit operator int(X)",
            ]
        );
    }

    #[test]
    fn overloads_do_not_conflict() {
        let (members, _) = merge_contributions(
            &key(),
            &[
                contribution("class A { void M(int x) { } }"),
                contribution("class B { void M(string x) { } }"),
            ],
            ConflictPolicy::Error,
        )
        .unwrap();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn conflicts_are_errors_by_default() {
        let err = merge_contributions(
            &key(),
            &[contribution("class A { int Count; }"), contribution("class B { int Count; }")],
            ConflictPolicy::Error,
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::MemberConflict {
                target: key(),
                member: "Count".to_string(),
            }
        );
    }

    #[test]
    fn last_wins_replaces_earlier_member() {
        let (members, _) = merge_contributions(
            &key(),
            &[
                contribution("class A { int Count; int Other; }"),
                contribution("class B { long Count; }"),
            ],
            ConflictPolicy::LastWins,
        )
        .unwrap();
        let names: Vec<_> = members.iter().flat_map(member_signatures).collect();
        assert_eq!(names, vec!["Other", "Count"]);
        let Member::Field(field) = &members[1] else {
            panic!("expected a field");
        };
        assert_eq!(pretty_print_type_ref(&field.ty), "long");
    }

    #[test]
    fn synthesized_shell_copies_target_identity() {
        let target = decl("public static class Helpers<T> where T : class { }");
        let mut attributor = Attributor::new("Mixin Task", "1.0.0");
        let out = synthesize(&target, decl("class X { public static int N; }").members, Vec::new(), &mut attributor);
        assert_eq!(out.modifiers, vec![Modifier::Public, Modifier::Static, Modifier::Partial]);
        assert_eq!(out.type_params, vec![TypeParam::new("T")]);
        assert!(out.constraints.is_empty());
        assert!(out.attributes.is_empty());
        assert_eq!(out.members[0].attributes().len(), 1);
        assert!(pretty_print_type_decl(&out).starts_with("public static partial class Helpers<T>"));
    }

    #[test]
    fn nested_targets_are_wrapped_in_partial_shells() {
        let mut universe = Universe::new();
        universe
            .add_source("namespace Demo { public class Outer<T> { internal class Inner { } } }", "App")
            .unwrap();
        let inner_key = DeclKey::parse_metadata("Demo.Outer`1+Inner");
        let inner = TypeDecl {
            modifiers: vec![Modifier::Internal, Modifier::Partial],
            ..TypeDecl::new(TypeKind::Class, "Inner")
        };
        let text = pretty_print_unit(&wrap_in_scope(&universe, &inner_key, inner));
        assert!(text.contains("namespace Demo"));
        assert!(text.contains("public partial class Outer<T>"));
        assert!(text.contains("internal partial class Inner"));
    }

    #[test]
    fn global_targets_have_no_namespace() {
        let universe = Universe::new();
        let unit = wrap_in_scope(&universe, &DeclKey::parse_metadata("Plain"), TypeDecl::new(TypeKind::Class, "Plain"));
        assert!(matches!(unit.members[0], NamespaceMember::Type(_)));
    }
}
