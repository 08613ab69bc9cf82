//! Provenance tagging of synthesized members.
//!
//! Every copied member and every copied nested type (and its members) gets
//! a generated-code attribute naming the generator. Abstract template
//! methods become partial method declarations, which the target is expected
//! to implement.

use mixin_foundation::GLOBAL_PREFIX;
use mixin_syntax::ast::{
    Attribute, AttributeArg, AttributeList, Expr, LiteralKind, Member, Modifier, NameSegment, TypeDecl,
};
use mixin_syntax::visitor::SyntaxTransform;
use mixin_syntax::{Span, TypeName};

use crate::lookup::ATTRIBUTE_SUFFIX;

/// Metadata name of the generated-code attribute.
pub const GENERATED_CODE_ATTRIBUTE: &str = "System.CodeDom.Compiler.GeneratedCodeAttribute";

const GENERATED_CODE_SIMPLE_NAME: &str = "GeneratedCodeAttribute";

/// Adds provenance tags to synthesized members.
#[derive(Clone, Debug)]
pub struct Attributor {
    tag: Attribute,
}

impl Attributor {
    /// Creates an attributor for the given generator name and version.
    #[must_use]
    pub fn new(generator: &str, version: &str) -> Self {
        let name = TypeName::global(GENERATED_CODE_ATTRIBUTE.split('.').map(NameSegment::new).collect());
        let tag = Attribute {
            name,
            args: vec![string_arg(generator), string_arg(version)],
            span: Span::synthetic(),
        };
        Self { tag }
    }

    /// The attribute added to each member.
    #[must_use]
    pub fn tag(&self) -> &Attribute {
        &self.tag
    }

    /// Returns true if `attribute` is a generated-code tag, written with or
    /// without the `Attribute` suffix.
    #[must_use]
    pub fn is_tag(attribute: &Attribute) -> bool {
        let dotted = attribute.name.dotted();
        let name = dotted.strip_prefix(GLOBAL_PREFIX).unwrap_or(&dotted);
        let normalized = if name.ends_with(ATTRIBUTE_SUFFIX) {
            name.to_string()
        } else {
            format!("{name}{ATTRIBUTE_SUFFIX}")
        };
        normalized == GENERATED_CODE_ATTRIBUTE || normalized == GENERATED_CODE_SIMPLE_NAME
    }

    /// Tags and adjusts top-level synthesized members.
    pub fn attribute_members(&mut self, members: Vec<Member>) -> Vec<Member> {
        members.into_iter().map(|m| self.transform_member(m)).collect()
    }

    fn add_tag(&self, lists: &mut Vec<AttributeList>) {
        let tagged = lists
            .iter()
            .filter(|list| list.target.is_none())
            .flat_map(|list| list.attributes.iter())
            .any(Self::is_tag);
        if !tagged {
            lists.push(AttributeList::single(self.tag.clone()));
        }
    }
}

impl SyntaxTransform for Attributor {
    fn transform_type_decl(&mut self, decl: TypeDecl) -> TypeDecl {
        let mut decl = TypeDecl {
            members: decl
                .members
                .into_iter()
                .map(|m| self.transform_member(m))
                .collect(),
            ..decl
        };
        self.add_tag(&mut decl.attributes);
        decl
    }

    fn transform_member(&mut self, member: Member) -> Member {
        let mut member = match member {
            Member::Type(decl) => return Member::Type(self.transform_type_decl(decl)),
            Member::Method(mut method) if method.modifiers.contains(&Modifier::Abstract) => {
                method.modifiers.retain(|m| *m != Modifier::Abstract);
                method.modifiers.push(Modifier::Partial);
                Member::Method(method)
            }
            other => other,
        };
        self.add_tag(member.attributes_mut());
        member
    }
}

fn string_arg(value: &str) -> AttributeArg {
    AttributeArg {
        name: None,
        value: Expr::Literal(LiteralKind::String, format!("\"{value}\""), Span::synthetic()),
    }
}
