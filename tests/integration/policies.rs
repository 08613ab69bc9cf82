//! Failure and conflict policy tests
//!
//! Tests how the configured policies change the outcome of a pass.

use mixin::engine::{ComposeConfig, ConflictPolicy, FailurePolicy, compose_sources};
use mixin::foundation::{DeclKey, ErrorKind};
use proptest::prelude::*;

const CONFLICTING: &str = r"
    using Mixin;
    class First { public int Count; public int OnlyFirst; }
    class Second { public long Count; }
    [Mixin(typeof(First)), Mixin(typeof(Second))] partial class Both { }
";

#[test]
fn conflicts_are_errors_by_default() {
    let out = compose_sources(&[(CONFLICTING, "App")], ComposeConfig::default()).unwrap();
    assert_eq!(
        out.failure(&DeclKey::parse_metadata("Both")).map(|e| e.kind.clone()),
        Some(ErrorKind::MemberConflict {
            target: DeclKey::parse_metadata("Both"),
            member: "Count".to_string(),
        })
    );
}

#[test]
fn last_wins_keeps_the_later_member() {
    let out = compose_sources(
        &[(CONFLICTING, "App")],
        ComposeConfig::default().with_conflict_policy(ConflictPolicy::LastWins),
    )
    .unwrap();
    let text = out.render_target(&DeclKey::parse_metadata("Both")).unwrap();
    assert!(text.contains("public long Count;"));
    assert!(!text.contains("public int Count;"));
    assert!(text.contains("public int OnlyFirst;"));
}

#[test]
fn abort_policy_stops_at_the_first_failure() {
    let source = r"
        using Mixin;
        class Good { public int G; }
        [Mixin(typeof(Nowhere))] partial class Broken { }
        [Mixin(typeof(Good))] partial class Fine { }
    ";
    let err = compose_sources(
        &[(source, "App")],
        ComposeConfig::default().with_failure_policy(FailurePolicy::AbortPass),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnresolvedTemplate(_)));
    assert!(!err.is_pass_fatal());
}

#[test]
fn members_from_one_template_may_overload() {
    let out = compose_sources(
        &[(
            "using Mixin; class T { public void M(int x) { } public void M(string s) { } } [Mixin(typeof(T))] partial class X { }",
            "App",
        )],
        ComposeConfig::strict(),
    )
    .unwrap();
    assert!(out.is_success());
}

proptest! {
    #[test]
    fn isolated_failures_never_hide_good_targets(broken in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut source = String::from("using Mixin; class Good { public int G; }\n");
        for (i, is_broken) in broken.iter().enumerate() {
            let template = if *is_broken { "Nowhere" } else { "Good" };
            source.push_str(&format!("[Mixin(typeof({template}))] partial class T{i} {{ }}\n"));
        }
        let out = compose_sources(&[(source.as_str(), "App")], ComposeConfig::default()).unwrap();
        for (i, is_broken) in broken.iter().enumerate() {
            let key = DeclKey::parse_metadata(&format!("T{i}"));
            prop_assert_eq!(out.get(&key).is_some(), !is_broken);
            prop_assert_eq!(out.failure(&key).is_some(), *is_broken);
        }
    }
}
