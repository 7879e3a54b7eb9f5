use super::*;
use crate::errors::{ScopeError, ScopeErrorKind};
use crate::value::{CallableValue, Value};
use pretty_assertions::assert_eq;
use scope_ir::SharedInterner;

/// A standalone chain root, independent of the process singleton so
/// tests cannot collide through shared root names.
fn fresh_root(bindings: Bindings) -> SharedScope {
    match Scope::build(None, SharedInterner::new(), bindings) {
        Ok(scope) => scope,
        Err(e) => panic!("scope construction failed: {e}"),
    }
}

fn kind_of(result: Result<impl std::fmt::Debug, ScopeError>) -> ScopeErrorKind {
    match result {
        Ok(v) => panic!("expected an error, got {v:?}"),
        Err(e) => e.kind,
    }
}

#[test]
fn get_resolves_through_the_chain() {
    let root = fresh_root(Bindings::new().local("x", Value::int(1)));
    let child = root.extend(Bindings::new().local("y", Value::int(2)));
    let child = match child {
        Ok(scope) => scope,
        Err(e) => panic!("extend failed: {e}"),
    };

    assert_eq!(child.get("x"), Ok(Value::int(1)));
    assert_eq!(child.get("y"), Ok(Value::int(2)));
    assert_eq!(root.get("x"), Ok(Value::int(1)));
}

#[test]
fn set_mutates_the_owning_cell_for_all_descendants() {
    let root = fresh_root(Bindings::new().local("x", Value::int(1)));
    let a = root
        .extend(Bindings::new().local("a", Value::Void))
        .unwrap_or_else(|e| panic!("{e}"));
    let b = a
        .extend(Bindings::new().local("b", Value::Void))
        .unwrap_or_else(|e| panic!("{e}"));

    // Write through the owner.
    assert_eq!(root.set("x", Value::int(5)), Ok(()));
    assert_eq!(a.get("x"), Ok(Value::int(5)));
    assert_eq!(b.get("x"), Ok(Value::int(5)));

    // Write through the deepest descendant still hits the owner's cell.
    assert_eq!(b.set("x", Value::int(7)), Ok(()));
    assert_eq!(root.get("x"), Ok(Value::int(7)));
    assert_eq!(a.get("x"), Ok(Value::int(7)));
}

#[test]
fn sibling_scopes_share_ancestor_cells() {
    let root = fresh_root(Bindings::new().local("shared", Value::int(0)));
    let left = root
        .extend(Bindings::new().local("l", Value::Void))
        .unwrap_or_else(|e| panic!("{e}"));
    let right = root
        .extend(Bindings::new().local("r", Value::Void))
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(left.set("shared", Value::int(3)), Ok(()));
    assert_eq!(right.get("shared"), Ok(Value::int(3)));
}

#[test]
fn undeclared_names_are_unresolved_never_void() {
    let root = fresh_root(Bindings::new().local("x", Value::int(1)));
    assert_eq!(
        kind_of(root.get("missing")),
        ScopeErrorKind::UnresolvedName {
            name: "missing".to_string()
        }
    );
    // set cannot introduce bindings.
    assert_eq!(
        kind_of(root.set("missing", Value::int(1))),
        ScopeErrorKind::UnresolvedName {
            name: "missing".to_string()
        }
    );
}

#[test]
fn reserved_names_fail_construction() {
    let root = fresh_root(Bindings::new());
    let result = root.extend(Bindings::new().local("__expr", Value::Void));
    assert_eq!(
        kind_of(result),
        ScopeErrorKind::ReservedName {
            name: "__expr".to_string()
        }
    );
}

#[test]
fn visible_names_never_shadow() {
    let root = fresh_root(Bindings::new().local("x", Value::int(1)));
    let child = root
        .extend(Bindings::new().local("y", Value::int(2)))
        .unwrap_or_else(|e| panic!("{e}"));

    // Inherited name, one level up.
    assert_eq!(
        kind_of(child.extend(Bindings::new().local("y", Value::int(9)))),
        ScopeErrorKind::NameCollision {
            name: "y".to_string()
        }
    );
    // Inherited name, two levels up.
    assert_eq!(
        kind_of(child.extend(Bindings::new().local("x", Value::int(9)))),
        ScopeErrorKind::NameCollision {
            name: "x".to_string()
        }
    );
    // Duplicate inside one declaration block.
    assert_eq!(
        kind_of(
            root.extend(
                Bindings::new()
                    .local("z", Value::int(1))
                    .literal("z", Value::string("1"))
            )
        ),
        ScopeErrorKind::NameCollision {
            name: "z".to_string()
        }
    );
}

#[test]
fn failed_extend_installs_nothing() {
    let root = fresh_root(Bindings::new().local("x", Value::int(1)));
    let result = root.extend(
        Bindings::new()
            .local("fresh", Value::int(2))
            .local("x", Value::int(9)),
    );
    assert!(result.is_err());

    // The valid half of the block was not installed anywhere.
    assert_eq!(
        kind_of(root.get("fresh")),
        ScopeErrorKind::UnresolvedName {
            name: "fresh".to_string()
        }
    );
    assert_eq!(root.get("x"), Ok(Value::int(1)));
}

#[test]
fn literals_are_frozen_and_immutable() {
    let root = fresh_root(Bindings::new().literal("greeting", Value::string("hello")));

    assert_eq!(root.get("greeting"), Ok(Value::string("hello")));
    assert_eq!(root.get("greeting"), Ok(Value::string("hello")));
    assert_eq!(root.literal_source("greeting"), Some("hello"));

    // Literal bindings reject assignment, by reference or literal.
    assert_eq!(
        kind_of(root.set("greeting", Value::string("bye"))),
        ScopeErrorKind::ImmutableBinding {
            name: "greeting".to_string()
        }
    );
    assert_eq!(
        kind_of(root.set_literal("greeting", Value::string("bye"))),
        ScopeErrorKind::ImmutableBinding {
            name: "greeting".to_string()
        }
    );
    assert_eq!(root.get("greeting"), Ok(Value::string("hello")));
}

#[test]
fn literal_sources_survive_into_descendants() {
    let c = CallableValue::with_source(vec![], "fn describe() { greeting }", |_| Ok(Value::Void));
    let root = fresh_root(Bindings::new().literal("describe", Value::Callable(c)));
    let child = root
        .extend(Bindings::new().local("x", Value::int(1)))
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(
        child.literal_source("describe"),
        Some("(fn () { greeting })")
    );
    assert_eq!(child.literal_source("x"), None);
}

#[test]
fn unencodable_literal_aborts_construction() {
    let root = fresh_root(Bindings::new());
    let result = root.extend(Bindings::new().literal("n", Value::int(1)));
    assert_eq!(
        kind_of(result),
        ScopeErrorKind::NotEncodable {
            type_name: "int".to_string()
        }
    );
}

#[test]
fn set_literal_requires_an_encodable_value() {
    let root = fresh_root(Bindings::new().local("x", Value::string("start")));

    assert_eq!(root.set_literal("x", Value::string("next")), Ok(()));
    assert_eq!(root.get("x"), Ok(Value::string("next")));

    // An opaque value passes through plain set but not literal transit.
    let live = Value::opaque("handle", 42_u8);
    assert_eq!(
        kind_of(root.set_literal("x", live.clone())),
        ScopeErrorKind::NotEncodable {
            type_name: "handle".to_string()
        }
    );
    assert_eq!(root.get("x"), Ok(Value::string("next")));
    assert_eq!(root.set("x", live.clone()), Ok(()));
    assert_eq!(root.get("x"), Ok(live));
}

#[test]
fn set_many_applies_in_order_and_stops_on_error() {
    let root = fresh_root(
        Bindings::new()
            .local("a", Value::int(0))
            .local("b", Value::int(0))
            .local("c", Value::int(0)),
    );

    assert_eq!(
        root.set_many([("a", Value::int(1)), ("b", Value::int(2))]),
        Ok(())
    );
    assert_eq!(root.get("a"), Ok(Value::int(1)));
    assert_eq!(root.get("b"), Ok(Value::int(2)));

    // The pair before the failure lands; the pair after does not.
    let result = root.set_many([
        ("a", Value::int(10)),
        ("missing", Value::int(11)),
        ("c", Value::int(12)),
    ]);
    assert!(result.is_err());
    assert_eq!(root.get("a"), Ok(Value::int(10)));
    assert_eq!(root.get("c"), Ok(Value::int(0)));
}

#[test]
fn names_list_own_first_then_inherited() {
    let root = fresh_root(
        Bindings::new()
            .local("rx", Value::int(1))
            .literal("rl", Value::string("x")),
    );
    let child = root
        .extend(
            Bindings::new()
                .local("cx", Value::int(2))
                .local("_hidden", Value::int(3)),
        )
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(child.names(), vec!["cx", "_hidden", "rx", "rl"]);
    assert_eq!(child.exports(), vec!["cx", "rx", "rl"]);
}

#[test]
fn chains_cross_threads() {
    let root = fresh_root(Bindings::new().local("n", Value::int(0)));
    let handle = {
        let root = root.clone();
        std::thread::spawn(move || root.set("n", Value::int(41)))
    };
    match handle.join() {
        Ok(result) => assert_eq!(result, Ok(())),
        Err(_) => panic!("writer thread panicked"),
    }
    assert_eq!(root.get("n"), Ok(Value::int(41)));
}
