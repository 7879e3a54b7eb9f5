//! End-to-end walk of the canonical usage pattern, against the process
//! root singleton.

use pretty_assertions::assert_eq;

use crate::errors::ScopeErrorKind;
use crate::{create, root, Bindings, Value};

#[test]
fn chained_scopes_resolve_and_mutate_through_the_owner() {
    let a = create(Bindings::new().local("scenario_x", Value::int(1)))
        .unwrap_or_else(|e| panic!("{e}"));
    let b = a
        .extend(Bindings::new().local("scenario_y", Value::int(2)))
        .unwrap_or_else(|e| panic!("{e}"));

    // The grandchild sees the root helpers and the whole chain.
    assert!(b.get("__slice").is_ok());
    assert_eq!(b.get("scenario_x"), Ok(Value::int(1)));
    assert_eq!(b.get("scenario_y"), Ok(Value::int(2)));

    // Mutation through the owner is visible below.
    assert_eq!(a.set("scenario_x", Value::int(5)), Ok(()));
    assert_eq!(b.get("scenario_x"), Ok(Value::int(5)));

    // A name bound nowhere in the chain stays unresolved, never void.
    assert_eq!(
        b.get("scenario_absent").map_err(|e| e.kind),
        Err(ScopeErrorKind::UnresolvedName {
            name: "scenario_absent".to_string()
        })
    );

    // Redeclaring a visible name at a nested scope is a collision, the
    // policy this engine documents for its one ambiguous point.
    let redeclare = b.extend(Bindings::new().local("scenario_x", Value::int(9)));
    assert_eq!(
        redeclare.map(|_| ()).map_err(|e| e.kind),
        Err(ScopeErrorKind::NameCollision {
            name: "scenario_x".to_string()
        })
    );
}

#[test]
fn create_extends_the_singleton() {
    let scope = create(Bindings::new().local("scenario_solo", Value::Bool(true)))
        .unwrap_or_else(|e| panic!("{e}"));

    // Root names are inherited, own names come first.
    let names = scope.names();
    assert_eq!(names.first(), Some(&"scenario_solo"));
    assert!(names.contains(&"__extends"));

    // The singleton itself was not touched.
    assert!(root().get("scenario_solo").is_err());
}
