//! Assembling trees from type names and attributes.

mod common;

use behavior_core::{
    Attributes, BehaviorTree, Blackboard, BuildError, Node, NodeRegistry, Shape, Status,
    TickError, TreeConfig,
};
use common::{Countdown, init_tracing};
use serde_json::json;

fn no_attrs() -> Attributes {
    Attributes::new()
}

#[tokio::test]
async fn assembles_and_runs_a_tree_from_definitions() {
    init_tracing();
    let registry = NodeRegistry::with_builtins();

    let mut root = registry.construct("Selector", &no_attrs(), "root").unwrap();

    let mut guarded = registry
        .construct(
            "Conditional",
            &Attributes::from_pairs([("key", json!("alarm"))]).unwrap(),
            "when_alarmed",
        )
        .unwrap();
    guarded
        .add_child(registry.construct("Success", &no_attrs(), "flee").unwrap())
        .unwrap();

    let mut retry = registry
        .construct(
            "Retry",
            &Attributes::from_pairs([("max_attempts", json!(2))]).unwrap(),
            "retry_patrol",
        )
        .unwrap();
    retry
        .add_child(registry.construct("Failure", &no_attrs(), "patrol").unwrap())
        .unwrap();

    root.add_child(guarded).unwrap();
    root.add_child(retry).unwrap();
    assert_eq!(root.children().len(), 2);
    assert!(root.children().iter().all(|child| child.parent() == Some(root.id())));

    let mut tree = BehaviorTree::with_root(TreeConfig::new("assembled"), root).unwrap();
    assert_eq!(tree.tick().await.unwrap(), Status::Failure);

    tree.blackboard().set("alarm", true);
    assert_eq!(tree.tick().await.unwrap(), Status::Success);
}

#[tokio::test]
async fn childless_composites_refuse_to_tick() {
    let registry = NodeRegistry::with_builtins();
    let bb = Blackboard::new();

    let mut seq = registry.construct("Sequence", &no_attrs(), "empty_seq").unwrap();
    let err = seq.tick(&bb).await.unwrap_err();
    assert!(matches!(err, TickError::EmptyComposite { .. }));
    assert_eq!(err.node(), Some("empty_seq"));

    let attrs = Attributes::new()
        .with("success_policy", "all_succeed")
        .unwrap()
        .with("failure_policy", "all_fail")
        .unwrap();
    let mut par = registry.construct("Parallel", &attrs, "empty_par").unwrap();
    let err = par.tick(&bb).await.unwrap_err();
    assert!(matches!(err, TickError::EmptyComposite { .. }));
}

#[test]
fn parallel_policies_are_parsed_from_snake_case() {
    let registry = NodeRegistry::with_builtins();
    let attrs = Attributes::new()
        .with("success_policy", "one_succeeds")
        .unwrap()
        .with("failure_policy", "all_fail")
        .unwrap();

    let node = registry.construct("Parallel", &attrs, "race").unwrap();
    assert_eq!(node.type_name(), "Parallel");
    assert_eq!(node.shape(), Shape::Composite);
}

#[test]
fn swapped_parallel_policies_are_rejected() {
    let registry = NodeRegistry::with_builtins();
    let attrs = Attributes::new()
        .with("success_policy", "one_fails")
        .unwrap()
        .with("failure_policy", "all_fail")
        .unwrap();

    let err = registry.construct("Parallel", &attrs, "race").unwrap_err();
    assert!(matches!(err, BuildError::InvalidPolicy { role: "success", .. }));
}

#[test]
fn unbound_slots_fail_validation() {
    let registry = NodeRegistry::with_builtins();

    let seq = registry.construct("Sequence", &no_attrs(), "empty").unwrap();
    let err = BehaviorTree::with_root(TreeConfig::default(), seq).unwrap_err();
    assert!(matches!(err, BuildError::EmptyComposite { .. }));

    let timeout = registry
        .construct(
            "Timeout",
            &Attributes::from_pairs([("timeout_ms", json!(250))]).unwrap(),
            "deadline",
        )
        .unwrap();
    let err = BehaviorTree::with_root(TreeConfig::default(), timeout).unwrap_err();
    assert!(matches!(err, BuildError::MissingChild { node_type: "Timeout", .. }));
}

#[test]
fn leaves_and_full_decorators_refuse_children() {
    let registry = NodeRegistry::with_builtins();
    let mut leaf = registry.construct("Running", &no_attrs(), "wait").unwrap();
    let err = leaf
        .add_child(registry.construct("Success", &no_attrs(), "x").unwrap())
        .unwrap_err();
    assert!(matches!(err, BuildError::ChildLimit { shape: Shape::Leaf, .. }));

    let mut inverter = registry.construct("Inverter", &no_attrs(), "not").unwrap();
    inverter
        .add_child(registry.construct("Success", &no_attrs(), "a").unwrap())
        .unwrap();
    let err = inverter
        .add_child(registry.construct("Success", &no_attrs(), "b").unwrap())
        .unwrap_err();
    assert!(matches!(err, BuildError::ChildLimit { shape: Shape::Decorator, .. }));
}

#[test]
fn count_attributes_must_be_positive_integers() {
    let registry = NodeRegistry::with_builtins();

    let err = registry
        .construct(
            "Repeater",
            &Attributes::from_pairs([("count", json!(0))]).unwrap(),
            "loop",
        )
        .unwrap_err();
    assert!(err.to_string().contains("`loop`"));

    let err = registry
        .construct(
            "UntilSuccess",
            &Attributes::from_pairs([("max_attempts", json!("3"))]).unwrap(),
            "until",
        )
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidAttribute { .. }));
}

#[tokio::test]
async fn host_types_register_alongside_builtins() {
    let mut registry = NodeRegistry::with_builtins();
    registry.register("Walk", |spec| {
        let steps = spec.optional_u32("steps")?.unwrap_or(1) as usize;
        Ok(Node::action(spec.name, Countdown::new(steps, Status::Success)))
    });
    assert!(registry.contains("Walk"));
    assert!(registry.type_names().contains(&"Sequence"));

    let walk = registry
        .construct(
            "Walk",
            &Attributes::from_pairs([("steps", json!(1))]).unwrap(),
            "walk",
        )
        .unwrap();
    assert_eq!(walk.type_name(), "Countdown");

    let mut tree = BehaviorTree::with_root(TreeConfig::default(), walk).unwrap();
    assert_eq!(tree.tick().await.unwrap(), Status::Running);
    assert_eq!(tree.tick().await.unwrap(), Status::Success);
}
