//! Name → constructor registry used to build trees from external definitions.
//!
//! A parser (not part of this crate) reads a tree definition, and for each
//! element calls [`NodeRegistry::construct`] with the type name, the element's
//! attributes, and the node name. Children are then attached with
//! [`Node::add_child`]. Composites and decorators come back with open child
//! slots; [`Node::validate`] (run by [`BehaviorTree::bind`](crate::BehaviorTree::bind))
//! rejects a tree that still has one.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::BuildError;
use crate::leaf::{BlackboardFlag, BlackboardHas, Constant};
use crate::{
    Action, AlwaysFail, AlwaysSucceed, Conditional, Inverter, MemorySelector, MemorySequence, Node,
    Parallel, Policy, Repeater, Retry, Selector, Sequence, Status, Timeout, UntilFailure,
    UntilSuccess,
};

/// Attribute bag attached to one node definition.
///
/// Values are kept as JSON values; the typed accessors on [`NodeSpec`] do the
/// checking. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Map<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateAttribute`] if `key` is already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), BuildError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(BuildError::DuplicateAttribute { attribute: key });
        }
        self.entries.insert(key, value.into());
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, BuildError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Collects `(key, value)` pairs, rejecting repeated keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |attrs, (key, value)| attrs.with(key, value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a constructor knows about the node it is asked to build.
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec<'a> {
    pub node_type: &'a str,
    pub name: &'a str,
    pub attributes: &'a Attributes,
}

impl<'a> NodeSpec<'a> {
    fn missing(&self, attribute: &str) -> BuildError {
        BuildError::MissingAttribute {
            node: self.name.to_owned(),
            node_type: self.node_type.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    fn invalid(&self, attribute: &str, reason: impl fmt::Display) -> BuildError {
        BuildError::InvalidAttribute {
            node: self.name.to_owned(),
            node_type: self.node_type.to_owned(),
            attribute: attribute.to_owned(),
            reason: reason.to_string(),
        }
    }

    fn required(&self, key: &str) -> Result<&'a Value, BuildError> {
        self.attributes.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn optional_u32(&self, key: &str) -> Result<Option<u32>, BuildError> {
        let Some(value) = self.attributes.get(key) else {
            return Ok(None);
        };
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| self.invalid(key, format!("expected an unsigned integer, got {value}")))
    }

    pub fn required_u32(&self, key: &str) -> Result<u32, BuildError> {
        self.optional_u32(key)?.ok_or_else(|| self.missing(key))
    }

    /// A required count of at least 1.
    pub fn required_count(&self, key: &str) -> Result<NonZeroU32, BuildError> {
        NonZeroU32::new(self.required_u32(key)?)
            .ok_or_else(|| self.invalid(key, "must be at least 1"))
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str, BuildError> {
        let value = self.required(key)?;
        value
            .as_str()
            .ok_or_else(|| self.invalid(key, format!("expected a string, got {value}")))
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, BuildError> {
        let Some(value) = self.attributes.get(key) else {
            return Ok(None);
        };
        value
            .as_bool()
            .map(Some)
            .ok_or_else(|| self.invalid(key, format!("expected a boolean, got {value}")))
    }

    pub fn required_policy(&self, key: &str) -> Result<Policy, BuildError> {
        let raw = self.required_str(key)?;
        Policy::from_str(raw).map_err(|_| self.invalid(key, format!("unknown policy `{raw}`")))
    }

    /// A required duration given in milliseconds.
    pub fn required_millis(&self, key: &str) -> Result<Duration, BuildError> {
        let Some(value) = self.required(key)?.as_u64() else {
            return Err(self.invalid(key, "expected milliseconds as an unsigned integer"));
        };
        Ok(Duration::from_millis(value))
    }
}

/// Constructor stored in a [`NodeRegistry`].
pub type Constructor = Arc<dyn Fn(&NodeSpec<'_>) -> Result<Node, BuildError> + Send + Sync>;

/// Maps type names to node constructors.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    constructors: HashMap<String, Constructor>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in composite, decorator, and leaf.
    ///
    /// | Type | Attributes |
    /// |------|------------|
    /// | `Sequence`, `Selector`, `MemorySequence`, `MemorySelector` | – |
    /// | `Parallel` | `success_policy`, `failure_policy` |
    /// | `Inverter`, `AlwaysSucceed`, `AlwaysFail` | – |
    /// | `Repeater` | `count` |
    /// | `UntilSuccess`, `UntilFailure` | `max_attempts` |
    /// | `Retry` | `max_attempts`, optional `catch_faults` |
    /// | `Timeout` | `timeout_ms` |
    /// | `Conditional` | `key` (a `bool` blackboard flag) |
    /// | `Success`, `Failure`, `Running` | – |
    /// | `IsFlagSet`, `HasKey` | `key` |
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("Sequence", |spec| Ok(Node::composite_slot(spec.name, Sequence)));
        registry.register("Selector", |spec| Ok(Node::composite_slot(spec.name, Selector)));
        registry.register("MemorySequence", |spec| {
            Ok(Node::composite_slot(spec.name, MemorySequence::default()))
        });
        registry.register("MemorySelector", |spec| {
            Ok(Node::composite_slot(spec.name, MemorySelector::default()))
        });
        registry.register("Parallel", |spec| {
            let parallel = Parallel::new(
                spec.required_policy("success_policy")?,
                spec.required_policy("failure_policy")?,
            )?;
            Ok(Node::composite_slot(spec.name, parallel))
        });

        registry.register("Inverter", |spec| Ok(Node::decorator_slot(spec.name, Inverter)));
        registry.register("AlwaysSucceed", |spec| {
            Ok(Node::decorator_slot(spec.name, AlwaysSucceed))
        });
        registry.register("AlwaysFail", |spec| Ok(Node::decorator_slot(spec.name, AlwaysFail)));
        registry.register("Repeater", |spec| {
            let repeater = Repeater::new(spec.required_count("count")?);
            Ok(Node::decorator_slot(spec.name, repeater))
        });
        registry.register("UntilSuccess", |spec| {
            let until = UntilSuccess::new(spec.required_count("max_attempts")?);
            Ok(Node::decorator_slot(spec.name, until))
        });
        registry.register("UntilFailure", |spec| {
            let until = UntilFailure::new(spec.required_count("max_attempts")?);
            Ok(Node::decorator_slot(spec.name, until))
        });
        registry.register("Retry", |spec| {
            let mut retry = Retry::new(spec.required_count("max_attempts")?);
            if spec.optional_bool("catch_faults")?.unwrap_or(false) {
                retry = retry.catching_faults();
            }
            Ok(Node::decorator_slot(spec.name, retry))
        });
        registry.register("Timeout", |spec| {
            let timeout = Timeout::new(spec.required_millis("timeout_ms")?);
            Ok(Node::decorator_slot(spec.name, timeout))
        });
        registry.register("Conditional", |spec| {
            let gate = Conditional::new(BlackboardFlag::new(spec.required_str("key")?));
            Ok(Node::decorator_slot(spec.name, gate))
        });

        for status in [Status::Success, Status::Failure, Status::Running] {
            registry.register(Action::type_name(&Constant(status)), move |spec| {
                Ok(Node::action(spec.name, Constant(status)))
            });
        }
        registry.register("IsFlagSet", |spec| {
            Ok(Node::condition(spec.name, BlackboardFlag::new(spec.required_str("key")?)))
        });
        registry.register("HasKey", |spec| {
            Ok(Node::condition(spec.name, BlackboardHas::new(spec.required_str("key")?)))
        });

        registry
    }

    /// Registers `constructor` under `type_name`, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&NodeSpec<'_>) -> Result<Node, BuildError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .constructors
            .insert(type_name.clone(), Arc::new(constructor))
            .is_some()
        {
            tracing::debug!(%type_name, "replaced node constructor");
        }
    }

    /// Builds one node.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownType`] for an unregistered type, or
    /// whatever attribute error the constructor reports.
    pub fn construct(
        &self,
        node_type: &str,
        attributes: &Attributes,
        name: &str,
    ) -> Result<Node, BuildError> {
        let constructor =
            self.constructors
                .get(node_type)
                .ok_or_else(|| BuildError::UnknownType {
                    node_type: node_type.to_owned(),
                    node: name.to_owned(),
                })?;
        constructor(&NodeSpec {
            node_type,
            name,
            attributes,
        })
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.constructors.contains_key(node_type)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
