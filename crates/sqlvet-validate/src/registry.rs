//! Rule registry
//!
//! Maps node kinds to the rules interested in them. The walker asks the
//! registry for the rules of each node it visits and runs them in
//! registration order.

use crate::context::ValidationContext;
use indexmap::IndexSet;
use sqlvet_ast::{Node, NodeKind};
use std::collections::HashMap;
use std::sync::Arc;

/// A semantic check attached to one or more node kinds
///
/// Rules are stateless: everything they learn about the query comes from the
/// node and the context, and everything they find goes to
/// [`ValidationContext::add_problem`]. No rule may depend on another having
/// run first.
pub trait Rule: Send + Sync {
    /// Stable kebab-case name, used to disable the rule
    fn name(&self) -> &'static str;

    /// Node kinds this rule is dispatched for
    fn node_kinds(&self) -> &'static [NodeKind];

    /// Check one node
    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>);
}

/// Shared handle to a rule
pub type RuleRef = Arc<dyn Rule>;

/// Registry of rules with a dispatch table by node kind
#[derive(Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<RuleRef>,
    dispatch: HashMap<NodeKind, Vec<RuleRef>>,
}

impl RuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for rule in crate::rules::standard_rules() {
            registry.register(rule);
        }
        registry
    }

    /// Register a rule; returns false if a rule with that name is already
    /// registered
    pub fn register(&mut self, rule: RuleRef) -> bool {
        if self.rule(rule.name()).is_some() {
            return false;
        }
        for kind in rule.node_kinds() {
            self.dispatch.entry(*kind).or_default().push(Arc::clone(&rule));
        }
        self.rules.push(rule);
        true
    }

    /// Rules dispatched for a node kind, in registration order
    pub fn get(&self, kind: NodeKind) -> &[RuleRef] {
        self.dispatch.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find a rule by name
    pub fn rule(&self, name: &str) -> Option<&RuleRef> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Names of all registered rules
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// A copy of this registry without the named rules
    pub fn without(&self, disabled: &IndexSet<String>) -> Self {
        let mut registry = Self::new();
        for rule in &self.rules {
            if !disabled.contains(rule.name()) {
                registry.register(Arc::clone(rule));
            }
        }
        registry
    }

    /// Run every rule registered for the node's kind
    pub fn dispatch<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        for rule in self.get(node.kind()) {
            log::trace!("rule {} on {:?}", rule.name(), node.kind());
            rule.check(node, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlvet_ast::Expr;

    struct Named(&'static str);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn node_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::Column, NodeKind::Literal]
        }

        fn check<'a>(&self, _node: Node<'a>, _ctx: &mut ValidationContext<'a>) {}
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = RuleRegistry::new();
        assert!(registry.register(Arc::new(Named("a"))));
        assert!(registry.register(Arc::new(Named("b"))));
        assert!(!registry.register(Arc::new(Named("a"))));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(NodeKind::Column).len(), 2);
        assert!(registry.get(NodeKind::Select).is_empty());
        assert_eq!(Node::Expr(&Expr::int(1)).kind(), NodeKind::Literal);
    }

    #[test]
    fn test_without_skips_disabled() {
        let mut registry = RuleRegistry::new();
        registry.register(Arc::new(Named("a")));
        registry.register(Arc::new(Named("b")));

        let disabled: IndexSet<String> = ["a".to_string()].into_iter().collect();
        let filtered = registry.without(&disabled);
        let names: Vec<_> = filtered.names().collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_standard_rule_names_are_unique() {
        let registry = RuleRegistry::standard();
        assert_eq!(registry.len(), crate::rules::standard_rules().len());
        assert!(registry.names().all(|n| n == n.to_lowercase() && !n.contains(' ')));
    }
}
