//! ExecutionPlan - the ordered list of products one run walks.
//!
//! The plan is computed from the registry alone, before anything runs.
//! Ordering rules, in priority order:
//! 1. every dependency comes before its dependents
//! 2. before-legacy products, then the legacy block, then the rest
//! 3. among otherwise independent products, registration order

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

use crate::core::error::ConfigurationError;
use crate::core::product::PhaseBlock;
use crate::core::registry::ProductRegistry;

/// One product's slot in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedProduct {
    /// Product name
    pub name: String,

    /// Block the product runs in
    pub block: PhaseBlock,

    /// Declared dependencies
    pub dependencies: Vec<String>,

    /// Registration index in the registry
    #[serde(skip)]
    pub registration: usize,
}

/// Deterministic, topologically sorted product order for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    products: Vec<PlannedProduct>,
}

impl ExecutionPlan {
    /// Compute the plan for every registered product.
    pub fn build(registry: &ProductRegistry) -> Result<Self, ConfigurationError> {
        // Edges point from a dependency to its dependent.
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(registry.len(), 0);
        let nodes: Vec<NodeIndex> = (0..registry.len()).map(|i| graph.add_node(i)).collect();
        let mut planned = Vec::with_capacity(registry.len());

        for (idx, product) in registry.iter().enumerate() {
            let block = PhaseBlock::of(product);

            for dependency in product.dependencies() {
                let dep_idx = registry.position(dependency).ok_or_else(|| {
                    ConfigurationError::MissingDependency {
                        product: product.name().to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;

                let dep_block = registry
                    .get_index(dep_idx)
                    .map(PhaseBlock::of)
                    .unwrap_or(block);
                if dep_block > block {
                    return Err(ConfigurationError::PhaseOrdering {
                        product: product.name().to_string(),
                        product_block: block,
                        dependency: dependency.to_string(),
                        dependency_block: dep_block,
                    });
                }

                graph.update_edge(nodes[dep_idx], nodes[idx], ());
            }

            planned.push(PlannedProduct {
                name: product.name().to_string(),
                block,
                dependencies: product
                    .dependencies()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                registration: idx,
            });
        }

        let order = kahn_order(&graph, &planned)?;

        let mut slots: Vec<Option<PlannedProduct>> = planned.into_iter().map(Some).collect();
        let products = order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        Ok(ExecutionPlan { products })
    }

    /// Planned products in execution order.
    pub fn products(&self) -> &[PlannedProduct] {
        &self.products
    }

    /// Product names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Plan index of a product.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.products.iter().position(|p| p.name == name)
    }

    /// Products belonging to one block, in execution order.
    pub fn block(&self, block: PhaseBlock) -> impl Iterator<Item = &PlannedProduct> + '_ {
        self.products.iter().filter(move |p| p.block == block)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Kahn's algorithm, always emitting the ready product with the lowest
/// `(block, registration)` key.
///
/// Because no product depends on a later block, the lowest remaining block
/// always has a ready product, so blocks come out contiguous.
fn kahn_order(
    graph: &DiGraph<usize, ()>,
    planned: &[PlannedProduct],
) -> Result<Vec<usize>, ConfigurationError> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<(PhaseBlock, usize)>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| Reverse((planned[graph[n]].block, graph[n])))
        .collect();

    let mut order = Vec::with_capacity(planned.len());

    while let Some(Reverse((_, idx))) = ready.pop() {
        order.push(idx);

        for dependent in graph.neighbors_directed(NodeIndex::new(idx), Direction::Outgoing) {
            let slot = &mut in_degree[dependent.index()];
            *slot -= 1;
            if *slot == 0 {
                let dep_idx = graph[dependent];
                ready.push(Reverse((planned[dep_idx].block, dep_idx)));
            }
        }
    }

    if order.len() < planned.len() {
        let cycle = find_cycle(graph, &in_degree);
        return Err(ConfigurationError::Cycle {
            products: cycle
                .into_iter()
                .map(|idx| planned[idx].name.clone())
                .collect(),
        });
    }

    Ok(order)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Extract one cycle among the nodes Kahn's algorithm could not order.
///
/// Every leftover node has a leftover dependency, so walking dependency
/// edges from any of them must close a loop. The result follows "depends
/// on" edges and repeats its first element at the end.
fn find_cycle(graph: &DiGraph<usize, ()>, in_degree: &[usize]) -> Vec<usize> {
    let mut marks: Vec<Mark> = in_degree
        .iter()
        .map(|&d| if d > 0 { Mark::Unvisited } else { Mark::Done })
        .collect();

    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(cycle) = visit(graph, start, &mut marks, &mut stack) {
            return cycle.into_iter().map(|n| graph[n]).collect();
        }
    }

    // Unreachable for a graph Kahn rejected; report what is left.
    in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d > 0)
        .map(|(idx, _)| idx)
        .collect()
}

fn visit(
    graph: &DiGraph<usize, ()>,
    node: NodeIndex,
    marks: &mut [Mark],
    stack: &mut Vec<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    marks[node.index()] = Mark::InProgress;
    stack.push(node);

    let mut dependencies: Vec<NodeIndex> = graph
        .neighbors_directed(node, Direction::Incoming)
        .collect();
    dependencies.sort();

    for dep in dependencies {
        match marks[dep.index()] {
            Mark::InProgress => {
                if let Some(start) = stack.iter().position(|&n| n == dep) {
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(dep);
                    return Some(cycle);
                }
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(graph, dep, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node.index()] = Mark::Done;
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingProduct;

    fn registry(products: Vec<RecordingProduct>) -> ProductRegistry {
        let mut registry = ProductRegistry::new();
        for product in products {
            registry.register(Box::new(product)).unwrap();
        }
        registry
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let registry = registry(vec![
            RecordingProduct::new("app").deps(&["lib", "util"]),
            RecordingProduct::new("lib").deps(&["util"]),
            RecordingProduct::new("util"),
        ]);

        let plan = ExecutionPlan::build(&registry).unwrap();
        assert_eq!(plan.names(), vec!["util", "lib", "app"]);

        for planned in plan.products() {
            let own = plan.position(&planned.name).unwrap();
            for dep in &planned.dependencies {
                assert!(plan.position(dep).unwrap() < own);
            }
        }
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let registry = registry(vec![
            RecordingProduct::new("a"),
            RecordingProduct::new("b").deps(&["a"]),
            RecordingProduct::new("c").deps(&["a"]),
        ]);

        let plan = ExecutionPlan::build(&registry).unwrap();
        assert_eq!(plan.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let registry = registry(vec![
            RecordingProduct::new("d"),
            RecordingProduct::new("c").deps(&["d"]),
            RecordingProduct::new("b"),
            RecordingProduct::new("a").deps(&["b", "c"]),
        ]);

        let first = ExecutionPlan::build(&registry).unwrap();
        let second = ExecutionPlan::build(&registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.names(), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_before_legacy_products_precede_legacy_block() {
        let registry = registry(vec![
            RecordingProduct::new("late"),
            RecordingProduct::new("compiler").legacy(),
            RecordingProduct::new("stdlib").legacy().deps(&["compiler"]),
            RecordingProduct::new("early").before_legacy(),
            RecordingProduct::new("earliest").before_legacy(),
        ]);

        let plan = ExecutionPlan::build(&registry).unwrap();
        assert_eq!(
            plan.names(),
            vec!["early", "earliest", "compiler", "stdlib", "late"]
        );

        let last_before = plan.block(PhaseBlock::BeforeLegacy).count() - 1;
        let first_legacy = plan.position("compiler").unwrap();
        assert!(last_before < first_legacy);
    }

    #[test]
    fn test_after_block_may_depend_on_legacy_block() {
        let registry = registry(vec![
            RecordingProduct::new("driver").deps(&["compiler"]),
            RecordingProduct::new("compiler").legacy(),
        ]);

        let plan = ExecutionPlan::build(&registry).unwrap();
        assert_eq!(plan.names(), vec!["compiler", "driver"]);
    }

    #[test]
    fn test_two_node_cycle_is_reported() {
        let registry = registry(vec![
            RecordingProduct::new("a").deps(&["b"]),
            RecordingProduct::new("b").deps(&["a"]),
        ]);

        let err = ExecutionPlan::build(&registry).unwrap_err();
        match err {
            ConfigurationError::Cycle { products } => {
                assert_eq!(products, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {}", other),
        }
    }

    #[test]
    fn test_cycle_behind_acyclic_prefix() {
        let registry = registry(vec![
            RecordingProduct::new("root"),
            RecordingProduct::new("x").deps(&["root", "z"]),
            RecordingProduct::new("y").deps(&["x"]),
            RecordingProduct::new("z").deps(&["y"]),
            RecordingProduct::new("leaf").deps(&["z"]),
        ]);

        match ExecutionPlan::build(&registry).unwrap_err() {
            ConfigurationError::Cycle { products } => {
                assert_eq!(products, vec!["x", "z", "y", "x"]);
            }
            other => panic!("expected cycle, got {}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let registry = registry(vec![RecordingProduct::new("a").deps(&["a"])]);

        match ExecutionPlan::build(&registry).unwrap_err() {
            ConfigurationError::Cycle { products } => assert_eq!(products, vec!["a", "a"]),
            other => panic!("expected cycle, got {}", other),
        }
    }

    #[test]
    fn test_missing_dependency() {
        let registry = registry(vec![RecordingProduct::new("alive").deps(&["z3"])]);

        let err = ExecutionPlan::build(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingDependency { ref product, ref dependency }
                if product == "alive" && dependency == "z3"
        ));
    }

    #[test]
    fn test_before_legacy_depending_on_legacy_is_rejected() {
        let registry = registry(vec![
            RecordingProduct::new("compiler").legacy(),
            RecordingProduct::new("tool").before_legacy().deps(&["compiler"]),
        ]);

        let err = ExecutionPlan::build(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::PhaseOrdering {
                product_block: PhaseBlock::BeforeLegacy,
                dependency_block: PhaseBlock::Legacy,
                ..
            }
        ));
    }

    #[test]
    fn test_builtin_plan() {
        let plan = ExecutionPlan::build(&ProductRegistry::builtin()).unwrap();
        assert_eq!(plan.names(), vec!["llvm", "z3", "alive", "swift"]);
    }

    #[test]
    fn test_empty_registry() {
        let plan = ExecutionPlan::build(&ProductRegistry::new()).unwrap();
        assert!(plan.is_empty());
    }
}
