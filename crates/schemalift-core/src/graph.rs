use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::Table;

/// Creation order for interleaved tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterleaveOrder {
    /// Table ids, parents before children. Tables caught in a cycle are
    /// appended at the end in id order.
    pub order: Vec<String>,
    pub cycle: Option<Vec<String>>,
}

/// Build a deterministic parent-first ordering of the given tables.
pub fn build_interleave_order(tables: &BTreeMap<String, Table>) -> InterleaveOrder {
    let graph = build_adjacency(tables);

    match toposort(&graph) {
        Ok(order) => InterleaveOrder { order, cycle: None },
        Err((mut order, cycle)) => {
            order.extend(cycle.iter().cloned());
            InterleaveOrder {
                order,
                cycle: Some(cycle),
            }
        }
    }
}

/// Tables in creation order.
pub fn table_order(tables: &BTreeMap<String, Table>) -> Vec<&Table> {
    build_interleave_order(tables)
        .order
        .iter()
        .filter_map(|id| tables.get(id))
        .collect()
}

fn build_adjacency(tables: &BTreeMap<String, Table>) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (id, table) in tables {
        graph.entry(id.clone()).or_default();

        if let Some(interleave) = &table.interleave {
            // Unknown parents are reported by validation, not ordered here.
            if tables.contains_key(&interleave.parent) {
                graph
                    .entry(interleave.parent.clone())
                    .or_default()
                    .insert(id.clone());
            }
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Vec<String>, (Vec<String>, Vec<String>)> {
    let mut indegree: BTreeMap<String, usize> =
        graph.keys().map(|node| (node.clone(), 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(target.clone()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<String> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then(|| node.clone()))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.clone());

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(target.clone());
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<String> = indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect();
        Err((order, cycle_nodes))
    }
}
