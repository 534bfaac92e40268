//! In-process graph store over petgraph.
//!
//! Nodes are users, risks, and controls; edges are HAS_RISK,
//! SELECTED_CONTROL (user → control), and MITIGATES (control → risk).
//! Upserts are keyed, so replaying a write never duplicates a node or edge.

use std::collections::HashMap;
use std::sync::Mutex;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use aegis_core::errors::AegisResult;
use aegis_core::models::{ConfirmedControl, CoverageStat, Risk, UsageAggregate, UserProfile};
use aegis_core::traits::IGraphStore;

#[derive(Debug, Clone)]
enum Node {
    User {
        #[allow(dead_code)]
        id: String,
        domain: String,
    },
    Risk {
        #[allow(dead_code)]
        id: String,
        category: String,
    },
    Control {
        #[allow(dead_code)]
        id: String,
        control_code: String,
        title: String,
        annex_reference: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    HasRisk,
    SelectedControl,
    Mitigates,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    User(String),
    Risk(String),
    Control(String),
}

#[derive(Default)]
struct Inner {
    graph: StableDiGraph<Node, Edge>,
    index: HashMap<Key, NodeIndex>,
}

impl Inner {
    /// Insert or replace the node under `key`, keeping its edges.
    fn upsert_node(&mut self, key: Key, node: Node) -> NodeIndex {
        match self.index.get(&key) {
            Some(&ix) => {
                self.graph[ix] = node;
                ix
            }
            None => {
                let ix = self.graph.add_node(node);
                self.index.insert(key, ix);
                ix
            }
        }
    }

    fn ensure_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: Edge) {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| *e.weight() == edge);
        if !exists {
            self.graph.add_edge(from, to, edge);
        }
    }
}

/// Thread-safe in-memory graph store. Advisory: rebuildable from the
/// document store at any time.
pub struct MemoryGraphStore {
    inner: Mutex<Inner>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut inner)
    }

    pub fn node_count(&self) -> usize {
        self.with_inner(|inner| inner.graph.node_count())
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IGraphStore for MemoryGraphStore {
    fn upsert_user(&self, profile: &UserProfile) -> AegisResult<()> {
        self.with_inner(|inner| {
            inner.upsert_node(
                Key::User(profile.user_id.clone()),
                Node::User {
                    id: profile.user_id.clone(),
                    domain: profile.domain.clone(),
                },
            );
        });
        Ok(())
    }

    fn upsert_risk_node(&self, risk: &Risk) -> AegisResult<()> {
        self.with_inner(|inner| {
            let risk_ix = inner.upsert_node(
                Key::Risk(risk.id.clone()),
                Node::Risk {
                    id: risk.id.clone(),
                    category: risk.category.clone(),
                },
            );
            let user_ix = match inner.index.get(&Key::User(risk.user_id.clone())) {
                Some(&ix) => ix,
                None => inner.upsert_node(
                    Key::User(risk.user_id.clone()),
                    Node::User {
                        id: risk.user_id.clone(),
                        domain: String::new(),
                    },
                ),
            };
            inner.ensure_edge(user_ix, risk_ix, Edge::HasRisk);
        });
        Ok(())
    }

    fn ensure_risk_stub(&self, risk_id: &str, user_id: &str) -> AegisResult<()> {
        self.with_inner(|inner| {
            if inner.index.contains_key(&Key::Risk(risk_id.to_string())) {
                return;
            }
            let risk_ix = inner.upsert_node(
                Key::Risk(risk_id.to_string()),
                Node::Risk {
                    id: risk_id.to_string(),
                    category: String::new(),
                },
            );
            let user_key = Key::User(user_id.to_string());
            let user_ix = match inner.index.get(&user_key) {
                Some(&ix) => ix,
                None => inner.upsert_node(
                    user_key,
                    Node::User {
                        id: user_id.to_string(),
                        domain: String::new(),
                    },
                ),
            };
            inner.ensure_edge(user_ix, risk_ix, Edge::HasRisk);
        });
        Ok(())
    }

    fn upsert_control_node(&self, control: &ConfirmedControl) -> AegisResult<()> {
        let c = &control.control;
        self.with_inner(|inner| {
            inner.upsert_node(
                Key::Control(c.id.clone()),
                Node::Control {
                    id: c.id.clone(),
                    control_code: c.control_code.clone(),
                    title: c.title.clone(),
                    annex_reference: c.annex_reference.clone(),
                },
            );
        });
        Ok(())
    }

    fn link_mitigates(&self, control_id: &str, risk_id: &str) -> AegisResult<()> {
        self.with_inner(|inner| {
            let control = inner.index.get(&Key::Control(control_id.to_string())).copied();
            let risk = inner.index.get(&Key::Risk(risk_id.to_string())).copied();
            if let (Some(control_ix), Some(risk_ix)) = (control, risk) {
                inner.ensure_edge(control_ix, risk_ix, Edge::Mitigates);
            }
        });
        Ok(())
    }

    fn link_selected(&self, user_id: &str, control_id: &str) -> AegisResult<()> {
        self.with_inner(|inner| {
            let user = inner.index.get(&Key::User(user_id.to_string())).copied();
            let control = inner.index.get(&Key::Control(control_id.to_string())).copied();
            if let (Some(user_ix), Some(control_ix)) = (user, control) {
                inner.ensure_edge(user_ix, control_ix, Edge::SelectedControl);
            }
        });
        Ok(())
    }

    fn top_controls_for(
        &self,
        domain: &str,
        category: &str,
        limit: usize,
    ) -> AegisResult<Vec<UsageAggregate>> {
        let aggregates = self.with_inner(|inner| {
            // (code, title, reference) → usage count, over every
            // user-in-domain → control → risk-in-category path.
            let mut counts: HashMap<(String, String, String), u64> = HashMap::new();
            for user_ix in inner.graph.node_indices() {
                let Node::User { domain: d, .. } = &inner.graph[user_ix] else {
                    continue;
                };
                if d != domain {
                    continue;
                }
                for edge in inner.graph.edges_directed(user_ix, Direction::Outgoing) {
                    if *edge.weight() != Edge::SelectedControl {
                        continue;
                    }
                    let control_ix = edge.target();
                    let Node::Control {
                        control_code,
                        title,
                        annex_reference,
                        ..
                    } = &inner.graph[control_ix]
                    else {
                        continue;
                    };
                    let mitigates_matching = inner
                        .graph
                        .edges_directed(control_ix, Direction::Outgoing)
                        .filter(|e| *e.weight() == Edge::Mitigates)
                        .any(|e| {
                            matches!(&inner.graph[e.target()],
                                Node::Risk { category: c, .. } if c == category)
                        });
                    if mitigates_matching {
                        *counts
                            .entry((
                                control_code.clone(),
                                title.clone(),
                                annex_reference.clone(),
                            ))
                            .or_default() += 1;
                    }
                }
            }
            counts
        });

        let mut ranked: Vec<UsageAggregate> = aggregates
            .into_iter()
            .map(|((control_code, title, annex_reference), usage_count)| UsageAggregate {
                control_code,
                title,
                annex_reference,
                usage_count,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.control_code.cmp(&b.control_code))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn coverage_stats(&self, user_id: &str) -> AegisResult<Vec<CoverageStat>> {
        let stats = self.with_inner(|inner| {
            let mut per_category: HashMap<String, (u64, u64)> = HashMap::new();
            let Some(&user_ix) = inner.index.get(&Key::User(user_id.to_string())) else {
                return per_category;
            };
            for edge in inner.graph.edges_directed(user_ix, Direction::Outgoing) {
                if *edge.weight() != Edge::HasRisk {
                    continue;
                }
                let risk_ix = edge.target();
                let Node::Risk { category, .. } = &inner.graph[risk_ix] else {
                    continue;
                };
                let entry = per_category.entry(category.clone()).or_default();
                entry.0 += 1;
                // Controls mitigating this risk.
                entry.1 += inner
                    .graph
                    .edges_directed(risk_ix, Direction::Incoming)
                    .filter(|e| *e.weight() == Edge::Mitigates)
                    .count() as u64;
            }
            per_category
        });

        let mut out: Vec<CoverageStat> = stats
            .into_iter()
            .map(|(category, (total_risks, total_controls))| CoverageStat {
                category,
                total_risks,
                total_controls,
            })
            .collect();
        out.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(out)
    }
}
