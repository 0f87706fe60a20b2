// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cycle detection and root-cause attribution
//!
//! Only unregistered components and their blocking dependencies take part.
//! A blocking dependency with no unregistered provider is a missing leaf; a
//! walk that returns to a component already on its path is a cycle.

use super::{DependencyGraph, DependencyNode};
use crate::component::DependencyKind;
use serde::Serialize;
use std::collections::HashSet;

/// Components that (transitively) require each other, in walk order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub components: Vec<String>,
}

impl Cycle {
    pub fn contains(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// A blocking dependency nothing in the graph can provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    /// Service filter or configuration pid
    pub name: String,
    pub kind: DependencyKind,
    pub required_by: String,
}

/// Why one unregistered component cannot register
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCause {
    pub component: String,
    /// Unregistered components reached by the walk, starting component first
    pub unregistered: Vec<String>,
    /// Missing leaves, one per distinct name and kind
    pub missing: Vec<MissingDependency>,
    pub cycles: Vec<Cycle>,
}

impl RootCause {
    /// Blocked only by a cycle, with no missing leaf behind it
    pub fn is_cycle(&self) -> bool {
        self.missing.is_empty() && !self.cycles.is_empty()
    }

    pub fn missing_names(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Whole-graph report: every unregistered component, every cycle, every
/// missing dependency
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Diagnosis {
    pub unregistered: Vec<String>,
    pub cycles: Vec<Cycle>,
    pub missing: Vec<MissingDependency>,
}

impl Diagnosis {
    pub fn of(graph: &DependencyGraph) -> Self {
        Self {
            unregistered: graph
                .components(super::ComponentScope::Unregistered)
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
            cycles: graph.cycles(),
            missing: graph.missing(None),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.unregistered.is_empty()
    }

    pub fn missing_of(&self, kind: DependencyKind) -> Vec<&MissingDependency> {
        self.missing.iter().filter(|m| m.kind == kind).collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Undiscovered,
    Discovered,
    Processed,
}

struct CycleSearch<'a> {
    graph: &'a DependencyGraph,
    marks: Vec<Mark>,
    parent: Vec<Option<usize>>,
    cycles: Vec<Cycle>,
}

impl CycleSearch<'_> {
    /// Depth-first from `root` on an explicit stack of pending providers
    fn visit(&mut self, root: usize) {
        self.marks[root] = Mark::Discovered;
        let mut stack = vec![(root, self.providers(root))];
        while let Some((n, pending)) = stack.last_mut() {
            let n = *n;
            match pending.next() {
                None => {
                    self.marks[n] = Mark::Processed;
                    stack.pop();
                }
                Some(s) => match self.marks[s] {
                    Mark::Undiscovered => {
                        self.parent[s] = Some(n);
                        self.marks[s] = Mark::Discovered;
                        stack.push((s, self.providers(s)));
                    }
                    Mark::Discovered => self.record(n, s),
                    Mark::Processed => {}
                },
            }
        }
    }

    fn providers(&self, n: usize) -> std::vec::IntoIter<usize> {
        self.graph
            .blocked_by(n)
            .into_iter()
            .flat_map(|(_, providers)| providers)
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Back edge `n -> s`: follow parents from `n` up to `s`
    fn record(&mut self, n: usize, s: usize) {
        let mut members = vec![n];
        let mut p = n;
        while p != s {
            match self.parent[p] {
                Some(up) => {
                    p = up;
                    members.push(p);
                }
                None => break,
            }
        }
        members.reverse();
        self.cycles.push(Cycle {
            components: members
                .into_iter()
                .map(|i| self.graph.node(i).name.clone())
                .collect(),
        });
    }
}

struct RootCauseWalk<'a> {
    graph: &'a DependencyGraph,
    path: Vec<usize>,
    visited: HashSet<usize>,
    cause: RootCause,
}

/// What remains to do for a component on the walk's path
enum Step<'a> {
    Missing {
        dependency: &'a DependencyNode,
        required_by: usize,
    },
    Visit(usize),
}

impl<'a> RootCauseWalk<'a> {
    fn walk(&mut self, start: usize) {
        let mut stack: Vec<std::vec::IntoIter<Step<'a>>> = self.enter(start).into_iter().collect();
        while let Some(steps) = stack.last_mut() {
            match steps.next() {
                None => {
                    stack.pop();
                    self.path.pop();
                }
                Some(Step::Missing {
                    dependency,
                    required_by,
                }) => self.note_missing(dependency, required_by),
                Some(Step::Visit(provider)) => stack.extend(self.enter(provider)),
            }
        }
    }

    /// Put `n` on the path and list its steps; `None` for a component
    /// already on the path (a cycle) or already walked
    fn enter(&mut self, n: usize) -> Option<std::vec::IntoIter<Step<'a>>> {
        let graph = self.graph;
        if let Some(pos) = self.path.iter().position(|&p| p == n) {
            let cycle = Cycle {
                components: self.path[pos..]
                    .iter()
                    .map(|&i| graph.node(i).name.clone())
                    .collect(),
            };
            if !self.cause.cycles.contains(&cycle) {
                self.cause.cycles.push(cycle);
            }
            return None;
        }
        if !self.visited.insert(n) {
            return None;
        }

        self.cause.unregistered.push(graph.node(n).name.clone());
        self.path.push(n);
        let mut steps = Vec::new();
        for (dependency, providers) in graph.blocked_by(n) {
            if providers.is_empty() {
                steps.push(Step::Missing {
                    dependency,
                    required_by: n,
                });
            }
            steps.extend(providers.into_iter().map(Step::Visit));
        }
        Some(steps.into_iter())
    }

    fn note_missing(&mut self, dependency: &DependencyNode, required_by: usize) {
        let known = self
            .cause
            .missing
            .iter()
            .any(|m| m.name == dependency.target && m.kind == dependency.kind);
        if !known {
            self.cause.missing.push(MissingDependency {
                name: dependency.target.clone(),
                kind: dependency.kind,
                required_by: self.graph.node(required_by).name.clone(),
            });
        }
    }
}

impl DependencyGraph {
    /// Cycles among unregistered components, each reported once
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut search = CycleSearch {
            graph: self,
            marks: vec![Mark::Undiscovered; self.len()],
            parent: vec![None; self.len()],
            cycles: Vec::new(),
        };
        for n in 0..self.len() {
            if search.marks[n] == Mark::Undiscovered && !self.node(n).registered {
                search.visit(n);
            }
        }
        search.cycles
    }

    /// Blocking dependencies with no unregistered provider, optionally of
    /// one kind, in registration order
    pub fn missing(&self, kind: Option<DependencyKind>) -> Vec<MissingDependency> {
        (0..self.len())
            .flat_map(move |n| {
                self.blocked_by(n)
                    .into_iter()
                    .filter(move |(dep, providers)| {
                        providers.is_empty()
                            && match kind {
                                Some(k) => k == dep.kind,
                                None => true,
                            }
                    })
                    .map(move |(dep, _)| MissingDependency {
                        name: dep.target.clone(),
                        kind: dep.kind,
                        required_by: self.node(n).name.clone(),
                    })
            })
            .collect()
    }

    /// Walk from an unregistered component to what ultimately blocks it.
    /// `None` if the component is unknown or registered.
    pub fn root_cause(&self, component: &str) -> Option<RootCause> {
        let start = self.index_of(component)?;
        if self.node(start).registered {
            return None;
        }
        let mut walk = RootCauseWalk {
            graph: self,
            path: Vec::new(),
            visited: HashSet::new(),
            cause: RootCause {
                component: component.to_string(),
                unregistered: Vec::new(),
                missing: Vec::new(),
                cycles: Vec::new(),
            },
        };
        walk.walk(start);
        Some(walk.cause)
    }
}

#[cfg(test)]
#[path = "diagnosis_tests.rs"]
mod tests;
