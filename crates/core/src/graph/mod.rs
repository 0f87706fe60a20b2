// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component dependency graph
//!
//! Nodes are components and their declared dependencies. Edges run from a
//! component to each of its dependencies, and from a service dependency to
//! every component whose provided interfaces and properties match it. The
//! graph is rebuilt from a snapshot whenever a diagnosis is requested and is
//! never mutated afterwards.

mod diagnosis;
mod report;

pub use diagnosis::{Cycle, Diagnosis, MissingDependency, RootCause};

use crate::component::DependencyKind;
use crate::config::Dictionary;
use crate::service::ServiceFilter;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

/// A component as seen by the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentNode {
    pub name: String,
    pub provides: Vec<String>,
    pub properties: Dictionary,
    /// Whether the component currently has its services registered
    pub registered: bool,
    pub dependencies: Vec<DependencyNode>,
}

impl ComponentNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provides: Vec::new(),
            properties: Dictionary::new(),
            registered: false,
            dependencies: Vec::new(),
        }
    }

    pub fn provides(mut self, interface: impl Into<String>) -> Self {
        self.provides.push(interface.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<crate::config::Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn registered(mut self, registered: bool) -> Self {
        self.registered = registered;
        self
    }

    pub fn with_dependency(mut self, dependency: DependencyNode) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// One declared dependency of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// Slot name within the owning component
    pub name: String,
    /// Service filter text or configuration pid
    pub target: String,
    pub kind: DependencyKind,
    pub required: bool,
    pub available: bool,
}

impl DependencyNode {
    /// A required, unavailable service dependency
    pub fn service(name: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: filter.into(),
            kind: DependencyKind::Service,
            required: true,
            available: false,
        }
    }

    /// A required, unavailable configuration dependency
    pub fn configuration(name: impl Into<String>, pid: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Configuration,
            ..Self::service(name, pid)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Required and without a provider
    pub fn is_blocking(&self) -> bool {
        self.required && !self.available
    }
}

/// Which components a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentScope {
    #[default]
    All,
    Unregistered,
}

/// Which dependencies a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyScope {
    #[default]
    All,
    Unavailable,
    RequiredUnavailable,
}

impl DependencyScope {
    fn admits(self, dependency: &DependencyNode) -> bool {
        match self {
            DependencyScope::All => true,
            DependencyScope::Unavailable => !dependency.available,
            DependencyScope::RequiredUnavailable => dependency.is_blocking(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Component(usize),
    /// Index into the owning component's dependencies
    Dependency(usize),
}

/// Graph over a snapshot of components, queried in registration order
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    components: Vec<ComponentNode>,
    graph: DiGraph<Node, ()>,
    component_nodes: Vec<NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph; `components` order is the registration order
    pub fn build(components: Vec<ComponentNode>) -> Self {
        let mut graph = DiGraph::new();
        let component_nodes: Vec<NodeIndex> = (0..components.len())
            .map(|i| graph.add_node(Node::Component(i)))
            .collect();

        for (ci, component) in components.iter().enumerate() {
            for (di, dependency) in component.dependencies.iter().enumerate() {
                let node = graph.add_node(Node::Dependency(di));
                graph.add_edge(component_nodes[ci], node, ());
                if dependency.kind != DependencyKind::Service {
                    continue;
                }
                let filter = ServiceFilter::parse(&dependency.target);
                for (pi, provider) in components.iter().enumerate() {
                    if filter.matches(&provider.provides, &provider.properties) {
                        graph.add_edge(node, component_nodes[pi], ());
                    }
                }
            }
        }

        Self {
            components,
            graph,
            component_nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self, scope: ComponentScope) -> Vec<&ComponentNode> {
        self.components
            .iter()
            .filter(|c| scope == ComponentScope::All || !c.registered)
            .collect()
    }

    pub fn component(&self, name: &str) -> Option<&ComponentNode> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn dependencies_of(&self, component: &str, scope: DependencyScope) -> Vec<&DependencyNode> {
        self.component(component)
            .map(|c| c.dependencies.iter().filter(|d| scope.admits(d)).collect())
            .unwrap_or_default()
    }

    /// Components able to satisfy a component's dependency, in registration order
    pub fn providers_of(&self, component: &str, dependency: &str) -> Vec<&ComponentNode> {
        let Some(ci) = self.index_of(component) else {
            return Vec::new();
        };
        self.successors(self.component_nodes[ci])
            .into_iter()
            .find_map(|node| match self.graph[node] {
                Node::Dependency(di)
                    if self.components[ci].dependencies[di].name == dependency =>
                {
                    Some(node)
                }
                _ => None,
            })
            .map(|node| {
                self.successors(node)
                    .into_iter()
                    .filter_map(|p| self.component_at(p))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    pub(crate) fn node(&self, index: usize) -> &ComponentNode {
        &self.components[index]
    }

    /// Blocking dependencies of an unregistered component, each paired with
    /// the unregistered components that could provide it
    pub(crate) fn blocked_by(&self, index: usize) -> Vec<(&DependencyNode, Vec<usize>)> {
        if self.components[index].registered {
            return Vec::new();
        }
        self.successors(self.component_nodes[index])
            .into_iter()
            .filter_map(|node| match self.graph[node] {
                Node::Dependency(dependency) => {
                    let dep = &self.components[index].dependencies[dependency];
                    dep.is_blocking().then(|| {
                        let providers = self
                            .successors(node)
                            .into_iter()
                            .filter_map(|p| match self.graph[p] {
                                Node::Component(pi) if !self.components[pi].registered => Some(pi),
                                _ => None,
                            })
                            .collect();
                        (dep, providers)
                    })
                }
                Node::Component(_) => None,
            })
            .collect()
    }

    /// Outgoing neighbours in insertion order
    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        nodes.sort();
        nodes
    }

    fn component_at(&self, node: NodeIndex) -> Option<&ComponentNode> {
        match self.graph[node] {
            Node::Component(i) => Some(&self.components[i]),
            Node::Dependency { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
