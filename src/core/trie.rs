//! Arena-backed storage for the compiled route trie.
//!
//! Nodes live in one flat `Vec` and reference each other by integer
//! handles, so traversal is pointer-chase-free and the whole structure
//! serializes naturally into the flat cache archive. A node is a tagged
//! union: one kind discriminator (root / literal / variable) plus the
//! shared child, route and host-trie fields.
//!
//! Host mini-tries live in the same arena, rooted at a `Root`-kind node
//! hanging off a path terminal's `host_root`.

use std::{collections::HashMap, sync::Arc};

use super::{route::Route, template::RouteVariable};

/// Handle to a node in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a route stored alongside the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub(crate) u32);

impl RouteId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kind discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum TrieNodeKind {
    /// The root of the path trie or of a nested host trie.
    Root,
    /// An exact segment value. Never contains the segment separator.
    Literal(String),
    /// The single variable slot at this depth.
    Variable(RouteVariable),
}

/// One trie node. `routes` is non-empty only on nodes reachable by fully
/// consuming a path (or host); `host_root` points at the nested host trie
/// evaluated lazily after the path already matched.
#[derive(Debug, Clone, PartialEq)]
pub struct TrieNode {
    pub kind: TrieNodeKind,
    pub literal_children: HashMap<String, NodeId>,
    pub variable_child: Option<NodeId>,
    pub routes: Vec<RouteId>,
    pub host_root: Option<NodeId>,
}

impl TrieNode {
    pub(crate) fn new(kind: TrieNodeKind) -> Self {
        Self {
            kind,
            literal_children: HashMap::new(),
            variable_child: None,
            routes: Vec::new(),
            host_root: None,
        }
    }

    /// Whether matching may stop here: the node carries routes directly
    /// or routes behind a host restriction.
    pub fn is_terminal(&self) -> bool {
        !self.routes.is_empty() || self.host_root.is_some()
    }

    /// The variable slot, if this is a variable node.
    pub fn variable(&self) -> Option<&RouteVariable> {
        match &self.kind {
            TrieNodeKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }
}

/// The compiled, immutable prefix trie shared read-only across all
/// concurrent match operations. Built once per process (or loaded from a
/// cache) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
    routes: Vec<Arc<Route>>,
}

impl RouteTrie {
    /// An empty trie holding only the path root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new(TrieNodeKind::Root)],
            routes: Vec::new(),
        }
    }

    pub(crate) fn from_parts(nodes: Vec<TrieNode>, routes: Vec<Arc<Route>>) -> Self {
        Self { nodes, routes }
    }

    /// The path-trie root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TrieNode {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc_node(&mut self, kind: TrieNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TrieNode::new(kind));
        id
    }

    pub fn route(&self, id: RouteId) -> &Arc<Route> {
        &self.routes[id.index()]
    }

    pub(crate) fn add_route(&mut self, route: Route) -> RouteId {
        let id = RouteId(self.routes.len() as u32);
        self.routes.push(Arc::new(route));
        id
    }

    pub fn nodes(&self) -> &[TrieNode] {
        &self.nodes
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}
