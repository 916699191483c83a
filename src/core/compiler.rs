//! Compiles parsed routes into the shared prefix trie.
//!
//! Each route's path template becomes a root→…→terminal chain of nodes;
//! chains from independently compiled routes merge by unioning literal
//! children and reusing the single variable slot per depth. The merge is
//! what makes matching O(path-segment-count) instead of O(route-count).
//!
//! Determinism is a structural guarantee: a depth holds at most one
//! literal set and at most one variable slot, and reusing the slot
//! requires a structurally identical variable declaration. Anything else
//! fails compilation instead of silently reordering route priority.

use thiserror::Error;
use tracing::debug;

use super::{
    route::{Route, RouteCollection},
    template::Segment,
    trie::{NodeId, RouteId, RouteTrie, TrieNodeKind},
};

/// Compile-time failures. Fatal at startup; a trie is never built from a
/// collection that trips one of these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error(
        "conflicting variable segments at '{location}': ':{existing}' is already registered and does not match ':{incoming}'"
    )]
    AmbiguousVariable {
        location: String,
        existing: String,
        incoming: String,
    },
}

/// Builds one trie from many independently compiled route templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrieCompiler;

impl TrieCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile a whole collection into a fresh trie. Idempotent: equal
    /// collections produce structurally equal tries.
    pub fn compile(&self, collection: &RouteCollection) -> Result<RouteTrie, CompileError> {
        let mut trie = RouteTrie::new();
        for route in collection.iter() {
            self.insert_route(&mut trie, route.clone())?;
        }
        debug!(
            routes = collection.len(),
            nodes = trie.node_count(),
            "compiled route trie"
        );
        Ok(trie)
    }

    /// Insert one route: build/merge its path chain, then attach the
    /// route either directly at the path terminal or at the terminal of
    /// the nested host trie when the route restricts host.
    pub fn insert_route(
        &self,
        trie: &mut RouteTrie,
        route: Route,
    ) -> Result<RouteId, CompileError> {
        let path_segments = route.uri_template.path_segments.clone();
        let host_segments = route.uri_template.host_segments.clone();
        let route_id = trie.add_route(route);

        let mut current = trie.root();
        let mut location = String::new();
        for segment in &path_segments {
            location.push('/');
            location.push_str(&display_segment(segment));
            current = descend(trie, current, segment, &location, false)?;
        }

        match host_segments {
            Some(segments) => {
                let host_root = match trie.node(current).host_root {
                    Some(id) => id,
                    None => {
                        let id = trie.alloc_node(TrieNodeKind::Root);
                        trie.node_mut(current).host_root = Some(id);
                        id
                    }
                };
                let mut host_current = host_root;
                let mut host_location = format!("{location} @");
                for segment in &segments {
                    host_location.push('.');
                    host_location.push_str(&display_segment(segment));
                    host_current = descend(trie, host_current, segment, &host_location, true)?;
                }
                trie.node_mut(host_current).routes.push(route_id);
            }
            None => trie.node_mut(current).routes.push(route_id),
        }

        Ok(route_id)
    }
}

/// Move one level down from `parent`, creating or merging the child node
/// for `segment`. Host literals are folded to lowercase so host matching
/// is case-insensitive.
fn descend(
    trie: &mut RouteTrie,
    parent: NodeId,
    segment: &Segment,
    location: &str,
    case_insensitive: bool,
) -> Result<NodeId, CompileError> {
    match segment {
        Segment::Literal(value) => {
            let key = if case_insensitive {
                value.to_ascii_lowercase()
            } else {
                value.clone()
            };
            if let Some(&existing) = trie.node(parent).literal_children.get(&key) {
                return Ok(existing);
            }
            let child = trie.alloc_node(TrieNodeKind::Literal(key.clone()));
            trie.node_mut(parent).literal_children.insert(key, child);
            Ok(child)
        }
        Segment::Variable(variable) => {
            if let Some(existing_id) = trie.node(parent).variable_child {
                let existing = trie
                    .node(existing_id)
                    .variable()
                    .expect("variable slot points at a variable node");
                if *existing == *variable {
                    return Ok(existing_id);
                }
                return Err(CompileError::AmbiguousVariable {
                    location: location.to_string(),
                    existing: existing.name.clone(),
                    incoming: variable.name.clone(),
                });
            }
            let child = trie.alloc_node(TrieNodeKind::Variable(variable.clone()));
            trie.node_mut(parent).variable_child = Some(child);
            Ok(child)
        }
    }
}

fn display_segment(segment: &Segment) -> String {
    match segment {
        Segment::Literal(value) => value.clone(),
        Segment::Variable(variable) => format!(":{}", variable.name),
    }
}
