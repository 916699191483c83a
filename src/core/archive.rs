//! Versioned flat archive format for compiled tries.
//!
//! Instead of opaque whole-graph serialization, a trie is persisted as a
//! plain array of parent-indexed node records plus the route table:
//! stable, portable, and inspectable. Rule instances are not serialized
//! at all — the written rule applications are, and they are re-resolved
//! through the [`RuleFactory`] on load, so custom rules survive the round
//! trip as long as their factories are registered.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    route::Route,
    rules::{RuleApplication, RuleFactory, RuleFactoryError},
    template::RouteVariable,
    trie::{NodeId, RouteId, RouteTrie, TrieNode, TrieNodeKind},
};

/// Bump on any incompatible change to the record layout.
pub const TRIE_ARCHIVE_VERSION: u32 = 1;

/// Decode failures. An archive that trips one of these is corrupt and is
/// reported as a hard cache error, never silently recompiled around.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ArchiveError {
    #[error("unsupported trie archive version {found} (expected {TRIE_ARCHIVE_VERSION})")]
    VersionMismatch { found: u32 },

    #[error("archive has no root node")]
    MissingRoot,

    #[error("node record {index} links to invalid parent {parent}")]
    InvalidParent { index: usize, parent: u32 },

    #[error("node record {index} references out-of-range route {route}")]
    InvalidRouteIndex { index: usize, route: u32 },

    #[error("node record {index} would occupy an already-taken child slot")]
    DuplicateChildSlot { index: usize },

    #[error("node record {index} has an inconsistent parent link")]
    InvalidLink { index: usize },

    #[error(transparent)]
    Rule(#[from] RuleFactoryError),
}

/// How a node hangs off its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// The path-trie root; carries no parent.
    Root,
    /// A literal or variable child of its parent.
    Child,
    /// The root of the host trie nested under its parent.
    Host,
}

/// Node payload, mirroring [`TrieNodeKind`] minus resolved rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRecordKind {
    Root,
    Literal {
        value: String,
    },
    Variable {
        name: String,
        #[serde(default)]
        default_value: Option<String>,
        #[serde(default)]
        rule_applications: Vec<RuleApplication>,
    },
}

/// One flat node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub parent: Option<u32>,
    pub link: LinkKind,
    pub kind: NodeRecordKind,
    #[serde(default)]
    pub routes: Vec<u32>,
}

/// The complete archive: version, route table, node records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrieArchive {
    pub version: u32,
    pub routes: Vec<Route>,
    pub nodes: Vec<NodeRecord>,
}

impl TrieArchive {
    /// Flatten a compiled trie into records. Children are emitted after
    /// their parents because the arena allocates them that way, which the
    /// decoder relies on to rule out cycles.
    pub fn from_trie(trie: &RouteTrie) -> Self {
        let nodes = trie.nodes();

        let mut parents: Vec<Option<(u32, LinkKind)>> = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            for &child in node.literal_children.values() {
                parents[child.index()] = Some((index as u32, LinkKind::Child));
            }
            if let Some(child) = node.variable_child {
                parents[child.index()] = Some((index as u32, LinkKind::Child));
            }
            if let Some(host) = node.host_root {
                parents[host.index()] = Some((index as u32, LinkKind::Host));
            }
        }

        let records = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let (parent, link) = match parents[index] {
                    Some((parent, link)) => (Some(parent), link),
                    None => (None, LinkKind::Root),
                };
                NodeRecord {
                    parent,
                    link,
                    kind: match &node.kind {
                        TrieNodeKind::Root => NodeRecordKind::Root,
                        TrieNodeKind::Literal(value) => NodeRecordKind::Literal {
                            value: value.clone(),
                        },
                        TrieNodeKind::Variable(variable) => NodeRecordKind::Variable {
                            name: variable.name.clone(),
                            default_value: variable.default_value.clone(),
                            rule_applications: variable.rule_applications.clone(),
                        },
                    },
                    routes: node.routes.iter().map(|route| route.0).collect(),
                }
            })
            .collect();

        Self {
            version: TRIE_ARCHIVE_VERSION,
            routes: trie.routes().iter().map(|route| (**route).clone()).collect(),
            nodes: records,
        }
    }

    /// Rebuild the trie, validating the version, every index, and every
    /// link, and re-resolving rule applications through `factory`.
    pub fn into_trie(self, factory: &RuleFactory) -> Result<RouteTrie, ArchiveError> {
        if self.version != TRIE_ARCHIVE_VERSION {
            return Err(ArchiveError::VersionMismatch {
                found: self.version,
            });
        }
        if self.nodes.is_empty() {
            return Err(ArchiveError::MissingRoot);
        }

        let mut routes = Vec::with_capacity(self.routes.len());
        for mut route in self.routes {
            route.uri_template.resolve_rules(factory)?;
            routes.push(Arc::new(route));
        }
        let route_count = routes.len() as u32;

        let mut nodes: Vec<TrieNode> = Vec::with_capacity(self.nodes.len());
        for (index, record) in self.nodes.iter().enumerate() {
            let kind = match &record.kind {
                NodeRecordKind::Root => TrieNodeKind::Root,
                NodeRecordKind::Literal { value } => TrieNodeKind::Literal(value.clone()),
                NodeRecordKind::Variable {
                    name,
                    default_value,
                    rule_applications,
                } => {
                    let mut variable = RouteVariable::new(name.clone());
                    variable.default_value = default_value.clone();
                    variable.rule_applications = rule_applications.clone();
                    variable.resolve_rules(factory)?;
                    TrieNodeKind::Variable(variable)
                }
            };

            let mut node = TrieNode::new(kind);
            for &route in &record.routes {
                if route >= route_count {
                    return Err(ArchiveError::InvalidRouteIndex { index, route });
                }
                node.routes.push(RouteId(route));
            }
            nodes.push(node);
        }

        for (index, record) in self.nodes.iter().enumerate() {
            match (record.parent, record.link) {
                (None, LinkKind::Root) => {
                    if index != 0 || !matches!(nodes[index].kind, TrieNodeKind::Root) {
                        return Err(ArchiveError::InvalidLink { index });
                    }
                }
                (Some(parent), link) => {
                    let parent_index = parent as usize;
                    // Parents must precede children; this is also what
                    // keeps a crafted archive from smuggling in a cycle.
                    if parent_index >= index {
                        return Err(ArchiveError::InvalidParent { index, parent });
                    }
                    let id = NodeId(index as u32);
                    match link {
                        LinkKind::Child => match nodes[index].kind.clone() {
                            TrieNodeKind::Literal(value) => {
                                if nodes[parent_index]
                                    .literal_children
                                    .insert(value, id)
                                    .is_some()
                                {
                                    return Err(ArchiveError::DuplicateChildSlot { index });
                                }
                            }
                            TrieNodeKind::Variable(_) => {
                                if nodes[parent_index].variable_child.is_some() {
                                    return Err(ArchiveError::DuplicateChildSlot { index });
                                }
                                nodes[parent_index].variable_child = Some(id);
                            }
                            TrieNodeKind::Root => {
                                return Err(ArchiveError::InvalidLink { index });
                            }
                        },
                        LinkKind::Host => {
                            if !matches!(nodes[index].kind, TrieNodeKind::Root)
                                || nodes[parent_index].host_root.is_some()
                            {
                                return Err(ArchiveError::InvalidLink { index });
                            }
                            nodes[parent_index].host_root = Some(id);
                        }
                        LinkKind::Root => {
                            return Err(ArchiveError::InvalidLink { index });
                        }
                    }
                }
                (None, _) => {
                    return Err(ArchiveError::InvalidLink { index });
                }
            }
        }

        Ok(RouteTrie::from_parts(nodes, routes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        compiler::TrieCompiler,
        parser::parse_uri_template,
        route::{Route, RouteAction, RouteCollection},
    };

    fn sample_trie() -> RouteTrie {
        let factory = RuleFactory::with_builtins();
        let routes = vec![
            Route::new(
                ["GET"],
                parse_uri_template("/users/:{id|int}", Some("api.example.com"), false, &factory)
                    .expect("parses"),
                RouteAction::new("users.show"),
            ),
            Route::new(
                ["GET", "POST"],
                parse_uri_template("/items", None, false, &factory).expect("parses"),
                RouteAction::new("items"),
            ),
        ];
        TrieCompiler::new()
            .compile(&RouteCollection::from(routes))
            .expect("compiles")
    }

    #[test]
    fn test_round_trip_is_structurally_equal() {
        let factory = RuleFactory::with_builtins();
        let trie = sample_trie();
        let archive = TrieArchive::from_trie(&trie);
        let rebuilt = archive.into_trie(&factory).expect("decodes");
        assert_eq!(trie, rebuilt);
    }

    #[test]
    fn test_round_trip_preserves_resolved_rules() {
        let factory = RuleFactory::with_builtins();
        let trie = sample_trie();
        let rebuilt = TrieArchive::from_trie(&trie)
            .into_trie(&factory)
            .expect("decodes");

        let users = rebuilt.node(rebuilt.root()).literal_children["users"];
        let id_node = rebuilt.node(users).variable_child.expect("variable slot");
        let variable = rebuilt.node(id_node).variable().expect("variable");
        assert_eq!(variable.rules.len(), 1);
        assert!(variable.rules[0].passes("42"));
        assert!(!variable.rules[0].passes("4a"));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let factory = RuleFactory::with_builtins();
        let mut archive = TrieArchive::from_trie(&sample_trie());
        archive.version = TRIE_ARCHIVE_VERSION + 1;
        assert_eq!(
            archive.into_trie(&factory).unwrap_err(),
            ArchiveError::VersionMismatch {
                found: TRIE_ARCHIVE_VERSION + 1
            }
        );
    }

    #[test]
    fn test_unresolvable_rule_slug_is_rejected() {
        let trie = sample_trie();
        let archive = TrieArchive::from_trie(&trie);
        // An empty factory knows no slugs, so the recorded `int`
        // application cannot be rebuilt.
        let empty = RuleFactory::new();
        assert!(matches!(
            archive.into_trie(&empty).unwrap_err(),
            ArchiveError::Rule(RuleFactoryError::UnknownSlug { .. })
        ));
    }

    #[test]
    fn test_out_of_range_route_index_is_rejected() {
        let factory = RuleFactory::with_builtins();
        let mut archive = TrieArchive::from_trie(&sample_trie());
        let record = archive
            .nodes
            .iter_mut()
            .find(|record| !record.routes.is_empty())
            .expect("some terminal record");
        record.routes[0] = 999;
        assert!(matches!(
            archive.into_trie(&factory).unwrap_err(),
            ArchiveError::InvalidRouteIndex { route: 999, .. }
        ));
    }

    #[test]
    fn test_forward_parent_link_is_rejected() {
        let factory = RuleFactory::with_builtins();
        let mut archive = TrieArchive::from_trie(&sample_trie());
        let last = archive.nodes.len() as u32 - 1;
        for record in archive.nodes.iter_mut().skip(1) {
            record.parent = Some(last);
        }
        assert!(matches!(
            archive.into_trie(&factory).unwrap_err(),
            ArchiveError::InvalidParent { .. }
        ));
    }
}
