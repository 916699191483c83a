//! Runtime route matching over the compiled trie.
//!
//! Matching is synchronous, single-pass and bounded by segment count: the
//! walker descends one trie level per path segment, preferring literal
//! children and falling back to the single variable slot. A non-match is
//! an ordinary value, never an error; the only allocations on the hot
//! path are the bindings handed back to the caller.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use super::{
    route::Route,
    trie::{NodeId, RouteId, RouteTrie},
};

/// The request scheme, as far as matching cares: whether the transport
/// satisfies HTTPS-only routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriScheme {
    Http,
    Https,
}

/// A successful match: the route plus every captured binding, including
/// contributed defaults and host-derived variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub route_vars: HashMap<String, String>,
}

/// The outcome of one match call. Failures are typed so the caller can
/// translate them into the right HTTP status (404 / 405 + `Allow` / …).
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched(RouteMatch),
    NotFound,
    MethodNotAllowed { allowed_methods: Vec<String> },
    HostMismatch,
    HttpsRequired,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn into_match(self) -> Option<RouteMatch> {
        match self {
            MatchResult::Matched(matched) => Some(matched),
            _ => None,
        }
    }
}

/// A route candidate visible at a path terminal, remembering whether it
/// arrived through the host trie (and therefore owns the host bindings).
struct Candidate {
    route_id: RouteId,
    host_restricted: bool,
}

/// The runtime matcher. Cheap to clone; the trie inside is shared
/// read-only and never locked.
#[derive(Debug, Clone)]
pub struct TrieRouteMatcher {
    trie: Arc<RouteTrie>,
}

impl TrieRouteMatcher {
    pub fn new(trie: Arc<RouteTrie>) -> Self {
        Self { trie }
    }

    /// Match assuming a secure transport (the common TLS-terminated
    /// deployment). Use [`match_route_with_scheme`](Self::match_route_with_scheme)
    /// when the original scheme is known.
    pub fn match_route(&self, method: &str, host: &str, path: &str) -> MatchResult {
        self.match_route_with_scheme(method, host, path, UriScheme::Https)
    }

    /// Match a `(method, host, path)` triple against the trie.
    pub fn match_route_with_scheme(
        &self,
        method: &str,
        host: &str,
        path: &str,
        scheme: UriScheme,
    ) -> MatchResult {
        let mut segments: Vec<&str> = path.split('/').collect();
        // A leading slash produces an empty first segment that is not a
        // real segment; every other empty segment (trailing slash, `//`)
        // is.
        if path.starts_with('/') {
            segments.remove(0);
        }

        let mut route_vars = HashMap::new();
        let Some(terminal) = self.walk(self.trie.root(), &segments, &mut route_vars) else {
            return MatchResult::NotFound;
        };

        self.resolve_terminal(terminal, method, host, scheme, route_vars)
    }

    /// Depth-first descent: literal child first, then the variable slot.
    /// A branch that dead-ends unwinds, removing any binding it made, so
    /// a sibling variable branch still sees clean state.
    fn walk(
        &self,
        node_id: NodeId,
        segments: &[&str],
        vars: &mut HashMap<String, String>,
    ) -> Option<NodeId> {
        let Some((head, rest)) = segments.split_first() else {
            return self.contribute_defaults(node_id, vars);
        };

        let node = self.trie.node(node_id);

        if let Some(&child) = node.literal_children.get(*head)
            && let Some(terminal) = self.walk(child, rest, vars)
        {
            return Some(terminal);
        }

        if let Some(child_id) = node.variable_child {
            let variable = self
                .trie
                .node(child_id)
                .variable()
                .expect("variable slot points at a variable node");
            // Rules run in declaration order right after capture; a
            // failing rule fails this depth outright.
            if variable.rules.iter().all(|rule| rule.passes(head)) {
                let previous = vars.insert(variable.name.clone(), (*head).to_string());
                if let Some(terminal) = self.walk(child_id, rest, vars) {
                    return Some(terminal);
                }
                match previous {
                    Some(value) => vars.insert(variable.name.clone(), value),
                    None => vars.remove(&variable.name),
                };
            }
        }

        None
    }

    /// The path is exhausted at `node_id`. Either it is already a
    /// terminal, or a chain of unvisited defaulted variable children
    /// leads to one, contributing their defaults into the bindings.
    fn contribute_defaults(
        &self,
        node_id: NodeId,
        vars: &mut HashMap<String, String>,
    ) -> Option<NodeId> {
        let mut current = node_id;
        let mut pending: Vec<(String, String)> = Vec::new();

        loop {
            let node = self.trie.node(current);
            if node.is_terminal() {
                vars.extend(pending);
                return Some(current);
            }
            let child_id = node.variable_child?;
            let variable = self
                .trie
                .node(child_id)
                .variable()
                .expect("variable slot points at a variable node");
            let default = variable.default_value.clone()?;
            pending.push((variable.name.clone(), default));
            current = child_id;
        }
    }

    /// Terminal semantics, in order: collect candidates (host-restricted
    /// ones first, after the lazy host walk), filter by method building
    /// the `Allow` union, gate HTTPS-only routes, and hand back the first
    /// survivor with its bindings.
    fn resolve_terminal(
        &self,
        terminal: NodeId,
        method: &str,
        host: &str,
        scheme: UriScheme,
        mut route_vars: HashMap<String, String>,
    ) -> MatchResult {
        let node = self.trie.node(terminal);

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut host_bindings: Option<HashMap<String, String>> = None;
        let mut host_failed = false;

        if let Some(host_root) = node.host_root {
            let host_lower = host.to_ascii_lowercase();
            let mut host_segments: Vec<&str> = host_lower.split('.').collect();
            host_segments.reverse();

            let mut bindings = HashMap::new();
            match self.walk(host_root, &host_segments, &mut bindings) {
                Some(host_terminal) if !self.trie.node(host_terminal).routes.is_empty() => {
                    candidates.extend(self.trie.node(host_terminal).routes.iter().map(
                        |&route_id| Candidate {
                            route_id,
                            host_restricted: true,
                        },
                    ));
                    host_bindings = Some(bindings);
                }
                _ => host_failed = true,
            }
        }

        candidates.extend(node.routes.iter().map(|&route_id| Candidate {
            route_id,
            host_restricted: false,
        }));

        if candidates.is_empty() {
            return if host_failed {
                MatchResult::HostMismatch
            } else {
                MatchResult::NotFound
            };
        }

        let method_upper = method.to_ascii_uppercase();
        let mut allowed: BTreeSet<String> = BTreeSet::new();
        let mut surviving: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            let route = self.trie.route(candidate.route_id);
            allowed.extend(route.http_methods.iter().cloned());
            if route.http_methods.contains(&method_upper) {
                surviving.push(candidate);
            }
        }

        if surviving.is_empty() {
            return MatchResult::MethodNotAllowed {
                allowed_methods: allowed.into_iter().collect(),
            };
        }

        let mut https_blocked = false;
        for candidate in surviving {
            let route = self.trie.route(candidate.route_id);
            if route.uri_template.is_https_only && scheme == UriScheme::Http {
                https_blocked = true;
                continue;
            }
            if candidate.host_restricted
                && let Some(bindings) = &host_bindings
            {
                route_vars.extend(bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            return MatchResult::Matched(RouteMatch {
                route: Arc::clone(route),
                route_vars,
            });
        }

        if https_blocked {
            MatchResult::HttpsRequired
        } else {
            MatchResult::NotFound
        }
    }
}
