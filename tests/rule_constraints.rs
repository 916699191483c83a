// Integration tests for constraint rules evaluated during traversal
#[cfg(test)]
mod tests {
    use dendrite::{
        MatchResult, RuleFactory, TrieCompiler, TrieRouteMatcher,
        config::{RouteDefinition, RoutingConfig},
    };
    use std::sync::Arc;

    fn definition(path: &str, handler: &str) -> RouteDefinition {
        RouteDefinition {
            path: path.to_string(),
            methods: vec!["GET".to_string()],
            handler: handler.to_string(),
            host: None,
            name: None,
            https_only: false,
            middlewares: Vec::new(),
        }
    }

    fn build_matcher(routes: Vec<RouteDefinition>) -> TrieRouteMatcher {
        let rules = RuleFactory::with_builtins();
        let collection = RoutingConfig { routes }
            .build_collection(&rules)
            .expect("valid route definitions");
        let trie = TrieCompiler::new().compile(&collection).expect("compiles");
        TrieRouteMatcher::new(Arc::new(trie))
    }

    #[test]
    fn test_int_rule_end_to_end() {
        let matcher = build_matcher(vec![definition("/users/:{id|int}", "users.show")]);

        let matched = matcher
            .match_route("GET", "example.com", "/users/42")
            .into_match()
            .expect("matches");
        assert_eq!(matched.route_vars["id"], "42");

        assert!(
            matcher
                .match_route("GET", "example.com", "/users/-1")
                .is_matched()
        );
        assert_eq!(
            matcher.match_route("GET", "example.com", "/users/4a"),
            MatchResult::NotFound
        );
    }

    #[test]
    fn test_alpha_rule_end_to_end() {
        let matcher = build_matcher(vec![definition("/tags/:{tag|alpha}", "tags.show")]);

        assert!(
            matcher
                .match_route("GET", "example.com", "/tags/abc")
                .is_matched()
        );
        for bad in ["abc1", "ab c", ""] {
            assert_eq!(
                matcher.match_route("GET", "example.com", &format!("/tags/{bad}")),
                MatchResult::NotFound,
                "expected '{bad}' to fail the alpha rule"
            );
        }
    }

    #[test]
    fn test_between_rule_bounds() {
        let inclusive = build_matcher(vec![definition(
            "/pages/:{num|between(1,10,true)}",
            "pages.inclusive",
        )]);
        assert!(
            inclusive
                .match_route("GET", "example.com", "/pages/1")
                .is_matched()
        );
        assert!(
            inclusive
                .match_route("GET", "example.com", "/pages/10")
                .is_matched()
        );

        let exclusive = build_matcher(vec![definition(
            "/pages/:{num|between(1,10,false)}",
            "pages.exclusive",
        )]);
        assert_eq!(
            exclusive.match_route("GET", "example.com", "/pages/1"),
            MatchResult::NotFound
        );
        assert_eq!(
            exclusive.match_route("GET", "example.com", "/pages/10"),
            MatchResult::NotFound
        );
        assert!(
            exclusive
                .match_route("GET", "example.com", "/pages/5")
                .is_matched()
        );
    }

    #[test]
    fn test_membership_and_uuid_rules() {
        let matcher = build_matcher(vec![
            definition("/posts/:{status|in(draft,published)}", "posts.by_status"),
            definition("/nodes/:{node|uuidv4}", "nodes.show"),
        ]);

        assert!(
            matcher
                .match_route("GET", "example.com", "/posts/draft")
                .is_matched()
        );
        assert_eq!(
            matcher.match_route("GET", "example.com", "/posts/archived"),
            MatchResult::NotFound
        );

        let id = uuid::Uuid::new_v4();
        assert!(
            matcher
                .match_route("GET", "example.com", &format!("/nodes/{id}"))
                .is_matched()
        );
        assert_eq!(
            matcher.match_route("GET", "example.com", "/nodes/not-a-uuid"),
            MatchResult::NotFound
        );
    }

    #[test]
    fn test_chained_rules_must_all_pass() {
        let matcher = build_matcher(vec![definition(
            "/batches/:{size|int|between(1,100)}",
            "batches",
        )]);

        assert!(
            matcher
                .match_route("GET", "example.com", "/batches/50")
                .is_matched()
        );
        // Passes `between` but not `int`.
        assert_eq!(
            matcher.match_route("GET", "example.com", "/batches/5.5"),
            MatchResult::NotFound
        );
        // Passes `int` but not `between`.
        assert_eq!(
            matcher.match_route("GET", "example.com", "/batches/500"),
            MatchResult::NotFound
        );
    }

    #[test]
    fn test_unregistered_slug_fails_registration() {
        let rules = RuleFactory::with_builtins();
        let config = RoutingConfig {
            routes: vec![definition("/ages/:{minAge|int|min(0)}", "ages")],
        };
        let err = config.build_collection(&rules).unwrap_err();
        assert!(err.to_string().contains("min"));
    }

    #[test]
    fn test_date_rule_round_trip() {
        let matcher = build_matcher(vec![definition(
            "/reports/:{day|date('%Y-%m-%d')}",
            "reports.daily",
        )]);

        assert!(
            matcher
                .match_route("GET", "example.com", "/reports/2024-06-01")
                .is_matched()
        );
        assert_eq!(
            matcher.match_route("GET", "example.com", "/reports/2024-6-1"),
            MatchResult::NotFound
        );
    }
}
