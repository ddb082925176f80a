//! Property tests for placeholder resolution

use chsync_vars::{ProcessEnv, ResolverOptions, VariableResolver};
use proptest::prelude::*;

fn empty_resolver(strict: bool) -> VariableResolver {
    VariableResolver::new(ResolverOptions {
        strict,
        process_env: ProcessEnv::Disabled,
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn inline_defaults_are_never_unresolved(
        names in prop::collection::vec("[A-Z_][A-Z0-9_]{0,8}", 1..5),
        defaults in prop::collection::vec("[a-z0-9 ./-]{0,12}", 5),
    ) {
        let text: String = names
            .iter()
            .zip(defaults.iter())
            .map(|(name, default)| format!("<${{{}:{}}}>", name, default))
            .collect();

        let result = empty_resolver(true).resolve(&text).unwrap();
        prop_assert!(result.unresolved_vars.is_empty());

        let expected: String = defaults
            .iter()
            .take(names.len())
            .map(|d| format!("<{}>", d))
            .collect();
        prop_assert_eq!(result.resolved, expected);
    }

    #[test]
    fn text_without_placeholders_is_unchanged(text in "[^$]{0,64}") {
        let result = empty_resolver(false).resolve(&text).unwrap();
        prop_assert_eq!(result.resolved, text);
        prop_assert!(result.unresolved_vars.is_empty());
    }
}
