//! Property-based tests for quoting, sanitization and section ordering.

use hostkit_cli::domain::catalog::{Category, ServiceConfig};
use hostkit_cli::domain::sanitize::{sanitize_output, strip_ansi};
use hostkit_cli::domain::{
    ApplicationDefinition, SectionDefinition, SectionProviderType, shell_quote,
    validate_identifier,
};
use proptest::prelude::*;

fn app_with_orders(orders: &[i32], default_at: Option<usize>) -> ApplicationDefinition {
    let sections = orders
        .iter()
        .enumerate()
        .map(|(index, order)| SectionDefinition {
            id: format!("s{index}"),
            name: format!("Section {index}"),
            icon: "dot".to_string(),
            provider_type: SectionProviderType::Logs,
            is_default: default_at == Some(index),
            requires_running: false,
            order: *order,
        })
        .collect();
    ApplicationDefinition {
        id: "demo".to_string(),
        name: "Demo".to_string(),
        category: Category::System,
        theme_color: "#000000".to_string(),
        sections,
        service_config: ServiceConfig::default(),
        capabilities: std::collections::BTreeSet::new(),
    }
}

fn section_index(section: &SectionDefinition) -> usize {
    section.id[1..].parse().unwrap_or(usize::MAX)
}

proptest! {
    /// Stripping the outer quotes and folding `'\''` back gives the input.
    #[test]
    fn shell_quote_round_trips(value in ".{0,64}") {
        let quoted = shell_quote(&value);
        prop_assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
        let inner = &quoted[1..quoted.len() - 1];
        for piece in inner.split(r"'\''") {
            prop_assert!(!piece.contains('\''));
        }
        prop_assert_eq!(inner.replace(r"'\''", "'"), value);
    }

    /// Sanitizing twice changes nothing and never leaves an escape behind.
    #[test]
    fn sanitize_is_idempotent(raw in r"(\x1B\[[0-9;]{0,6}m|[ -~]|\n|\t|\r|\x07|\x1B){0,40}") {
        let once = sanitize_output(&raw);
        prop_assert!(!once.contains('\x1B'));
        prop_assert_eq!(sanitize_output(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }

    /// Text without escapes passes `strip_ansi` unchanged.
    #[test]
    fn strip_ansi_keeps_plain_text(text in "[ -~\n]{0,80}") {
        prop_assert_eq!(strip_ansi(&text), text);
    }

    /// Names matching the identifier grammar are accepted.
    #[test]
    fn identifier_grammar_accepted(name in "[A-Za-z0-9_][A-Za-z0-9_-]{0,62}") {
        prop_assert!(validate_identifier(&name).is_ok());
    }

    /// Any shell or SQL metacharacter is rejected.
    #[test]
    fn metacharacters_rejected(
        prefix in "[a-z]{0,8}",
        bad in prop::sample::select(vec![";", "'", "\"", "`", "$", " ", "/", "\\", "\n", "*"]),
        suffix in "[a-z]{0,8}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert!(validate_identifier(&name).is_err());
    }

    /// Sections come out by non-decreasing order; ties keep declaration order.
    #[test]
    fn sorted_sections_is_stable(orders in prop::collection::vec(-3i32..4, 1..12)) {
        let app = app_with_orders(&orders, None);
        let sorted = app.sorted_sections();
        prop_assert_eq!(sorted.len(), orders.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].order <= pair[1].order);
            if pair[0].order == pair[1].order {
                prop_assert!(section_index(pair[0]) < section_index(pair[1]));
            }
        }
    }

    /// The flagged section wins; without a flag the first declared one does.
    #[test]
    fn default_section_choice(
        orders in prop::collection::vec(-3i32..4, 1..12),
        flag in any::<prop::sample::Index>(),
        flagged in any::<bool>(),
    ) {
        let default_at = flagged.then(|| flag.index(orders.len()));
        let app = app_with_orders(&orders, default_at);
        let chosen = app.default_section().map(section_index);
        prop_assert_eq!(chosen, Some(default_at.unwrap_or(0)));
    }
}
