//! Integration tests for orgchem-router
//!
//! Tests are organized by feature area and cover:
//! - Precedence of the static routes
//! - Normalization (suffixes, trailing slashes, base prefix)
//! - Purity and idempotence of resolution

use orgchem_router::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Route Precedence
// ============================================================================

#[rstest]
#[case("/", RouteKind::Home)]
#[case("", RouteKind::Home)]
#[case("/lessons/alcohols", RouteKind::Lesson)]
#[case("/lessons/alcohols/", RouteKind::Lesson)]
#[case("/about", RouteKind::About)]
#[case("/about.html", RouteKind::About)]
#[case("/contact/", RouteKind::Contact)]
#[case("/unknown-page", RouteKind::Generic)]
#[case("/lessons", RouteKind::Generic)]
#[case("/about/team", RouteKind::Generic)]
fn test_route_kinds(#[case] path: &str, #[case] expected: RouteKind) {
    assert_eq!(resolve(path).kind(), expected);
}

#[test]
fn test_lesson_params() {
    let m = resolve("/lessons/carboxylicacids.html");
    assert_eq!(m.path, "/lessons/carboxylicacids");
    assert_eq!(m.param("topic"), Some("carboxylicacids"));
    assert_eq!(m.page.topic(), Some("carboxylicacids"));
    assert!(m.is_lesson());
}

#[test]
fn test_generic_page_name() {
    let m = resolve("/unknown-page");
    assert_eq!(
        m.page,
        Page::Generic {
            page_name: "unknown-page".to_string()
        }
    );
    assert_eq!(m.param("page"), Some("unknown-page"));
}

#[test]
fn test_nested_generic_page_name() {
    let m = resolve("/guides/naming/");
    assert_eq!(m.param("page"), Some("guides/naming"));
}

#[test]
fn test_exact_matches_are_not_prefixes() {
    // "/aboutus" must not be treated as About
    assert_eq!(resolve("/aboutus").kind(), RouteKind::Generic);
    assert_eq!(resolve("/contacts").kind(), RouteKind::Generic);
}

// ============================================================================
// Base Path
// ============================================================================

#[test]
fn test_route_table_base_path() {
    let table = RouteTable::with_base_path("/organic");
    assert_eq!(table.resolve("/organic").kind(), RouteKind::Home);
    assert_eq!(table.resolve("/organic/").kind(), RouteKind::Home);
    assert_eq!(
        table.resolve("/organic/lessons/ketones").param("topic"),
        Some("ketones")
    );
    // Paths outside the base resolve as-is
    assert_eq!(table.resolve("/about").kind(), RouteKind::About);
}

#[test]
fn test_route_table_without_base() {
    let table = RouteTable::new();
    assert_eq!(table.base_path(), "");
    assert_eq!(table.app_path("/phenols.html"), "/phenols");
    assert_eq!(table.routes().len(), 5);
}

// ============================================================================
// Purity and Idempotence
// ============================================================================

#[rstest]
#[case("/lessons/ethers/")]
#[case("/x.html/")]
#[case("/about.html")]
#[case("")]
#[case("//")]
#[case("/lessons//ethers")]
#[case("/contact/.html")]
fn test_resolve_normalize_idempotent(#[case] path: &str) {
    let normalized = normalize_path(path);
    assert_eq!(resolve(&normalized), resolve(path));
}

#[test]
fn test_resolve_is_pure() {
    let first = resolve("/lessons/amines");
    let _ = resolve("/about");
    let second = resolve("/lessons/amines");
    assert_eq!(first, second);
}

#[test]
fn test_lesson_path_round_trip() {
    let path = lesson_path("haloarenes");
    assert_eq!(resolve(&path).param("topic"), Some("haloarenes"));
}
