//! End-to-end matching and link generation over a configured table.

mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;

use url_router::routing::{
    LinkParams, Params, Route, RouteError, RouteTable, UrlBuilder, ValidatorError, Validator, Validators,
    NO_ROUTE_ACTION,
};

fn table() -> RouteTable {
    url_router::config::build_table(&common::config()).unwrap()
}

#[rstest]
#[case("user/42", Some("user"), &[("id", "42")])]
#[case("blog", Some("blog"), &[])]
#[case("blog/5", Some("blog"), &[("page", "5")])]
#[case("files/a/b/c", Some("files"), &[("path", "a/b/c")])]
#[case("en/docs/intro", Some("docs"), &[("lang", "en"), ("page", "intro")])]
#[case("fr/doc/intro", Some("docs"), &[("lang", "fr"), ("page", "intro")])]
#[case("de/docs/intro", None, &[])]
#[case("user/abc", None, &[])]
#[case("user/42/extra", None, &[])]
fn test_selection(#[case] path: &str, #[case] name: Option<&str>, #[case] bound: &[(&str, &str)]) {
    let matched = table().select(path).unwrap();
    assert_eq!(matched.name(), name);

    let expected: Params = bound
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(matched.bound(), &expected);
    if name.is_none() {
        assert!(matched.is_not_found());
        assert_eq!(matched.action(), NO_ROUTE_ACTION);
    }
}

#[test]
fn test_blog_default_page() {
    let matched = table().select("blog").unwrap();
    assert_eq!(matched.get("page"), Some("1"));
}

#[test]
fn test_root_uses_index_route() {
    let matched = table().select("/").unwrap();
    assert_eq!(matched.name(), Some("index"));
    assert!(!matched.is_not_found());
}

#[test]
fn test_empty_table_sentinels() {
    let table = RouteTable::new();

    let root = table.select("/").unwrap();
    assert_eq!(root.action(), "Index");
    assert!(!root.is_not_found());

    let missing = table.select("missing").unwrap();
    assert_eq!(missing.action(), NO_ROUTE_ACTION);
    assert!(missing.is_not_found());
}

#[test]
fn test_exact_template_match_binds_nothing() {
    let route = Route::builder("user/:id").build().unwrap();
    assert_eq!(route.match_path("user/:id").unwrap(), Some(Params::new()));
    assert_eq!(route.match_path("").unwrap(), None);
}

#[test]
fn test_validator_fault_propagates() {
    let validators = Validators::new().with(
        "id",
        Validator::from_fn(|value, variable| Err(ValidatorError::new(variable, value, "backend down"))),
    );
    let route = Route::new("item/:id", Params::new(), validators).unwrap();
    let table = RouteTable::new().with_route("item", route);

    let err = table.select("item/1").unwrap_err();
    assert_eq!(err.variable, "id");
}

#[rstest]
#[case("user", &[("id", "42")], "/user/42")]
#[case("blog", &[], "/blog")]
#[case("docs", &[("lang", "EN"), ("page", "Intro")], "/en/doc/intro")]
#[case("files", &[("path", "a/b")], "/files/a/b")]
fn test_path_only_links(#[case] name: &str, #[case] params: &[(&str, &str)], #[case] expected: &str) {
    let link = params
        .iter()
        .fold(LinkParams::new().path_only(), |link, (k, v)| link.param(*k, *v));
    let url = UrlBuilder::relative().url_for(&table(), name, &link).unwrap();
    assert_eq!(url, expected);
}

#[test]
fn test_absolute_links_with_query_and_fragment() {
    let links = url_router::config::build_links(&common::config()).unwrap();
    let link = LinkParams::new()
        .param("id", "7")
        .query("tab", "posts")
        .query("empty", "")
        .fragment("top");
    assert_eq!(
        links.url_for(&table(), "user", &link).unwrap(),
        "https://example.com/app/user/7?tab=posts#top"
    );

    let keep = LinkParams::new().param("id", "7").query("flag", "").keep_empty();
    assert_eq!(
        links.url_for(&table(), "user", &keep).unwrap(),
        "https://example.com/app/user/7?flag"
    );
}

#[test]
fn test_unknown_route_name() {
    let err = UrlBuilder::relative()
        .url_for(&table(), "nope", &LinkParams::new())
        .unwrap_err();
    assert_eq!(err, RouteError::UnknownRoute("nope".into()));
}

#[test]
fn test_build_then_match_round_trip() {
    let table = table();
    let builder = UrlBuilder::relative();

    for (name, params) in [
        ("user", vec![("id", "42")]),
        ("blog", vec![("page", "3")]),
        ("files", vec![("path", "x/y/z")]),
    ] {
        let link = params
            .iter()
            .fold(LinkParams::new(), |link, (k, v)| link.param(*k, *v));
        let url = builder.url_for(&table, name, &link).unwrap();

        let matched = table.select(url.trim_start_matches('/')).unwrap();
        assert_eq!(matched.name(), Some(name), "round trip of {url}");
        for (k, v) in params {
            assert_eq!(matched.get(k), Some(v));
        }
    }
}
