//! Response Parsing Tests
//!
//! Full documents from `tests/fixtures` parsed into model graphs.

use headless_content::models::{DatePrecision, LinkKind};
use headless_content::{
    parser, HasChildren, HasFields, Model, ModelKind, Parser, StrOptions, ThumbOptions,
    TypeRegistry,
};
use serde_json::{json, Value};

fn fixture(source: &str) -> Value {
    serde_json::from_str(source).unwrap()
}

fn page() -> Model {
    parser::create_model(&fixture(include_str!("fixtures/page.json")))
}

fn site() -> Model {
    parser::create_model(&fixture(include_str!("fixtures/site.json")))
}

// =============================================================================
// Page
// =============================================================================

#[test]
fn test_page_meta_and_link() {
    let model = page();
    assert_eq!(model.type_name(), "page");
    let page = model.as_page().unwrap();
    assert_eq!(page.link().unwrap().href(), "/blog/hello");
    assert_eq!(page.link().unwrap().label(), "Hello");
    assert_eq!(page.title(), Some("Hello"));
    assert_eq!(page.blueprint(), Some("article"));
    assert!(page.is_listed());
    assert_eq!(page.field("title").unwrap().value(), &json!("Hello"));
}

#[test]
fn test_date_prefers_full_datetime() {
    let model = page();
    let date = model.field("published").and_then(Model::as_date).unwrap();
    assert_eq!(date.precision(), Some(DatePrecision::DateTime));
    assert_eq!(date.timezone(), Some("Europe/Berlin"));
    assert_eq!(date.str(&StrOptions::default()), "2024-03-01 09:30");
    assert_eq!(
        model.field("published").unwrap().str(&StrOptions::default().format("%d.%m.%Y")),
        "01.03.2024"
    );
}

#[test]
fn test_rich_text_renders_in_order() {
    let model = page();
    let html = model.field("text").and_then(Model::as_html).unwrap();
    assert_eq!(
        html.render(),
        "<p>Read the <a href=\"/about\">about page</a>.</p><hr>"
    );
    let links = html.links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].kind(), LinkKind::Page);
    assert_eq!(html.text(), "Read the about page.");
}

#[test]
fn test_file_thumb_is_derived_on_demand() {
    let model = page();
    let file = model.field("cover").and_then(Model::as_file).unwrap();
    assert!(file.is_image());
    assert_eq!(file.link().unwrap().label(), "cover.jpg");

    let attrs = file.thumb(&ThumbOptions::new().width(400));
    assert_eq!(
        attrs.src.as_deref(),
        Some("https://cdn.example.com/media/cover-400x225.jpg")
    );
    assert_eq!((attrs.width, attrs.height), (Some(400), Some(225)));
    assert_eq!(attrs.alt.as_deref(), Some("Sunrise"));

    let cropped = file.thumb(&ThumbOptions::new().width(300).height(300).crop(true).quality(60));
    assert!(cropped.src.unwrap().ends_with("cover-300x300-crop-q60.jpg"));
}

#[test]
fn test_structure_rows_are_entries() {
    let model = page();
    let links = model.field("links").and_then(Model::as_children).unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.entries().iter().all(|e| e.type_name() == "entry"));

    let docs = links.first().unwrap().field("target").unwrap().link().unwrap();
    assert_eq!(docs.kind(), LinkKind::Url);
    assert_eq!(docs.label(), "Docs");

    let mail = links.last().unwrap().field("target").unwrap().link().unwrap();
    assert_eq!(mail.kind(), LinkKind::Email);
    assert_eq!(mail.label(), "mailto:hi@example.com");
}

#[test]
fn test_blocks_collection() {
    let model = page();
    let blocks = model.field("blocks").and_then(Model::as_children).unwrap();
    assert_eq!(blocks.of_type("block").count(), 2);
    match blocks.find("b2") {
        Some(Model::Block(block)) => {
            assert_eq!(block.block_type(), Some("quote"));
            assert!(block.is_hidden());
            assert_eq!(block.field_str("text").as_deref(), Some("Hidden"));
        }
        other => panic!("expected block b2, got {:?}", other),
    }
}

#[test]
fn test_unknown_and_untyped_fields() {
    let model = page();
    let rating = model.field("rating").unwrap();
    assert_eq!(rating.type_name(), "base");
    assert_eq!(rating.value(), &json!(4));

    let extra = model.field("extra").unwrap();
    assert_eq!(extra.type_name(), "base");
    assert_eq!(extra.value(), &json!({ "nested": [1, 2, 3] }));
}

#[test]
fn test_registered_alias_is_used() {
    let mut registry = TypeRegistry::new();
    registry.register_model("stars", ModelKind::Number);
    let model = Parser::new(&registry).create_model(&fixture(include_str!("fixtures/page.json")));

    let rating = model.field("rating").unwrap();
    assert_eq!(rating.type_name(), "stars");
    assert_eq!(rating.kind(), ModelKind::Number);
    assert_eq!(rating.str(&StrOptions::default().decimals(1)), "4.0");
}

// =============================================================================
// Site
// =============================================================================

#[test]
fn test_site_languages() {
    let model = site();
    let Model::Site(site) = &model else {
        panic!("expected site, got {}", model.type_name());
    };
    assert_eq!(site.title(), Some("Example"));

    let languages = site.languages();
    assert_eq!(languages.len(), 2);
    assert!(languages[0].is_default());
    assert_eq!(languages[0].locale(), Some("en_US"));
    assert_eq!(languages[1].direction(), "rtl");
}

#[test]
fn test_pagination_window() {
    let model = site();
    let children = model.field("children").and_then(Model::as_collection).unwrap();
    let pagination = children.pagination().unwrap();
    assert_eq!(pagination.total, 5);
    assert!(!children.has_prev(1));
    assert!(children.has_next(1));
    assert!(children.has_next(2));
    assert!(!children.has_next(3));
    assert_eq!(pagination.next_set(), Some(2));
    assert!(children.first().unwrap().as_page().unwrap().is_home());
}

// =============================================================================
// Generic walk
// =============================================================================

#[test]
fn test_parse_mixed_document() {
    let parsed = parser::parse(&json!({
        "site": fixture(include_str!("fixtures/site.json")),
        "pages": [fixture(include_str!("fixtures/page.json"))],
        "count": 1
    }));

    let site = parsed.get("site").and_then(|p| p.as_model()).unwrap();
    assert_eq!(site.type_name(), "site");
    let pages = parsed.get("pages").and_then(|p| p.as_list()).unwrap();
    assert_eq!(pages[0].as_model().unwrap().type_name(), "page");
    assert_eq!(
        parsed.get("count"),
        Some(&headless_content::Parsed::Scalar(json!(1)))
    );
}
