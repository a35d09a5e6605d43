use std::fs;

use tempfile::TempDir;

use super::*;

const ICON: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="100" height="50"><defs><linearGradient id="grad"><stop offset="0"/></linearGradient></defs><style>#grad, .icon { opacity: 1 } .large{fill:url(#grad)}</style><use xlink:href="#grad"/><path class="icon large" fill="url('#grad')" d="M0 0h10"/></svg>
"##;

fn loaded(raw: &str) -> ScalableVectorGraphic {
    let counter = InstanceCounter::starting_at(0);
    let mut svg = ScalableVectorGraphic::with_counter(&counter);
    svg.parse(raw).unwrap();
    svg
}

fn suffix_of(svg: &ScalableVectorGraphic) -> String {
    svg.suffix().unwrap().to_string()
}

#[test]
fn test_viewbox_synthesized_from_dimensions() {
    let svg = loaded(r#"<svg width="100" height="50"><path/></svg>"#);
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg width="100" height="50" viewBox="0 0 100 50"><path/></svg>"#
    );
}

#[test]
fn test_existing_viewbox_untouched() {
    let raw = r#"<svg viewBox="0 0 24 24" width="100" height="50"/>"#;
    assert_eq!(loaded(raw).embed().unwrap(), raw);
}

#[test]
fn test_viewbox_needs_both_dimensions() {
    for raw in [
        r#"<svg width="100"/>"#,
        r#"<svg height="50"/>"#,
        r#"<svg width="" height="50"/>"#,
    ] {
        assert_eq!(loaded(raw).embed().unwrap(), raw);
    }
}

#[test]
fn test_viewbox_keeps_units() {
    let svg = loaded(r#"<svg width="10em" height="5em"/>"#);
    assert!(svg.embed().unwrap().contains(r#"viewBox="0 0 10em 5em""#));
}

#[test]
fn test_reference_integrity() {
    let svg = loaded(ICON);
    let s = suffix_of(&svg);
    let out = svg.embed().unwrap();

    assert!(out.contains(&format!(r#"<linearGradient id="grad{s}">"#)));
    assert!(out.contains(&format!(r##"xlink:href="#grad{s}""##)));
    // quotes inside attribute values are re-escaped
    assert!(out.contains(&format!(r##"fill="url(&#39;#grad{s}&#39;)""##)));
    assert!(out.contains(&format!("#grad{s}, .icon{s} {{ opacity: 1 }}")));
    assert!(out.contains(&format!(".large{s}{{fill:url(#grad{s})}}")));
}

#[test]
fn test_class_tokens_suffixed_independently() {
    let svg = loaded(r#"<svg><path class="icon large"/></svg>"#);
    let s = suffix_of(&svg);
    assert_eq!(
        svg.embed().unwrap(),
        format!(r#"<svg><path class="icon{s} large{s}"/></svg>"#)
    );
}

#[test]
fn test_plain_href_is_suffixed() {
    let svg = loaded(r##"<svg><a href="#top"/><a href="/about"/></svg>"##);
    let s = suffix_of(&svg);
    assert_eq!(
        svg.embed().unwrap(),
        format!(r##"<svg><a href="#top{s}"/><a href="/about"/></svg>"##)
    );
}

#[test]
fn test_output_has_no_prolog() {
    let out = loaded(ICON).embed().unwrap();
    assert!(out.starts_with("<svg "));
    assert!(out.ends_with("</svg>"));
    assert!(!out.contains("DOCTYPE"));
    assert!(!out.contains("<?xml"));
}

#[test]
fn test_reset_is_idempotent() {
    let mut svg = loaded(ICON);
    svg.reset().unwrap();
    let once = svg.embed().unwrap();
    svg.reset().unwrap().reset().unwrap();
    assert_eq!(svg.embed().unwrap(), once);
}

#[test]
fn test_reset_discards_edits() {
    let mut svg = loaded(ICON);
    let pristine = svg.embed().unwrap();
    svg.remove_attributes(["width", "height"])
        .unwrap()
        .remove_style("fill")
        .unwrap()
        .title("Edited")
        .unwrap();
    assert_ne!(svg.embed().unwrap(), pristine);

    svg.reset().unwrap();
    assert_eq!(svg.embed().unwrap(), pristine);
}

#[test]
fn test_remove_attributes_root_only() {
    let mut svg = loaded(r#"<svg width="1" height="2" id="a"><rect width="3"/></svg>"#);
    svg.remove_attributes(vec!["width".to_string(), "height".to_string()])
        .unwrap()
        .remove_attribute("missing")
        .unwrap();
    let s = suffix_of(&svg);
    assert_eq!(
        svg.embed().unwrap(),
        format!(r#"<svg id="a{s}" viewBox="0 0 1 2"><rect width="3"/></svg>"#)
    );
}

#[test]
fn test_remove_styles_everywhere() {
    let mut svg = loaded(
        r#"<svg viewBox="0 0 1 1" fill="red"><g style="fill:#fff;stroke:#000;"><path fill="blue" style="fill:none"/></g></svg>"#,
    );
    svg.remove_styles(["fill"]).unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1"><g style="stroke:#000;"><path/></g></svg>"#
    );
}

#[test]
fn test_remove_absent_style_is_noop() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1"><path style="stroke:red"/></svg>"#);
    let before = svg.embed().unwrap();
    svg.remove_styles(["fill", ""]).unwrap();
    assert_eq!(svg.embed().unwrap(), before);
}

#[test]
fn test_set_attributes_overwrites_and_appends() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1" role="presentation"/>"#);
    svg.set_attributes([("role", "img"), ("aria-label", "Logo")])
        .unwrap()
        .set_attribute("focusable", "false")
        .unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1" role="img" aria-label="Logo" focusable="false"/>"#
    );
}

#[test]
fn test_fill_sets_root_attribute() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1" fill="red"/>"#);
    svg.fill("currentColor").unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1" fill="currentColor"/>"#
    );
}

#[test]
fn test_title_inserted_first() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1"><path d="M0 0"/><rect/></svg>"#);
    svg.title("Icon").unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1"><title>Icon</title><path d="M0 0"/><rect/></svg>"#
    );
}

#[test]
fn test_title_replaces_existing() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1"><path/><title>Old <b>x</b></title></svg>"#);
    svg.title("New & improved").unwrap().title("Newer").unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1"><path/><title>Newer</title></svg>"#
    );
}

#[test]
fn test_title_ignores_nested_titles() {
    let mut svg = loaded(r#"<svg viewBox="0 0 1 1"><g><title>Group</title></g></svg>"#);
    svg.title("Top").unwrap();
    assert_eq!(
        svg.embed().unwrap(),
        r#"<svg viewBox="0 0 1 1"><title>Top</title><g><title>Group</title></g></svg>"#
    );
}

#[test]
fn test_source_is_immutable() {
    let mut svg = loaded(ICON);
    let dom = svg.embed_source_dom().unwrap();
    svg.remove_attributes(["width"])
        .unwrap()
        .remove_styles(["opacity"])
        .unwrap()
        .fill("red")
        .unwrap()
        .title("x")
        .unwrap();

    assert_eq!(svg.embed_source_code().unwrap(), ICON);
    assert_eq!(svg.embed_source_dom().unwrap(), dom);
    assert!(!dom.contains("viewBox"));
    assert!(dom.contains(r#"id="grad""#));
}

#[test]
fn test_failed_parse_keeps_previous_document() {
    let mut svg = loaded(ICON);
    let before = svg.embed().unwrap();
    let suffix = suffix_of(&svg);

    assert!(matches!(svg.parse("<svg><g></svg>"), Err(SvgError::Malformed(_))));
    assert_eq!(svg.embed().unwrap(), before);
    assert_eq!(suffix_of(&svg), suffix);
    assert_eq!(svg.embed_source_code().unwrap(), ICON);
}

#[test]
fn test_not_loaded() {
    let mut svg = ScalableVectorGraphic::with_counter(&InstanceCounter::starting_at(0));
    assert!(!svg.is_loaded());
    assert!(svg.suffix().is_none());
    assert!(matches!(svg.embed(), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.embed_source_code(), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.embed_source_dom(), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.reset(), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.title("x"), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.fill("red"), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.remove_style("fill"), Err(SvgError::NotLoaded)));
    assert!(matches!(svg.remove_attribute("width"), Err(SvgError::NotLoaded)));
}

#[test]
fn test_instances_get_distinct_suffixes() {
    let counter = InstanceCounter::starting_at(0);
    let mut a = ScalableVectorGraphic::with_counter(&counter);
    let mut b = ScalableVectorGraphic::with_counter(&counter);
    assert_eq!((a.instance(), b.instance()), (1, 2));

    a.parse(ICON).unwrap();
    b.parse(ICON).unwrap();
    assert_ne!(a.suffix(), b.suffix());
    assert_ne!(a.embed().unwrap(), b.embed().unwrap());
}

#[test]
fn test_suffix_is_deterministic_for_counter() {
    let first = loaded(ICON);
    let second = loaded(ICON);
    assert_eq!(first.suffix(), second.suffix());
    assert_eq!(
        first.suffix().unwrap(),
        &Suffix::derive(ICON, first.instance())
    );
}

#[test]
fn test_global_counter_instances() {
    let a = ScalableVectorGraphic::new();
    let b = ScalableVectorGraphic::default();
    assert_ne!(a.instance(), b.instance());
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("icon.svg");
    fs::write(&path, ICON).unwrap();

    let mut svg = ScalableVectorGraphic::new();
    svg.load(&path).unwrap();
    assert_eq!(svg.embed_source_code().unwrap(), ICON);
    assert!(svg.embed().unwrap().contains(r#"viewBox="0 0 100 50""#));
}

#[test]
fn test_load_missing_file() {
    let mut svg = ScalableVectorGraphic::new();
    let err = svg.load("/nonexistent/path.svg").unwrap_err();
    assert!(matches!(err, SvgError::NotFound(ref path) if path.ends_with("path.svg")));
    assert!(matches!(svg.embed(), Err(SvgError::NotLoaded)));
}

#[test]
fn test_load_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.svg");
    fs::write(&path, "<svg><path></svg>").unwrap();

    let mut svg = ScalableVectorGraphic::new();
    assert!(matches!(svg.load(&path), Err(SvgError::Malformed(_))));
    assert!(!svg.is_loaded());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        SvgError::NotFound("a.svg".into()).to_string(),
        "SVG file not found: a.svg"
    );
    assert_eq!(SvgError::NotLoaded.to_string(), "no SVG document loaded");
}
