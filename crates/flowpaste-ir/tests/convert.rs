use std::collections::HashMap;

use anyhow::{Result, anyhow};
use flowpaste_ir::{
    ConvertError, ConvertOptions, Node, XscpDocument, convert, convert_with_options,
    validate_document,
    xscp::{ElementNode, ElementPayload, ElementType, LinkMode, ListRole},
};
use serde_json::Value;

fn element<'a>(doc: &'a XscpDocument, id: &str) -> Result<&'a ElementNode> {
    doc.node(id)
        .and_then(Node::as_element)
        .ok_or_else(|| anyhow!("expected element node {id}"))
}

fn elements_of_type(doc: &XscpDocument, element_type: ElementType) -> Vec<&ElementNode> {
    doc.payload
        .nodes
        .iter()
        .filter_map(Node::as_element)
        .filter(|element| element.element_type == element_type)
        .collect()
}

fn embeds(doc: &XscpDocument) -> Vec<&str> {
    doc.payload
        .nodes
        .iter()
        .filter_map(Node::as_embed)
        .map(|embed| embed.v.as_str())
        .collect()
}

fn texts(doc: &XscpDocument) -> Vec<&str> {
    doc.payload
        .nodes
        .iter()
        .filter_map(Node::as_text)
        .map(|text| text.v.as_str())
        .collect()
}

fn is_descendant(doc: &XscpDocument, ancestor: &str, target: &str) -> bool {
    let mut stack = vec![ancestor.to_string()];
    while let Some(id) = stack.pop() {
        let Some(node) = doc.node(&id) else { continue };
        for child in node.children() {
            if child == target {
                return true;
            }
            stack.push(child.clone());
        }
    }
    false
}

/// Serialized document with every generated identifier replaced by its
/// first-seen ordinal, so two runs can be compared structurally.
fn shape(doc: &XscpDocument) -> Result<Value> {
    let mut value = serde_json::to_value(doc)?;
    let mut ordinals: HashMap<String, String> = HashMap::new();
    let generated: Vec<String> = doc
        .payload
        .nodes
        .iter()
        .map(|node| node.id().to_string())
        .chain(doc.payload.styles.iter().map(|style| style.id.clone()))
        .collect();
    for id in generated {
        let next = format!("#{}", ordinals.len());
        ordinals.entry(id).or_insert(next);
    }
    rewrite_ids(&mut value, &ordinals);
    Ok(value)
}

fn rewrite_ids(value: &mut Value, ordinals: &HashMap<String, String>) {
    match value {
        Value::String(text) => {
            if let Some(ordinal) = ordinals.get(text.as_str()) {
                *text = ordinal.clone();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| rewrite_ids(item, ordinals)),
        Value::Object(map) => map.values_mut().for_each(|item| rewrite_ids(item, ordinals)),
        _ => {}
    }
}

const LANDING_HTML: &str = r#"
<html>
  <head><title>Landing</title><meta charset="utf-8"></head>
  <body>
    <nav class="nav"><a class="nav-link" href="/about">About</a></nav>
    <section class="hero">
      <h1 class="hero-title">Ship faster</h1>
      <p>Copy, paste, <em>done</em>.</p>
      <img src="hero.png" alt="Hero" width="640">
    </section>
    <ul class="features"><li>Fast</li><li>Typed</li></ul>
    <script>console.log("ready")</script>
  </body>
</html>
"#;

const LANDING_CSS: &str = r#"
:root { --brand: #ff0066; }
.nav { display: flex; gap: 12px; }
.nav-link { color: var(--brand); }
.hero { padding: 80px 24px; }
.hero-title { font-size: clamp(2rem, 5vw, 4rem); }
.features li { margin: 0 0 8px; }
.foo { color: red; }
.nav-link:hover { text-decoration: underline; }
@media (max-width: 600px) { .hero { padding: 40px 16px; } }
"#;

#[test]
fn landing_page_produces_a_valid_graph() -> Result<()> {
    let doc = convert(LANDING_HTML, LANDING_CSS)?;
    validate_document(&doc)?;

    let root = doc.root().ok_or_else(|| anyhow!("missing root"))?;
    for node in &doc.payload.nodes {
        for child in node.children() {
            assert!(doc.node(child).is_some(), "dangling child {child}");
        }
        for class in node.classes() {
            let matching = doc.payload.styles.iter().filter(|s| &s.id == class).count();
            assert_eq!(matching, 1, "style {class} must resolve exactly once");
        }
        if node.id() != root.id() {
            assert!(is_descendant(&doc, root.id(), node.id()), "{} unreachable", node.id());
        }
    }
    assert!(!texts(&doc).contains(&"Landing"), "title text is never rendered");
    Ok(())
}

#[test]
fn repeated_conversion_has_identical_shape() -> Result<()> {
    let first = convert(LANDING_HTML, LANDING_CSS)?;
    let second = convert(LANDING_HTML, LANDING_CSS)?;
    assert_eq!(first.payload.nodes.len(), second.payload.nodes.len());
    assert_eq!(first.payload.styles.len(), second.payload.styles.len());
    assert_eq!(shape(&first)?, shape(&second)?);
    Ok(())
}

#[test]
fn shorthands_expand_into_longhands() -> Result<()> {
    let doc = convert(
        r#"<div class="pad"><div class="round">x</div></div>"#,
        ".pad { padding: 10px 20px; } .round { border-radius: 4px 8px; }",
    )?;
    let pad = doc.style_by_name("pad").ok_or_else(|| anyhow!("pad style"))?;
    assert_eq!(
        pad.style_less,
        "padding-top: 10px; padding-right: 20px; padding-bottom: 10px; padding-left: 20px;"
    );
    let round = doc.style_by_name("round").ok_or_else(|| anyhow!("round style"))?;
    assert_eq!(
        round.style_less,
        "border-top-left-radius: 4px; border-top-right-radius: 8px; \
         border-bottom-right-radius: 4px; border-bottom-left-radius: 8px;"
    );
    Ok(())
}

#[test]
fn opaque_values_are_wrapped_not_expanded() -> Result<()> {
    let doc = convert(
        r#"<div class="w">x</div>"#,
        ".w { width: calc(100% - 20px); margin: var(--gutter); }",
    )?;
    let style = doc.style_by_name("w").ok_or_else(|| anyhow!("w style"))?;
    assert_eq!(
        style.style_less,
        "width: @raw<|calc(100% - 20px)|>; margin: @raw<|var(--gutter)|>;"
    );
    Ok(())
}

#[test]
fn unused_classes_move_into_the_embed() -> Result<()> {
    let doc = convert(r#"<div class="card">Hi</div>"#, ".card { color: blue; } .foo { color: red; }")?;
    assert!(doc.style_by_name("foo").is_none());
    assert!(doc.style_by_name("card").is_some());

    let relocated = embeds(&doc);
    assert_eq!(relocated.len(), 1);
    assert!(relocated[0].contains("/* Unused classes */"));
    assert!(relocated[0].contains(".foo { color: red; }"));

    let root = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    let last = root.children.last().ok_or_else(|| anyhow!("root children"))?;
    assert!(doc.node(last).and_then(Node::as_embed).is_some(), "embed is the last top-level node");
    Ok(())
}

#[test]
fn unused_class_relocation_can_be_disabled() -> Result<()> {
    let options = ConvertOptions {
        relocate_unused_classes: false,
        ..ConvertOptions::default()
    };
    let doc = convert_with_options(r#"<p>Hi</p>"#, ".foo { color: red; }", &options)?;
    assert!(embeds(&doc).is_empty());
    assert!(doc.payload.styles.is_empty());
    Ok(())
}

#[test]
fn no_visible_elements_yield_an_empty_container_root() -> Result<()> {
    let doc = convert("<head><title>x</title></head>", "")?;
    assert_eq!(doc.payload.nodes.len(), 1);
    let root = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    assert_eq!(root.element_type, ElementType::Block);
    assert!(root.children.is_empty());
    assert!(root.classes.is_empty());
    Ok(())
}

#[test]
fn single_top_level_element_is_the_root() -> Result<()> {
    let doc = convert(r#"<article class="post"><p>Body</p></article>"#, ".post { color: red; }")?;
    let root = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    assert_eq!(root.tag, "article");
    assert_eq!(root.classes.len(), 1);
    Ok(())
}

#[test]
fn several_top_level_elements_get_a_wrapper() -> Result<()> {
    let doc = convert("<h1>A</h1><p>B</p><blockquote>C</blockquote>", "")?;
    let root = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    assert_eq!(root.element_type, ElementType::Block);
    let tags: Vec<&str> = root
        .children
        .iter()
        .map(|id| element(&doc, id).map(|e| e.tag.as_str()))
        .collect::<Result<_>>()?;
    assert_eq!(tags, vec!["h1", "p", "blockquote"]);
    Ok(())
}

#[test]
fn table_sections_are_hoisted_away() -> Result<()> {
    let doc = convert("<body><table><tr><td><p>Text</p></td></tr></table></body>", "")?;
    let paragraphs = elements_of_type(&doc, ElementType::Paragraph);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(doc.root().map(Node::id), Some(paragraphs[0].id.as_str()));
    assert!(doc
        .payload
        .nodes
        .iter()
        .filter_map(Node::as_element)
        .all(|e| !matches!(e.tag.as_str(), "table" | "tr" | "td" | "tbody")));
    Ok(())
}

#[test]
fn scripts_and_svg_become_embeds() -> Result<()> {
    let doc = convert(
        r#"<div><svg viewBox="0 0 1 1"><circle r="1"></circle></svg><script>go()</script></div>"#,
        "",
    )?;
    let found: Vec<_> = doc.payload.nodes.iter().filter_map(Node::as_embed).collect();
    assert_eq!(found.len(), 2);
    assert!(found[0].v.starts_with("<svg"));
    assert!(!found[0].is_script());
    assert!(found[1].v.contains("go()"));
    assert!(found[1].is_script());
    Ok(())
}

#[test]
fn links_carry_mode_url_and_target() -> Result<()> {
    let doc = convert(
        r##"<p><a href="#pricing">P</a><a href="mailto:hi@example.com" target="_blank">M</a></p>"##,
        "",
    )?;
    let links = elements_of_type(&doc, ElementType::Link);
    assert_eq!(links.len(), 2);
    let ElementPayload::Link { link } = &links[0].data.payload else {
        return Err(anyhow!("first link payload"));
    };
    assert_eq!(link.mode, LinkMode::Section);
    assert_eq!(link.target, "_self");
    let ElementPayload::Link { link } = &links[1].data.payload else {
        return Err(anyhow!("second link payload"));
    };
    assert_eq!(link.mode, LinkMode::Email);
    assert_eq!(link.url, "mailto:hi@example.com");
    assert_eq!(link.target, "_blank");
    Ok(())
}

#[test]
fn images_use_placeholder_asset_and_defaults() -> Result<()> {
    let options = ConvertOptions {
        asset_placeholder: "asset-123".to_string(),
        ..ConvertOptions::default()
    };
    let doc = convert_with_options(r#"<img src="cat.png" data-kind="photo">"#, "", &options)?;
    let images = elements_of_type(&doc, ElementType::Image);
    let ElementPayload::Image { img, attr } = &images[0].data.payload else {
        return Err(anyhow!("image payload"));
    };
    assert_eq!(img.id, "asset-123");
    assert_eq!(attr.src, "cat.png");
    assert_eq!(attr.alt, "");
    assert_eq!(attr.loading, "lazy");
    assert_eq!(attr.width, "auto");
    assert_eq!(attr.height, "auto");
    assert_eq!(images[0].data.xattr.len(), 1);
    assert_eq!(images[0].data.xattr[0].name, "data-kind");
    Ok(())
}

#[test]
fn sections_wrap_content_in_a_container() -> Result<()> {
    let doc = convert("<section><h2>T</h2></section>", "")?;
    let section = &elements_of_type(&doc, ElementType::Section)[0];
    assert_eq!(section.children.len(), 1);
    let wrapper = element(&doc, &section.children[0])?;
    assert_eq!(wrapper.element_type, ElementType::Block);
    assert!(wrapper.classes.is_empty());
    assert_eq!(element(&doc, &wrapper.children[0])?.tag, "h2");
    assert!(matches!(section.data.payload, ElementPayload::Section { .. }));

    let kept = convert(r#"<section><div class="container"><h2>T</h2></div></section>"#, "")?;
    let section = &elements_of_type(&kept, ElementType::Section)[0];
    let child = element(&kept, &section.children[0])?;
    assert_eq!(child.tag, "div");
    assert_eq!(element(&kept, &child.children[0])?.tag, "h2");
    Ok(())
}

#[test]
fn lists_record_their_role() -> Result<()> {
    let doc = convert("<ol><li>One</li></ol>", "")?;
    let list = &elements_of_type(&doc, ElementType::List)[0];
    let item = &elements_of_type(&doc, ElementType::ListItem)[0];
    assert!(matches!(list.data.payload, ElementPayload::List { list: ListRole::List }));
    assert!(matches!(item.data.payload, ElementPayload::List { list: ListRole::Item }));
    Ok(())
}

#[test]
fn unknown_tags_pass_through_with_attributes() -> Result<()> {
    let doc = convert(
        r#"<button type="button" data-track="cta" aria-label="Start">Go</button>"#,
        "",
    )?;
    let root = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    assert_eq!(root.element_type, ElementType::Passthrough);
    assert_eq!(root.tag, "button");
    let ElementPayload::Passthrough { attributes } = &root.data.payload else {
        return Err(anyhow!("passthrough payload"));
    };
    let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["type", "data-track", "aria-label"]);
    let custom: Vec<&str> = root.data.xattr.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(custom, vec!["data-track", "aria-label"]);
    let json = serde_json::to_value(&doc)?;
    assert_eq!(json["payload"]["nodes"][0]["type"], "DOM");
    Ok(())
}

#[test]
fn complex_selectors_merge_into_literal_classes() -> Result<()> {
    let doc = convert(
        r#"<div class="card"><h2 class="title">T</h2></div>"#,
        ".card { color: red; } .title { font-weight: 700; } .card h2 { margin: 0; }",
    )?;
    let title = doc.style_by_name("title").ok_or_else(|| anyhow!("title style"))?;
    assert_eq!(
        title.style_less,
        "font-weight: 700; margin-top: 0; margin-right: 0; margin-bottom: 0; margin-left: 0;"
    );
    assert_eq!(doc.payload.styles.len(), 2);
    Ok(())
}

#[test]
fn classless_matches_share_a_synthetic_style() -> Result<()> {
    let doc = convert("<h2>A</h2><h2>B</h2>", "h2 { color: blue; }")?;
    let style = doc.style_by_name("custom-h2").ok_or_else(|| anyhow!("synthetic style"))?;
    let headings = elements_of_type(&doc, ElementType::Heading);
    assert_eq!(headings.len(), 2);
    for heading in headings {
        assert_eq!(heading.classes, vec![style.id.clone()]);
    }
    Ok(())
}

#[test]
fn unsupported_selectors_are_relocated() -> Result<()> {
    let doc = convert(
        r#"<a class="btn" href="/go">Go</a>"#,
        ".btn { color: black; } .btn:hover { color: blue; }",
    )?;
    let btn = doc.style_by_name("btn").ok_or_else(|| anyhow!("btn style"))?;
    assert_eq!(btn.style_less, "color: black;");
    let relocated = embeds(&doc);
    assert!(relocated[0].contains("/* Unsupported selectors */\n.btn:hover { color: blue; }"));
    Ok(())
}

#[test]
fn advanced_css_is_relocated_verbatim() -> Result<()> {
    let doc = convert(
        r#"<div class="a">x</div>"#,
        ":root { --gap: 8px; } .a { color: red; } @media (max-width: 600px) { .a { color: blue; } }",
    )?;
    let relocated = embeds(&doc);
    assert_eq!(relocated.len(), 1);
    let block = relocated[0];
    assert!(block.starts_with("<style>\n/* Advanced CSS */\n:root { --gap: 8px; }"));
    assert!(block.contains("@media (max-width: 600px) { .a { color: blue; } }"));
    assert_eq!(
        doc.style_by_name("a").map(|s| s.style_less.as_str()),
        Some("color: red;")
    );
    Ok(())
}

#[test]
fn inline_style_blocks_feed_the_sheet() -> Result<()> {
    let doc = convert(
        r#"<html><head><style>.hero { gap: 4px 8px; }</style></head><body><div class="hero">x</div></body></html>"#,
        "",
    )?;
    let hero = doc.style_by_name("hero").ok_or_else(|| anyhow!("hero style"))?;
    assert_eq!(hero.style_less, "grid-column-gap: 4px; grid-row-gap: 8px;");
    assert!(embeds(&doc).is_empty());
    Ok(())
}

#[test]
fn inline_declarations_follow_external_ones() -> Result<()> {
    let doc = convert("<style>.a{color:blue}</style><div class=a>x</div>", ".a{color:red}")?;
    let style = doc.style_by_name("a").ok_or_else(|| anyhow!("a style"))?;
    assert_eq!(style.style_less, "color: red; color: blue;");
    Ok(())
}

#[test]
fn text_runs_keep_their_place_between_elements() -> Result<()> {
    let doc = convert("<p>Copy, <em>done</em>.</p>", "")?;
    let paragraph = doc.root().and_then(Node::as_element).ok_or_else(|| anyhow!("root"))?;
    assert_eq!(paragraph.children.len(), 3);
    let first = doc.node(&paragraph.children[0]).and_then(Node::as_text);
    let middle = element(&doc, &paragraph.children[1])?;
    let last = doc.node(&paragraph.children[2]).and_then(Node::as_text);
    assert_eq!(first.map(|t| t.v.as_str()), Some("Copy,"));
    assert_eq!(middle.element_type, ElementType::Emphasized);
    assert_eq!(last.map(|t| t.v.as_str()), Some("."));
    Ok(())
}

#[test]
fn mixed_selector_lists_are_applied_once() -> Result<()> {
    let doc = convert(r#"<div class="wrapper">x</div>"#, "body, .wrapper { margin: 0; }")?;
    let wrapper = doc.style_by_name("wrapper").ok_or_else(|| anyhow!("wrapper style"))?;
    assert_eq!(
        wrapper.style_less,
        "margin-top: 0; margin-right: 0; margin-bottom: 0; margin-left: 0;"
    );
    let relocated = embeds(&doc);
    assert_eq!(relocated.len(), 1);
    assert!(relocated[0].contains("body { margin: 0; }"));
    assert!(!relocated[0].contains(".wrapper"));

    let doc = convert(r#"<h1>T</h1><a href="/x">L</a>"#, "h1, a[href] { color: red; }")?;
    let heading = doc.style_by_name("custom-h1").ok_or_else(|| anyhow!("h1 style"))?;
    assert_eq!(heading.style_less, "color: red;");
    assert_eq!(doc.payload.styles.len(), 1);
    let relocated = embeds(&doc);
    assert!(relocated[0].contains("a[href] { color: red; }"));
    assert!(!relocated[0].contains("h1"));
    validate_document(&doc)?;
    Ok(())
}

#[test]
fn empty_markup_is_an_error() {
    assert!(matches!(convert("", ".a { color: red; }"), Err(ConvertError::EmptyInput)));
    assert!(matches!(convert("   \n", ""), Err(ConvertError::EmptyInput)));
}

#[test]
fn serialized_envelope_matches_clipboard_format() -> Result<()> {
    let doc = convert("<p>Hello</p>", "")?;
    let json: Value = serde_json::from_str(&doc.to_json_string()?)?;
    assert_eq!(json["type"], "@webflow/XscpData");
    assert_eq!(json["payload"]["nodes"][1]["text"], true);
    assert_eq!(json["payload"]["nodes"][1]["v"], "Hello");
    assert_eq!(json["meta"]["droppedLinks"], 0);
    Ok(())
}
