#![cfg(feature = "render")]

use hillchart::render::{
    HeadlessRenderer, LayoutOptions, SvgRenderOptions, render_svg_for_state, render_svg_for_token,
};
use hillchart::{ChartState, ManualClock, MemoryLocation, Store, StoreOptions, codec};

fn parse(svg: &str) -> roxmltree::Document<'_> {
    roxmltree::Document::parse(svg).unwrap_or_else(|e| panic!("invalid SVG ({e}):\n{svg}"))
}

#[test]
fn store_state_renders_to_well_formed_svg() {
    let location = MemoryLocation::parse("https://example.com/hill/").unwrap();
    let mut store = Store::init(location, ManualClock::default(), StoreOptions::default());
    let auth = store.add_scope("Auth & <SSO>", Some(0.2));
    let billing = store.add_scope("Billing", Some(0.8));

    let svg = render_svg_for_state(
        store.state(),
        &LayoutOptions::default(),
        &SvgRenderOptions::default(),
    )
    .unwrap();
    let doc = parse(&svg);

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("viewBox"), Some("0 0 800 300"));

    let groups: Vec<_> = doc
        .descendants()
        .filter(|n| n.attribute("class") == Some("scope-group"))
        .collect();
    let ids: Vec<_> = groups
        .iter()
        .filter_map(|g| g.attribute("data-scope-id"))
        .collect();
    assert_eq!(ids, vec![auth.id.as_str(), billing.id.as_str()]);

    let label = groups[0]
        .descendants()
        .find(|n| n.tag_name().name() == "text")
        .and_then(|n| n.text());
    assert_eq!(label, Some("Auth & <SSO>"));
}

#[test]
fn tokens_from_either_format_render_identically_shaped_svg() {
    let state = ChartState {
        title: "Tokens".to_string(),
        scopes: vec![hillchart::Scope {
            id: "abc".to_string(),
            name: "Only".to_string(),
            position: 1.0,
        }],
    };
    let renderer = HeadlessRenderer::new();
    let current = renderer.render_svg_for_token(&codec::encode(&state)).unwrap();
    let legacy = renderer
        .render_svg_for_token(&codec::encode_legacy(&state))
        .unwrap();
    // 1.0 survives quantization exactly, so both paths lay out the same chart.
    assert_eq!(current, legacy);

    let direct = render_svg_for_token(
        &format!("#{}", codec::encode(&state)),
        &LayoutOptions::default(),
        &SvgRenderOptions::default(),
    )
    .unwrap();
    assert_eq!(direct, current);
}

#[test]
fn narrow_renderer_scales_the_surface() {
    let renderer = HeadlessRenderer::new().with_width(400.0).with_height(280.0);
    let layout = renderer.layout(&ChartState::default()).unwrap();
    assert_eq!(layout.divider.x, 200.0);
    let svg = renderer.render_svg(&ChartState::default()).unwrap();
    assert_eq!(
        parse(&svg).root_element().attribute("viewBox"),
        Some("0 0 400 280")
    );
}
