use super::*;

fn a(pairs: &[(&str, &str)]) -> Attributes {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn leaf(b: &mut SceneBuilder, name: &str, attrs: &[(&str, &str)]) {
    b.open_tag(name, &a(attrs));
    b.close_tag(name);
}

fn reference(doc: &Document, id: &str) -> Reference {
    match &doc.node(doc.node_by_id(id).unwrap()).kind {
        NodeKind::Reference(r) => r.clone(),
        other => panic!("not a reference: {}", other.name()),
    }
}

#[test]
fn outermost_svg_becomes_root_and_sizes_from_view_box() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &a(&[("viewBox", "0 0 40 20")]));
    leaf(&mut b, "rect", &[("width", "50%"), ("height", "10")]);
    b.close_tag("svg");
    let doc = b.finish();

    let root = doc.root().unwrap();
    assert_eq!(doc.intrinsic_size(), Some((40.0, 20.0)));
    let rect = doc.node(root).children[0];
    let bbox = doc.bounding_box(rect).unwrap();
    assert_eq!(bbox, Rect::new(0.0, 0.0, 20.0, 10.0));
}

#[test]
fn defs_and_symbols_are_not_painted_children() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &a(&[("width", "10"), ("height", "10")]));
    b.open_tag("defs", &Attributes::new());
    leaf(&mut b, "rect", &[("id", "r"), ("width", "5"), ("height", "5")]);
    b.close_tag("defs");
    b.open_tag("symbol", &a(&[("id", "s")]));
    b.close_tag("symbol");
    leaf(&mut b, "use", &[("id", "u"), ("href", "#r")]);
    b.close_tag("svg");
    let doc = b.finish();

    let root = doc.node(doc.root().unwrap());
    assert_eq!(root.children.len(), 1);
    assert_eq!(doc.node(root.children[0]).element, "use");
    let r = doc.node_by_id("r").unwrap();
    assert!(doc.node(r).parent.is_some());
    assert_eq!(reference(&doc, "u").link, Some(r));
}

#[test]
fn forward_reference_is_patched_at_finish() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    leaf(&mut b, "use", &[("id", "u"), ("xlink:href", "#later")]);
    leaf(&mut b, "circle", &[("id", "later"), ("r", "2")]);
    b.close_tag("svg");
    let doc = b.finish();

    assert_eq!(reference(&doc, "u").link, doc.node_by_id("later"));
    assert!(doc.pending_references().is_empty());
}

#[test]
fn use_rejection_needs_both_sizes() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    leaf(&mut b, "rect", &[("id", "t"), ("width", "1"), ("height", "1")]);
    leaf(&mut b, "use", &[("id", "both"), ("href", "#t"), ("width", "0"), ("height", "5")]);
    leaf(&mut b, "use", &[("id", "one"), ("href", "#t"), ("width", "0")]);
    leaf(&mut b, "use", &[("id", "neg"), ("href", "#t"), ("width", "4"), ("height", "-1")]);
    b.close_tag("svg");
    let doc = b.finish();

    assert!(reference(&doc, "both").rejected);
    assert_eq!(reference(&doc, "both").link, None);
    assert!(!reference(&doc, "one").rejected);
    assert!(reference(&doc, "one").link.is_some());
    assert!(reference(&doc, "neg").rejected);
}

#[test]
fn mismatched_close_is_ignored() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    b.open_tag("g", &a(&[("id", "g")]));
    b.close_tag("svg");
    leaf(&mut b, "rect", &[("id", "inner"), ("width", "1"), ("height", "1")]);
    b.close_tag("g");
    b.close_tag("svg");
    let doc = b.finish();

    let g = doc.node_by_id("g").unwrap();
    assert_eq!(doc.node(g).children, vec![doc.node_by_id("inner").unwrap()]);
}

#[test]
fn unknown_elements_are_transparent() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    b.open_tag("a", &Attributes::new());
    leaf(&mut b, "rect", &[("id", "r"), ("width", "1"), ("height", "1")]);
    b.close_tag("a");
    b.close_tag("svg");
    let doc = b.finish();

    let root = doc.node(doc.root().unwrap());
    assert_eq!(root.children, vec![doc.node_by_id("r").unwrap()]);
}

#[test]
fn nesting_limit_skips_the_subtree() {
    let mut opts = Options::default();
    opts.limits.max_nesting_depth = 2;
    let mut b = SceneBuilder::new(&opts);
    b.open_tag("svg", &Attributes::new());
    b.open_tag("g", &a(&[("id", "g")]));
    b.open_tag("g", &a(&[("id", "deep")]));
    leaf(&mut b, "rect", &[("id", "r")]);
    b.close_tag("g");
    b.close_tag("g");
    leaf(&mut b, "rect", &[("id", "ok"), ("width", "1"), ("height", "1")]);
    b.close_tag("svg");
    let doc = b.finish();

    assert!(doc.node_by_id("deep").is_none());
    assert!(doc.node_by_id("r").is_none());
    assert!(doc.node_by_id("ok").is_some());
}

#[test]
fn filter_collects_primitives_and_children() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    b.open_tag("filter", &a(&[("id", "f")]));
    leaf(&mut b, "feGaussianBlur", &[("stdDeviation", "2"), ("result", "blur")]);
    b.open_tag("feMerge", &Attributes::new());
    leaf(&mut b, "feMergeNode", &[("in", "blur")]);
    leaf(&mut b, "feMergeNode", &[("in", "SourceGraphic")]);
    b.close_tag("feMerge");
    leaf(&mut b, "rect", &[("id", "stray"), ("width", "1"), ("height", "1")]);
    b.close_tag("filter");
    b.close_tag("svg");
    let doc = b.finish();

    let f = doc.filter_by_id("f").unwrap();
    assert_eq!(f.primitives.len(), 2);
    match &f.primitives[1].kind {
        crate::filters::PrimitiveKind::Merge { inputs } => assert_eq!(inputs.len(), 2),
        other => panic!("unexpected {}", other.name()),
    }
    assert!(doc.node_by_id("stray").is_none());
}

#[test]
fn clip_path_and_mask_register_resources() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    b.open_tag("clipPath", &a(&[("id", "c"), ("clipPathUnits", "objectBoundingBox")]));
    leaf(&mut b, "rect", &[("width", "1"), ("height", "1")]);
    b.close_tag("clipPath");
    b.open_tag("mask", &a(&[("id", "m")]));
    b.close_tag("mask");
    b.close_tag("svg");
    let doc = b.finish();

    let clip = doc.registry().clip_path("c").unwrap();
    assert_eq!(clip.units, Units::ObjectBoundingBox);
    assert_eq!(doc.node(clip.node).children.len(), 1);
    let mask = doc.registry().mask("m").unwrap();
    assert_eq!(mask.region.units, Units::ObjectBoundingBox);
    assert!((mask.region.width - 1.2).abs() < 1e-12);
    assert!(doc.node(doc.root().unwrap()).children.is_empty());
}

#[test]
fn rounded_rect_radius_defaults_to_the_other_axis() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    leaf(&mut b, "rect", &[("id", "r"), ("width", "10"), ("height", "4"), ("rx", "5")]);
    b.close_tag("svg");
    let doc = b.finish();

    let bbox = doc.bounding_box(doc.node_by_id("r").unwrap()).unwrap();
    assert!((bbox.width() - 10.0).abs() < 1e-9);
    assert!((bbox.height() - 4.0).abs() < 1e-9);
}

#[test]
fn switch_children_carry_condition_flags() {
    let mut b = SceneBuilder::new(&Options::default());
    b.open_tag("svg", &Attributes::new());
    b.open_tag("switch", &a(&[("id", "s")]));
    leaf(&mut b, "rect", &[("id", "fr"), ("systemLanguage", "fr")]);
    leaf(&mut b, "rect", &[("id", "en"), ("systemLanguage", "en-US")]);
    b.close_tag("switch");
    b.close_tag("svg");
    let doc = b.finish();

    assert!(!doc.node(doc.node_by_id("fr").unwrap()).state.cond_true);
    assert!(doc.node(doc.node_by_id("en").unwrap()).state.cond_true);
    assert!(matches!(
        doc.node(doc.node_by_id("s").unwrap()).kind,
        NodeKind::ConditionalGroup
    ));
}
