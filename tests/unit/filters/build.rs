use super::*;

fn env() -> LengthEnv {
    LengthEnv {
        dpi_x: 90.0,
        dpi_y: 90.0,
        width: 200.0,
        height: 100.0,
        font_size: 12.0,
    }
}

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn build(name: &str, a: &[(&str, &str)]) -> Primitive {
    primitive_from_element(
        name,
        &attrs(a),
        &State::default(),
        Units::UserSpaceOnUse,
        &env(),
        &Options::default(),
    )
    .unwrap()
}

#[test]
fn filter_region_defaults_to_bbox_margin() {
    let f = filter_from_attributes(&Attributes::new(), &env());
    assert_eq!(f.region.units, Units::ObjectBoundingBox);
    assert!((f.region.x + 0.1).abs() < 1e-12);
    assert!((f.region.width - 1.2).abs() < 1e-12);
    assert_eq!(f.primitive_units, Units::UserSpaceOnUse);
}

#[test]
fn user_space_filter_region_uses_viewport_percentages() {
    let f = filter_from_attributes(&attrs(&[("filterUnits", "userSpaceOnUse")]), &env());
    assert!((f.region.x + 20.0).abs() < 1e-9);
    assert!((f.region.height - 120.0).abs() < 1e-9);

    let f = filter_from_attributes(
        &attrs(&[("filterUnits", "userSpaceOnUse"), ("x", "5"), ("width", "50%")]),
        &env(),
    );
    assert_eq!(f.region.x, 5.0);
    assert_eq!(f.region.width, 100.0);
}

#[test]
fn unknown_element_is_not_a_primitive() {
    let p = primitive_from_element(
        "feBogus",
        &Attributes::new(),
        &State::default(),
        Units::UserSpaceOnUse,
        &env(),
        &Options::default(),
    );
    assert!(p.is_none());
}

#[test]
fn blur_reads_optional_second_deviation() {
    let p = build("feGaussianBlur", &[("stdDeviation", "2"), ("result", "b")]);
    match p.kind {
        PrimitiveKind::GaussianBlur { input, std_dev } => {
            assert_eq!(input, Input::Previous);
            assert_eq!(std_dev, (2.0, 2.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(p.result.as_deref(), Some("b"));
}

#[test]
fn arithmetic_composite_reads_coefficients() {
    let p = build(
        "feComposite",
        &[("operator", "arithmetic"), ("k2", "0.5"), ("k3", "0.5"), ("in2", "SourceAlpha")],
    );
    match p.kind {
        PrimitiveKind::Composite { in2, operator, .. } => {
            assert_eq!(in2, Input::SourceAlpha);
            assert_eq!(
                operator,
                CompositeOperator::Arithmetic {
                    k1: 0.0,
                    k2: 0.5,
                    k3: 0.5,
                    k4: 0.0
                }
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn erode_and_dilate_aliases() {
    match build("feDilate", &[("radius", "1 2")]).kind {
        PrimitiveKind::Morphology { op, radius, .. } => {
            assert_eq!(op, MorphologyOp::Dilate);
            assert_eq!(radius, (1.0, 2.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn merge_nodes_and_transfer_functions_attach_to_parent() {
    let mut merge = build("feMerge", &[]);
    assert!(apply_child(&mut merge, "feMergeNode", &attrs(&[("in", "a")])));
    assert!(apply_child(&mut merge, "feMergeNode", &Attributes::new()));
    match &merge.kind {
        PrimitiveKind::Merge { inputs } => {
            assert_eq!(inputs, &vec![Input::Named("a".into()), Input::Previous]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut ct = build("feComponentTransfer", &[]);
    assert!(apply_child(
        &mut ct,
        "feFuncA",
        &attrs(&[("type", "table"), ("tableValues", "0 1")])
    ));
    match &ct.kind {
        PrimitiveKind::ComponentTransfer { funcs, .. } => {
            assert_eq!(funcs[0], TransferFn::Identity);
            assert_eq!(funcs[3], TransferFn::Table(vec![0.0, 1.0]));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!apply_child(&mut ct, "feMergeNode", &Attributes::new()));
}

#[test]
fn only_first_light_source_counts() {
    let mut p = build("feDiffuseLighting", &[]);
    apply_child(&mut p, "feDistantLight", &attrs(&[("elevation", "45")]));
    apply_child(&mut p, "fePointLight", &attrs(&[("z", "10")]));
    match p.kind {
        PrimitiveKind::Lighting { light, color, .. } => {
            assert_eq!(
                light,
                Some(LightSource::Distant {
                    azimuth: 0.0,
                    elevation: 45.0
                })
            );
            assert_eq!(color, crate::attr::Color::WHITE);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn fe_image_fragment_is_a_node_reference() {
    match build("feImage", &[("href", "#shape")]).kind {
        PrimitiveKind::Image {
            source: ImageSource::Node(id),
            ..
        } => assert_eq!(id, "shape"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn primitive_subregion_lengths_are_resolved() {
    let p = build("feFlood", &[("x", "10%"), ("width", "20")]);
    assert_eq!(p.x, Some(20.0));
    assert_eq!(p.width, Some(20.0));
    assert_eq!(p.y, None);
}
