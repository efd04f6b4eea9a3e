use super::*;

use crate::filters::{Filter, Primitive, PrimitiveKind};
use crate::scene::node::Region;

fn obb_filter() -> Filter {
    Filter::new()
}

fn source() -> Surface {
    let mut s = Surface::new(20, 20).unwrap();
    s.set_pixel(5, 5, [10, 20, 30, 40]);
    s
}

#[test]
fn bounding_box_region_needs_a_bbox() {
    let src = source();
    let limits = Limits::default();
    assert!(FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, None, &limits).is_none());
}

#[test]
fn default_region_expands_bbox_by_ten_percent() {
    let src = source();
    let limits = Limits::default();
    let bbox = Rect::new(5.0, 5.0, 15.0, 15.0);
    let ctx = FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, Some(bbox), &limits).unwrap();
    assert_eq!(ctx.region(), IRect::new(4, 4, 16, 16));
}

#[test]
fn source_alpha_keeps_only_alpha() {
    let src = source();
    let limits = Limits::default();
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
    let ctx = FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, Some(bbox), &limits).unwrap();
    let a = ctx.input(&Input::SourceAlpha).unwrap();
    assert_eq!(a.pixel(5, 5), [0, 0, 0, 40]);
}

#[test]
fn previous_falls_back_to_source_then_tracks_results() {
    let src = source();
    let limits = Limits::default();
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
    let mut ctx =
        FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, Some(bbox), &limits).unwrap();
    assert_eq!(ctx.input(&Input::Previous).unwrap().pixel(5, 5), [10, 20, 30, 40]);

    let mut red = ctx.transparent().unwrap();
    red.fill([255, 0, 0, 255]);
    ctx.store(Some("r"), red, ctx.region());
    assert_eq!(ctx.input(&Input::Previous).unwrap().pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(
        ctx.input(&Input::Named("r".into())).unwrap().pixel(0, 0),
        [255, 0, 0, 255]
    );
    // Unknown names read the latest result.
    assert_eq!(
        ctx.input(&Input::Named("nope".into())).unwrap().pixel(0, 0),
        [255, 0, 0, 255]
    );
}

#[test]
fn missing_background_is_transparent() {
    let src = source();
    let limits = Limits::default();
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
    let ctx = FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, Some(bbox), &limits).unwrap();
    let bg = ctx.input(&Input::BackgroundImage).unwrap();
    assert!(bg.data().iter().all(|&b| b == 0));
}

#[test]
fn fill_paint_floods_the_region() {
    let src = source();
    let limits = Limits::default();
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
    let ctx = FilterContext::new(&obb_filter(), &src, Affine::IDENTITY, Some(bbox), &limits)
        .unwrap()
        .with_paints(Some(Color::from_rgb8(0, 0, 255)), None);
    let fill = ctx.input(&Input::FillPaint).unwrap();
    assert_eq!(fill.pixel(3, 3), [0, 0, 255, 255]);
    assert_eq!(fill.pixel(15, 15), [0; 4]);
    let stroke = ctx.input(&Input::StrokePaint).unwrap();
    assert_eq!(stroke.pixel(3, 3), [0; 4]);
}

#[test]
fn primitive_subregion_in_bbox_units() {
    let src = source();
    let limits = Limits::default();
    let mut filter = obb_filter();
    filter.primitive_units = Units::ObjectBoundingBox;
    let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
    let ctx = FilterContext::new(&filter, &src, Affine::IDENTITY, Some(bbox), &limits).unwrap();
    let mut prim = Primitive::new(PrimitiveKind::Tile {
        input: Input::Previous,
    });
    prim.x = Some(0.2);
    prim.width = Some(0.5);
    assert_eq!(ctx.subregion(&prim), IRect::new(2, 0, 7, 11));
}

#[test]
fn user_space_region_and_paffine() {
    let src = source();
    let limits = Limits::default();
    let mut filter = obb_filter();
    filter.region = Region {
        x: 0.0,
        y: 0.0,
        width: 5.0,
        height: 5.0,
        units: Units::UserSpaceOnUse,
    };
    let ctx = FilterContext::new(&filter, &src, Affine::scale(2.0), None, &limits).unwrap();
    assert_eq!(ctx.region(), IRect::new(0, 0, 10, 10));
    assert_eq!(ctx.scale_lengths(1.0, 3.0), (2.0, 6.0));
}
