use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::foundation::math::unpremultiply;
use crate::render::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelector {
    R,
    G,
    B,
    #[default]
    A,
}

impl ChannelSelector {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "R" => Some(Self::R),
            "G" => Some(Self::G),
            "B" => Some(Self::B),
            "A" => Some(Self::A),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::G => 1,
            Self::B => 2,
            Self::A => 3,
        }
    }
}

/// Move each pixel of `input` by `scale * (channel - 0.5)` read from the unpremultiplied `map`.
/// Samples are nearest-neighbour; anything outside `bounds` reads as transparent.
pub fn apply(
    input: &Surface,
    map: &Surface,
    scale: (f64, f64),
    x_channel: ChannelSelector,
    y_channel: ChannelSelector,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    let mut out = Surface::new(input.width(), input.height())?;
    let bounds = bounds.intersect(input.bounds());
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let m = unpremultiply(map.pixel(x, y));
            let dx = scale.0 * (f64::from(m[x_channel.index()]) - 0.5);
            let dy = scale.1 * (f64::from(m[y_channel.index()]) - 0.5);
            let sx = (f64::from(x) + dx).floor() as i32;
            let sy = (f64::from(y) + dy).floor() as i32;
            if bounds.contains(sx, sy) {
                out.set_pixel(x, y, input.pixel(sx, sy));
            }
        }
    }
    Ok(out)
}
