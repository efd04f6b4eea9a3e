//! Tolerant parsers for attribute values. Every parser returns `None` on malformed input and the
//! caller treats the attribute as absent.

pub mod color;
pub mod length;
pub mod number;
pub mod paint;
pub mod transform;
pub mod view_box;

pub use color::{Color, parse_color};
pub use length::{Length, LengthUnit, parse_length, parse_normalized_length};
pub use number::{parse_number, parse_number_list, parse_number_optional_number};
pub use paint::{Paint, parse_paint};
pub use transform::parse_transform;
pub use view_box::{
    Align1D, AspectRatio, ViewBox, parse_aspect_ratio, parse_iri, parse_overflow, parse_view_box,
    view_box_transform,
};
