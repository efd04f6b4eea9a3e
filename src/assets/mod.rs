//! External images referenced by `image` elements and `feImage` primitives.

pub mod decode;
pub mod load;

pub use load::load_href;
