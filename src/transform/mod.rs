pub mod affine;

pub use affine::compose;
