//! Scene graph: node arena, identifier registry, cascading state and the builder that fills them.

pub mod attributes;
pub mod builder;
pub mod document;
pub mod node;
pub mod parse;
pub mod registry;
pub mod state;
pub(crate) mod style;

pub use attributes::Attributes;
pub use builder::SceneBuilder;
pub use document::Document;
pub use node::{
    DocumentRoot, Leaf, LeafShape, Node, NodeId, NodeKind, Reference, Region, Symbol, Units,
};
pub use parse::parse_document;
pub use registry::{ClipPathDef, MaskDef, Registry, Resource};
pub use state::{FillRule, LineCap, LineJoin, Prop, State, Visibility};
