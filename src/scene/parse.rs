//! XML driver: walks a `roxmltree` document and feeds the scene builder tag by tag.

use roxmltree::{Edge, ParsingOptions};

use crate::config::Options;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::scene::attributes::Attributes;
use crate::scene::builder::SceneBuilder;
use crate::scene::document::Document;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Parse SVG text into a resolved [`Document`]. Only XML syntax errors fail; everything past
/// well-formedness is recovered by the builder.
#[tracing::instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_document(text: &str, opts: &Options) -> SvgraphResult<Document> {
    let xml = roxmltree::Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )
    .map_err(|e| SvgraphError::parse(e.to_string()))?;

    let mut builder = SceneBuilder::new(opts);
    for edge in xml.root().traverse() {
        match edge {
            Edge::Open(node) if node.is_element() => {
                builder.open_tag(node.tag_name().name(), &attributes(node));
            }
            Edge::Close(node) if node.is_element() => {
                builder.close_tag(node.tag_name().name());
            }
            _ => {}
        }
    }
    let doc = builder.finish();
    tracing::debug!(
        nodes = doc.len(),
        ids = doc.registry().len(),
        unresolved = doc.pending_references().len(),
        "document built"
    );
    Ok(doc)
}

fn attributes(node: roxmltree::Node<'_, '_>) -> Attributes {
    node.attributes()
        .map(|a| {
            let name = match a.namespace() {
                Some(XLINK_NS) => format!("xlink:{}", a.name()),
                _ => a.name().to_string(),
            };
            (name, a.value().to_string())
        })
        .collect()
}
