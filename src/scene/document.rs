use kurbo::Shape as _;
use tracing::debug;

use crate::config::Options;
use crate::filters::{Filter, FilterId};
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::SvgraphResult;
use crate::scene::node::{LeafShape, Node, NodeId, NodeKind};
use crate::scene::registry::{Registry, Resource};

/// Bounding-box recursion stops here; deeper (or cyclic) content contributes nothing.
const BBOX_MAX_DEPTH: usize = 128;

/// A built scene: the node arena, the identifier registry and the filter definitions.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: Option<NodeId>,
    pub(crate) registry: Registry,
    pub(crate) filters: Vec<Filter>,
    pub(crate) pending: Vec<NodeId>,
}

impl Document {
    /// Parse and build a document from SVG text.
    pub fn from_str(text: &str, opts: &Options) -> SvgraphResult<Self> {
        crate::scene::parse::parse_document(text, opts)
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn push_filter(&mut self, filter: Filter) -> FilterId {
        let id = FilterId(self.filters.len() as u32);
        self.filters.push(filter);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first document root opened during the build.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn lookup(&self, id: &str) -> Option<&Resource> {
        self.registry.get(id)
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.registry.node(id)
    }

    pub fn filter(&self, id: FilterId) -> &Filter {
        &self.filters[id.index()]
    }

    pub fn filter_by_id(&self, id: &str) -> Option<&Filter> {
        self.registry.filter(id).map(|f| self.filter(f))
    }

    /// References that have not been linked to a target yet.
    pub fn pending_references(&self) -> &[NodeId] {
        &self.pending
    }

    /// Link every pending reference whose target is now registered. Returns how many were
    /// linked. Running it again links nothing new.
    #[tracing::instrument(skip(self), fields(pending = self.pending.len()))]
    pub fn resolve_references(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut resolved = 0;
        for id in pending {
            let target = match &self.node(id).kind {
                NodeKind::Reference(r) => r.href.as_deref().and_then(|h| self.registry.node(h)),
                _ => None,
            };
            match target {
                Some(t) => {
                    if let NodeKind::Reference(r) = &mut self.node_mut(id).kind {
                        r.link = Some(t);
                        resolved += 1;
                    }
                }
                None => {
                    debug!(node = id.index(), "reference target not found");
                    self.pending.push(id);
                }
            }
        }
        resolved
    }

    /// Width and height of the root viewport.
    pub fn intrinsic_size(&self) -> Option<(f64, f64)> {
        match &self.node(self.root?).kind {
            NodeKind::DocumentRoot(r) => Some((r.width, r.height)),
            _ => None,
        }
    }

    /// Geometric bounds of `id`'s content in the node's own user space (its own transform
    /// excluded). `None` for nodes with no geometry.
    pub fn bounding_box(&self, id: NodeId) -> Option<Rect> {
        self.bbox_inner(id, 0)
    }

    fn bbox_inner(&self, id: NodeId, depth: usize) -> Option<Rect> {
        if depth > BBOX_MAX_DEPTH {
            return None;
        }
        let node = self.get(id)?;
        match &node.kind {
            NodeKind::Leaf(leaf) => match &leaf.shape {
                LeafShape::Path(p) if p.elements().is_empty() => None,
                LeafShape::Path(p) => Some(p.bounding_box()),
                LeafShape::Image { rect, .. } => Some(*rect),
            },
            NodeKind::Group | NodeKind::Symbol(_) => {
                self.union_children(node.children.iter().copied(), Affine::IDENTITY, depth)
            }
            NodeKind::ConditionalGroup => {
                let first = node
                    .children
                    .iter()
                    .copied()
                    .find(|c| self.node(*c).state.cond_true);
                self.union_children(first, Affine::IDENTITY, depth)
            }
            NodeKind::DocumentRoot(root) => self.union_children(
                node.children.iter().copied(),
                root.content_transform(),
                depth,
            ),
            NodeKind::Reference(r) => {
                let target = self.node(r.link?);
                let inner = self.bbox_inner(r.link?, depth + 1)?;
                let to_target = r.content_transform(target) * target.state.affine;
                Some(to_target.transform_rect_bbox(inner))
            }
        }
    }

    fn union_children(
        &self,
        children: impl IntoIterator<Item = NodeId>,
        outer: Affine,
        depth: usize,
    ) -> Option<Rect> {
        let mut acc: Option<Rect> = None;
        for child in children {
            let Some(b) = self.bbox_inner(child, depth + 1) else {
                continue;
            };
            let b = (outer * self.node(child).state.affine).transform_rect_bbox(b);
            acc = Some(match acc {
                Some(a) => a.union(b),
                None => b,
            });
        }
        acc
    }
}
