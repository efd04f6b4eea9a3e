use std::collections::HashMap;

use tracing::debug;

use crate::filters::FilterId;
use crate::scene::node::{NodeId, Region, Units};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPathDef {
    pub node: NodeId,
    pub units: Units,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskDef {
    pub node: NodeId,
    pub region: Region,
    pub content_units: Units,
}

/// Anything an identifier can name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resource {
    Node(NodeId),
    Filter(FilterId),
    ClipPath(ClipPathDef),
    Mask(MaskDef),
}

/// Identifier lookup table. Entries are non-owning; the document arena owns every node.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Resource>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`. A later registration of the same identifier replaces the earlier one.
    pub fn insert(&mut self, id: impl Into<String>, resource: Resource) -> Option<Resource> {
        let id = id.into();
        let previous = self.entries.insert(id.clone(), resource);
        if previous.is_some() {
            debug!(id, "duplicate identifier, last definition wins");
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.entries.get(id)
    }

    pub fn node(&self, id: &str) -> Option<NodeId> {
        match self.entries.get(id)? {
            Resource::Node(n) => Some(*n),
            _ => None,
        }
    }

    pub fn filter(&self, id: &str) -> Option<FilterId> {
        match self.entries.get(id)? {
            Resource::Filter(f) => Some(*f),
            _ => None,
        }
    }

    pub fn clip_path(&self, id: &str) -> Option<ClipPathDef> {
        match self.entries.get(id)? {
            Resource::ClipPath(c) => Some(*c),
            _ => None,
        }
    }

    pub fn mask(&self, id: &str) -> Option<MaskDef> {
        match self.entries.get(id)? {
            Resource::Mask(m) => Some(*m),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
