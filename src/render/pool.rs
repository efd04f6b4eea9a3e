use std::collections::VecDeque;

use crate::config::Limits;
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;

const DEFAULT_CAPACITY: usize = 8;

/// Bounded free list of layer surfaces. Released surfaces are reused by the next request of the
/// same size; the oldest entry is dropped once the pool is full.
#[derive(Debug)]
pub struct SurfacePool {
    free: VecDeque<Surface>,
    capacity: usize,
    reused: u64,
}

impl Default for SurfacePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SurfacePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: VecDeque::new(),
            capacity,
            reused: 0,
        }
    }

    /// A transparent `width x height` surface, recycled when possible.
    pub fn acquire(&mut self, width: u32, height: u32, limits: &Limits) -> SvgraphResult<Surface> {
        self.acquire_with(width, height, limits, Surface::new)
    }

    /// Like [`SurfacePool::acquire`], with `alloc` creating the surface on a miss.
    pub fn acquire_with(
        &mut self,
        width: u32,
        height: u32,
        limits: &Limits,
        alloc: impl FnOnce(u32, u32) -> SvgraphResult<Surface>,
    ) -> SvgraphResult<Surface> {
        limits.check_surface(width, height)?;
        if let Some(pos) = self
            .free
            .iter()
            .position(|s| s.width() == width && s.height() == height)
            && let Some(mut s) = self.free.remove(pos)
        {
            s.clear();
            self.reused += 1;
            return Ok(s);
        }
        alloc(width, height)
    }

    pub fn release(&mut self, surface: Surface) {
        if self.capacity == 0 {
            return;
        }
        self.free.push_back(surface);
        while self.free.len() > self.capacity {
            self.free.pop_front();
        }
    }

    /// How many acquisitions were served from the free list.
    pub fn reused(&self) -> u64 {
        self.reused
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}
