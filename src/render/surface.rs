use crate::foundation::core::IRect;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 raster buffer, row-major without padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// A transparent surface. Allocation failure is reported instead of aborting.
    pub fn new(width: u32, height: u32) -> SvgraphResult<Self> {
        let len = byte_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| {
            SvgraphError::render(format!("failed to allocate {width}x{height} surface"))
        })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> SvgraphResult<Self> {
        if data.len() != byte_len(width, height)? {
            return Err(SvgraphError::render(
                "surface data must match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> IRect {
        IRect::from_size(self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Pixel at `(x, y)`; transparent outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        match self.index(x, y) {
            Some(i) => [
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ],
            None => [0; 4],
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, px: [u8; 4]) {
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 4].copy_from_slice(&px);
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn fill(&mut self, px: [u8; 4]) {
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Zero every pixel outside `keep`.
    pub fn clear_outside(&mut self, keep: IRect) {
        let keep = keep.intersect(self.bounds());
        let w = self.width as i32;
        for y in 0..self.height as i32 {
            for x in 0..w {
                if !keep.contains(x, y) {
                    let i = ((y * w + x) as usize) * 4;
                    self.data[i..i + 4].fill(0);
                }
            }
        }
    }

    /// Scale every pixel by `coverage[i] / 255`.
    pub fn apply_coverage(&mut self, coverage: &[u8]) -> SvgraphResult<()> {
        if coverage.len() * 4 != self.data.len() {
            return Err(SvgraphError::render("coverage length must match surface"));
        }
        for (px, &c) in self.data.chunks_exact_mut(4).zip(coverage) {
            if c == 255 {
                continue;
            }
            for v in px.iter_mut() {
                *v = mul_div255_u8(u16::from(*v), u16::from(c));
            }
        }
        Ok(())
    }

    /// Straight (unpremultiplied) RGBA8 copy, for encoders.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

fn byte_len(width: u32, height: u32) -> SvgraphResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SvgraphError::limit("surface size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
