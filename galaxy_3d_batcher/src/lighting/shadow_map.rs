//! Temporary shadow map handles and a pooled atlas allocator.
//!
//! Handles are valid for the current frame only; the owner of the
//! allocator calls `reset` once the frame has been submitted.

use glam::{UVec2, UVec4};
use crate::engine_debug;

/// Region of a shadow atlas page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMap {
    /// Atlas page (texture) index
    pub page: u32,
    /// x, y, width, height in texels
    pub region: UVec4,
}

impl ShadowMap {
    pub fn new(page: u32, region: UVec4) -> Self {
        Self { page, region }
    }

    /// Width and height in texels.
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.region.z, self.region.w)
    }
}

/// Row of equally tall regions in a page.
#[derive(Debug, Clone, Copy)]
struct Shelf {
    y: u32,
    height: u32,
    used_width: u32,
}

#[derive(Debug, Clone, Default)]
struct Page {
    shelves: Vec<Shelf>,
    used_height: u32,
}

/// Shelf-packing allocator over a fixed budget of square atlas pages.
///
/// Requests are served first-fit in page order; a request that fits in no
/// page and cannot open a new page (budget exhausted) returns `None`.
#[derive(Debug, Clone)]
pub struct ShadowMapAllocator {
    page_size: u32,
    max_pages: u32,
    pages: Vec<Page>,
    num_allocations: usize,
}

impl ShadowMapAllocator {
    /// Create an allocator with `max_pages` pages of `page_size`² texels.
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
            pages: Vec::new(),
            num_allocations: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Pages in use this frame.
    pub fn num_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn num_allocations(&self) -> usize {
        self.num_allocations
    }

    /// Release every allocation.
    pub fn reset(&mut self) {
        if self.num_allocations > 0 {
            engine_debug!("galaxy3d::ShadowMapAllocator", "Released {} shadow maps on {} pages",
                self.num_allocations, self.pages.len());
        }
        self.pages.clear();
        self.num_allocations = 0;
    }

    /// Allocate a region of `size` texels.
    pub fn allocate(&mut self, size: UVec2) -> Option<ShadowMap> {
        if size.x == 0 || size.y == 0 || size.x > self.page_size || size.y > self.page_size {
            return None;
        }

        for (page_index, page) in self.pages.iter_mut().enumerate() {
            if let Some(origin) = Self::allocate_in_page(page, self.page_size, size) {
                self.num_allocations += 1;
                return Some(ShadowMap::new(page_index as u32, UVec4::new(origin.x, origin.y, size.x, size.y)));
            }
        }

        if self.pages.len() as u32 >= self.max_pages {
            return None;
        }

        let mut page = Page::default();
        let origin = Self::allocate_in_page(&mut page, self.page_size, size)?;
        self.pages.push(page);
        self.num_allocations += 1;
        Some(ShadowMap::new(self.pages.len() as u32 - 1, UVec4::new(origin.x, origin.y, size.x, size.y)))
    }

    fn allocate_in_page(page: &mut Page, page_size: u32, size: UVec2) -> Option<UVec2> {
        for shelf in &mut page.shelves {
            if size.y <= shelf.height && shelf.used_width + size.x <= page_size {
                let origin = UVec2::new(shelf.used_width, shelf.y);
                shelf.used_width += size.x;
                return Some(origin);
            }
        }

        if page.used_height + size.y > page_size {
            return None;
        }

        let shelf = Shelf { y: page.used_height, height: size.y, used_width: size.x };
        page.used_height += size.y;
        page.shelves.push(shelf);
        Some(UVec2::new(0, shelf.y))
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
