use std::num::NonZeroU32;

use spellbook_catalog::types::PageSize;

/// The slice of search results currently requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: NonZeroU32,
    page_size: PageSize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl PageWindow {
    /// A window on the first page
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: NonZeroU32::MIN,
            page_size,
        }
    }

    pub fn page(&self) -> NonZeroU32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn next(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Go back one page, staying on the first page if already there
    pub fn previous(&mut self) {
        self.page = NonZeroU32::new(self.page.get() - 1).unwrap_or(NonZeroU32::MIN);
    }

    pub fn go_to(&mut self, page: NonZeroU32) {
        self.page = page;
    }

    /// Change the page size, keeping the current page number
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    pub fn reset(&mut self) {
        self.page = NonZeroU32::MIN;
    }

    /// The last page holding results, given the total number of results.
    ///
    /// An empty result set still has a first page.
    pub fn last_page(&self, count: u64) -> NonZeroU32 {
        let pages = count.div_ceil(u64::from(self.page_size.get()));
        u32::try_from(pages)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(if pages == 0 {
                NonZeroU32::MIN
            } else {
                NonZeroU32::MAX
            })
    }

    pub fn has_next(&self, count: u64) -> bool {
        self.page < self.last_page(count)
    }
}
