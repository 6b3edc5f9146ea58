/// Where the pagination window currently sits. `page` may point past the
/// end after a filter change; `slice` clamps it and the owner writes the
/// clamped value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    size: usize,
    page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub start: usize,
    pub end: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl PageState {
    pub fn new(size: usize) -> Self {
        PageState {
            size: size.max(1),
            page: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Change the page size, re-anchoring on the first row of the page
    /// that was showing so the window stays near the same records.
    pub fn set_size(&mut self, size: usize) {
        let anchor = self.page * self.size;
        self.size = size.max(1);
        self.page = anchor / self.size;
    }
}

/// Window a visible sequence of `nrows` rows. `total_pages` is at least 1
/// even for an empty sequence; an out-of-range page clamps to the last
/// one before slicing.
pub fn slice(nrows: usize, state: &PageState) -> PageSlice {
    let size = state.size.max(1);
    let total_pages = nrows.div_ceil(size).max(1);
    let page = state.page.min(total_pages - 1);
    let start = (page * size).min(nrows);
    let end = (start + size).min(nrows);
    PageSlice {
        start,
        end,
        page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceil_with_a_floor_of_one() {
        for (nrows, size, expected) in [
            (0, 10, 1),
            (1, 10, 1),
            (10, 10, 1),
            (11, 10, 2),
            (8, 3, 3),
            (100, 25, 4),
        ] {
            let slice = slice(nrows, &PageState::new(size));
            assert_eq!(slice.total_pages, expected, "nrows={nrows} size={size}");
        }
    }

    #[test]
    fn empty_sequence_yields_one_empty_page() {
        let slice = slice(0, &PageState::new(10));
        assert_eq!((slice.start, slice.end), (0, 0));
        assert_eq!(slice.page, 0);
        assert_eq!(slice.total_pages, 1);
    }

    #[test]
    fn out_of_range_page_clamps_to_the_last_one() {
        let mut state = PageState::new(10);
        state.set_page(7);
        let slice = slice(35, &state);
        assert_eq!(slice.page, 3);
        assert_eq!((slice.start, slice.end), (30, 35));
    }

    #[test]
    fn last_page_may_be_short() {
        let mut state = PageState::new(3);
        state.set_page(2);
        let slice = slice(8, &state);
        assert_eq!((slice.start, slice.end), (6, 8));
    }

    #[test]
    fn size_change_reanchors_on_the_first_visible_row() {
        // Page 3 of size 10 starts at row 30; with size 25 that row sits
        // on page 1.
        let mut state = PageState::new(10);
        state.set_page(3);
        state.set_size(25);
        assert_eq!(state.page(), 1);

        // And back down: row 25 at size 5 is page 5.
        state.set_size(5);
        assert_eq!(state.page(), 5);
    }

    #[test]
    fn zero_size_is_lifted_to_one() {
        let mut state = PageState::new(0);
        assert_eq!(state.size(), 1);
        state.set_size(0);
        assert_eq!(state.size(), 1);
        assert_eq!(slice(4, &state).total_pages, 4);
    }
}
