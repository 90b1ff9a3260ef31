//! Page-number window shown under paged lists.

/// Number of page buttons shown at most.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// TMDB refuses pages beyond this number.
pub const MAX_TOTAL_PAGES: u32 = 500;

/// Clamps an upstream page count into `[1, MAX_TOTAL_PAGES]`.
#[must_use]
pub fn clamp_total_pages(total_pages: u32) -> u32 {
    total_pages.clamp(1, MAX_TOTAL_PAGES)
}

/// Computes the page numbers to show around `current_page`.
///
/// The window is centered on `current_page` and, near either end, slides
/// toward the boundary that still has room so that it keeps
/// `min(total_pages, max_visible)` entries. Returns an empty window when
/// there is nothing to navigate (`total_pages <= 1`).
///
/// `current_page` outside `[1, total_pages]` is clamped first.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn compute_window(current_page: u32, total_pages: u32, max_visible: u32) -> Vec<u32> {
    if total_pages <= 1 || max_visible == 0 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let half = max_visible / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = current.saturating_add(half).min(total_pages);

    if end - start + 1 < max_visible {
        if start == 1 {
            end = max_visible;
        } else if end == total_pages {
            start = total_pages - max_visible + 1;
        }
    }
    // An even window centered on `current` is one wider than allowed.
    if end - start + 1 > max_visible {
        end = start + max_visible - 1;
    }

    (start..=end).collect()
}

/// Page buttons plus previous/next state for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct PaginationWindow {
    /// Page numbers to show, ascending.
    pub pages: Vec<u32>,
    /// Highlighted page.
    pub current_page: u32,
    /// Last page.
    pub total_pages: u32,
}

impl PaginationWindow {
    /// Derives the window for the default button count.
    #[must_use]
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        Self {
            pages: compute_window(current_page, total_pages, MAX_VISIBLE_PAGES),
            current_page,
            total_pages,
        }
    }

    /// No pagination control should be rendered.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page before the current one, if any.
    #[must_use]
    pub fn previous(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page.saturating_sub(1))
    }

    /// Page after the current one, if any.
    #[must_use]
    pub fn next(&self) -> Option<u32> {
        (self.current_page < self.total_pages).then(|| self.current_page.saturating_add(1))
    }
}
