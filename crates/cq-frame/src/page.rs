use serde::Serialize;

use crate::FrameError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

/// Slice page `page_index` (zero-based) of `page_size` rows. A page starting
/// past the end is empty but still reports the full total.
pub fn paginate<T: Clone>(
    rows: &[T],
    page_index: usize,
    page_size: usize,
) -> Result<Page<T>, FrameError> {
    if page_size == 0 {
        return Err(FrameError::InvalidPageSize(page_size));
    }

    let total = rows.len();
    let start = page_index.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Ok(Page {
        content: rows[start..end].to_vec(),
        page_index,
        page_size,
        total,
    })
}
