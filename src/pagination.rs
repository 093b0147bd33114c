use serde::Serialize;

use crate::error::Error;

/// One page of an ordered result set.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        Self {
            items,
            page,
            per_page,
            total,
            has_next: page
                .checked_mul(per_page)
                .map_or(false, |seen| seen < total),
            has_prev: page > 1,
        }
    }
}

/// Validate a 1-indexed page against a known total and return the query
/// offset. A page past the end fails loudly instead of clamping; page 1
/// over an empty set is the one allowed empty page.
pub fn offset_for_page(page: i64, per_page: i64, total: i64) -> Result<i64, Error> {
    if page < 1 || per_page < 1 {
        return Err(Error::PageOutOfRange);
    }
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or(Error::PageOutOfRange)?;
    if offset >= total && !(page == 1 && total == 0) {
        return Err(Error::PageOutOfRange);
    }
    Ok(offset)
}
