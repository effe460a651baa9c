use std::num::NonZeroUsize;

use crate::items::NormalizedItem;

/// Name of the first page. Every other page is `page{n}`.
pub const FIRST_PAGE_NAME: &str = "index";

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// One page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T = NormalizedItem> {
    /// 1-based.
    pub number: usize,
    pub items: Vec<T>,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// This page's own name, as used by prev/next links of its neighbours.
    pub fn name(&self) -> String {
        page_name(self.number)
    }
}

/// Name of page `number` (1-based): `index` for the first page, `page{n}` after.
///
/// Consumers address the first page by this canonical name, never `page1`.
pub fn page_name(number: usize) -> String {
    if number <= 1 {
        FIRST_PAGE_NAME.to_string()
    } else {
        format!("page{number}")
    }
}

/// Splits sorted items into consecutive pages of `page_size`.
///
/// Only the last page may be shorter. Pages are numbered from 1; page 1 has
/// no previous link, page 2 links back to [`FIRST_PAGE_NAME`], and the last
/// page has no next link. Concatenating every page's items gives back the
/// input unchanged.
///
/// An empty input still yields one empty first page so the site always has
/// its index.
pub fn paginate<T: Clone>(items: &[T], page_size: NonZeroUsize) -> Vec<Page<T>> {
    if items.is_empty() {
        return vec![Page {
            number: 1,
            items: Vec::new(),
            prev_link: None,
            next_link: None,
        }];
    }

    let chunks: Vec<&[T]> = items.chunks(page_size.get()).collect();
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| {
            let number = idx + 1;
            Page {
                number,
                items: chunk.to_vec(),
                prev_link: (number > 1).then(|| page_name(number - 1)),
                next_link: (number < total).then(|| page_name(number + 1)),
            }
        })
        .collect()
}
