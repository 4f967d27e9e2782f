//! Lazy traversal of paged listings.
//!
//! [`paginate`] turns a "fetch page N" function into a stream of pages. A page is only
//! requested when the stream is polled, so a consumer that stops reading early never
//! pays for the pages it skipped.

use crate::error::ReportError;
use futures::stream::{self, Stream};
use std::future::Future;

/// Page numbers start at 1.
pub const FIRST_PAGE: u32 = 1;

/// One page of a remote listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page to request next, or `None` when the listing is exhausted.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: Option<u32>) -> Self {
        Self { items, next_page }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Builds a page from a provider that reports "no next page" as page 0.
    pub fn with_next_sentinel(items: Vec<T>, next_page: u32) -> Self {
        Self::new(items, (next_page != 0).then_some(next_page))
    }
}

/// Upper bound on the number of pages a single listing may fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageLimit(Option<u32>);

impl PageLimit {
    pub fn unlimited() -> Self {
        Self(None)
    }

    pub fn at_most(pages: u32) -> Self {
        Self(Some(pages))
    }

    fn allows(&self, fetched: u32) -> bool {
        self.0.map_or(true, |max| fetched < max)
    }
}

impl From<Option<u32>> for PageLimit {
    fn from(max_pages: Option<u32>) -> Self {
        Self(max_pages)
    }
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    next: Option<u32>,
    fetched: u32,
}

/// Streams the items of every page, starting at [`FIRST_PAGE`].
///
/// The stream ends after a page without a `next_page`, after a `next_page` that does
/// not move forward, or once `limit` pages have been fetched. A fetch error is yielded
/// as the final item.
pub fn paginate<'a, T, F, Fut>(
    mut fetch: F,
    limit: PageLimit,
) -> impl Stream<Item = Result<Vec<T>, ReportError>> + 'a
where
    T: 'a,
    F: FnMut(u32) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, ReportError>> + 'a,
{
    let start = Cursor {
        next: Some(FIRST_PAGE),
        fetched: 0,
    };

    stream::try_unfold(start, move |cursor| {
        let request = match cursor.next {
            Some(page) if limit.allows(cursor.fetched) => Some((page, fetch(page))),
            Some(page) => {
                tracing::warn!(
                    page,
                    max_pages = cursor.fetched,
                    "Hit page limit before the listing was exhausted. Data may be incomplete."
                );
                None
            }
            None => None,
        };

        async move {
            let Some((page, response)) = request else {
                return Ok(None);
            };
            let Page { items, next_page } = response.await?;

            let next = next_page.filter(|next| *next > page);
            if next_page.is_some() && next.is_none() {
                tracing::debug!(page, ?next_page, "Next page does not advance, stopping");
            }

            let cursor = Cursor {
                next,
                fetched: cursor.fetched + 1,
            };
            Ok::<_, ReportError>(Some((items, cursor)))
        }
    })
}
