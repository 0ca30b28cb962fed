//! Accumulated list state for infinite scrolling.

use std::collections::HashSet;

use crate::models::SpeciesBasic;

/// Whether a page request is outstanding for a [`PagedList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchGate {
    #[default]
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

/// Pages of basic records appended in offset order, deduplicated by id.
///
/// `next_offset` follows the upstream cursor (raw page lengths), not the
/// number of records kept locally.
#[derive(Debug, Clone)]
pub struct PagedList {
    items: Vec<SpeciesBasic>,
    seen: HashSet<u32>,
    next_offset: u32,
    has_more: bool,
    page_size: u32,
    gate: FetchGate,
}

impl PagedList {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            next_offset: 0,
            has_more: true,
            page_size,
            gate: FetchGate::Idle,
        }
    }

    pub fn items(&self) -> &[SpeciesBasic] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_offset(&self) -> u32 {
        self.next_offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_fetching(&self) -> bool {
        self.gate == FetchGate::Fetching
    }

    /// Claims the gate for the next page. Returns `None` while another page is
    /// in flight or once the end of data has been seen; such calls are dropped.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.gate == FetchGate::Fetching {
            return None;
        }
        self.gate = FetchGate::Fetching;
        Some(PageRequest {
            offset: self.next_offset,
            limit: self.page_size,
        })
    }

    /// Appends a fetched page and releases the gate. Returns how many records
    /// were new. A short or empty page marks the end of data for good.
    pub fn append_page(&mut self, page: Vec<SpeciesBasic>, requested_limit: u32) -> usize {
        self.gate = FetchGate::Idle;
        self.next_offset += page.len() as u32;
        if page.is_empty() || (page.len() as u32) < requested_limit {
            self.has_more = false;
        }

        let before = self.items.len();
        for item in page {
            if self.seen.insert(item.id) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Releases the gate after a failed fetch; the same offset is retried on
    /// the next request.
    pub fn fail_fetch(&mut self) {
        self.gate = FetchGate::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[u32]) -> Vec<SpeciesBasic> {
        ids.iter()
            .map(|&id| SpeciesBasic {
                id,
                name: format!("species-{}", id),
                ..Default::default()
            })
            .collect()
    }

    fn ids(list: &PagedList) -> Vec<u32> {
        list.items().iter().map(|p| p.id).collect()
    }

    #[test]
    fn pages_accumulate_in_order() {
        let mut list = PagedList::new(3);
        assert_eq!(list.append_page(page(&[1, 2, 3]), 3), 3);
        assert_eq!(list.append_page(page(&[4, 5, 6]), 3), 3);
        assert_eq!(ids(&list), [1, 2, 3, 4, 5, 6]);
        assert_eq!(list.next_offset(), 6);
        assert!(list.has_more());
    }

    #[test]
    fn replayed_page_changes_nothing_but_cursor() {
        let mut list = PagedList::new(3);
        list.append_page(page(&[1, 2, 3]), 3);
        let before = list.items().to_vec();

        assert_eq!(list.append_page(page(&[1, 2, 3]), 3), 0);
        assert_eq!(list.items(), &before[..]);
        // cursor follows upstream, not the deduplicated count
        assert_eq!(list.next_offset(), 6);
    }

    #[test]
    fn duplicates_inside_a_page_keep_first() {
        let mut list = PagedList::new(4);
        let mut p = page(&[7, 8, 7, 9]);
        p[2].name = "duplicate".into();
        assert_eq!(list.append_page(p, 4), 3);
        assert_eq!(ids(&list), [7, 8, 9]);
        assert_eq!(list.items()[0].name, "species-7");
        assert_eq!(list.next_offset(), 4);
    }

    #[test]
    fn short_page_ends_data_permanently() {
        let mut list = PagedList::new(3);
        list.append_page(page(&[1, 2]), 3);
        assert!(!list.has_more());
        assert_eq!(list.begin_fetch(), None);

        list.append_page(page(&[3, 4, 5]), 3);
        assert!(!list.has_more());
    }

    #[test]
    fn empty_page_after_exact_multiple_ends_data() {
        let mut list = PagedList::new(2);
        list.append_page(page(&[1, 2]), 2);
        assert!(list.has_more());
        list.append_page(Vec::new(), 2);
        assert!(!list.has_more());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn gate_drops_requests_while_fetching() {
        let mut list = PagedList::new(2);
        let req = list.begin_fetch().unwrap();
        assert_eq!(req, PageRequest { offset: 0, limit: 2 });
        assert!(list.is_fetching());
        assert_eq!(list.begin_fetch(), None);

        list.append_page(page(&[1, 2]), req.limit);
        assert!(!list.is_fetching());
        assert_eq!(list.begin_fetch(), Some(PageRequest { offset: 2, limit: 2 }));
    }

    #[test]
    fn failure_releases_gate_at_same_offset() {
        let mut list = PagedList::new(5);
        list.begin_fetch().unwrap();
        list.fail_fetch();
        assert!(!list.is_fetching());
        assert_eq!(list.begin_fetch(), Some(PageRequest { offset: 0, limit: 5 }));
    }
}
