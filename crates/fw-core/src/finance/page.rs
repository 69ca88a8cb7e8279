use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Items held in a [`PageBuffer`] are deduplicated by this identity.
pub trait PageItem: Clone + Send + Sync + 'static {
    fn item_id(&self) -> &str;
}

/// One page returned by a remote list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Server-reported size of the whole collection.
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Which list operation is currently in flight, if any.
///
/// Modelled as a single value so at most one of the three activities can be
/// active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Refreshing,
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn is_loading_more(&self) -> bool {
        matches!(self, FetchStatus::LoadingMore)
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self, FetchStatus::Refreshing)
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self, FetchStatus::Idle)
    }
}

/// Accumulated, order-preserving, deduplicated view of a remote collection.
///
/// `offset` counts rows consumed from the server; it equals `items.len()`
/// unless the server window shifted and returned rows already held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageBuffer<T> {
    items: Vec<T>,
    total: usize,
    offset: usize,
    has_more: bool,
}

impl<T> Default for PageBuffer<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset: 0,
            has_more: false,
        }
    }
}

impl<T: PageItem> PageBuffer<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.item_id() == id)
    }

    /// Replace the whole buffer with a first page.
    pub fn replace_with(&mut self, page: Page<T>) {
        let returned = page.items.len();
        let mut seen = HashSet::with_capacity(returned);
        self.items = page
            .items
            .into_iter()
            .filter(|item| seen.insert(item.item_id().to_string()))
            .collect();
        self.total = page.total;
        self.offset = returned;
        self.has_more = returned > 0 && self.offset < self.total;
    }

    /// Append a following page, skipping ids already held.
    ///
    /// Returns how many items were actually added.
    pub fn append(&mut self, page: Page<T>) -> usize {
        let returned = page.items.len();
        let mut seen: HashSet<String> = self
            .items
            .iter()
            .map(|item| item.item_id().to_string())
            .collect();
        let before = self.items.len();
        for item in page.items {
            if seen.insert(item.item_id().to_string()) {
                self.items.push(item);
            }
        }
        self.total = page.total;
        self.offset += returned;
        // An empty page ends pagination even if the reported total disagrees.
        self.has_more = returned > 0 && self.offset < self.total;
        self.items.len() - before
    }

    /// Replace an item in place. Returns false when the id is not held.
    pub fn update_item(&mut self, item: T) -> bool {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.item_id() == item.item_id())
        {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Remove an item locally, shrinking `offset` and `total` with it.
    pub fn remove_item(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.item_id() == id)?;
        let removed = self.items.remove(index);
        self.offset = self.offset.saturating_sub(1);
        self.total = self.total.saturating_sub(1);
        self.has_more = self.offset < self.total;
        Some(removed)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
