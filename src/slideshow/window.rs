/// The locally materialized prefix of the catalog ordering
///
/// Descriptors are kept in arrival order and never re-sorted. `total_count` is
/// what the catalog last reported for the whole ordering; the window never holds
/// more than that.

use log::warn;
use std::collections::BTreeSet;

use crate::catalog::{ImageDescriptor, Page};

#[derive(Debug, Clone, Default)]
pub struct Window {
    descriptors: Vec<ImageDescriptor>,
    total_count: usize,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a first page
    pub fn replace(&mut self, page: Page) {
        self.descriptors.clear();
        self.total_count = 0;
        self.append(page);
    }

    /// Append a continuation page
    ///
    /// Descriptors whose filename is already held are dropped. Returns how many
    /// descriptors were actually added.
    pub fn append(&mut self, page: Page) -> usize {
        let before = self.descriptors.len();

        for descriptor in page.descriptors {
            if self.position(&descriptor.filename).is_some() {
                warn!(
                    "⚠️  Catalog repeated {} across pages, ignoring duplicate",
                    descriptor.filename
                );
                continue;
            }
            self.descriptors.push(descriptor);
        }

        self.total_count = page.total_count.max(self.descriptors.len());
        self.descriptors.len() - before
    }

    /// Declare the ordering fully materialized at the current length
    pub fn seal(&mut self) {
        self.total_count = self.descriptors.len();
    }

    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.total_count = 0;
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Whether the whole ordering is held locally
    pub fn is_complete(&self) -> bool {
        self.descriptors.len() >= self.total_count
    }

    pub fn get(&self, index: usize) -> Option<&ImageDescriptor> {
        self.descriptors.get(index)
    }

    pub fn last(&self) -> Option<&ImageDescriptor> {
        self.descriptors.last()
    }

    pub fn position(&self, filename: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.filename == filename)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.descriptors.iter()
    }
}

/// Window indices whose payload has been requested and confirmed warm
///
/// Indices only mean something relative to one window, so this is cleared on
/// every window reset. A requested index is never requested again, even if the
/// warm failed.
#[derive(Debug, Clone, Default)]
pub struct PreloadSet {
    requested: BTreeSet<usize>,
    warmed: BTreeSet<usize>,
}

impl PreloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index` as requested; false if it already was
    pub fn request(&mut self, index: usize) -> bool {
        self.requested.insert(index)
    }

    pub fn mark_warmed(&mut self, index: usize) {
        self.warmed.insert(index);
    }

    pub fn is_warmed(&self, index: usize) -> bool {
        self.warmed.contains(&index)
    }

    pub fn is_requested(&self, index: usize) -> bool {
        self.requested.contains(&index)
    }

    pub fn warmed(&self) -> impl Iterator<Item = usize> + '_ {
        self.warmed.iter().copied()
    }

    pub fn clear(&mut self) {
        self.requested.clear();
        self.warmed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Locator;
    use chrono::Utc;

    fn page(names: &[&str], total_count: usize) -> Page {
        Page {
            descriptors: names
                .iter()
                .map(|name| ImageDescriptor {
                    filename: name.to_string(),
                    locator: Locator::Remote(format!("http://catalog/{}", name)),
                    mime_type: "image/jpeg".to_string(),
                    size: 0,
                    width: None,
                    height: None,
                    modified_date: Utc::now(),
                })
                .collect(),
            total_count,
        }
    }

    #[test]
    fn test_append_keeps_arrival_order() {
        let mut window = Window::new();
        window.replace(page(&["c", "a"], 4));
        let added = window.append(page(&["d", "b"], 4));

        assert_eq!(added, 2);
        let names: Vec<_> = window.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, ["c", "a", "d", "b"]);
        assert!(window.is_complete());
    }

    #[test]
    fn test_append_drops_duplicates_and_bounds_total() {
        let mut window = Window::new();
        window.replace(page(&["a", "b", "c"], 10));
        let added = window.append(page(&["a", "b"], 10));

        assert_eq!(added, 0);
        assert_eq!(window.len(), 3);
        assert_eq!(window.total_count(), 10);

        // The catalog shrank below what we already hold
        window.append(page(&["d"], 2));
        assert_eq!(window.len(), 4);
        assert_eq!(window.total_count(), 4);
    }

    #[test]
    fn test_seal_and_replace() {
        let mut window = Window::new();
        window.replace(page(&["a", "b"], 9));
        assert!(!window.is_complete());

        window.seal();
        assert!(window.is_complete());

        window.replace(page(&["z"], 5));
        assert_eq!(window.len(), 1);
        assert_eq!(window.total_count(), 5);
        assert_eq!(window.position("z"), Some(0));
        assert_eq!(window.position("a"), None);
    }

    #[test]
    fn test_preload_set_requests_once() {
        let mut set = PreloadSet::new();
        assert!(set.request(3));
        assert!(!set.request(3));
        assert!(!set.is_warmed(3));

        set.mark_warmed(3);
        assert!(set.is_warmed(3));
        assert_eq!(set.warmed().collect::<Vec<_>>(), [3]);

        set.clear();
        assert!(!set.is_requested(3));
        assert!(!set.is_warmed(3));
    }
}
