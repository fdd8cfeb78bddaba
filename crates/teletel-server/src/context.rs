//! Navigation history as an immutable chain of contexts.
//!
//! Every page visit happens inside a [`NavigationContext`]. Moving forward
//! derives a new context whose `previous` points at the old one, so RETOUR
//! is a pointer chase and nothing already in the chain is ever mutated.
//! Contexts accumulate the texts submitted along the way plus a free-form
//! map handlers use to pass state to pages deeper in the chain.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::page::Page;

/// One step of a user's walk through the page tree.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    previous: Option<Arc<NavigationContext>>,
    current_page: Page,
    data: HashMap<String, BTreeMap<usize, String>>,
    custom_data: HashMap<String, String>,
}

impl NavigationContext {
    /// Entry context of a fresh session, with empty history.
    pub fn root(page: Page) -> Arc<Self> {
        Arc::new(Self {
            previous: None,
            current_page: page,
            data: HashMap::new(),
            custom_data: HashMap::new(),
        })
    }

    /// Derive the context for `next`, recording what was submitted on the
    /// current page.
    ///
    /// The accumulated maps are copied, never shared, so contexts earlier in
    /// the chain keep the view they had when they were current.
    pub fn derive(self: &Arc<Self>, submitted: BTreeMap<usize, String>, next: Page) -> Self {
        let mut data = self.data.clone();
        data.insert(self.current_page.data_key(), submitted);
        Self {
            previous: Some(Arc::clone(self)),
            current_page: next,
            data,
            custom_data: self.custom_data.clone(),
        }
    }

    /// Attach a custom key/value pair, builder style.
    #[must_use]
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    /// The page this context renders.
    pub fn page(&self) -> &Page {
        &self.current_page
    }

    /// Context RETOUR goes back to, if any.
    pub fn previous(&self) -> Option<&Arc<NavigationContext>> {
        self.previous.as_ref()
    }

    /// Texts submitted on the page stored under `key`, by field index.
    pub fn submitted(&self, key: &str) -> Option<&BTreeMap<usize, String>> {
        self.data.get(key)
    }

    /// Free-form value stored by an earlier handler.
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn page(dir: &std::path::Path, name: Option<&str>) -> Page {
        Page::resolve(dir, 3615, name).await
    }

    #[tokio::test]
    async fn derive_links_back_and_records_submissions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("3615/meteo")).unwrap();

        let root = NavigationContext::root(page(dir.path(), None).await);
        let mut submitted = BTreeMap::new();
        submitted.insert(0, "meteo".to_string());

        let next = Arc::new(root.derive(submitted, page(dir.path(), Some("meteo")).await));

        assert_eq!(next.page().name(), "meteo");
        assert!(next.previous().is_some_and(|prev| Arc::ptr_eq(prev, &root)));
        assert_eq!(
            next.submitted("3615").and_then(|texts| texts.get(&0)).map(String::as_str),
            Some("meteo")
        );
        // The root context itself never saw the submission.
        assert!(root.submitted("3615").is_none());
    }

    #[tokio::test]
    async fn custom_data_flows_down_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("3615/a/b")).unwrap();

        let root = NavigationContext::root(page(dir.path(), None).await);
        let first = Arc::new(
            root.derive(BTreeMap::new(), page(dir.path(), Some("a")).await)
                .with_custom("username", "anna"),
        );
        let second = Arc::new(first.derive(BTreeMap::new(), page(dir.path(), Some("a.b")).await));

        assert_eq!(second.custom("username"), Some("anna"));
        assert_eq!(root.custom("username"), None);
    }

    #[tokio::test]
    async fn revisiting_a_page_overwrites_its_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("3615/menu")).unwrap();

        let root = NavigationContext::root(page(dir.path(), None).await);
        let menu = page(dir.path(), Some("menu")).await;

        let first_visit = Arc::new(root.derive(BTreeMap::new(), menu.clone()));
        let mut old = BTreeMap::new();
        old.insert(0, "old".to_string());
        let second_visit = Arc::new(first_visit.derive(old, menu.clone()));
        let mut new = BTreeMap::new();
        new.insert(0, "new".to_string());
        let third_visit = Arc::new(second_visit.derive(new, menu));

        assert_eq!(
            third_visit.submitted("menu").and_then(|texts| texts.get(&0)).map(String::as_str),
            Some("new")
        );
        // The intermediate context keeps the view it had when it was current.
        assert_eq!(
            second_visit.submitted("menu").and_then(|texts| texts.get(&0)).map(String::as_str),
            Some("old")
        );
    }
}
