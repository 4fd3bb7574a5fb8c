//! Run-scoped category tree shared by every search task

use crate::model::{CategoryGroup, SearchGroup};
use std::sync::{Mutex, PoisonError};

/// Category-keyed collection of search groups
///
/// Merges append under one lock, so concurrent searches never lose each
/// other's groups. Nothing is deduplicated here; that happens on persist.
#[derive(Debug, Default)]
pub struct ResultTree {
    categories: Mutex<Vec<CategoryGroup>>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree pre-seeded with the given categories, in order
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = names.into_iter().map(CategoryGroup::new).collect();
        Self {
            categories: Mutex::new(categories),
        }
    }

    /// Appends `group` to its category, creating the category if it is new
    pub fn merge(&self, category: &str, group: SearchGroup) {
        let mut categories = self
            .categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match categories.iter_mut().find(|c| c.category == category) {
            Some(existing) => existing.searches.push(group),
            None => {
                let mut created = CategoryGroup::new(category);
                created.searches.push(group);
                categories.push(created);
            }
        }
    }

    /// Copy of the current tree
    pub fn snapshot(&self) -> Vec<CategoryGroup> {
        self.categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consumes the tree once every writer is done
    pub fn into_inner(self) -> Vec<CategoryGroup> {
        self.categories
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
