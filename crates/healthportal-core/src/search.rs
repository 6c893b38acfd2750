//! Client-side search and optimistic list updates.
//!
//! The portal never searches on the server: every listing screen loads the
//! whole collection and filters it locally as the user types. After a
//! create/update/delete the local list is patched in place instead of being
//! reloaded.

use crate::models::{Article, HasId, Medicine, Review, Ticket, User};
use crate::utils::contains_ignore_case;

/// Something a search box can filter
pub trait Searchable {
    /// True when `query` matches. An empty query matches everything.
    fn matches(&self, query: &str) -> bool;
}

fn opt_contains(field: Option<&str>, query: &str) -> bool {
    field.map(|s| contains_ignore_case(s, query)).unwrap_or(false)
}

impl Searchable for Article {
    fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.title, query) || contains_ignore_case(&self.category, query)
    }
}

impl Searchable for Medicine {
    fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.title, query) || contains_ignore_case(&self.category, query)
    }
}

impl Searchable for Review {
    fn matches(&self, query: &str) -> bool {
        query.is_empty() || opt_contains(self.medicine_name.as_deref(), query)
    }
}

impl Searchable for User {
    fn matches(&self, query: &str) -> bool {
        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        contains_ignore_case(&full_name, query) || opt_contains(self.email.as_deref(), query)
    }
}

impl Searchable for Ticket {
    fn matches(&self, query: &str) -> bool {
        if query.is_empty() || opt_contains(self.subject.as_deref(), query) {
            return true;
        }
        self.author()
            .map(|user| {
                opt_contains(user.email.as_deref(), query)
                    || opt_contains(user.first_name.as_deref(), query)
                    || opt_contains(user.last_name.as_deref(), query)
            })
            .unwrap_or(false)
    }
}

/// The admin review table also searches by the author's first name
pub fn admin_review_matches(review: &Review, query: &str) -> bool {
    review.matches(query)
        || review
            .author()
            .map(|user| opt_contains(user.first_name.as_deref(), query))
            .unwrap_or(false)
}

/// Items matching `query`, in their original order
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    filter_with(items, query, T::matches)
}

pub fn filter_with<'a, T>(items: &'a [T], query: &str, pred: impl Fn(&T, &str) -> bool) -> Vec<&'a T> {
    let query = query.trim();
    items.iter().filter(|item| pred(*item, query)).collect()
}

/// In-place patches applied after a successful write
pub trait ListExt<T: HasId> {
    /// Swap in the updated copy of an item; returns false if it is not loaded
    fn replace_by_id(&mut self, item: T) -> bool;
    /// Drop an item; returns false if it is not loaded
    fn remove_by_id(&mut self, id: &str) -> bool;
    /// New items go to the top
    fn prepend(&mut self, item: T);
}

impl<T: HasId> ListExt<T> for Vec<T> {
    fn replace_by_id(&mut self, item: T) -> bool {
        match self.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.len();
        self.retain(|item| item.id() != id);
        self.len() != before
    }

    fn prepend(&mut self, item: T) {
        self.insert(0, item);
    }
}
