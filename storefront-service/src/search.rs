//! Text search over listable resources
//!
//! Simple resources match when their name begins with the fragment. Orders match
//! when either the customer name or the customer email contains the fragment.
//! Matching is case-sensitive and an empty fragment matches everything.

use crate::store::FilterCondition;

/// How a resource kind interprets a search fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPolicy {
    /// `name` starts with the fragment
    NamePrefix,
    /// `name` or `email` contains the fragment
    NameOrEmailContains,
}

impl SearchPolicy {
    /// Filter the store can evaluate itself, if the policy allows it
    ///
    /// Substring matching is not something every backend can answer, so only the
    /// prefix policy is pushed down.
    pub fn store_filter(self, fragment: Option<&str>) -> Option<FilterCondition> {
        let fragment = fragment.filter(|f| !f.is_empty())?;
        match self {
            SearchPolicy::NamePrefix => Some(FilterCondition::starts_with("name", fragment)),
            SearchPolicy::NameOrEmailContains => None,
        }
    }
}

/// Entities that can be searched by text
pub trait Searchable {
    /// Matching rule for this entity kind
    const POLICY: SearchPolicy;

    /// Display name the fragment is matched against
    fn search_name(&self) -> &str;

    /// Secondary email field, only consulted by [`SearchPolicy::NameOrEmailContains`]
    fn search_email(&self) -> Option<&str> {
        None
    }
}

/// Whether `entity` matches the search fragment
pub fn matches<T: Searchable>(entity: &T, fragment: Option<&str>) -> bool {
    let Some(fragment) = fragment.filter(|f| !f.is_empty()) else {
        return true;
    };

    match T::POLICY {
        SearchPolicy::NamePrefix => entity.search_name().starts_with(fragment),
        SearchPolicy::NameOrEmailContains => {
            entity.search_name().contains(fragment)
                || entity
                    .search_email()
                    .is_some_and(|email| email.contains(fragment))
        }
    }
}

/// Keep the entities matching `fragment`, preserving order
pub fn filter<T: Searchable>(items: Vec<T>, fragment: Option<&str>) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| matches(item, fragment))
        .collect()
}
