use serde::{Deserialize, Serialize};

use super::catalog_resource;
use crate::repository::ClientView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub is_enabled: bool,
}

catalog_resource!(Category, collection = "category", kind = "Category");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

impl ClientView for Category {
    type View = CategoryView;
}
