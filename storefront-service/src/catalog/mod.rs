//! Catalog resources: products, categories, coupons, banners and advertisements
//!
//! All five are plain documents with a display name and an `is_enabled` flag. They
//! share [`CollectionRepository`](crate::repository::CollectionRepository) for
//! persistence and the name-prefix search policy.

mod advertise;
mod banner;
mod category;
mod coupon;
mod product;

pub use advertise::{Advertise, AdvertiseView};
pub use banner::{Banner, BannerView};
pub use category::{Category, CategoryView};
pub use coupon::Coupon;
pub use product::{Product, ProductView};

/// Implements [`Searchable`](crate::search::Searchable) and
/// [`Resource`](crate::repository::Resource) for a catalog struct with `id`, `name`
/// and `is_enabled` fields.
macro_rules! catalog_resource {
    ($ty:ty, collection = $collection:literal, kind = $kind:literal) => {
        impl $crate::search::Searchable for $ty {
            const POLICY: $crate::search::SearchPolicy = $crate::search::SearchPolicy::NamePrefix;

            fn search_name(&self) -> &str {
                &self.name
            }
        }

        impl $crate::repository::Resource for $ty {
            const COLLECTION: &'static str = $collection;
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn is_enabled(&self) -> bool {
                self.is_enabled
            }
        }
    };
}

pub(crate) use catalog_resource;
