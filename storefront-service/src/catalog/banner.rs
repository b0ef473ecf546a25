use serde::{Deserialize, Serialize};

use super::catalog_resource;
use crate::repository::ClientView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub id: String,
    pub name: String,
    /// Image URL, usually one returned by the upload endpoint
    pub image: String,
    pub is_enabled: bool,
}

catalog_resource!(Banner, collection = "banners", kind = "Banner");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerView {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<Banner> for BannerView {
    fn from(banner: Banner) -> Self {
        Self {
            id: banner.id,
            name: banner.name,
            image: banner.image,
        }
    }
}

impl ClientView for Banner {
    type View = BannerView;
}
