use serde::{Deserialize, Serialize};

use super::catalog_resource;
use crate::repository::ClientView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advertise {
    pub id: String,
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub is_enabled: bool,
}

catalog_resource!(Advertise, collection = "advertises", kind = "Advertise");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertiseView {
    pub id: String,
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<Advertise> for AdvertiseView {
    fn from(advertise: Advertise) -> Self {
        Self {
            id: advertise.id,
            name: advertise.name,
            image: advertise.image,
            link: advertise.link,
        }
    }
}

impl ClientView for Advertise {
    type View = AdvertiseView;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_omitted_when_absent() {
        let advertise = Advertise {
            id: "a1".into(),
            name: "Spring sale".into(),
            ..Advertise::default()
        };
        let json = serde_json::to_value(AdvertiseView::from(advertise)).unwrap();
        assert!(json.get("link").is_none());
    }
}
