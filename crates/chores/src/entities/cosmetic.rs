use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CosmeticKind {
    Avatar,
    Frame,
    Badge,
    Theme,
}

/// An item players can buy with coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CosmeticItem {
    pub id: String,
    pub name: String,
    pub kind: CosmeticKind,
    pub price: i64,
}

impl CosmeticItem {
    fn new(id: &str, name: &str, kind: CosmeticKind, price: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            price,
        }
    }
}

static CATALOG: Lazy<Vec<CosmeticItem>> = Lazy::new(|| {
    use CosmeticKind::*;
    vec![
        CosmeticItem::new("avatar-fox", "Fox avatar", Avatar, 20),
        CosmeticItem::new("avatar-robot", "Robot avatar", Avatar, 35),
        CosmeticItem::new("avatar-dragon", "Dragon avatar", Avatar, 80),
        CosmeticItem::new("frame-gold", "Gold frame", Frame, 50),
        CosmeticItem::new("frame-rainbow", "Rainbow frame", Frame, 120),
        CosmeticItem::new("badge-helper", "Helping hand badge", Badge, 10),
        CosmeticItem::new("badge-streak", "Streak badge", Badge, 40),
        CosmeticItem::new("theme-ocean", "Ocean theme", Theme, 60),
        CosmeticItem::new("theme-space", "Space theme", Theme, 150),
    ]
});

pub fn catalog() -> &'static [CosmeticItem] {
    &CATALOG
}

pub fn find(item_id: &str) -> Option<&'static CosmeticItem> {
    CATALOG.iter().find(|item| item.id == item_id)
}
