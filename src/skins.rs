//! Avatar skin catalog
//!
//! Fixed at build time. The first entry is free and always owned.

/// One purchasable look for the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub id: &'static str,
    pub name: &'static str,
    /// Image path relative to the page
    pub image: &'static str,
    pub cost: u64,
}

pub const DEFAULT_SKIN: &str = "classic";

pub static CATALOG: [Skin; 4] = [
    Skin {
        id: DEFAULT_SKIN,
        name: "Classic",
        image: "pictures/result.png",
        cost: 0,
    },
    Skin {
        id: "duck",
        name: "Duck",
        image: "pictures/duck.png",
        cost: 10,
    },
    Skin {
        id: "twitter",
        name: "Twitter",
        image: "pictures/twitter.png",
        cost: 50,
    },
    Skin {
        id: "black",
        name: "Black",
        image: "pictures/black.png",
        cost: 100,
    },
];

/// Look up a skin by id
pub fn find(id: &str) -> Option<&'static Skin> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Image for a skin id, falling back to the default look
pub fn image_for(id: &str) -> &'static str {
    find(id).unwrap_or(&CATALOG[0]).image
}
