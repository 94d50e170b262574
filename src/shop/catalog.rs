//! The static accessory catalog and the search, filter and sort options of the shop page.

use std::{cmp::Ordering, fmt::Display, str::FromStr, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{Error, ledger::EggAmount};

/// The identifier of an accessory in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The shelf an accessory sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clothes,
    Toys,
    Fashion,
    House,
}

impl Category {
    /// All categories in the order the shop shows its tabs.
    pub const ALL: [Category; 4] = [
        Category::Clothes,
        Category::Toys,
        Category::Fashion,
        Category::House,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Clothes => "clothes",
            Category::Toys => "toys",
            Category::Fashion => "fashion",
            Category::House => "house",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Clothes => "Clothes",
            Category::Toys => "Toys",
            Category::Fashion => "Fashion",
            Category::House => "House",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(Error::NotFound)
    }
}

/// Which categories the shop page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    /// Anything other than a known category shows all categories.
    fn from(value: Option<&str>) -> Self {
        value
            .and_then(|value| value.parse().ok())
            .map(CategoryFilter::Only)
            .unwrap_or_default()
    }
}

/// The order the shop page lists accessories in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    #[serde(rename = "price-high")]
    PriceHighToLow,
    #[serde(rename = "name-asc")]
    NameAToZ,
    #[serde(rename = "name-desc")]
    NameZToA,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::PriceLowToHigh,
        SortOrder::PriceHighToLow,
        SortOrder::NameAToZ,
        SortOrder::NameZToA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::PriceLowToHigh => "price-low",
            SortOrder::PriceHighToLow => "price-high",
            SortOrder::NameAToZ => "name-asc",
            SortOrder::NameZToA => "name-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::PriceLowToHigh => "Price: Low to High",
            SortOrder::PriceHighToLow => "Price: High to Low",
            SortOrder::NameAToZ => "Name: A to Z",
            SortOrder::NameZToA => "Name: Z to A",
        }
    }

    fn compare(self, a: &Accessory, b: &Accessory) -> Ordering {
        match self {
            SortOrder::PriceLowToHigh => a.price.cmp(&b.price),
            SortOrder::PriceHighToLow => b.price.cmp(&a.price),
            SortOrder::NameAToZ => compare_names(&a.name, &b.name),
            SortOrder::NameZToA => compare_names(&b.name, &a.name),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// An accessory the child can buy with golden eggs.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessory {
    pub id: ItemId,
    pub name: String,
    pub price: EggAmount,
    pub category: Category,
    pub description: String,
    /// The URL of the picture of the accessory.
    pub image: String,
}

impl Accessory {
    fn new(
        id: &str,
        name: &str,
        price: u64,
        category: Category,
        description: &str,
        image: &str,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.to_owned(),
            price: EggAmount::new_unchecked(price),
            category,
            description: description.to_owned(),
            image: image.to_owned(),
        }
    }
}

static CATALOG: LazyLock<Vec<Accessory>> = LazyLock::new(|| {
    vec![
        Accessory::new(
            "1",
            "Pink Party Dress",
            25,
            Category::Clothes,
            "A beautiful pink party dress for special occasions.",
            "https://images.unsplash.com/photo-1596462502278-27bfdc403348?w=300&q=80",
        ),
        Accessory::new(
            "2",
            "Beach Set",
            30,
            Category::Clothes,
            "Perfect outfit for a day at the beach.",
            "https://images.unsplash.com/photo-1575537302964-96cd47c06b1b?w=300&q=80",
        ),
        Accessory::new(
            "3",
            "Mini Puppy",
            15,
            Category::Toys,
            "A cute puppy companion for your doll.",
            "https://images.unsplash.com/photo-1591160690555-5debfba289f0?w=300&q=80",
        ),
        Accessory::new(
            "4",
            "Pink Convertible",
            50,
            Category::Toys,
            "A stylish pink convertible car.",
            "https://images.unsplash.com/photo-1581235720704-06d3acfcb36f?w=300&q=80",
        ),
        Accessory::new(
            "5",
            "Sunglasses",
            10,
            Category::Fashion,
            "Trendy sunglasses for a fashionable look.",
            "https://images.unsplash.com/photo-1577803645773-f96470509666?w=300&q=80",
        ),
        Accessory::new(
            "6",
            "Jewelry Set",
            20,
            Category::Fashion,
            "Elegant necklace and earrings set.",
            "https://images.unsplash.com/photo-1599643478518-a784e5dc4c8f?w=300&q=80",
        ),
        Accessory::new(
            "7",
            "Mini Sofa",
            35,
            Category::House,
            "A comfortable miniature sofa for the doll house.",
            "https://images.unsplash.com/photo-1555041469-a586c61ea9bc?w=300&q=80",
        ),
        Accessory::new(
            "8",
            "Kitchen Set",
            45,
            Category::House,
            "Complete kitchen set with appliances and utensils.",
            "https://images.unsplash.com/photo-1556911220-bff31c812dba?w=300&q=80",
        ),
    ]
});

/// Every accessory in the shop.
pub fn catalog() -> &'static [Accessory] {
    &CATALOG
}

/// Look up an accessory by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no accessory has the ID `id`.
pub fn find_accessory(id: &ItemId) -> Result<&'static Accessory, Error> {
    catalog()
        .iter()
        .find(|accessory| &accessory.id == id)
        .ok_or(Error::NotFound)
}

/// The accessories whose name or description contains `query` (ignoring case)
/// and whose category passes `filter`, in `sort` order.
pub fn search(query: &str, filter: CategoryFilter, sort: SortOrder) -> Vec<&'static Accessory> {
    let query = query.trim().to_lowercase();

    let mut accessories: Vec<&'static Accessory> = catalog()
        .iter()
        .filter(|accessory| {
            accessory.name.to_lowercase().contains(&query)
                || accessory.description.to_lowercase().contains(&query)
        })
        .filter(|accessory| filter.matches(accessory.category))
        .collect();

    accessories.sort_by(|a, b| sort.compare(a, b));

    accessories
}
