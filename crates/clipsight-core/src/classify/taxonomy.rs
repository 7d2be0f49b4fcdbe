//! Fixed label taxonomies for each analysis aspect.
//!
//! Label order is meaningful: downstream reports map a label's position to
//! a severity score, glycemic level, compatibility status, and so on. Never
//! reorder these lists without updating the report mappings.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::ClassifyError;

const HIRSUTISM_LABELS: &[&str] = &[
    "no facial hair",
    "minimal facial hair",
    "moderate facial hair on upper lip",
    "moderate facial hair on chin",
    "heavy facial hair on face",
];

const ACNE_LABELS: &[&str] = &[
    "clear skin",
    "mild acne with few pimples",
    "moderate acne with several pimples",
    "severe acne with many pimples and inflammation",
];

const FOOD_CATEGORY_LABELS: &[&str] = &[
    "a plate of vegetables and salad",
    "a plate of rice or grains",
    "fried food or fast food",
    "a bowl of soup or stew",
    "bread or pastries",
    "fruits",
    "meat or protein dish",
    "sweets or desserts",
    "Indian curry dish",
    "healthy balanced meal",
];

#[rustfmt::skip]
const FOOD_ITEM_LABELS: &[&str] = &[
    // Vegetables
    "broccoli", "spinach", "carrots", "tomatoes", "cucumber", "lettuce",
    "onions", "bell peppers", "cauliflower", "cabbage", "peas", "beans",
    "mushrooms", "zucchini", "eggplant", "okra", "potato", "sweet potato",
    // Proteins
    "chicken", "fish", "eggs", "paneer", "tofu", "dal lentils", "chickpeas",
    "mutton", "prawns", "beef", "lamb", "cottage cheese",
    // Grains
    "rice", "roti chapati", "naan bread", "quinoa", "oats", "pasta",
    "white bread", "brown rice", "millet bajra", "wheat",
    // Fruits
    "apple", "banana", "mango", "grapes", "orange", "berries",
    "papaya", "watermelon", "guava", "pomegranate",
    // Dairy
    "milk", "yogurt curd", "cheese", "butter", "ghee",
    // Regional dishes
    "biryani", "samosa", "dosa", "idli", "paratha", "pakora",
    "butter chicken", "palak paneer", "chole", "rajma",
    // Other
    "nuts almonds", "salad", "soup", "sandwich", "pizza", "burger",
    "french fries", "noodles", "momos dumplings",
];

const GLYCEMIC_INDEX_LABELS: &[&str] = &[
    "low glycemic index food like vegetables, legumes, nuts",
    "medium glycemic index food like whole grains, fruits",
    "high glycemic index food like white rice, potatoes, sugar, bread",
];

const PCOS_COMPATIBILITY_LABELS: &[&str] = &[
    "PCOS friendly anti-inflammatory healthy food",
    "moderately suitable food for hormonal health",
    "inflammatory processed food to avoid for PCOS",
];

const PROTEIN_LEVEL_LABELS: &[&str] = &[
    "high protein food like meat, eggs, fish, paneer, tofu",
    "moderate protein food",
    "low protein carb heavy food",
];

/// Identity of a built-in taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyId {
    Hirsutism,
    Acne,
    FoodCategory,
    FoodItem,
    GlycemicIndex,
    PcosCompatibility,
    ProteinLevel,
}

impl TaxonomyId {
    /// Every built-in taxonomy, in registry order.
    pub const ALL: [TaxonomyId; 7] = [
        TaxonomyId::Hirsutism,
        TaxonomyId::Acne,
        TaxonomyId::FoodCategory,
        TaxonomyId::FoodItem,
        TaxonomyId::GlycemicIndex,
        TaxonomyId::PcosCompatibility,
        TaxonomyId::ProteinLevel,
    ];

    /// Registry name used for lookups and logging.
    pub fn name(self) -> &'static str {
        match self {
            TaxonomyId::Hirsutism => "hirsutism",
            TaxonomyId::Acne => "acne",
            TaxonomyId::FoodCategory => "food_category",
            TaxonomyId::FoodItem => "food_item",
            TaxonomyId::GlycemicIndex => "glycemic_index",
            TaxonomyId::PcosCompatibility => "pcos_compatibility",
            TaxonomyId::ProteinLevel => "protein_level",
        }
    }

    fn labels(self) -> &'static [&'static str] {
        match self {
            TaxonomyId::Hirsutism => HIRSUTISM_LABELS,
            TaxonomyId::Acne => ACNE_LABELS,
            TaxonomyId::FoodCategory => FOOD_CATEGORY_LABELS,
            TaxonomyId::FoodItem => FOOD_ITEM_LABELS,
            TaxonomyId::GlycemicIndex => GLYCEMIC_INDEX_LABELS,
            TaxonomyId::PcosCompatibility => PCOS_COMPATIBILITY_LABELS,
            TaxonomyId::ProteinLevel => PROTEIN_LEVEL_LABELS,
        }
    }
}

impl FromStr for TaxonomyId {
    type Err = ClassifyError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TaxonomyId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| ClassifyError::UnknownTaxonomy(name.to_string()))
    }
}

/// A candidate label and its stable position within its taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: Cow<'static, str>,
    pub index: usize,
}

/// An ordered, non-empty list of candidate labels for one aspect.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: Cow<'static, str>,
    id: Option<TaxonomyId>,
    labels: Vec<Label>,
}

impl Taxonomy {
    fn builtin(id: TaxonomyId) -> Self {
        let labels = id
            .labels()
            .iter()
            .enumerate()
            .map(|(index, &text)| Label {
                text: Cow::Borrowed(text),
                index,
            })
            .collect();
        Self {
            name: Cow::Borrowed(id.name()),
            id: Some(id),
            labels,
        }
    }

    /// Build a one-off taxonomy from caller-supplied labels, keeping their order.
    ///
    /// Fails with `EmptyLabelSet` when no labels are given.
    pub fn adhoc<I>(labels: I) -> Result<Self, ClassifyError>
    where
        I: IntoIterator<Item = String>,
    {
        let labels: Vec<Label> = labels
            .into_iter()
            .enumerate()
            .map(|(index, text)| Label {
                text: Cow::Owned(text),
                index,
            })
            .collect();
        if labels.is_empty() {
            return Err(ClassifyError::EmptyLabelSet);
        }
        Ok(Self {
            name: Cow::Borrowed("adhoc"),
            id: None,
            labels,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Built-in identity, `None` for ad-hoc taxonomies.
    pub fn id(&self) -> Option<TaxonomyId> {
        self.id
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label texts in taxonomy order, ready for the text encoder.
    pub fn texts(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.text.to_string()).collect()
    }
}

/// Process-wide, read-only set of built-in taxonomies.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    taxonomies: Vec<Taxonomy>,
}

impl TaxonomyRegistry {
    /// Registry holding the seven built-in taxonomies.
    pub fn builtin() -> Self {
        Self {
            taxonomies: TaxonomyId::ALL.into_iter().map(Taxonomy::builtin).collect(),
        }
    }

    /// Look up a taxonomy by registry name.
    pub fn get(&self, name: &str) -> Result<&Taxonomy, ClassifyError> {
        let id: TaxonomyId = name.parse()?;
        Ok(self.taxonomy(id))
    }

    /// Look up a built-in taxonomy by identity.
    pub fn taxonomy(&self, id: TaxonomyId) -> &Taxonomy {
        // `taxonomies` is built from `TaxonomyId::ALL`, so positions line up.
        &self.taxonomies[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxonomy> {
        self.taxonomies.iter()
    }
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
