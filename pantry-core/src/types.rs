//! Typed schemas for the documents the admin tools read and write.
//!
//! Reads deserialize into these structs and reject documents that do not fit
//! (see `StoreError::Malformed`); writes serialize from them, so every tool
//! agrees on field names and shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text keyed by language code ("lt", "en", ...).
pub type LocalizedText = BTreeMap<String, String>;

/// Language preference order for derived text such as image alt tags.
pub const LOCALE_PRIORITY: &[&str] = &["lt", "en"];

/// Pick the best available translation: preferred locales first, then
/// whatever the map holds.
pub fn preferred_text(text: &LocalizedText) -> Option<&str> {
    for locale in LOCALE_PRIORITY {
        if let Some(value) = text.get(*locale) {
            return Some(value);
        }
    }
    text.values().next().map(String::as_str)
}

/// Publication status of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    #[default]
    Draft,
    Public,
}

/// One ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: LocalizedText,
    pub amount: f64,
    pub unit: LocalizedText,
}

/// One numbered instruction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionStep {
    pub number: u32,
    pub text: LocalizedText,
}

/// Prep/cook/total minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    #[serde(default)]
    pub prep_minutes: u32,
    #[serde(default)]
    pub cook_minutes: u32,
    #[serde(default)]
    pub total_minutes: u32,
}

/// Reference to the published image of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Public object-store URL.
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// SEO metadata carried by recipes and categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Rating aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

/// A recipe document (collection `recipes_new`).
///
/// `slug`, `title` and `categoryPath` are required; a stored document missing
/// any of them fails the typed read. Everything else defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique URL-safe identifier.
    pub slug: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    /// Key into the category tree (slash-free).
    pub category_path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoMeta>,
    /// Freeform JSON-LD mirror for search engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Value>,
    #[serde(default)]
    pub status: RecipeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// RFC 3339 timestamp of the last mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One manually curated filter facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacet {
    pub value: String,
    pub label: String,
    pub priority: i32,
}

/// Filter specification attached to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Curated facets in display order.
    #[serde(default)]
    pub manual: Vec<FilterFacet>,
    /// Facet keys computed at render time.
    #[serde(default)]
    pub auto: Vec<String>,
    /// Cooking-time bucket keys.
    #[serde(default)]
    pub time_filters: Vec<String>,
}

/// A category document (collection `categories_new`).
///
/// `path` and `title` are required; the tree is one level deep in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique key recipes reference via `categoryPath`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    pub title: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSpec>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub order: i32,
}
