use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

/// One listed psychologist, in the document store's field layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Backend key; absent for records that only exist in the built-in dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub initial_consultation: String,
    #[serde(default)]
    pub about: String,
}

impl CatalogRecord {
    /// Stable key: the backend key when present, otherwise the display name.
    pub fn identity(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Missing or non-finite prices count as 0.
    pub fn hourly_rate(&self) -> f64 {
        no_data_as_zero(self.price_per_hour)
    }

    pub fn rating_score(&self) -> f64 {
        no_data_as_zero(self.rating)
    }
}

fn no_data_as_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Favorite identities of the signed-in user, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    ids: IndexSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.ids.contains(identity)
    }

    pub fn toggle(&mut self, identity: &str) -> Toggle {
        if self.ids.shift_remove(identity) {
            Toggle::Removed
        } else {
            self.ids.insert(identity.to_string());
            Toggle::Added
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// 排序選項，順序與篩選選單一致
///
/// Serialized as kebab-case names; parsing (CLI, TOML) goes through `FromStr`
/// and also takes the menu labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum SortMode {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    RatingAsc,
    RatingDesc,
    #[default]
    Default,
}

impl SortMode {
    pub const ALL: [SortMode; 7] = [
        SortMode::NameAsc,
        SortMode::NameDesc,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
        SortMode::RatingAsc,
        SortMode::RatingDesc,
        SortMode::Default,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::NameAsc => "A to Z",
            SortMode::NameDesc => "Z to A",
            SortMode::PriceAsc => "Price: low to high",
            SortMode::PriceDesc => "Price: high to low",
            SortMode::RatingAsc => "Not popular",
            SortMode::RatingDesc => "Popular",
            SortMode::Default => "Show all",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortMode {
    type Err = String;

    /// Accepts kebab-case names and menu labels, including the old price labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let mode = match normalized.as_str() {
            "name-asc" | "a to z" => SortMode::NameAsc,
            "name-desc" | "z to a" => SortMode::NameDesc,
            "price-asc" | "price: low to high" | "less than 10$" => SortMode::PriceAsc,
            "price-desc" | "price: high to low" | "greater than 10$" => SortMode::PriceDesc,
            "rating-asc" | "not popular" => SortMode::RatingAsc,
            "rating-desc" | "popular" => SortMode::RatingDesc,
            "default" | "show all" => SortMode::Default,
            _ => return Err(format!("unknown sort mode: {}", s)),
        };
        Ok(mode)
    }
}

impl TryFrom<String> for SortMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How many leading records of a sorted list are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleWindow {
    pub count: usize,
}

impl VisibleWindow {
    pub const INITIAL_COUNT: usize = 3;
    pub const STEP: usize = 3;

    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for VisibleWindow {
    fn default() -> Self {
        Self::new(Self::INITIAL_COUNT)
    }
}

/// A signed-in user as returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Uppercase first letter of the display name, "U" when there is none.
    pub fn initial(&self) -> char {
        self.display_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short message for the user, shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, name: &str) -> CatalogRecord {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    #[test]
    fn test_identity_prefers_backend_key() {
        assert_eq!(record(Some("-Nx1"), "Dr. Sarah Davis").identity(), "-Nx1");
        assert_eq!(record(None, "Dr. Sarah Davis").identity(), "Dr. Sarah Davis");
    }

    #[test]
    fn test_missing_numbers_read_as_zero() {
        let r = record(None, "Dr. No Data");
        assert_eq!(r.hourly_rate(), 0.0);
        assert_eq!(r.rating_score(), 0.0);
        assert!(r.reviews.is_empty());
    }

    #[test]
    fn test_favorite_toggle_keeps_insertion_order() {
        let mut favorites: FavoriteSet = ["b", "a"].into_iter().collect();
        assert_eq!(favorites.toggle("c"), Toggle::Added);
        assert_eq!(favorites.toggle("b"), Toggle::Removed);
        assert_eq!(favorites.iter().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_favorites_serialize_as_plain_array() {
        let favorites: FavoriteSet = ["x", "y", "x"].into_iter().collect();
        assert_eq!(favorites.len(), 2);
        assert_eq!(serde_json::to_value(&favorites).unwrap(), serde_json::json!(["x", "y"]));
        let back: FavoriteSet = serde_json::from_str(r#"["y","x"]"#).unwrap();
        assert!(back.contains("x") && back.contains("y"));
    }

    #[test]
    fn test_sort_mode_parses_names_and_labels() {
        assert_eq!("name-asc".parse::<SortMode>().unwrap(), SortMode::NameAsc);
        assert_eq!("Popular".parse::<SortMode>().unwrap(), SortMode::RatingDesc);
        assert_eq!("Less than 10$".parse::<SortMode>().unwrap(), SortMode::PriceAsc);
        assert_eq!("Greater than 10$".parse::<SortMode>().unwrap(), SortMode::PriceDesc);
        assert!("cheapest".parse::<SortMode>().is_err());
        for mode in SortMode::ALL {
            assert_eq!(mode.label().parse::<SortMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_session_initial() {
        let mut session = UserSession {
            uid: "u1".into(),
            email: None,
            display_name: Some("anna".into()),
            id_token: "t".into(),
            refresh_token: None,
            expires_at: None,
        };
        assert_eq!(session.initial(), 'A');
        session.display_name = None;
        assert_eq!(session.initial(), 'U');
        assert!(!session.is_expired(Utc::now()));
    }
}
