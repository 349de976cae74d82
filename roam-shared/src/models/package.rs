use serde::{Deserialize, Serialize};

/// A tour package as served by the catalog API.
///
/// Immutable from the storefront's perspective: fetched, displayed and
/// priced against, never mutated outside the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelPackage {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Trip length in days.
    pub duration: u32,
    /// Per-person price in whole rupees.
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub whats_included: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_to_visit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mongo_style_id() {
        let json = r#"{
            "_id": "665f1a2b3c4d5e6f70818283",
            "name": "Living Root Bridges Trek",
            "destination": "Meghalaya",
            "duration": 5,
            "price": 19500,
            "imageUrl": "https://cdn.example.com/roots.jpg",
            "rating": 4.8
        }"#;

        let pkg: TravelPackage = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.id, "665f1a2b3c4d5e6f70818283");
        assert_eq!(pkg.price, 19500);
        assert!(pkg.activities.is_empty());
    }
}
