//! The property record produced by the detail parser

use serde::{Deserialize, Serialize};

/// Placeholder for a text field the page did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names of every property CSV, in field-declaration order
pub const FIELD_NAMES: [&str; 6] = [
    "title",
    "location",
    "spec",
    "price",
    "description",
    "features",
];

/// One extracted listing
///
/// Every text field holds real content or `"N/A"`. `features` is `None` when
/// the amenities grid is missing or empty, which is not the same as an empty
/// list; the CSV encoding keeps the two apart (empty cell vs `[]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub title: String,
    pub location: String,

    /// Up to three headline attributes joined with `" | "`
    pub spec: String,
    pub price: String,
    pub description: String,

    #[serde(with = "features_cell")]
    pub features: Option<Vec<String>>,
}

impl PropertyRecord {
    /// A record with nothing extracted
    pub fn not_available() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            spec: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            features: None,
        }
    }
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self::not_available()
    }
}

/// CSV cell encoding for `features`: a JSON array, or an empty cell when absent
mod features_cell {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(features: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match features {
            Some(list) => {
                let json = serde_json::to_string(list).map_err(S::Error::custom)?;
                serializer.serialize_str(&json)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cell: Option<String> = Option::deserialize(deserializer)?;
        match cell.as_deref() {
            None | Some("") => Ok(None),
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}
