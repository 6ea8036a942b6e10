use serde::{Deserialize, Deserializer, Serialize};

/// One title returned by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieItem {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// `movie`, `series`, `episode`, ...
    #[serde(rename = "Type")]
    pub category: String,
    /// Kept as text: series report ranges such as `2008–2013`.
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster: String,
}

/// A page of results plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEnvelope {
    #[serde(rename = "Search", default)]
    pub items: Vec<MovieItem>,
    #[serde(
        rename = "totalResults",
        default,
        deserialize_with = "count_from_text_or_number"
    )]
    pub total_count: u64,
    /// Set by the API when nothing matched or the request was rejected.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchEnvelope {
    /// Parse a response body. A body without an items array is an empty
    /// result, not a failure.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let mut envelope: SearchEnvelope = serde_json::from_str(body)?;
        if envelope.items.is_empty() {
            envelope.total_count = 0;
        }
        Ok(envelope)
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

fn count_from_text_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_search_page() {
        let body = r#"{
            "Search": [
                {"Title": "Batman Begins", "Year": "2005", "imdbID": "tt0372784",
                 "Type": "movie", "Poster": "https://example.com/bb.jpg"},
                {"Title": "Batman: The Animated Series", "Year": "1992–1995",
                 "imdbID": "tt0103359", "Type": "series", "Poster": "N/A"}
            ],
            "totalResults": "45",
            "Response": "True"
        }"#;

        let envelope = SearchEnvelope::from_json(body).unwrap();
        assert_eq!(envelope.total_count, 45);
        assert_eq!(envelope.items.len(), 2);
        assert_eq!(envelope.items[0].id, "tt0372784");
        assert_eq!(envelope.items[1].category, "series");
        assert_eq!(envelope.items[1].year, "1992–1995");
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn numeric_total_is_accepted() {
        let body = r#"{"Search": [{"Title": "Heat", "Year": "1995", "imdbID": "tt0113277",
            "Type": "movie", "Poster": "N/A"}], "totalResults": 1}"#;
        assert_eq!(SearchEnvelope::from_json(body).unwrap().total_count, 1);
    }

    #[test]
    fn missing_items_means_no_results() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;

        let envelope = SearchEnvelope::from_json(body).unwrap();
        assert!(envelope.is_empty());
        assert!(envelope.items.is_empty());
        assert_eq!(envelope.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn garbage_total_is_a_decode_error() {
        let body = r#"{"Search": [], "totalResults": "lots"}"#;
        assert!(SearchEnvelope::from_json(body).is_err());
    }
}
