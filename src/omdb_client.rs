use reqwest::{Client, RequestBuilder, Url};
use std::env;
use std::error::Error;
use tracing::{debug, info};

use crate::dispatcher::TitleSearch;
use crate::error::SearchError;
use crate::models::SearchEnvelope;
use crate::Args;

pub const DEFAULT_ENDPOINT: &str = "https://www.omdbapi.com/";

/// Public demo key, used when none is configured.
pub const DEFAULT_API_KEY: &str = "8523cbb8";

pub struct OmdbClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl OmdbClient {
    /// Create a new OmdbClient instance
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        // API key from arguments, then environment, then the demo key
        let api_key = match &args.api_key {
            Some(k) if !k.trim().is_empty() => k.clone(),
            _ => match env::var("OMDB_API_KEY") {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    debug!("No OMDb API key configured, using the demo key");
                    DEFAULT_API_KEY.to_string()
                }
            },
        };

        let endpoint = Url::parse(&args.endpoint)?;

        let client = Client::builder()
            .user_agent(concat!("movie-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(OmdbClient {
            client,
            endpoint,
            api_key,
        })
    }

    fn request(&self, query: &str, page: u32) -> RequestBuilder {
        self.client.get(self.endpoint.clone()).query(&[
            ("apikey", self.api_key.as_str()),
            ("s", query),
            ("page", page.to_string().as_str()),
        ])
    }
}

impl TitleSearch for OmdbClient {
    async fn search_titles(&self, query: &str, page: u32) -> Result<SearchEnvelope, SearchError> {
        debug!("Requesting '{}' page {} from {}", query, page, self.endpoint);
        let response = self.request(query, page).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let body = response.text().await?;
        let envelope = SearchEnvelope::from_json(&body)?;

        if let Some(reason) = &envelope.error {
            debug!("No results for '{}' page {}: {}", query, page, reason);
        }
        info!(
            "Fetched {} of {} results for '{}' page {}",
            envelope.items.len(),
            envelope.total_count,
            query,
            page
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn client(extra: &[&str]) -> OmdbClient {
        let mut argv = vec!["movie-catalog"];
        argv.extend_from_slice(extra);
        OmdbClient::new(&Args::try_parse_from(argv).unwrap()).unwrap()
    }

    #[test]
    fn request_carries_key_query_and_page() {
        let client = client(&["--api-key", "secret", "--endpoint", "http://localhost:8080/"]);
        let request = client.request("the dark knight", 2).build().unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/?apikey=secret&s=the+dark+knight&page=2"
        );
    }

    #[test]
    fn query_text_is_encoded() {
        let client = client(&["--api-key", "k"]);
        let request = client.request("tom & jerry", 1).build().unwrap();

        assert_eq!(request.url().host_str(), Some("www.omdbapi.com"));
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("s".to_string(), "tom & jerry".to_string())));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let args = Args::try_parse_from(["movie-catalog", "--endpoint", "not a url"]).unwrap();
        assert!(OmdbClient::new(&args).is_err());
    }
}
