use super::model::{LounaatResponse, Restaurant};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Default HTTP request timeout in seconds
const HTTP_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the restaurants service
#[derive(Debug, Clone)]
pub struct RestaurantsClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestaurantsClient {
    /// Create a client for the service rooted at `base_url`
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        // Relative joins drop the last path segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::InvalidInput(format!("Invalid restaurants URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub(crate) fn lounaat_url(&self, date: NaiveDate, latitude: f64, longitude: f64) -> Result<Url> {
        let mut url = self
            .base_url
            .join("lounaat")
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string())
            .append_pair("lat", &latitude.to_string())
            .append_pair("lng", &longitude.to_string());
        Ok(url)
    }

    /// Fetch restaurants around a coordinate for `date`
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or bad payload
    pub async fn get_restaurants(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Restaurant>> {
        let url = self.lounaat_url(date, latitude, longitude)?;
        debug!(url = %url, "Fetching restaurants");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Network(e.to_string()))?;

        let payload: LounaatResponse = response
            .json()
            .await
            .map_err(|e| Error::Execution(format!("Unable to decode restaurants: {}", e)))?;

        Ok(payload.restaurants)
    }
}
