use super::client::RestaurantsClient;
use super::model::Restaurant;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolResult};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GetRestaurantsInput {
    #[serde(default)]
    date: Option<NaiveDate>,
    latitude: f64,
    longitude: f64,
}

/// Tool listing nearby restaurants that published a menu for the day
pub struct GetRestaurantsTool {
    definition: ToolDefinition,
    client: Arc<RestaurantsClient>,
}

impl GetRestaurantsTool {
    /// Tool name exposed to the model
    pub const NAME: &'static str = "get_restaurants";

    /// Create the tool over `client`
    #[must_use]
    pub fn new(client: Arc<RestaurantsClient>) -> Self {
        let definition = ToolDefinition::new(
            Self::NAME,
            "Retrieves the list of nearby restaurants with daily menu for the given date.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "The day on which to find information (YYYY-MM-DD). Defaults to today."
                },
                "latitude": {
                    "type": "number",
                    "description": "Latitude of the user's location"
                },
                "longitude": {
                    "type": "number",
                    "description": "Longitude of the user's location"
                }
            },
            "required": ["latitude", "longitude"]
        }));

        Self { definition, client }
    }
}

fn with_menus(restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    restaurants.into_iter().filter(Restaurant::has_menu).collect()
}

#[async_trait::async_trait]
impl Tool for GetRestaurantsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let input: GetRestaurantsInput = serde_json::from_value(input)
            .map_err(|e| Error::InvalidInput(format!("get_restaurants: {}", e)))?;
        let date = input.date.unwrap_or_else(|| Local::now().date_naive());

        let restaurants = self
            .client
            .get_restaurants(date, input.latitude, input.longitude)
            .await?;
        let restaurants = with_menus(restaurants);
        debug!(count = restaurants.len(), %date, "Restaurants with menus");

        let output =
            serde_json::to_value(&restaurants).map_err(|e| Error::Execution(e.to_string()))?;
        Ok(ToolResult::success(
            output,
            start.elapsed().as_millis() as u64,
        ))
    }
}
