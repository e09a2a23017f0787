use serde::{Deserialize, Serialize};

/// One dish on a restaurant's daily menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantMenuItem {
    /// Dish name
    pub name: String,
    /// Marked lactose free
    #[serde(default)]
    pub lactose_free: bool,
    /// Marked gluten free
    #[serde(default)]
    pub gluten_free: bool,
}

/// A restaurant near the requested coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Restaurant name
    pub name: String,
    /// Menu for the requested day
    #[serde(default)]
    pub menu_items: Vec<RestaurantMenuItem>,
    /// Distance from the coordinate, in kilometres
    #[serde(default)]
    pub distance: f64,
    /// Notices published by the restaurant (closed, opening hours, ...)
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Restaurant {
    /// True if the restaurant published any dishes
    #[must_use]
    pub fn has_menu(&self) -> bool {
        !self.menu_items.is_empty()
    }
}

/// Response body of the `lounaat` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LounaatResponse {
    /// Restaurants around the coordinate
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "restaurants": [
                {
                    "name": "Factory",
                    "menuItems": [
                        {"name": "Salmon soup", "lactoseFree": true},
                        {"name": "Pasta", "glutenFree": false}
                    ],
                    "distance": 0.4,
                    "messages": []
                },
                {"name": "Closed Cafe", "menuItems": [], "distance": 1.2, "messages": ["Closed today"]}
            ]
        }"#;

        let response: LounaatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.restaurants.len(), 2);

        let factory = &response.restaurants[0];
        assert!(factory.has_menu());
        assert!(factory.menu_items[0].lactose_free);
        assert!(!factory.menu_items[0].gluten_free);
        assert!(!response.restaurants[1].has_menu());
        assert_eq!(response.restaurants[1].messages, vec!["Closed today"]);
    }
}
