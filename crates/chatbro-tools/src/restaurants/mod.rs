//! Restaurants - nearby lunch menus
//!
//! The restaurants service answers `GET lounaat?date=&lat=&lng=` with the
//! restaurants around a coordinate and their menu for that day.

mod client;
mod model;
mod tool;

pub use client::RestaurantsClient;
pub use model::{LounaatResponse, Restaurant, RestaurantMenuItem};
pub use tool::GetRestaurantsTool;
