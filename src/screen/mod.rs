pub mod config;
pub mod controller;
pub mod services;

pub use config::{Destination, FirstFixAction, ScreenConfig};
pub use controller::{ScreenController, ScreenEvent, ScreenState};
pub use services::{ScreenServices, TileServices};
