pub mod base;
pub mod location;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod route;
pub mod style;
