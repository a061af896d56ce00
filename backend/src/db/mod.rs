pub mod buildings;
pub mod connection;
pub mod matches;
pub mod migrations;
pub mod rides;
pub mod users;

pub use connection::{get_db_pool, DatabaseConfig};
