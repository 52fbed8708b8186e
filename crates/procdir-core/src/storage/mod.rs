pub mod clients;
pub mod sqlite;

pub use sqlite::Database;
