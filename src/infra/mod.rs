pub mod directory;
pub mod sqlite;
