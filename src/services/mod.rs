pub mod ticket_store;
pub mod user_directory;

pub use ticket_store::{StatusCount, StatusPointSum, TicketStore};
pub use user_directory::UserDirectoryService;
