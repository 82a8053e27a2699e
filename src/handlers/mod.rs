pub mod admin;
pub mod events;
pub mod results;
pub mod rivals;
pub mod stats;
pub mod users;
