pub mod delivery;
pub mod route;
pub mod sync_log;
pub mod user;
