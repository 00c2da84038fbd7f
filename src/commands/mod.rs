pub mod describe;
pub mod list;
pub mod query;
