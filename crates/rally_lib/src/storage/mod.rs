pub mod db;
pub mod schema;

pub use db::{open, open_in_memory};
