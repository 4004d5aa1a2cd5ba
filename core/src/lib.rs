pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod spoonacular;

pub use error::{Error, Result};
