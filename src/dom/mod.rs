pub mod dom_model;
pub mod error;
pub mod fixture;
pub mod query;
pub mod visibility;
