pub mod attributes;
pub mod cache;
pub mod collector;
pub mod intersection;
pub mod labels;
pub mod mutation;
pub mod overlay;
pub mod scheduler;
pub mod snapshot_model;
