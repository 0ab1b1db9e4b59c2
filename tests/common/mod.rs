#![allow(dead_code)]

pub mod overlay;
pub mod utils;
