pub mod autofill;
pub mod card;
pub mod credential_model;
pub mod error;
pub mod expiry;
pub mod generator;
pub mod identity;
pub mod iso;
pub mod keywords;
pub mod login;
pub mod matching;
pub mod script_model;
pub mod totp;
pub mod trust;
