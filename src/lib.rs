//! Autofill core: an incremental index of a page's forms and fields, and a
//! fill-script engine that turns a snapshot plus a credential into a
//! replayable list of actions.

pub mod cli;
pub mod collect;
pub mod dom;
pub mod fill;
pub mod trace;
