// Drawledger Kernel
//
// Draw-indexed parameter histories with floor lookups: what was in
// effect at or before a given draw.

pub mod client;
pub mod config;
pub mod guard;
pub mod history;
pub mod rules;
pub mod search;
