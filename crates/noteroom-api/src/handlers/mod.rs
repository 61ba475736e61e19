//! Handler modules for noteroom-api.

pub mod notes;
