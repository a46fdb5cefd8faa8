//! Wire models shared by the VitalSync server and its viewers.

pub mod models;

pub use models::*;
