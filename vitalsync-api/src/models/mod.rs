mod device;
mod patient;
mod summary;

pub use device::*;
pub use patient::*;
pub use summary::*;

pub type Id = i32;
