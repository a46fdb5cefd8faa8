mod broadcast_service;
mod seed_service;
mod simulation_service;
mod snapshot_service;
mod summary_service;

pub use broadcast_service::*;
pub use seed_service::*;
pub use simulation_service::*;
pub use snapshot_service::*;
pub use summary_service::*;
