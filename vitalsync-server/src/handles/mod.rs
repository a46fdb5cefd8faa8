mod docs_handle;
mod health_handle;
mod patient_handle;
mod stream_handle;

pub use docs_handle::*;
pub use health_handle::*;
pub use patient_handle::*;
pub use stream_handle::*;
