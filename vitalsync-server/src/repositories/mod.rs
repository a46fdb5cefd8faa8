mod device;
mod health_summary;
mod patient;
mod reading;

pub use device::DeviceRepository;
pub use health_summary::HealthSummaryRepository;
pub use patient::PatientRepository;
pub use reading::ReadingRepository;
