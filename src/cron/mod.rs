pub mod jobs;
pub mod scheduler;

pub use scheduler::CronScheduler;
