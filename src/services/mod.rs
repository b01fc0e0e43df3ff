pub mod claims;
#[cfg(test)]
pub mod memory_store;
pub mod metrics;
pub mod page;
pub mod sheets;
pub mod store;
pub mod week_scheduler;
