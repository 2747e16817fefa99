mod ip_pool;
mod local_services;
mod memory_state_store;

pub use ip_pool::IpPool;
pub use local_services::LocalServices;
pub use memory_state_store::MemoryStateStore;
