pub mod client;
pub mod explorer;
pub mod resilience;

pub use client::ActivitySource;
pub use explorer::{ExplorerAction, ExplorerClient};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, ResilientClient, RetryConfig};
