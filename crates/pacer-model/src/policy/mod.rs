mod strategy;
pub use strategy::DelayStrategy;

mod backoff;
pub use backoff::BackoffPolicy;

mod preset;
pub use preset::PolicyPreset;
