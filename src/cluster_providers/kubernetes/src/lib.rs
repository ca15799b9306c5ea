pub mod client;
pub mod sniffer;
pub mod types;

pub use client::KubeClient;
pub use sniffer::SnifferManager;
