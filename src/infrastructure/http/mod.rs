pub mod dto;

#[cfg(target_arch = "wasm32")]
pub mod dashboard_client;

pub use dto::*;

#[cfg(target_arch = "wasm32")]
pub use dashboard_client::DashboardHttpClient;
