pub mod candle_cache;
pub mod fetch_coordinator;
pub mod session;

pub use candle_cache::*;
pub use fetch_coordinator::*;
pub use session::*;
