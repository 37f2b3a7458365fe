pub mod app;
pub mod chain;
pub mod config;
pub mod service;
pub mod session;

pub use app::build_app;

// Re-export commonly used types for tests
pub use service::{
    DexCore, DexTradingService, Notification, OperationState, PairDetails, Quote, TxStatus,
};
pub use session::{Session, SessionManager};
