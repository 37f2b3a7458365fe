pub mod amounts;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod pairs;
pub mod quote;
pub mod trading;
pub mod types;


pub use error::ServiceError;
pub use notify::{Notification, NotificationVariant, Notifier};
pub use orchestrator::{OperationKind, OperationState, OperationTracker, TxOrchestrator, TxStatus};
pub use pairs::{PairDetails, PairQueryService};
pub use quote::{Quote, QuoteFeed, QuoteInput};
pub use trading::{DexCore, DexTradingService};
pub use types::*;

pub(crate) type ServiceResult<T> = std::result::Result<T, ServiceError>;
