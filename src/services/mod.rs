pub mod api_client;
pub mod notifier;
pub mod session_events;
pub mod sync_service;

pub use api_client::{ApiClient, SESSION_EXPIRED_MESSAGE};
pub use notifier::{Notifier, ToastKind};
pub use sync_service::{LongPollSync, MealIssueSource, NotificationSource};
