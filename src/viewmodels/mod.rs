pub mod auth_viewmodel;
pub mod menu_viewmodel;
pub mod notification_viewmodel;

pub use auth_viewmodel::{AuthOutcome, AuthViewModel, RegisterForm};
pub use menu_viewmodel::MenuViewModel;
pub use notification_viewmodel::NotificationViewModel;
