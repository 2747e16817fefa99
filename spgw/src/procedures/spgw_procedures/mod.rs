mod create_session;
mod dedicated_bearer_activation;
mod dedicated_bearer_deactivation;
mod delete_bearer_command;
mod delete_session;
mod modify_bearer;
mod release_access_bearers;
mod spgw_message_handler;
mod suspend_notification;

pub use create_session::*;
pub use dedicated_bearer_activation::*;
pub use dedicated_bearer_deactivation::*;
pub use delete_bearer_command::*;
pub use delete_session::*;
pub use modify_bearer::*;
pub use release_access_bearers::*;
pub use spgw_message_handler::*;
pub use suspend_notification::*;
