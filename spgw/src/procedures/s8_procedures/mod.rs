mod create_bearer;
mod create_session;
mod delete_bearer;
mod delete_session;
mod s8_message_handler;

pub use create_bearer::*;
pub use create_session::*;
pub use delete_bearer::*;
pub use delete_session::*;
pub use s8_message_handler::*;
