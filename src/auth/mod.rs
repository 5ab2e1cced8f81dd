mod log_in;
mod middleware;
mod token;

pub use log_in::post_log_in;
pub use middleware::{CurrentUser, auth_guard};
pub use token::{Claims, TokenService};
