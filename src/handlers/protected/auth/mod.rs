pub mod session;

pub use session::current_user as session_current_user;
pub use session::logout as session_logout;
pub use session::refresh_token as session_refresh;
