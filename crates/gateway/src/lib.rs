//! The gateway core: authentication, sessions, admission and tool dispatch.
//!
//! Every client request passes through the same gate sequence. A session
//! token proves who is calling, the rate limiter decides whether the call
//! fits into the client's quota, and only then is the requested tool looked
//! up, its arguments validated and the backend invoked.

#![deny(missing_docs)]

mod credentials;
mod dispatcher;
mod error;
mod session;

pub use credentials::CredentialStore;
pub use dispatcher::{AuthResponse, Dispatcher, ToolName};
pub use error::{AuthError, GatewayError};
pub use session::{Session, SessionManager};
