//! Session handling and delegated authentication.

pub mod provider;
pub mod session;

pub use provider::{IdentityProvider, SignUpOutcome, SupabaseAuth};
pub use session::{Session, SessionContext, SessionUser, clear_session, load_session, save_session};
