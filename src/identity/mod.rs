//! Identity and session token management for the admin surface.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;

pub use principal::Principal;
pub use session::{Claims, SessionAuthority, SECRET_ENV, TEACHER_ROLE};
