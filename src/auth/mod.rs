//! # Authentication & Authorization
//!
//! Signed bearer credentials (JWT), argon2 password hashing, and the
//! request guards that attach an identity to the pipeline.

pub mod errors;
pub mod guard;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use errors::{AuthError, AuthResult};
pub use guard::{is_logged_in, protect, restrict_to, CurrentUser};
pub use jwt::{Claims, JwtManager};
