//! Authentication: bcrypt password hashing, HS256 access tokens, and the
//! request extractors that gate handlers.
//!
//! A token carries a `jti`; logging out records it in the store's revocation
//! list until the token would have expired anyway.

pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::{AdminUser, AuthUser, MaybeAuthUser};
pub use jwt::{Claims, IssuedToken, JwtConfig, JwtManager, VerifiedToken};
pub use password::{MIN_PASSWORD_LEN, hash_password, verify_password};
