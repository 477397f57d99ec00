//! # Authentication and Access Control
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Authorization: Bearer <jwt>                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_auth                                                           │
//! │       ├── missing / malformed header   → 401 UNAUTHORIZED               │
//! │       ├── bad signature / expired      → 401 UNAUTHORIZED               │
//! │       ├── session logged out / idle    → 401 UNAUTHORIZED               │
//! │       └── ok: CurrentUser { user, sid, capabilities } in extensions     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_capability(cap)                                                │
//! │       ├── cap not granted to role      → 403 FORBIDDEN                  │
//! │       └── ok: handler                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod jwt;
mod middleware;
mod password;

pub use jwt::{extract_bearer_token, Claims, JwtManager};
pub use middleware::{require_auth, require_capability, CurrentUser};
pub use password::{hash_password, verify_password};
