//! # Session Store
//!
//! One entry per logged-in terminal: the staff member, their cart, and a
//! checkout guard. Carts are never shared between sessions.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login ──► create(user) ──► sid (in JWT)                               │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  each request ──► touch(sid)   expired? ──► purged, 401                 │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  cart ops ──► with_cart_mut(sid, |cart| ...)                            │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  checkout ──► begin_checkout ──► (db) ──► guard dropped                 │
//! │                                            committed → cart cleared     │
//! │                                            otherwise → cart kept        │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  logout ──► remove(sid)      idle sweep ──► sweep()                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! `Arc<Mutex<HashMap>>`. The lock is only held for in-memory work and
//! never across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use naira_core::{Cart, User};

/// A logged-in staff member and their cart.
#[derive(Debug, Clone)]
pub struct StaffSession {
    pub user: User,
    pub cart: Cart,
    last_seen: Instant,
    checkout_in_progress: bool,
}

impl StaffSession {
    fn new(user: User) -> Self {
        StaffSession {
            user,
            cart: Cart::new(),
            last_seen: Instant::now(),
            checkout_in_progress: false,
        }
    }

    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_seen) > idle_timeout
    }
}

/// Why a session operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Unknown, logged out or idle past the timeout.
    Expired,
    CheckoutInProgress,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, StaffSession>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StaffSession>> {
        // A panic while holding the lock leaves plain data behind; keep serving.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a session with an empty cart and returns its id.
    pub fn create(&self, user: User) -> String {
        let sid = Uuid::new_v4().to_string();
        self.lock().insert(sid.clone(), StaffSession::new(user));
        sid
    }

    /// Looks up a live session, purging it if it has expired.
    fn live<'a>(
        sessions: &'a mut HashMap<String, StaffSession>,
        sid: &str,
        idle_timeout: Duration,
    ) -> Result<&'a mut StaffSession, SessionError> {
        let now = Instant::now();
        let expired = match sessions.get(sid) {
            Some(session) => session.is_expired(now, idle_timeout),
            None => return Err(SessionError::Expired),
        };
        if expired {
            sessions.remove(sid);
            return Err(SessionError::Expired);
        }
        sessions.get_mut(sid).ok_or(SessionError::Expired)
    }

    /// Marks the session as used and returns its user.
    pub fn touch(&self, sid: &str) -> Result<User, SessionError> {
        let mut sessions = self.lock();
        let session = Self::live(&mut sessions, sid, self.idle_timeout)?;
        session.last_seen = Instant::now();
        Ok(session.user.clone())
    }

    /// Runs `f` against the session's cart.
    ///
    /// Refused with `CheckoutInProgress` while a sale is being committed,
    /// so the cart cannot change under the snapshot being sold.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// sessions.with_cart_mut(&sid, |cart| cart.add(&product, 2))??;
    /// ```
    pub fn with_cart_mut<F, R>(&self, sid: &str, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut sessions = self.lock();
        let session = Self::live(&mut sessions, sid, self.idle_timeout)?;
        if session.checkout_in_progress {
            return Err(SessionError::CheckoutInProgress);
        }
        Ok(f(&mut session.cart))
    }

    pub fn cart(&self, sid: &str) -> Result<Cart, SessionError> {
        let mut sessions = self.lock();
        let session = Self::live(&mut sessions, sid, self.idle_timeout)?;
        Ok(session.cart.clone())
    }

    /// Sets the checkout guard and returns a snapshot of the cart to sell.
    ///
    /// A second call while the returned [`CheckoutGuard`] is alive fails
    /// with `CheckoutInProgress`.
    pub fn begin_checkout(&self, sid: &str) -> Result<(Cart, CheckoutGuard), SessionError> {
        let mut sessions = self.lock();
        let session = Self::live(&mut sessions, sid, self.idle_timeout)?;
        if session.checkout_in_progress {
            return Err(SessionError::CheckoutInProgress);
        }
        session.checkout_in_progress = true;
        let guard = CheckoutGuard {
            store: self.clone(),
            sid: sid.to_string(),
            committed: false,
        };
        Ok((session.cart.clone(), guard))
    }

    fn finish_checkout(&self, sid: &str, committed: bool) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(sid) {
            session.checkout_in_progress = false;
            if committed {
                session.cart.clear();
            }
        }
    }

    /// Logout. Returns false if the session was already gone.
    pub fn remove(&self, sid: &str) -> bool {
        self.lock().remove(sid).is_some()
    }

    /// Drops every session belonging to `user_id` (deactivated accounts).
    pub fn remove_user(&self, user_id: &str) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.user.id != user_id);
        before - sessions.len()
    }

    /// Purges idle sessions. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.idle_timeout));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Checkout Guard
// =============================================================================

/// Holds a session's checkout slot. Dropping it releases the slot; the
/// cart is cleared only if [`commit`](Self::commit) was called first.
///
/// Released on drop so a cancelled request cannot leave the session stuck.
#[derive(Debug)]
pub struct CheckoutGuard {
    store: SessionStore,
    sid: String,
    committed: bool,
}

impl CheckoutGuard {
    /// The sale is stored; the cart will be emptied on release.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for CheckoutGuard {
    fn drop(&mut self) {
        self.store.finish_checkout(&self.sid, self.committed);
    }
}

// =============================================================================
// Sweep Task
// =============================================================================

/// Periodically purges idle sessions until the runtime shuts down.
pub fn spawn_sweeper(store: SessionStore, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = store.sweep();
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "Idle sessions purged");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use naira_core::{Product, Role};

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user-{id}"),
            full_name: "Test User".to_string(),
            email: None,
            password_hash: String::new(),
            role: Role::Cashier,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn product(id: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            barcode: None,
            name: format!("Product {id}"),
            description: None,
            category: "Provisions".to_string(),
            price_kobo: 50_000,
            cost_price_kobo: None,
            stock_quantity: stock,
            reorder_level: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_carts_are_per_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(user("1"));
        let b = store.create(user("2"));

        store
            .with_cart_mut(&a, |cart| cart.add(&product("p1", 10), 2))
            .unwrap()
            .unwrap();

        assert_eq!(store.cart(&a).unwrap().quantity_of("p1"), 2);
        assert!(store.cart(&b).unwrap().is_empty());
    }

    #[test]
    fn test_removed_session_is_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        let sid = store.create(user("1"));
        assert!(store.touch(&sid).is_ok());

        assert!(store.remove(&sid));
        assert_eq!(store.touch(&sid).unwrap_err(), SessionError::Expired);
        assert!(!store.remove(&sid));
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::ZERO);
        let sid = store.create(user("1"));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.touch(&sid).unwrap_err(), SessionError::Expired);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_purges_idle() {
        let store = SessionStore::new(Duration::ZERO);
        store.create(user("1"));
        store.create(user("2"));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.sweep(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_checkout_guard() {
        let store = SessionStore::new(Duration::from_secs(60));
        let sid = store.create(user("1"));
        store
            .with_cart_mut(&sid, |cart| cart.add(&product("p1", 10), 1))
            .unwrap()
            .unwrap();

        let (snapshot, guard) = store.begin_checkout(&sid).unwrap();
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(
            store.begin_checkout(&sid).unwrap_err(),
            SessionError::CheckoutInProgress
        );
        assert_eq!(
            store.with_cart_mut(&sid, |cart| cart.clear()).unwrap_err(),
            SessionError::CheckoutInProgress
        );

        // Failed sale keeps the cart
        drop(guard);
        assert_eq!(store.cart(&sid).unwrap().line_count(), 1);

        let (_, guard) = store.begin_checkout(&sid).unwrap();
        guard.commit();
        assert!(store.cart(&sid).unwrap().is_empty());
        assert!(store.begin_checkout(&sid).is_ok());
    }

    #[test]
    fn test_remove_user_drops_all_their_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.create(user("1"));
        store.create(user("1"));
        let other = store.create(user("2"));

        assert_eq!(store.remove_user("1"), 2);
        assert!(store.touch(&other).is_ok());
    }
}
