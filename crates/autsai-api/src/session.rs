use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use autsai_core::screens::{BellPoller, NotificationBell, local_now};
use autsai_core::shell::Shell;
use autsai_db::{Database, LocalGateway, Storage};
use autsai_types::api::{Claims, User};

/// One signed-in partner: their gateway, the shell with its screen
/// controllers, and the bell poller refreshing in the background.
pub struct Session {
    pub user: User,
    pub gateway: Arc<LocalGateway>,
    pub shell: RwLock<Shell<LocalGateway>>,
    poller: BellPoller<LocalGateway>,
}

impl Session {
    fn start(db: Arc<Database>, storage: Arc<Storage>, user: User, poll_interval: Duration) -> Self {
        let gateway = Arc::new(LocalGateway::signed_in(db, storage, user.clone()));
        let shell = Shell::new(gateway.clone(), local_now().date());
        let poller = BellPoller::spawn(NotificationBell::new(gateway.clone()), poll_interval);
        Self {
            user,
            gateway,
            shell: RwLock::new(shell),
            poller,
        }
    }

    pub fn bell(&self) -> Arc<RwLock<NotificationBell<LocalGateway>>> {
        self.poller.bell()
    }
}

/// Open sessions keyed by partner id. Removing a session drops its poller.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    db: Arc<Database>,
    storage: Arc<Storage>,
    poll_interval: Duration,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(db: Arc<Database>, storage: Arc<Storage>, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                db,
                storage,
                poll_interval,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The partner's session, started on first use.
    pub async fn open(&self, claims: &Claims) -> Arc<Session> {
        if let Some(session) = self.inner.sessions.read().await.get(&claims.sub) {
            return session.clone();
        }

        let mut sessions = self.inner.sessions.write().await;
        sessions
            .entry(claims.sub)
            .or_insert_with(|| {
                info!("Starting session for {}", claims.email);
                Arc::new(Session::start(
                    self.inner.db.clone(),
                    self.inner.storage.clone(),
                    User::from(claims),
                    self.inner.poll_interval,
                ))
            })
            .clone()
    }

    /// End a session. Returns whether one was open.
    pub async fn close(&self, user_id: Uuid) -> bool {
        let removed = self.inner.sessions.write().await.remove(&user_id);
        match removed {
            Some(session) => {
                session.gateway.sign_out();
                info!("Closed session for {}", session.user.email);
                true
            }
            None => false,
        }
    }

    pub async fn count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}
