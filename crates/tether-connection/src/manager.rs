//! Ownership of the single live database session

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tether_core::{Connection, ConnectionConfig, DatabaseDriver, Result, TetherError, codes};
use tokio::sync::Mutex;

use crate::reconnect::ReconnectConfig;

/// Owns the one live connection handle, the configuration used to open it
/// and the counter of consecutive connection-loss failures.
///
/// The manager only opens and replaces sessions. Deciding when to reconnect
/// is the job of [`crate::ResilientInvoker`].
pub struct ConnectionManager {
    driver: Arc<dyn DatabaseDriver>,
    config: ConnectionConfig,
    reconnect: ReconnectConfig,
    /// The live handle (behind mutex for replacement)
    handle: Mutex<Option<Arc<dyn Connection>>>,
    /// Consecutive transient failures since the last clean operation
    consecutive_failures: AtomicU32,
    /// Sessions opened over the manager's lifetime
    sessions_opened: AtomicU64,
}

impl ConnectionManager {
    /// Create a manager without opening a session.
    ///
    /// Call [`ConnectionManager::reconnect`] (or build a
    /// [`crate::ResilientInvoker`] with `establish`) before use.
    pub fn new<D: DatabaseDriver + 'static>(
        driver: D,
        config: ConnectionConfig,
        reconnect: ReconnectConfig,
    ) -> Self {
        Self {
            driver: Arc::new(driver),
            config,
            reconnect,
            handle: Mutex::new(None),
            consecutive_failures: AtomicU32::new(0),
            sessions_opened: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn reconnect_config(&self) -> &ReconnectConfig {
        &self.reconnect
    }

    /// The configured retry ceiling
    pub fn retry_ceiling(&self) -> u32 {
        self.reconnect.max_retries()
    }

    /// Open a brand new session and apply the session directive to it.
    ///
    /// The new handle is returned, not stored.
    pub async fn connect(&self) -> Result<Arc<dyn Connection>> {
        let conn = self.driver.connect(&self.config).await?;

        if let Some(directive) = &self.config.session_directive {
            tracing::debug!(directive = %directive, "applying session directive");
            conn.execute(directive, &[]).await?;
        }

        Ok(conn)
    }

    /// Discard the current handle, if any, and store a freshly opened one.
    ///
    /// The old handle is dropped rather than closed; its server side is
    /// usually gone already. On failure the manager is left without a handle.
    pub async fn reconnect(&self) -> Result<()> {
        let mut guard = self.handle.lock().await;

        if guard.take().is_some() {
            tracing::debug!(target_db = %self.config.target(), "discarding previous connection");
        }

        let conn = self.connect().await?;
        *guard = Some(conn);

        let sessions = self.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            driver = self.driver.name(),
            target_db = %self.config.target(),
            sessions,
            "database session established"
        );
        Ok(())
    }

    /// The live handle, lent for the duration of one operation.
    ///
    /// Without a handle this reports a gone-away failure so callers route it
    /// through the same recovery path as a dropped session.
    pub async fn current_handle(&self) -> Result<Arc<dyn Connection>> {
        self.handle.lock().await.clone().ok_or_else(|| {
            TetherError::driver(
                codes::SERVER_GONE_AWAY,
                "no database session has been established",
            )
        })
    }

    /// Whether a handle is currently held
    pub async fn is_connected(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Number of consecutive transient failures observed
    pub fn retry_count(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// Number of sessions successfully opened so far
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    /// Count one more transient failure, returning the new total
    pub(crate) fn record_transient_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn reset_retries(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("driver", &self.driver.name())
            .field("config", &self.config)
            .field("reconnect", &self.reconnect)
            .field("consecutive_failures", &self.retry_count())
            .field("sessions_opened", &self.sessions_opened())
            .finish()
    }
}
