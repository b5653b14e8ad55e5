//! Store backend selection and repository wiring.

use std::fmt;
use std::sync::Arc;

use dernek_core::audit::{AuditSink, FanoutAuditSink};
use dernek_core::auth::ActorContext;
use dernek_core::sync::{PendingOperation, SyncQueueSink};
use dernek_shared::config::{StoreConfig, StoreMode};
use dernek_shared::types::MemberId;
use dernek_shared::AppConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::StoreError;
use crate::members::{DbMemberDirectory, MemberDirectory};
use crate::migration::{Migrator, MigratorTrait};
use crate::repositories::{
    AccrualRepository, CashAccountRepository, ClosingRepository, DuesRepository,
    ExpenseRepository, IncomeRepository, TransferRepository,
};

/// Where the ledger lives. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite file owned by this process.
    Local {
        /// Connection URL.
        url: String,
    },
    /// Shared server, migrated out of band.
    Remote {
        /// Connection URL.
        url: String,
    },
}

impl StoreBackend {
    /// Resolves the backend from configuration.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        match config.mode {
            StoreMode::Local => Self::Local {
                url: config.url.clone(),
            },
            StoreMode::Remote => Self::Remote {
                url: config.url.clone(),
            },
        }
    }

    /// Connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Local { url } | Self::Remote { url } => url,
        }
    }

    /// Connection options for this backend.
    ///
    /// A local store has a single writer, so its pool holds one connection.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url().to_string());
        options.sqlx_logging(false);
        if let Self::Local { .. } = self {
            options.max_connections(1).min_connections(1);
        }
        options
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { .. } => write!(f, "local"),
            Self::Remote { .. } => write!(f, "remote"),
        }
    }
}

/// An open store and the collaborators every repository shares.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
    backend: StoreBackend,
    config: AppConfig,
    audit: Arc<dyn AuditSink>,
    members: Arc<dyn MemberDirectory>,
    sync: Option<Arc<SyncQueueSink>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend)
            .field("replicate", &self.sync.is_some())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Connects to the configured backend.
    ///
    /// A local store is migrated to the latest schema. With replication on,
    /// every committed mutation is also queued for the replicator.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn open(config: AppConfig, audit: Arc<dyn AuditSink>) -> Result<Self, StoreError> {
        let backend = StoreBackend::from_config(&config.store);
        tracing::info!(backend = %backend, replicate = config.store.replicate, "opening store");

        let db = Database::connect(backend.connect_options()).await?;
        if let StoreBackend::Local { .. } = backend {
            Migrator::up(&db, None).await?;
        }

        Ok(Self::assemble(db, backend, config, audit))
    }

    /// Wraps an existing connection. The schema must already be migrated.
    #[must_use]
    pub fn from_connection(
        db: DatabaseConnection,
        config: AppConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let backend = StoreBackend::from_config(&config.store);
        Self::assemble(db, backend, config, audit)
    }

    fn assemble(
        db: DatabaseConnection,
        backend: StoreBackend,
        config: AppConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let (audit, sync) = if config.store.replicate {
            let queue = Arc::new(SyncQueueSink::new());
            let sinks: Vec<Arc<dyn AuditSink>> = vec![audit, queue.clone() as Arc<dyn AuditSink>];
            let fanout: Arc<dyn AuditSink> = Arc::new(FanoutAuditSink::new(sinks));
            (fanout, Some(queue))
        } else {
            (audit, None)
        };
        let members: Arc<dyn MemberDirectory> = Arc::new(DbMemberDirectory::new(db.clone()));

        Self {
            db,
            backend,
            config,
            audit,
            members,
            sync,
        }
    }

    /// Replaces the member directory used by the dues tracker.
    #[must_use]
    pub fn with_members(mut self, members: Arc<dyn MemberDirectory>) -> Self {
        self.members = members;
        self
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Selected backend.
    #[must_use]
    pub const fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Drains the operations queued for replication. Empty without replication.
    #[must_use]
    pub fn pending_sync(&self) -> Vec<PendingOperation> {
        self.sync
            .as_ref()
            .map(|queue| queue.take_pending())
            .unwrap_or_default()
    }

    /// Cash accounts and balances.
    #[must_use]
    pub fn cash_accounts(&self) -> CashAccountRepository {
        CashAccountRepository::new(self.db.clone(), self.audit.clone())
    }

    /// Income ledger.
    #[must_use]
    pub fn income(&self) -> IncomeRepository {
        IncomeRepository::new(
            self.db.clone(),
            self.audit.clone(),
            self.members.clone(),
            self.config.dues.clone(),
        )
    }

    /// Expense ledger.
    #[must_use]
    pub fn expenses(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.db.clone(), self.audit.clone())
    }

    /// Transfers.
    #[must_use]
    pub fn transfers(&self) -> TransferRepository {
        TransferRepository::new(self.db.clone(), self.audit.clone())
    }

    /// Dues tracker.
    #[must_use]
    pub fn dues(&self) -> DuesRepository {
        DuesRepository::new(
            self.db.clone(),
            self.audit.clone(),
            self.members.clone(),
            self.config.dues.clone(),
        )
    }

    /// Accrual registry.
    #[must_use]
    pub fn accruals(&self) -> AccrualRepository {
        AccrualRepository::new(self.db.clone(), self.audit.clone())
    }

    /// Year-end closing.
    #[must_use]
    pub fn closing(&self) -> ClosingRepository {
        ClosingRepository::new(self.db.clone(), self.audit.clone(), self.config.closing)
    }

    /// Members stored in this database.
    #[must_use]
    pub fn member_directory(&self) -> DbMemberDirectory {
        DbMemberDirectory::new(self.db.clone())
    }

    /// Removes a member with the configured deletion mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not edit dues or the member is unknown.
    pub async fn remove_member(&self, ctx: &ActorContext, id: MemberId) -> Result<(), StoreError> {
        self.member_directory()
            .remove(ctx, self.audit.as_ref(), id, self.config.members.deletion_mode)
            .await
    }
}
