//! Transaction boundary shared by the write operations.
//!
//! An operation either owns its transaction ([`TxScope::Own`]) or participates
//! in one opened by its caller ([`TxScope::Join`]). Only an owning unit ever
//! begins, commits or rolls back.

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, error};

use crate::error::ServiceError;

/// How an operation relates to the surrounding transaction.
#[derive(Clone, Copy, Default)]
pub enum TxScope<'a> {
    /// Open, commit or roll back, and release a dedicated transaction.
    #[default]
    Own,
    /// Run inside the caller's transaction; the caller owns the boundary.
    Join(&'a DatabaseTransaction),
}

impl std::fmt::Debug for TxScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxScope::Own => f.write_str("Own"),
            TxScope::Join(_) => f.write_str("Join"),
        }
    }
}

/// A live transaction scope.
///
/// Committing or rolling back consumes an owned unit, so its connection is
/// released exactly once. An owned unit dropped without either is rolled
/// back by the driver.
pub enum UnitOfWork<'a> {
    Owned(DatabaseTransaction),
    Joined(&'a DatabaseTransaction),
}

impl<'a> UnitOfWork<'a> {
    /// Acquires a connection and starts a dedicated transaction.
    pub async fn begin(db: &DatabaseConnection) -> Result<UnitOfWork<'static>, ServiceError> {
        let txn = db.begin().await.map_err(|err| storage("begin", err))?;
        debug!("unit of work started");
        Ok(UnitOfWork::Owned(txn))
    }

    /// Starts a dedicated transaction or joins the caller's, per `scope`.
    pub async fn enter(db: &DatabaseConnection, scope: TxScope<'a>) -> Result<Self, ServiceError> {
        match scope {
            TxScope::Own => UnitOfWork::begin(db).await,
            TxScope::Join(txn) => Ok(UnitOfWork::Joined(txn)),
        }
    }

    /// Connection every statement of this unit must run on.
    pub fn conn(&self) -> &DatabaseTransaction {
        match self {
            UnitOfWork::Owned(txn) => txn,
            UnitOfWork::Joined(txn) => txn,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, UnitOfWork::Owned(_))
    }

    /// Commits an owned transaction; a joined unit leaves the commit to its owner.
    pub async fn commit_and_release(self) -> Result<(), ServiceError> {
        match self {
            UnitOfWork::Owned(txn) => {
                txn.commit().await.map_err(|err| storage("commit", err))?;
                debug!("unit of work committed");
                Ok(())
            }
            UnitOfWork::Joined(_) => Ok(()),
        }
    }

    /// Rolls back an owned transaction; a joined unit leaves the rollback to its owner.
    pub async fn rollback_and_release(self) -> Result<(), ServiceError> {
        match self {
            UnitOfWork::Owned(txn) => {
                txn.rollback().await.map_err(|err| storage("rollback", err))?;
                debug!("unit of work rolled back");
                Ok(())
            }
            UnitOfWork::Joined(_) => Ok(()),
        }
    }

    /// Ends the unit according to `outcome`: commit on success, roll back on
    /// failure.
    ///
    /// An owner returns the underlying cause of a partial write once it has
    /// been rolled back. A failed rollback is logged and the original error
    /// is returned. A joined unit hands `outcome` back untouched.
    pub async fn finish<T>(self, outcome: Result<T, ServiceError>) -> Result<T, ServiceError> {
        if !self.is_owner() {
            return outcome;
        }

        match outcome {
            Ok(value) => {
                self.commit_and_release().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback_and_release().await {
                    error!(error = %rollback_err, cause = %err, "rollback failed");
                }
                Err(err.resolved())
            }
        }
    }
}

/// Transaction control errors are classified like statement errors, so a
/// commit that loses a lock race is a retryable conflict.
fn storage(step: &'static str, err: DbErr) -> ServiceError {
    error!(error = ?err, step, "transaction control failed");
    ServiceError::from(err)
}
