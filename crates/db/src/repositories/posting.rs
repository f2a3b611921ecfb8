//! Posting repository: the write path into the double-entry ledger.
//!
//! Every business event that moves money goes through [`post_in`]: one
//! `ledger.transactions` row plus its balanced `ledger.entries`, inserted
//! atomically. Replays of the same idempotency key return the stored
//! transaction id and write nothing; a reference that already posted under
//! a different key is rejected.

use chrono::Utc;
use serde::Serialize;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use telar_core::ledger::{
    IdempotencyDecision, LedgerError, Posting, PostingReference, decide_idempotency,
};
use telar_shared::types::TransactionId;

use crate::entities::{accounts, ledger_entries, ledger_transactions};
use crate::repositories::account::get_or_create;

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// The result of a posting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostOutcome {
    /// The ledger transaction recording the event.
    pub transaction_id: TransactionId,
    /// True when the idempotency key had already posted and nothing was
    /// written.
    pub replayed: bool,
}

/// A stored ledger transaction with its entries.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithEntries {
    /// Transaction header.
    pub transaction: ledger_transactions::Model,
    /// Entry rows, each paired with its account.
    pub entries: Vec<(ledger_entries::Model, accounts::Model)>,
}

/// Posting repository for ledger writes.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a validated posting in its own database transaction.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateReference` if the business event already posted
    /// under a different idempotency key, or a database error.
    pub async fn post(&self, posting: &Posting) -> Result<PostOutcome, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let outcome = post_in(&txn, posting).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(outcome)
    }

    /// Loads a transaction and its entries by business reference.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no transaction posted for the
    /// reference.
    pub async fn get_by_reference(
        &self,
        reference_type: &str,
        reference_id: Uuid,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let transaction = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::ReferenceType.eq(reference_type))
            .filter(ledger_transactions::Column::ReferenceId.eq(reference_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TransactionNotFound(reference_id))?;

        let entries = ledger_entries::Entity::find()
            .find_also_related(accounts::Entity)
            .filter(ledger_entries::Column::TransactionId.eq(transaction.id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let entries = entries
            .into_iter()
            .map(|(entry, account)| {
                let account_id = entry.account_id;
                account
                    .map(|account| (entry, account))
                    .ok_or(LedgerError::AccountNotFound(account_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionWithEntries {
            transaction,
            entries,
        })
    }

    /// Posts the exact reversal of a stored transaction: same entries with
    /// negated amounts, referenced as a reversal of the original id.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for an unknown id, `DuplicateReference`
    /// if the transaction was already reversed under a different key.
    pub async fn reverse(
        &self,
        transaction_id: TransactionId,
        idempotency_key: &str,
    ) -> Result<PostOutcome, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let original = ledger_transactions::Entity::find_by_id(transaction_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id.into_inner()))?;

        let reference = PostingReference::Reversal(original.id);

        let by_key = find_by_idempotency_key(&txn, idempotency_key).await?;
        let stored = find_by_reference(&txn, &reference).await?;
        let decision = decide_idempotency(
            reference,
            idempotency_key,
            by_key,
            stored.as_ref().map(|(id, key)| (*id, key.as_str())),
        )?;
        if let IdempotencyDecision::Replay(existing) = decision {
            txn.commit().await.map_err(db_err)?;
            return Ok(PostOutcome {
                transaction_id: existing,
                replayed: true,
            });
        }

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionId.eq(original.id))
            .all(&txn)
            .await
            .map_err(db_err)?;

        let now = Utc::now().into();
        let reversal_id = Uuid::new_v4();
        let header = ledger_transactions::ActiveModel {
            id: Set(reversal_id),
            reference_type: Set(reference.reference_type().to_owned()),
            reference_id: Set(reference.reference_id()),
            currency: Set(original.currency.clone()),
            description: Set(Some(format!("Reversal of {}", original.id))),
            idempotency_key: Set(idempotency_key.to_owned()),
            created_at: Set(now),
        };
        header.insert(&txn).await.map_err(db_err)?;

        for entry in entries {
            let reversed = ledger_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(reversal_id),
                account_id: Set(entry.account_id),
                amount_minor: Set(-entry.amount_minor),
                metadata: Set(entry.metadata.clone()),
                created_at: Set(now),
            };
            reversed.insert(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(PostOutcome {
            transaction_id: TransactionId::from(reversal_id),
            replayed: false,
        })
    }
}

async fn find_by_idempotency_key<C: ConnectionTrait>(
    conn: &C,
    idempotency_key: &str,
) -> Result<Option<TransactionId>, LedgerError> {
    let stored = ledger_transactions::Entity::find()
        .filter(ledger_transactions::Column::IdempotencyKey.eq(idempotency_key))
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(stored.map(|t| TransactionId::from(t.id)))
}

async fn find_by_reference<C: ConnectionTrait>(
    conn: &C,
    reference: &PostingReference,
) -> Result<Option<(TransactionId, String)>, LedgerError> {
    let stored = ledger_transactions::Entity::find()
        .filter(ledger_transactions::Column::ReferenceType.eq(reference.reference_type()))
        .filter(ledger_transactions::Column::ReferenceId.eq(reference.reference_id()))
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(stored.map(|t| (TransactionId::from(t.id), t.idempotency_key)))
}

/// Posts inside an existing database transaction.
///
/// Callers that need the posting atomic with other writes (payout status
/// flips, checkout transitions) pass their transaction here; the commit
/// stays with the caller.
pub(crate) async fn post_in<C: ConnectionTrait>(
    conn: &C,
    posting: &Posting,
) -> Result<PostOutcome, LedgerError> {
    let by_key = find_by_idempotency_key(conn, &posting.idempotency_key).await?;
    let stored = find_by_reference(conn, &posting.reference).await?;
    let decision = decide_idempotency(
        posting.reference,
        &posting.idempotency_key,
        by_key,
        stored.as_ref().map(|(id, key)| (*id, key.as_str())),
    )?;

    if let IdempotencyDecision::Replay(existing) = decision {
        return Ok(PostOutcome {
            transaction_id: existing,
            replayed: true,
        });
    }

    let now = Utc::now().into();
    let transaction_id = Uuid::new_v4();
    let header = ledger_transactions::ActiveModel {
        id: Set(transaction_id),
        reference_type: Set(posting.reference.reference_type().to_owned()),
        reference_id: Set(posting.reference.reference_id()),
        currency: Set(posting.currency.code().to_owned()),
        description: Set(posting.description.clone()),
        idempotency_key: Set(posting.idempotency_key.clone()),
        created_at: Set(now),
    };
    header.insert(conn).await.map_err(db_err)?;

    for line in posting.entries() {
        let account = get_or_create(conn, &line.account).await?;
        let entry = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            account_id: Set(account.id),
            amount_minor: Set(line.amount_minor),
            metadata: Set(line.metadata.clone()),
            created_at: Set(now),
        };
        entry.insert(conn).await.map_err(db_err)?;
    }

    Ok(PostOutcome {
        transaction_id: TransactionId::from(transaction_id),
        replayed: false,
    })
}
