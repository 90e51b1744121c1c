//! Post-condition check against the document store.
//!
//! The UI step ends when the print dialog closes, but the only authoritative
//! signal that the journal landed is a finalized row in the document store.
//! The store write may lag the dialog, so the check re-polls on a short
//! budget before declaring failure.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

use crate::errors::AutomationError;

/// Grace budget for the archive row to appear after the dialog closes.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);
const VERIFY_INTERVAL: Duration = Duration::from_secs(1);

/// Status id meaning the stored file has completed processing.
const STATUS_FINALIZED: i32 = 1;

/// The filename Solteq Sund gives a journal printed on `date`.
pub fn journal_filename(date: NaiveDate) -> String {
    format!("Udskrift af journal {}.pdf", date.format("%d-%m-%Y"))
}

/// Read-only view of the document store, keyed by patient and filename.
/// Only emptiness is consumed.
#[async_trait]
pub trait DocumentArchive: Send + Sync {
    /// True iff a finalized document row exists for the patient (ten-digit
    /// CPR) and filename.
    async fn journal_stored(
        &self,
        cpr_digits: &str,
        filename: &str,
    ) -> Result<bool, AutomationError>;
}

/// `DocumentArchive` over the Solteq Sund database. The latest history entry
/// per document decides the status; parameters are bound, never interpolated.
pub struct PgDocumentArchive {
    pool: PgPool,
}

impl PgDocumentArchive {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentArchive for PgDocumentArchive {
    #[instrument(skip(self))]
    async fn journal_stored(
        &self,
        cpr_digits: &str,
        filename: &str,
    ) -> Result<bool, AutomationError> {
        let row = sqlx::query(
            r#"
            SELECT ds.DocumentId
            FROM DocumentStore ds
            JOIN Child c ON c.childId = ds.entityId
            JOIN (
                SELECT DocumentId, MAX(Document_HistoryId) AS MaxDocument_HistoryId
                FROM DocumentStoreStatus
                GROUP BY DocumentId
            ) latest ON ds.DocumentId = latest.DocumentId
            JOIN DocumentStoreStatus dss
                ON dss.DocumentId = ds.DocumentId
               AND dss.Document_HistoryId = latest.MaxDocument_HistoryId
            WHERE c.cpr = $1
              AND ds.OriginalFilename = $2
              AND dss.DocumentStoreStatusId = $3
            "#,
        )
        .bind(cpr_digits)
        .bind(filename)
        .bind(STATUS_FINALIZED)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }
}

/// Poll the archive until the journal row shows up or the grace budget
/// elapses. Returns `Ok(false)` only once the full budget has passed with no
/// matching row.
pub async fn wait_for_journal(
    archive: &dyn DocumentArchive,
    cpr_digits: &str,
    filename: &str,
    timeout: Duration,
) -> Result<bool, AutomationError> {
    let deadline = Instant::now() + timeout;
    loop {
        if archive.journal_stored(cpr_digits, filename).await? {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        debug!("journal row not visible yet, re-polling archive");
        sleep(VERIFY_INTERVAL.min(deadline - now)).await;
    }
}
