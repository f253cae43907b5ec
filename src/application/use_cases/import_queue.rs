// ============================================================
// IMPORT QUEUE
// ============================================================
// Serializes concurrent imports into one shared record set
//
// Each submit holds the record lock from snapshot to merge, so two imports
// never classify rows against the same stale snapshot. Parsing runs on the
// blocking pool.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use super::id_generator::{IdGenerator, UuidIds};
use super::import_orchestrator::import;
use crate::domain::csv::{FieldMapping, ImportReport, RecordSet, RowStatus};
use crate::domain::error::{ExchangeError, Result};

pub struct ImportQueue<G = UuidIds> {
    records: Arc<AsyncMutex<RecordSet>>,
    mapping: Arc<FieldMapping>,
    ids: Arc<Mutex<G>>,
    timeout: Option<Duration>,
    keep_failed: bool,
}

impl<G> Clone for ImportQueue<G> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            mapping: Arc::clone(&self.mapping),
            ids: Arc::clone(&self.ids),
            timeout: self.timeout,
            keep_failed: self.keep_failed,
        }
    }
}

impl ImportQueue<UuidIds> {
    pub fn new(mapping: FieldMapping) -> Self {
        Self::with_ids(mapping, UuidIds)
    }
}

impl<G> ImportQueue<G>
where
    G: IdGenerator + Send + 'static,
{
    pub fn with_ids(mapping: FieldMapping, ids: G) -> Self {
        Self {
            records: Arc::new(AsyncMutex::new(RecordSet::new())),
            mapping: Arc::new(mapping),
            ids: Arc::new(Mutex::new(ids)),
            timeout: None,
            keep_failed: false,
        }
    }

    /// Seed the shared set before the queue is handed out
    pub fn with_records(mut self, records: RecordSet) -> Self {
        self.records = Arc::new(AsyncMutex::new(records));
        self
    }

    /// Abandon an import that takes longer than `limit`; nothing is merged
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Also merge rows classified as failed (with their fallback values)
    pub fn keep_failed(mut self, keep: bool) -> Self {
        self.keep_failed = keep;
        self
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub async fn snapshot(&self) -> RecordSet {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Import one file against the current set and merge the outcome
    pub async fn submit(&self, bytes: Vec<u8>) -> Result<ImportReport> {
        let mut records = self.records.lock().await;
        let snapshot = records.clone();
        let mapping = Arc::clone(&self.mapping);
        let ids = Arc::clone(&self.ids);

        let task = tokio::task::spawn_blocking(move || {
            let mut ids = ids
                .lock()
                .map_err(|_| ExchangeError::Internal("id generator lock poisoned".to_string()))?;
            import(&bytes, &mapping, &snapshot, &mut *ids)
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(limit_ms = limit.as_millis() as u64, "Import timed out");
                    return Err(ExchangeError::Timeout(format!(
                        "import did not finish within {} ms",
                        limit.as_millis()
                    )));
                }
            },
            None => task.await,
        };

        let report = joined
            .map_err(|e| ExchangeError::Internal(format!("import task failed: {}", e)))??;

        let mut merged = 0usize;
        for (record, status) in report.rows_with_status() {
            if status == RowStatus::Failed && !self.keep_failed {
                continue;
            }
            records.upsert(record.clone());
            merged += 1;
        }

        info!(
            merged,
            total = records.len(),
            summary = %report.summary,
            "Merged import into record set"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::id_generator::SequentialIds;
    use crate::domain::csv::{FieldSpec, FieldValue, Record};
    use std::collections::HashSet;

    fn mapping() -> FieldMapping {
        FieldMapping::new(vec![
            FieldSpec::new("sku", "Mã"),
            FieldSpec::new("name", "Tên").required(),
        ])
        .unwrap()
        .with_identity_key("sku")
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_merges_and_updates() {
        let queue = ImportQueue::with_ids(mapping(), SequentialIds::new("p"));

        let first = queue.submit("Mã,Tên\na-1,Kem\n".as_bytes().to_vec()).await.unwrap();
        assert_eq!(first.summary.imported, 1);

        let second = queue
            .submit("Mã,Tên\na-1,Kem mới\n,Son\n".as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(second.summary.updated, 1);
        assert_eq!(second.summary.imported, 1);

        let records = queue.snapshot().await;
        assert_eq!(records.len(), 2);
        let updated = &records.records()[0];
        assert_eq!(updated.get("name"), Some(&FieldValue::text("Kem mới")));
    }

    #[tokio::test]
    async fn test_failed_rows_are_not_merged_by_default() {
        let input = "Mã,Tên\na-1,\na-2,Son\n".as_bytes().to_vec();

        let strict = ImportQueue::with_ids(mapping(), SequentialIds::new("p"));
        let report = strict.submit(input.clone()).await.unwrap();
        assert_eq!(report.summary.failed, 1);
        assert_eq!(strict.len().await, 1);

        let lenient = ImportQueue::with_ids(mapping(), SequentialIds::new("p")).keep_failed(true);
        lenient.submit(input).await.unwrap();
        assert_eq!(lenient.len().await, 2);
    }

    #[tokio::test]
    async fn test_seeded_records_classify_as_updates() {
        let seeded = RecordSet::from(vec![Record::new().with_id("a-1").with("sku", "a-1")]);
        let queue = ImportQueue::new(mapping()).with_records(seeded);

        let report = queue.submit("Mã,Tên\na-1,Kem\n".as_bytes().to_vec()).await.unwrap();
        assert_eq!(report.summary.updated, 1);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_get_distinct_ids() {
        let queue = ImportQueue::with_ids(mapping(), SequentialIds::new("p"));

        let mut handles = Vec::new();
        for i in 0..8 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let body = format!("Mã,Tên\n,Item {}\n", i);
                queue.submit(body.into_bytes()).await
            }));
        }
        for handle in handles {
            let report = handle.await.unwrap().unwrap();
            assert_eq!(report.summary.imported, 1);
        }

        let records = queue.snapshot().await;
        let ids: HashSet<_> = records.iter().filter_map(|r| r.id.clone()).collect();
        assert_eq!(records.len(), 8);
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_slow_import_times_out_without_merging() {
        struct Slow;
        impl IdGenerator for Slow {
            fn next_id(&mut self) -> String {
                std::thread::sleep(Duration::from_millis(300));
                "slow-1".to_string()
            }
        }

        let queue = ImportQueue::with_ids(mapping(), Slow).with_timeout(Duration::from_millis(20));
        let err = queue
            .submit("Mã,Tên\n,Kem\n".as_bytes().to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::Timeout(_)));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_file_leaves_set_untouched() {
        let queue = ImportQueue::new(mapping());
        let err = queue.submit(b"\"Ma,Ten\n".to_vec()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedInput(_)));
        assert!(queue.is_empty().await);
    }
}
