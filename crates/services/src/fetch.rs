//! # Data Fetch Layer
//!
//! Reads collections through the [`QueryCache`]. A fresh cached copy is served
//! as is; otherwise the backend is asked again. A failed refetch returns the
//! previous copy alongside the error so the screen keeps showing it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domains::{Equipment, MaintenanceBackend, MaintenanceLog, MonitorError, MonitoringReading};
use tracing::warn;

use crate::cache::{Cacheable, QueryCache, QueryKey};
use crate::ranking::{sort_equipment_history, sort_readings};

/// What a view gets back from a read: the best data available and the error
/// of the latest attempt, if it failed.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub data: Option<Arc<Vec<T>>>,
    pub error: Option<MonitorError>,
}

impl<T> QueryResult<T> {
    pub fn empty() -> Self {
        Self {
            data: Some(Arc::new(Vec::new())),
            error: None,
        }
    }

    /// The records, or an empty slice when nothing has ever loaded.
    pub fn records(&self) -> &[T] {
        self.data.as_deref().map(Vec::as_slice).unwrap_or_default()
    }

    /// `None` when nothing has ever loaded for this query.
    pub fn loaded(&self) -> Option<&[T]> {
        self.data.as_deref().map(Vec::as_slice)
    }
}

pub struct FetchLayer {
    backend: Arc<dyn MaintenanceBackend>,
    cache: QueryCache,
}

impl FetchLayer {
    pub fn new(backend: Arc<dyn MaintenanceBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            cache: QueryCache::new(ttl),
        }
    }

    pub fn backend(&self) -> &dyn MaintenanceBackend {
        self.backend.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn equipments(&self) -> QueryResult<Equipment> {
        self.query(QueryKey::Equipments, || self.backend.list_equipments())
            .await
    }

    pub async fn open_logs(&self) -> QueryResult<MaintenanceLog> {
        self.query(QueryKey::OpenLogs, || self.backend.list_open_logs())
            .await
    }

    pub async fn all_logs(&self) -> QueryResult<MaintenanceLog> {
        self.query(QueryKey::AllLogs, || self.backend.list_all_logs())
            .await
    }

    /// Maintenance history of one machine, most recently resolved first.
    pub async fn equipment_logs(&self, serial: &str) -> QueryResult<MaintenanceLog> {
        if serial.is_empty() {
            return QueryResult::empty();
        }
        self.query(QueryKey::EquipmentLogs(serial.to_string()), || async move {
            self.backend
                .equipment_logs(serial)
                .await
                .map(sort_equipment_history)
        })
        .await
    }

    /// Sensor readings of one machine, newest first.
    pub async fn monitoring_readings(&self, serial: &str) -> QueryResult<MonitoringReading> {
        if serial.is_empty() {
            return QueryResult::empty();
        }
        self.query(QueryKey::MonitoringReadings(serial.to_string()), || async move {
            self.backend
                .monitoring_readings(serial)
                .await
                .map(sort_readings)
        })
        .await
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryResult<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = domains::Result<Vec<T>>>,
    {
        let cached = self
            .cache
            .get(&key)
            .and_then(|hit| T::unwrap(hit.value).map(|data| (data, hit.fresh)));

        if let Some((data, true)) = &cached {
            return QueryResult {
                data: Some(Arc::clone(data)),
                error: None,
            };
        }

        let ticket = self.cache.begin_fetch(key);
        match fetch().await {
            Ok(records) => {
                let data = Arc::new(records);
                self.cache.complete(&ticket, T::wrap(Arc::clone(&data)));
                QueryResult {
                    data: Some(data),
                    error: None,
                }
            }
            Err(err) => {
                warn!(key = ?ticket.key(), error = %err, "fetch failed, keeping previous data");
                QueryResult {
                    data: cached.map(|(data, _)| data),
                    error: Some(err),
                }
            }
        }
    }
}
