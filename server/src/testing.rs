//! Substitute stores and request helpers for router tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, http::StatusCode};
use entity::Employee;
use http_body_util::BodyExt;
use platform_db::{DbError, DbResult, EmployeeStore, NewEmployee};
use platform_obs::MetricsRegistry;
use sea_orm::{DbErr, RuntimeErr};
use serde_json::Value;
use tower::ServiceExt;

use crate::{config::AppConfig, http::AppState};

/// Keeps rows in memory and hands out ids like a sequence would.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Employee>>,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Employee>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn create(&self, employee: NewEmployee) -> DbResult<Employee> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let row = Employee {
            id,
            name: employee.name,
            role: employee.role,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DbResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

fn db_error() -> DbError {
    DbError::Query(DbErr::Conn(RuntimeErr::Internal(
        "connection refused".into(),
    )))
}

/// Fails every call the way an unreachable database would.
pub struct FailingStore;

#[async_trait]
impl EmployeeStore for FailingStore {
    async fn list(&self) -> DbResult<Vec<Employee>> {
        Err(db_error())
    }

    async fn create(&self, _employee: NewEmployee) -> DbResult<Employee> {
        Err(db_error())
    }

    async fn delete(&self, _id: i32) -> DbResult<bool> {
        Err(db_error())
    }

    async fn ping(&self) -> DbResult<()> {
        Err(db_error())
    }
}

pub fn state_with(store: Arc<dyn EmployeeStore>) -> AppState {
    AppState {
        store,
        metrics: MetricsRegistry::new().unwrap(),
        config: Arc::new(AppConfig::from_lookup(|_| None).unwrap()),
    }
}

/// Sends one request and returns the status with the body parsed as JSON,
/// or as a JSON string when the body is not JSON.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
