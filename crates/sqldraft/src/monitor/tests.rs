use super::*;
use crate::error::DraftError;
use std::sync::Mutex;

// ── Recording client for tests ──

#[derive(Default)]
struct RecordingClient {
    seen: Mutex<Vec<(String, usize)>>,
    fail: bool,
}

impl RecordingClient {
    fn record(&self, sql: &str, params: &[Value]) -> DraftResult<()> {
        self.seen
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
        if self.fail {
            Err(DraftError::query("boom"))
        } else {
            Ok(())
        }
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[Value]) -> DraftResult<Vec<Row>> {
        self.record(sql, params)?;
        Ok(vec![Row::new().with("id", 1)])
    }
    async fn execute(&self, sql: &str, params: &[Value]) -> DraftResult<u64> {
        self.record(sql, params)?;
        Ok(3)
    }
    async fn insert(&self, sql: &str, params: &[Value]) -> DraftResult<Option<i64>> {
        self.record(sql, params)?;
        Ok(Some(42))
    }
}

#[test]
fn test_query_type_detection() {
    assert_eq!(
        QueryType::from_sql("SELECT * FROM `user` u"),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("  -- note\n select 1"),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("INSERT IGNORE INTO `user` (`name`) VALUES (?)"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("/* x */ UPDATE `user` SET `name` = ?"),
        QueryType::Update
    );
    assert_eq!(
        QueryType::from_sql("DELETE FROM `user`"),
        QueryType::Delete
    );
    assert_eq!(QueryType::from_sql("DESCRIBE `user`"), QueryType::Other);
    assert_eq!(QueryType::from_sql("SELECTED"), QueryType::Other);
}

#[test]
fn test_truncate_respects_char_boundary() {
    assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
    assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
    // 'é' is two bytes; cutting in the middle backs off.
    assert_eq!(truncate_sql_bytes("aé", 2), "a");
}

#[test]
fn test_slow_threshold() {
    let config = MonitorConfig::new().with_slow_query_threshold(Duration::from_millis(10));
    assert!(config.is_slow(Duration::from_millis(11)));
    assert!(!config.is_slow(Duration::from_millis(10)));
    assert!(!MonitorConfig::new().is_slow(Duration::from_secs(60)));
}

#[tokio::test]
async fn test_tracing_client_passes_through() {
    let client = TracingClient::new(RecordingClient::default())
        .with_config(MonitorConfig::new().level(Level::INFO).no_truncate());

    let rows = client.query("SELECT 1", &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
    let first = client.query_opt("SELECT 2", &[Value::Int(1)]).await.unwrap();
    assert!(first.is_some());
    assert_eq!(client.execute("DELETE FROM t", &[]).await.unwrap(), 3);
    assert_eq!(client.insert("INSERT INTO t", &[]).await.unwrap(), Some(42));

    let seen = client.inner().seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("SELECT 1".to_string(), 0),
            ("SELECT 2".to_string(), 1),
            ("DELETE FROM t".to_string(), 0),
            ("INSERT INTO t".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn test_tracing_client_propagates_errors() {
    let client = TracingClient::new(RecordingClient {
        fail: true,
        ..Default::default()
    });
    let err = client.execute("UPDATE t SET a = ?", &[Value::Int(1)]).await;
    assert!(matches!(err, Err(DraftError::Query(_))));
}
