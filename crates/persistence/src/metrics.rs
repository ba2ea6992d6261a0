//! Database metrics collection.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Count a failed query.
pub fn record_query_error(query_name: &str) {
    counter!(
        "database_query_errors_total",
        "query" => query_name.to_string()
    )
    .increment(1);
}

/// Times a database operation and records it on completion.
///
/// ```ignore
/// let timer = QueryTimer::new("list_email_settings");
/// let result = sqlx::query_as::<_, EmailSettingEntity>(...).fetch_all(&pool).await;
/// timer.finish(&result)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, plus an error count if the query failed,
    /// and hands the result back.
    pub fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
        if result.is_err() {
            record_query_error(self.query_name);
        }
        result
    }
}
