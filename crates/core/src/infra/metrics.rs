use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::error::ErrorCode;

const LATENCY_CAP: usize = 1000;

/// ローカルメトリクス収集器
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    rewrites_issued: u64,
    rewrites_applied: u64,
    rewrites_discarded: u64,
    rewrites_skipped: u64,
    copies: u64,
    errors_network: u64,
    errors_timeout: u64,
    errors_malformed: u64,
    errors_clipboard: u64,
    errors_other: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub tone: String,
    pub duration_ms: u64,
    pub ok: bool,
    pub timestamp: String,
}

/// メトリクスサマリー（レンダラーに返す用）
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub rewrites_issued: u64,
    pub rewrites_applied: u64,
    pub rewrites_discarded: u64,
    pub rewrites_skipped: u64,
    pub copies: u64,
    pub error_counts: ErrorCounts,
    pub avg_latency_ms: Option<f64>,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCounts {
    pub network: u64,
    pub timeout: u64,
    pub malformed: u64,
    pub clipboard: u64,
    pub other: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_rewrites_issued(&self) {
        self.counters.lock().rewrites_issued += 1;
    }

    pub fn inc_rewrites_applied(&self) {
        self.counters.lock().rewrites_applied += 1;
    }

    pub fn inc_rewrites_discarded(&self) {
        self.counters.lock().rewrites_discarded += 1;
    }

    pub fn inc_rewrites_skipped(&self) {
        self.counters.lock().rewrites_skipped += 1;
    }

    pub fn inc_copies(&self) {
        self.counters.lock().copies += 1;
    }

    pub fn inc_error(&self, code: ErrorCode) {
        let mut c = self.counters.lock();
        match code {
            ErrorCode::Network => c.errors_network += 1,
            ErrorCode::Timeout => c.errors_timeout += 1,
            ErrorCode::MalformedResponse => c.errors_malformed += 1,
            ErrorCode::Clipboard => c.errors_clipboard += 1,
            ErrorCode::Rewrite => c.errors_other += 1,
        }
    }

    pub fn record_latency(&self, tone: &str, duration_ms: u64, ok: bool) {
        let record = LatencyRecord {
            tone: tone.to_string(),
            duration_ms,
            ok,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        if latencies.len() > LATENCY_CAP {
            let excess = latencies.len() - LATENCY_CAP;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        let ok: Vec<f64> = latencies
            .iter()
            .filter(|r| r.ok)
            .map(|r| r.duration_ms as f64)
            .collect();
        let avg_latency_ms = if ok.is_empty() {
            None
        } else {
            Some(ok.iter().sum::<f64>() / ok.len() as f64)
        };

        let recent: Vec<LatencyRecord> = latencies.iter().rev().take(20).cloned().collect();

        MetricsSummary {
            rewrites_issued: c.rewrites_issued,
            rewrites_applied: c.rewrites_applied,
            rewrites_discarded: c.rewrites_discarded,
            rewrites_skipped: c.rewrites_skipped,
            copies: c.copies,
            error_counts: ErrorCounts {
                network: c.errors_network,
                timeout: c.errors_timeout,
                malformed: c.errors_malformed,
                clipboard: c.errors_clipboard,
                other: c.errors_other,
            },
            avg_latency_ms,
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
