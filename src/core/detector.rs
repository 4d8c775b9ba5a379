//! Outage window detection from the benchmark's TPS time series
//!
//! Every benchmark run produces an XML result document whose single
//! namespace-qualified `TPSReadings` leaf holds a flat comma-separated,
//! comma-terminated list of alternating `epoch_millis, tps` integers. A
//! trimmed document looks like:
//!
//! ```xml
//! <?xml version = '1.0' encoding = 'UTF-8'?>
//! <Results xmlns="http://www.dominicgiles.com/swingbench">
//!    <BenchmarkMetrics>
//!       <TPSReadings>1658003925819, 0,1658003926819, 0,...,1658005424067, 122,</TPSReadings>
//!    </BenchmarkMetrics>
//! </Results>
//! ```
//!
//! The run moves through well-defined states: initial ramp-up (TPS all zero),
//! full ramp-up (TPS steady), fault injection (TPS back to zero, outage
//! starts) and recovery (TPS back above threshold, outage ends). Detection is
//! a single forward pass over the samples.
//!
//! Known limitations, preserved deliberately: recovery is declared at the
//! first sample with TPS above 100 and the scan stops there, so a transient
//! spike above 100 during an outage reads as recovery; likewise nothing past
//! the first recovery sample is inspected.

use chrono::{DateTime, Local, TimeZone};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::info;

use crate::error::{HarnessError, HarnessResult, OutagePhase};

/// XML namespace qualifying the benchmark result document.
pub const RESULTS_NAMESPACE: &str = "http://www.dominicgiles.com/swingbench";

/// Leaf element carrying the TPS time series.
pub const TPS_READINGS_TAG: &str = "TPSReadings";

/// TPS above this value after an outage marks recovery.
const RECOVERY_TPS_THRESHOLD: i64 = 100;

/// One sample of the benchmark's transactions-per-second series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpsSample {
    pub timestamp_ms: i64,
    pub tps: i64,
}

/// The detected disruption interval, immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutageWindow {
    pub workload_start_ms: i64,
    pub outage_start_ms: i64,
    pub outage_end_ms: i64,
    pub duration_seconds: f64,
}

impl OutageWindow {
    pub fn workload_start_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.workload_start_ms).single()
    }

    pub fn outage_start_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.outage_start_ms).single()
    }

    pub fn outage_end_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.outage_end_ms).single()
    }
}

/// Extract the TPS time series from a benchmark result document.
///
/// Fails with a `Parse` error if the `TPSReadings` leaf is absent, its text
/// does not carry the mandatory trailing comma, or any token is not an
/// integer.
pub fn extract_tps_series(xml: &str) -> HarnessResult<Vec<TpsSample>> {
    let text = tps_readings_text(xml)?;

    // The series always ends with a trailing comma; its absence means the
    // document was truncated mid-write.
    let trimmed = text.trim();
    let csv = trimmed
        .strip_suffix(',')
        .ok_or_else(|| HarnessError::parse("TPSReadings text has no trailing separator"))?;

    let values = csv
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .map_err(|_| HarnessError::parse(format!("non-integer TPS token: {token:?}")))
        })
        .collect::<HarnessResult<Vec<i64>>>()?;

    if values.len() % 2 != 0 {
        return Err(HarnessError::parse(format!(
            "TPSReadings holds {} values, expected timestamp/tps pairs",
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| TpsSample {
            timestamp_ms: pair[0],
            tps: pair[1],
        })
        .collect())
}

/// Pull the text content of the namespace-qualified `TPSReadings` leaf.
fn tps_readings_text(xml: &str) -> HarnessResult<String> {
    let mut reader = NsReader::from_str(xml);
    let mut inside = false;
    let mut text: Option<String> = None;

    loop {
        let (resolve, event) = reader
            .read_resolved_event()
            .map_err(|e| HarnessError::parse(format!("invalid result document: {e}")))?;

        match (resolve, event) {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(start))
                if ns == RESULTS_NAMESPACE.as_bytes()
                    && start.local_name().as_ref() == TPS_READINGS_TAG.as_bytes() =>
            {
                inside = true;
            }
            (_, Event::Text(t)) if inside => {
                let chunk = t
                    .unescape()
                    .map_err(|e| HarnessError::parse(format!("invalid result document: {e}")))?;
                text.get_or_insert_with(String::new).push_str(&chunk);
            }
            (_, Event::End(end)) if inside && end.local_name().as_ref() == TPS_READINGS_TAG.as_bytes() => {
                inside = false;
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    text.ok_or_else(|| HarnessError::parse("result document has no TPSReadings element"))
}

/// Scan the sample sequence and compute the outage window.
///
/// State machine over one forward pass:
/// ramp-up (tps == 0) → active (first tps != 0 records workload start) →
/// outage (first tps == 0 afterwards records outage start) → recovered
/// (first tps > 100 records outage end and stops the scan).
///
/// A series that never reaches one of the phases fails with
/// `InsufficientData` naming that phase; a zero-valued window is never
/// returned.
pub fn detect(samples: &[TpsSample]) -> HarnessResult<OutageWindow> {
    let mut workload_start: Option<i64> = None;
    let mut outage_start: Option<i64> = None;
    let mut outage_end: Option<i64> = None;

    for sample in samples {
        if sample.tps != 0 && workload_start.is_none() && outage_start.is_none() {
            workload_start = Some(sample.timestamp_ms);
        } else if sample.tps == 0 && workload_start.is_some() && outage_start.is_none() {
            outage_start = Some(sample.timestamp_ms);
        } else if sample.tps > RECOVERY_TPS_THRESHOLD
            && workload_start.is_some()
            && outage_start.is_some()
        {
            outage_end = Some(sample.timestamp_ms);
            // Non-zero TPS continues to the end of the run; the first
            // recovery sample bounds the scan.
            break;
        }
    }

    let workload_start_ms = workload_start.ok_or(HarnessError::InsufficientData {
        phase: OutagePhase::WorkloadStart,
    })?;
    let outage_start_ms = outage_start.ok_or(HarnessError::InsufficientData {
        phase: OutagePhase::OutageStart,
    })?;
    let outage_end_ms = outage_end.ok_or(HarnessError::InsufficientData {
        phase: OutagePhase::Recovery,
    })?;

    let window = OutageWindow {
        workload_start_ms,
        outage_start_ms,
        outage_end_ms,
        duration_seconds: (outage_end_ms - outage_start_ms) as f64 / 1000.0,
    };

    info!(
        workload_start_ms = window.workload_start_ms,
        outage_start_ms = window.outage_start_ms,
        outage_end_ms = window.outage_end_ms,
        duration_seconds = window.duration_seconds,
        "📉 Outage window detected"
    );

    Ok(window)
}

/// Read a benchmark result file and compute its outage window.
pub async fn detect_from_file(path: &std::path::Path) -> HarnessResult<OutageWindow> {
    let xml = tokio::fs::read_to_string(path).await?;
    let samples = extract_tps_series(&xml)?;
    detect(&samples)
}
