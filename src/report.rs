use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::audio::analysis::AnalysisParams;
use crate::audio::features::{AnalysisReport, Detection};

/// One-line verdict.
pub fn summary(report: &AnalysisReport) -> String {
    match report.change_time() {
        Some(time) => format!("Sudden change detected at ~{:.2} seconds.", time),
        None => "No sudden change found above the threshold.".to_string(),
    }
}

/// Smoothed flux as `frame<TAB>seconds<TAB>value` lines.
pub fn flux_table(report: &AnalysisReport) -> String {
    let mut out = String::from("frame\ttime_s\tflux\n");
    for (frame, value) in report.smoothed_flux.iter().enumerate() {
        let _ = writeln!(out, "{}\t{:.3}\t{:.6}", frame, report.frame_time(frame), value);
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a Path,
    duration: f64,
    params: &'a AnalysisParams,
    sample_rate: u32,
    frame_count: usize,
    bin_count: usize,
    #[serde(flatten)]
    detection: &'a Detection,
    #[serde(skip_serializing_if = "Option::is_none")]
    smoothed_flux: Option<&'a [f64]>,
}

pub fn to_json(
    input: &Path,
    duration: f64,
    params: &AnalysisParams,
    report: &AnalysisReport,
    include_flux: bool,
) -> Result<String> {
    let doc = JsonReport {
        input,
        duration,
        params,
        sample_rate: report.sample_rate,
        frame_count: report.frame_count,
        bin_count: report.bin_count,
        detection: &report.detection,
        smoothed_flux: include_flux.then_some(report.smoothed_flux.as_slice()),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
