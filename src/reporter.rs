use crate::types::CycleReport;

/// Emit a cycle report as a single JSON line to stdout.
pub fn report_cycle(report: &CycleReport) {
    if let Ok(json) = serde_json::to_string(report) {
        println!("{json}");
    }
}

/// Emit a cycle report as pretty-printed JSON to stdout.
pub fn report_cycle_pretty(report: &CycleReport) {
    if let Ok(json) = serde_json::to_string_pretty(report) {
        println!("{json}");
    }
}
