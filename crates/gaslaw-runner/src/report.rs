use std::path::Path;

use crate::runner::ScenarioResult;

/// Everything a run produced, as written to the JSON snapshot.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub seconds: f64,
    pub fps: f64,
    pub results: Vec<ScenarioResult>,
}

/// Save a report as pretty JSON, creating parent directories.
pub fn save_report(path: &Path, report: &RunReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[ScenarioResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scenario | Mode | P (atm) | V (L) | T (K) | n (mol) | Particles | Target | <v²> | 2T | Ticks | Rejected |\n");
    out.push_str("|----------|------|---------|-------|-------|---------|-----------|--------|------|----|-------|----------|\n");

    for r in results {
        let s = &r.final_state;
        out.push_str(&format!(
            "| {} | {} | {:.4} | {:.3} | {:.2} | {:.3} | {} | {} | {:.2} | {:.2} | {} | {} |\n",
            r.scenario_name,
            r.final_mode,
            s.pressure,
            s.volume,
            s.temperature,
            s.moles,
            r.particle_count,
            r.target_count,
            r.mean_sq_speed,
            r.expected_mean_sq_speed,
            r.ticks,
            r.rejected_edits,
        ));
    }

    out
}

/// Names of scenarios whose population or temperature did not settle.
pub fn unsettled(results: &[ScenarioResult]) -> Vec<&str> {
    results
        .iter()
        .filter(|r| !r.settled())
        .map(|r| r.scenario_name.as_str())
        .collect()
}
