//! Report rendering.
use std::fmt::Write;

use anyhow::Result;
use runtime::{BatchReport, Summary};

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Full report as pretty-printed JSON
    Json,
}

pub fn render(report: &BatchReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(report.to_json()?),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn line(out: &mut String, label: &str, s: &Summary) {
    let _ = writeln!(
        out,
        "{label:<12} mean {:>12.2}  min {:>12.2}  max {:>12.2}  sd {:>10.2}",
        s.mean, s.min, s.max, s.std_dev
    );
}

fn render_text(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} iterations, base seed {})",
        report.scenario, report.iterations, report.base_seed
    );
    line(&mut out, "dps", &report.dps);
    line(&mut out, "damage", &report.damage);
    line(&mut out, "duration (s)", &report.duration);
    line(&mut out, "particles", &report.particles);
    for (i, s) in report.per_char_damage.iter().enumerate() {
        line(&mut out, &format!("char {i} dmg"), s);
    }
    for (i, s) in report.per_char_energy.iter().enumerate() {
        line(&mut out, &format!("char {i} energy"), s);
    }
    out
}
