//! Human-readable step rendering and structured step logs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use student::{ActionKind, ScoreMatrix, StepInfo, StudentEnv, StudentSimulation};

/// One JSON-lines entry of the step log.
#[derive(Serialize)]
pub struct StepRecord<'a> {
    #[serde(flatten)]
    pub info: &'a StepInfo,
    pub skills: &'a [f32],
    pub env: String,
}

/// `key=value` pairs of the last action, with 1-based indices.
#[must_use]
pub fn action_line(info: &StepInfo) -> String {
    let mut line = format!(
        "action={};subject={};difficulty={}",
        info.action,
        info.subject + 1,
        info.difficulty + 1
    );
    if let Some(score) = info.test_score {
        line.push_str(&format!(";test_score={score:.2}"));
    }
    if let Some(learning_type) = info.learning_type {
        line.push_str(&format!(";learning_type={}", learning_type + 1));
    }
    if let Some(improvement) = info.improvement {
        line.push_str(&format!(";improvement={improvement:.3}"));
    }
    line.push_str(&format!(";reward={:.3}", info.reward.total()));
    line
}

fn matrix_cell(values: impl Iterator<Item = f32>, precision: usize) -> String {
    let items: Vec<String> = values.map(|v| format!("{v:.precision$}")).collect();
    format!("[{}]", items.join(" "))
}

/// Table of the score layer and every learning type's attributed gain, one
/// row per subject; after a test the per-type train counters are added.
#[must_use]
pub fn score_table(scores: &ScoreMatrix, show_counters: bool) -> String {
    let shape = scores.shape();
    let levels = shape.num_difficulty_levels;
    let mut columns: Vec<(String, Vec<String>)> = Vec::new();

    let rows = |f: &dyn Fn(usize, usize) -> f32, precision: usize| -> Vec<String> {
        (0..shape.num_subjects)
            .map(|s| matrix_cell((0..levels).map(|d| f(s, d)), precision))
            .collect()
    };

    columns.push((
        "Test matrix".to_string(),
        rows(&|s: usize, d: usize| scores.score(s, d), 1),
    ));
    for t in 0..shape.num_learning_types {
        columns.push((
            format!("Learning type number {}", t + 1),
            rows(&|s: usize, d: usize| scores.type_gains(s, d)[t], 3),
        ));
    }
    if show_counters {
        for t in 0..shape.num_learning_types {
            columns.push((
                format!("Train counters {}", t + 1),
                rows(&|s: usize, d: usize| scores.train_counts(s, d)[t], 3),
            ));
        }
    }

    let widths: Vec<usize> = columns
        .iter()
        .map(|(header, cells)| {
            cells.iter().map(String::len).chain([header.len()]).max().unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(shape.num_subjects + 2);
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|((h, _), &w)| format!("{h:<w$}"))
        .collect();
    lines.push(header.join("  "));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(rule.join("  "));
    for s in 0..shape.num_subjects {
        let row: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|((_, cells), &w)| format!("{:<w$}", cells[s]))
            .collect();
        lines.push(row.join("  "));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Full rendering of the last step.
#[must_use]
pub fn render(student: &StudentEnv, info: &StepInfo) -> String {
    let skills: Vec<String> = student.skills().iter().map(|s| format!("{s:.1}")).collect();
    format!(
        "***\nAction: {}\n{}Latent skill level: [{}]\n***",
        action_line(info),
        score_table(student.scores(), info.action == ActionKind::Test),
        skills.join(" ")
    )
}

/// Sink for per-step output: optional console rendering and an optional
/// JSON-lines log file.
pub struct Reporter {
    render: bool,
    log: Option<BufWriter<File>>,
}

impl Reporter {
    pub fn new(render: bool, log_path: Option<&Path>) -> Result<Self> {
        let log = match log_path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create step log {}", path.display()))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self { render, log })
    }

    pub fn record<E: StudentSimulation>(&mut self, env: &E, info: &StepInfo) -> Result<()> {
        if self.render {
            println!("{}", render(env.student(), info));
        }
        if let Some(log) = self.log.as_mut() {
            let record = StepRecord { info, skills: env.student().skills(), env: env.label() };
            serde_json::to_writer(&mut *log, &record)?;
            log.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
        }
        Ok(())
    }
}
