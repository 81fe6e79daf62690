//! Rendering of the end-of-run report.
//!
//! The report carries the per-step metrics, the run outcome, the lifecycle
//! event log and the final training tables. It is printed to stdout as
//! pretty JSON or as plain-text tables.

use std::io::Write;

use firmsim_core::collector::StepMetrics;
use firmsim_core::company::CompanyModel;
use firmsim_core::dataset::TrainingData;
use firmsim_core::runner::SimulationResult;
use firmsim_types::LifecycleEvent;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::EngineError;

/// Everything printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Steps attempted.
    pub steps_run: u64,
    /// Messages of steps that failed and were skipped.
    pub failures: Vec<String>,
    /// Aggregate productivity after the last step.
    pub final_productivity: f64,
    /// Per-step metrics.
    pub metrics: &'a [StepMetrics],
    /// Every lifecycle transition of the run.
    pub events: &'a [LifecycleEvent],
    /// Final feature, sensitive and label tables.
    pub training_data: TrainingData,
}

impl<'a> Report<'a> {
    /// Assemble the report from a finished run.
    pub fn new(
        model: &'a CompanyModel,
        result: &SimulationResult,
        training_data: TrainingData,
    ) -> Self {
        Self {
            steps_run: result.steps_run,
            failures: result.failures.iter().map(ToString::to_string).collect(),
            final_productivity: result.final_productivity,
            metrics: model.collector().records(),
            events: model.events(),
            training_data,
        }
    }

    /// Write the report in `format`.
    pub fn write(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), EngineError> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
            OutputFormat::Text => self.write_text(out)?,
        }
        Ok(())
    }

    fn write_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "== Metrics ==")?;
        writeln!(
            out,
            "{:>5} {:>12} {:>9} {:>8} {:>10} {:>6} {:>8} {:>8}",
            "step", "productivity", "employees", "managers", "candidates", "hired", "promoted",
            "departed"
        )?;
        for m in self.metrics {
            writeln!(
                out,
                "{:>5} {:>12.4} {:>9} {:>8} {:>10} {:>6} {:>8} {:>8}",
                m.step,
                m.productivity,
                m.employees,
                m.managers,
                m.candidates_remaining,
                m.hired,
                m.promoted,
                m.departed
            )?;
        }

        if let Some(last) = self.metrics.last() {
            writeln!(out)?;
            writeln!(out, "== Manager composition (step {}) ==", last.step)?;
            for (attribute, counts) in &last.manager_composition {
                let cells: Vec<String> = counts.iter().map(|(v, n)| format!("{v}={n}")).collect();
                writeln!(out, "{attribute}: {}", cells.join(" "))?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "steps run: {}, failures: {}, final productivity: {:.4}, events: {}",
            self.steps_run,
            self.failures.len(),
            self.final_productivity,
            self.events.len()
        )?;
        for failure in &self.failures {
            writeln!(out, "  failed: {failure}")?;
        }

        let data = &self.training_data;
        writeln!(out)?;
        writeln!(out, "== Training data ({} rows) ==", data.rows())?;
        let header: Vec<&str> = data
            .feature_columns
            .iter()
            .chain(&data.sensitive_columns)
            .map(String::as_str)
            .chain(std::iter::once(data.label_column.as_str()))
            .collect();
        writeln!(out, "{}", header.join("\t"))?;
        let rows = data.features.iter().zip(&data.sensitive).zip(&data.labels);
        for ((features, sensitive), label) in rows {
            let cells: Vec<String> = features
                .iter()
                .chain(sensitive)
                .map(ToString::to_string)
                .chain(std::iter::once(format!("{label:.4}")))
                .collect();
            writeln!(out, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use firmsim_agents::{AttritionConfig, FixedOffset};
    use firmsim_core::company::CompanyParams;
    use firmsim_core::dataset::DatasetOptions;
    use firmsim_core::ranker::Ranker;
    use firmsim_core::runner::{NoOpCallback, run_simulation};
    use firmsim_data::{Column, Table, TableDataSource};

    use super::*;

    fn finished_model() -> (CompanyModel, SimulationResult) {
        let table = Table::new(
            vec![
                Column::numeric("skill", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
                Column::categorical(
                    "gender",
                    ["female", "male", "female", "male", "female", "male"]
                        .map(str::to_owned)
                        .to_vec(),
                ),
                Column::numeric("productivity", vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            ],
            "productivity",
        )
        .unwrap();
        let params = CompanyParams {
            n_employees: 2,
            n_managers: 1,
            gap: 1,
            attrition: AttritionConfig {
                employee_leave_probability: 0.0,
                manager_leave_probability: 0.0,
            },
            seed: 1,
        };
        let mut model = CompanyModel::new(
            params,
            &mut TableDataSource::new(table),
            &FixedOffset::default(),
            Ranker::default(),
        )
        .unwrap();
        let result = run_simulation(&mut model, 2, true, &mut NoOpCallback).unwrap();
        (model, result)
    }

    #[test]
    fn text_report_lists_steps_and_rows() {
        let (model, result) = finished_model();
        let data = model.training_data(&DatasetOptions::default()).unwrap();
        let report = Report::new(&model, &result, data);

        let mut out = Vec::new();
        report.write(OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("== Metrics =="));
        assert!(text.contains("== Training data (3 rows) =="));
        assert!(text.contains("skill\tgender\tproductivity"));
        assert!(text.contains("gender: female=1"));
        assert!(text.contains("steps run: 2, failures: 0"));
    }

    #[test]
    fn json_report_is_well_formed() {
        let (model, result) = finished_model();
        let data = model.training_data(&DatasetOptions::default()).unwrap();
        let report = Report::new(&model, &result, data);

        let mut out = Vec::new();
        report.write(OutputFormat::Json, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(parsed["steps_run"], 2);
        assert_eq!(parsed["metrics"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["events"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["events"][0]["kind"], "hired");
        assert_eq!(parsed["training_data"]["labels"].as_array().unwrap().len(), 3);
    }
}
