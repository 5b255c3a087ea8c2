//! Analysis pipeline.
//!
//! Pipeline flow:
//! Spreadsheet → Dataset → two groups → t-test → staged workbook + chart → commit

use crate::artifacts::{ArtifactNames, Clock, Staging, SystemClock};
use crate::models::{AnalysisConfig, Result, RunReport, TestKind};
use crate::report::{ChartData, render_plot, write_workbook};
use crate::source::load_dataset;
use crate::stats::compare;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{debug, info};

/// Steps reported on the progress bar.
const STEPS: u64 = 5;

/// Runs one two-group comparison from a validated configuration.
pub struct Analyzer {
    config: AnalysisConfig,
    clock: Box<dyn Clock>,
    show_progress: bool,
}

impl Analyzer {
    /// Create an analyzer; the configuration is validated up front.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Box::new(SystemClock),
            show_progress: false,
        })
    }

    /// Use `clock` to timestamp the artifacts.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Draw a step bar on stderr while running.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the analysis and write both artifacts.
    ///
    /// K_i: On error no artifact of this run is left in `output_dir`.
    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        let start = Instant::now();
        let pb = self.progress_bar();

        let swept = Staging::recover(&config.output_dir, &config.output_prefix)?;
        if !swept.is_empty() {
            info!(count = swept.len(), "Cleaned up staged files from an interrupted run");
        }

        // Load
        pb.set_message("reading data");
        info!(path = %config.excel_path.display(), "Reading data");
        let dataset = load_dataset(&config.excel_path, config.sheet.as_deref())?;
        pb.inc(1);

        // Select
        pb.set_message("selecting groups");
        let schema = dataset.schema(&config.group_column, &config.value_column)?;
        let names = [config.group1_name.as_str(), config.group2_name.as_str()];
        let [group1, group2] = dataset.select_groups(&schema, names)?;
        debug!(
            group1 = names[0],
            n1 = group1.len(),
            group2 = names[1],
            n2 = group2.len(),
            "Groups selected"
        );
        pb.inc(1);

        // Test
        pb.set_message("running t-test");
        let kind = TestKind::from_equal_var(config.equal_var);
        let (test, descriptive) = compare(
            (names[0], group1.as_slice()),
            (names[1], group2.as_slice()),
            kind,
        )?;
        debug!(
            kind = kind.label(),
            t = test.t_statistic,
            df = test.df,
            p = test.p_value,
            "Test computed"
        );
        pb.inc(1);

        // Write, staged until both artifacts exist
        let artifact_names = ArtifactNames::from_clock(&config.output_prefix, self.clock.as_ref());
        let staging = Staging::begin(&config.output_dir, &artifact_names)?;

        pb.set_message("writing workbook");
        write_workbook(&staging.workbook().staged, &test, &descriptive)?;
        pb.inc(1);

        pb.set_message("rendering plot");
        let chart = ChartData {
            group_column: &config.group_column,
            value_column: &config.value_column,
            groups: [(names[0], group1.as_slice()), (names[1], group2.as_slice())],
            p_value: test.p_value,
        };
        render_plot(&staging.plot().staged, &chart, &config.plot)?;
        pb.inc(1);

        let (workbook_path, plot_path) = staging.commit()?;
        info!(path = %workbook_path.display(), "Results saved");
        info!(path = %plot_path.display(), "Plot saved");

        pb.finish_with_message(format!("done in {:.1}s", start.elapsed().as_secs_f64()));

        Ok(RunReport {
            test,
            descriptive,
            workbook_path,
            plot_path,
        })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(STEPS);
        match ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            Ok(style) => pb.with_style(style.progress_chars("##-")),
            Err(_) => pb,
        }
    }
}
