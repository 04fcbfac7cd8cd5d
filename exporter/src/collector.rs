use std::collections::HashMap;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use squeue_data::{AggregatedJobMetrics, JobRecord, QueueSnapshot};
use tracing::error;

pub const METRIC_NAME: &str = "slurm_jobs";
pub const METRIC_HELP: &str = "Description of running Slurm jobs";

/// Label schema of the `slurm_jobs` gauge. Length and order are fixed for
/// the process lifetime; every sample carries all twelve values.
pub const JOB_LABELS: [&str; 12] = [
    "account",
    "job_id",
    "name",
    "cpus",
    "memory",
    "state",
    "nodes",
    "partition",
    "group_id",
    "group_name",
    "user_id",
    "user_name",
];

/// Render one job as its label vector, in [`JOB_LABELS`] order.
///
/// Integer fields go through their decimal `Display` form. A partially
/// filled record still yields all twelve values (zero/empty defaults); a
/// job is never skipped over missing data.
pub fn project(job: &JobRecord, totals: &AggregatedJobMetrics) -> [String; 12] {
    [
        job.account.clone(),
        job.job_id.to_string(),
        job.name.clone(),
        job.cpus().to_string(),
        totals.memory_allocated.to_string(),
        format!("[{}]", job.state.join(" ")),
        job.nodes.clone(),
        job.partition.clone(),
        job.group_id.to_string(),
        job.group_name.clone(),
        job.user_id.to_string(),
        job.user_name.clone(),
    ]
}

/// All label vectors of a snapshot, one per job, in the order squeue
/// listed them.
pub fn samples(snapshot: &QueueSnapshot) -> Vec<[String; 12]> {
    snapshot
        .jobs
        .iter()
        .map(|job| project(job, &job.aggregate()))
        .collect()
}

fn families_for(snapshot: &QueueSnapshot) -> Result<Vec<MetricFamily>, prometheus::Error> {
    let jobs = GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &JOB_LABELS)?;
    for values in samples(snapshot) {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        jobs.with_label_values(&values).set(1.0);
    }
    Ok(jobs.collect())
}

/// Queries the live Slurm job queue on every scrape and exposes one
/// `slurm_jobs` gauge per listed job, value fixed at 1.0 (presence
/// indicator; the labels carry the data).
#[derive(Debug)]
pub struct JobsCollector {
    desc: Desc,
}

impl JobsCollector {
    pub fn new() -> Result<Self, prometheus::Error> {
        let desc = Desc::new(
            METRIC_NAME.to_owned(),
            METRIC_HELP.to_owned(),
            JOB_LABELS.iter().map(|&label| label.to_owned()).collect(),
            HashMap::new(),
        )?;
        Ok(Self { desc })
    }
}

impl Collector for JobsCollector {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    /// One full fetch → decode → project pipeline per call. A broken
    /// squeue integration takes the whole exporter down instead of
    /// degrading into an empty metric set.
    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = match QueueSnapshot::query() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("querying job queue: {e}");
                std::process::exit(1);
            }
        };
        match families_for(&snapshot) {
            Ok(families) => families,
            Err(e) => {
                error!("building slurm_jobs family: {e}");
                std::process::exit(1);
            }
        }
    }
}
