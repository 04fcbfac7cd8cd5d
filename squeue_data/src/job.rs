use derive_more::derive::{Deref, Display, Into};
use serde::Deserialize;

use crate::error::ParseError;

/// Slurm job id as reported by `squeue`. Expected positive and unique
/// within a snapshot, but neither is enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deref, Display, Into, Deserialize)]
pub struct JobId(pub u64);

/// One running or queued job, decoded from `squeue --json`.
///
/// Which sub-objects squeue emits depends on the job state: a pending job
/// carries no `job_resources` yet. Every field therefore defaults to its
/// zero value instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub account: String,
    pub job_id: JobId,
    pub name: String,
    #[serde(rename = "job_resources")]
    pub resources: Option<JobResources>,
    #[serde(rename = "job_state")]
    pub state: Vec<String>,
    /// Assigned node names, possibly a compact range expression
    /// (`node[01-04]`). Opaque to us.
    pub nodes: String,
    pub partition: String,
    pub group_id: u64,
    pub group_name: String,
    pub user_id: u64,
    pub user_name: String,
}

/// Resources granted to a started job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobResources {
    pub cpus: u64,
    pub nodes: AllocatedNodes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AllocatedNodes {
    pub allocation: Vec<NodeAllocation>,
}

/// One entry in a job's per-node allocation list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeAllocation {
    pub memory: AllocatedMemory,
}

/// Memory amount in whatever unit squeue reports. Never rescaled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AllocatedMemory {
    pub allocated: u64,
}

/// The decoded result of one `squeue --json` invocation. Built fresh per
/// fetch and discarded after projection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueSnapshot {
    pub jobs: Vec<JobRecord>,
}

impl QueueSnapshot {
    /// Decode raw squeue output. Unknown fields are ignored, absent fields
    /// become zero values; only malformed JSON is an error.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(raw)?)
    }
}

/// Per-job totals derived from the allocation list. Recomputed on every
/// scrape, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatedJobMetrics {
    pub job_id: JobId,
    pub memory_allocated: u64,
}

impl JobRecord {
    /// Requested CPU count, 0 while the job has no resources yet.
    pub fn cpus(&self) -> u64 {
        self.resources.as_ref().map_or(0, |r| r.cpus)
    }

    /// Sum allocated memory over all node allocations. An empty allocation
    /// list (or a job without resources) totals 0.
    pub fn aggregate(&self) -> AggregatedJobMetrics {
        let memory_allocated: u64 = self
            .resources
            .iter()
            .flat_map(|r| &r.nodes.allocation)
            .map(|node| node.memory.allocated)
            .sum();
        AggregatedJobMetrics {
            job_id: self.job_id,
            memory_allocated,
        }
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(memory: u64) -> NodeAllocation {
        NodeAllocation {
            memory: AllocatedMemory { allocated: memory },
        }
    }

    #[test]
    fn QueueSnapshot__parse__full_job() {
        let raw = br#"{
            "jobs": [{
                "account": "grpA",
                "job_id": 42,
                "name": "run1",
                "job_resources": {
                    "cpus": 4,
                    "nodes": {"allocation": [{"memory": {"allocated": 1024}}]}
                },
                "job_state": ["RUNNING"],
                "nodes": "node01",
                "partition": "gpu",
                "group_id": 10,
                "group_name": "grpA",
                "user_id": 99,
                "user_name": "alice"
            }]
        }"#;
        let snapshot = QueueSnapshot::parse(raw).unwrap();
        assert_eq!(snapshot.jobs.len(), 1);
        let job = &snapshot.jobs[0];
        assert_eq!(job.account, "grpA");
        assert_eq!(job.job_id, JobId(42));
        assert_eq!(job.name, "run1");
        assert_eq!(job.cpus(), 4);
        assert_eq!(job.state, vec!["RUNNING"]);
        assert_eq!(job.nodes, "node01");
        assert_eq!(job.partition, "gpu");
        assert_eq!(job.group_id, 10);
        assert_eq!(job.group_name, "grpA");
        assert_eq!(job.user_id, 99);
        assert_eq!(job.user_name, "alice");
        assert_eq!(job.aggregate().memory_allocated, 1024);
    }

    #[test]
    fn QueueSnapshot__parse__missing_job_resources() {
        let raw = br#"{"jobs": [{"job_id": 7, "name": "pending", "job_state": ["PENDING"]}]}"#;
        let snapshot = QueueSnapshot::parse(raw).unwrap();
        let job = &snapshot.jobs[0];
        assert_eq!(job.job_id, JobId(7));
        assert!(job.resources.is_none());
        assert_eq!(job.cpus(), 0);
        assert_eq!(job.aggregate().memory_allocated, 0);
    }

    #[test]
    fn QueueSnapshot__parse__empty_object_is_empty_snapshot() {
        let snapshot = QueueSnapshot::parse(b"{}").unwrap();
        assert!(snapshot.jobs.is_empty());
    }

    #[test]
    fn QueueSnapshot__parse__unknown_fields_ignored() {
        let raw = br#"{
            "meta": {"slurm_version": "23.02"},
            "jobs": [{"job_id": 1, "tres_req_str": "cpu=4,mem=8G"}]
        }"#;
        let snapshot = QueueSnapshot::parse(raw).unwrap();
        assert_eq!(snapshot.jobs[0].job_id, JobId(1));
    }

    #[test]
    fn QueueSnapshot__parse__preserves_job_order() {
        let raw = br#"{"jobs": [{"job_id": 3}, {"job_id": 1}, {"job_id": 2}]}"#;
        let snapshot = QueueSnapshot::parse(raw).unwrap();
        let ids: Vec<u64> = snapshot.jobs.iter().map(|job| job.job_id.0).collect();
        assert_eq!(ids, [3, 1, 2]);
    }

    #[test]
    fn QueueSnapshot__parse__malformed_payload() {
        assert!(QueueSnapshot::parse(b"{\"jobs\": [").is_err());
        assert!(QueueSnapshot::parse(b"squeue: command error").is_err());
    }

    #[test]
    fn JobRecord__aggregate__sums_node_allocations() {
        let job = JobRecord {
            job_id: JobId(42),
            resources: Some(JobResources {
                cpus: 4,
                nodes: AllocatedNodes {
                    allocation: vec![allocation(5), allocation(7), allocation(3)],
                },
            }),
            ..Default::default()
        };
        let totals = job.aggregate();
        assert_eq!(totals.job_id, JobId(42));
        assert_eq!(totals.memory_allocated, 15);
    }

    #[test]
    fn JobRecord__aggregate__empty_allocation_list_is_zero() {
        let job = JobRecord {
            resources: Some(JobResources::default()),
            ..Default::default()
        };
        assert_eq!(job.aggregate().memory_allocated, 0);
    }

    #[test]
    fn JobRecord__aggregate__no_resources_is_zero() {
        assert_eq!(JobRecord::default().aggregate().memory_allocated, 0);
    }
}
