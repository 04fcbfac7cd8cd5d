use std::process::Command;

use color_eyre::Result;
use squeue_data::QueueSnapshot;

fn are_we_on_slurm_machine() -> bool {
    let success = Command::new("which")
        .arg("squeue")
        .output()
        .expect("error while executing `which`")
        .status
        .success();
    if !success {
        eprintln!("No slurm found, SKIPPING");
    }
    success
}

#[test]
fn query_live_job_queue() -> Result<()> {
    if !are_we_on_slurm_machine() {
        return Ok(());
    }
    // look if querying and decoding can happen without an error
    // if so, just print out the result, since we have no way to actually validate the data
    let snapshot = QueueSnapshot::query()?;
    println!("{n} jobs listed: {snapshot:?}", n = snapshot.jobs.len());
    Ok(())
}
