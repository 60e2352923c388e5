// CLASSIFICATION: COMMUNITY
// Filename: slaunch_collect.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Run the secure-launch collectors named in a policy file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use serde_json::Value;

use cohesix_measure::tpm::{SoftTpm, TpmDevice};
use cohesix_measure::{new_collector, run_pipeline, Collector, TrustAnchor, MEASUREMENT_PCR};

#[derive(Parser)]
#[command(about = "Measure and persist secure-launch evidence")]
struct Cli {
    /// Policy file: one collector record or `{"collectors": [...]}`
    #[arg(long)]
    policy: PathBuf,
    /// TPM character device
    #[arg(long, default_value = "/dev/tpmrm0")]
    tpm: PathBuf,
    /// Extend an in-memory PCR bank instead of a TPM
    #[arg(long)]
    soft_tpm: bool,
}

/// Collector records in policy order.
fn policy_records(policy: &Value) -> anyhow::Result<Vec<Vec<u8>>> {
    let records: Vec<&Value> = match policy.get("collectors") {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(_) => anyhow::bail!("\"collectors\" must be an array"),
        None => vec![policy],
    };
    records
        .into_iter()
        .map(|r| serde_json::to_vec(r).context("re-encoding collector record"))
        .collect()
}

fn load_collectors(path: &Path) -> anyhow::Result<Vec<Box<dyn Collector>>> {
    let raw = fs::read(path).with_context(|| format!("reading policy {}", path.display()))?;
    let policy: Value = serde_json::from_slice(&raw).context("parsing policy")?;
    policy_records(&policy)?
        .iter()
        .map(|record| new_collector(record).context("building collector"))
        .collect()
}

fn run(cli: &Cli, tpm: &mut dyn TrustAnchor) -> anyhow::Result<ExitCode> {
    let collectors = load_collectors(&cli.policy)?;
    info!("running {} collector(s)", collectors.len());
    let outcomes = run_pipeline(&collectors, tpm);

    let mut code = ExitCode::SUCCESS;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            if e.is_fatal() {
                error!("{}: fatal: {}", outcome.kind, e);
                return Ok(ExitCode::from(2));
            }
            code = ExitCode::FAILURE;
        }
    }
    Ok(code)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.soft_tpm {
        let mut tpm = SoftTpm::new();
        let code = run(&cli, &mut tpm)?;
        println!(
            "PCR[{}] = {}",
            MEASUREMENT_PCR,
            hex::encode(tpm.read_pcr(MEASUREMENT_PCR)?)
        );
        return Ok(code);
    }

    let dev = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&cli.tpm)
        .with_context(|| format!("opening {}", cli.tpm.display()))?;
    let mut tpm = TpmDevice::new(dev);
    run(&cli, &mut tpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record_policy() {
        let v: Value = serde_json::json!({"type": "cpuid", "location": "sda:/x"});
        let records = policy_records(&v).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn collector_list_keeps_order() {
        let v: Value = serde_json::json!({"collectors": [
            {"type": "cpuid", "location": "sda:/a"},
            {"type": "cpuid", "location": "sdb:/b"}
        ]});
        let records = policy_records(&v).unwrap();
        let second: Value = serde_json::from_slice(&records[1]).unwrap();
        assert_eq!(second["location"], "sdb:/b");
    }

    #[test]
    fn non_array_collectors_is_rejected() {
        let v: Value = serde_json::json!({"collectors": {"type": "cpuid"}});
        assert!(policy_records(&v).is_err());
    }
}
