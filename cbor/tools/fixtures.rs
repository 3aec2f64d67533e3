/*!
Fixtures command - write the built-in conformance cases as JSON fixture files
*/

use super::cases::{self, Group};
use anyhow::{Context, bail};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tessera_cbor::fixture::Record;
use tracing::{error, info};

/// File collecting every success record.
const ALL_SUCCESS: &str = "TestDecodeSuccess";

/// File collecting every error record.
const ALL_ERRORS: &str = "TestDecodeError";

/// Write conformance fixture files
#[derive(Parser, Debug)]
#[command(about = "Write the built-in decoder conformance cases as JSON fixtures", long_about = None)]
pub struct Command {
    /// Output directory, created if missing
    #[arg(short = 'o', long, default_value = ".")]
    output: PathBuf,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let files = build()?;

        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create {}", self.output.display()))?;
        for (name, records) in &files {
            let path = self.output.join(format!("{name}.json"));
            let text = serde_json::to_string_pretty(records)?;
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(records = records.len(), "Wrote {}", path.display());
        }
        println!("Wrote {} fixture files to {}", files.len(), self.output.display());
        Ok(())
    }
}

/// Checks every built-in case and lays out the fixture files: one per group,
/// then the collected success and error files.
fn build() -> anyhow::Result<Vec<(String, Vec<Record>)>> {
    let mut files = Vec::new();
    let mut failed = 0;

    let mut all = Vec::new();
    for Group { name, cases } in cases::success_groups() {
        let records: Vec<Record> = cases.iter().map(|case| case.record()).collect();
        for (case, record) in cases.iter().zip(&records) {
            if let Err(e) = record.verify() {
                error!(description = %case.description, "Built-in case does not hold: {e}");
                failed += 1;
            }
        }
        all.extend(records.iter().cloned());
        files.push((name.to_string(), records));
    }
    files.push((ALL_SUCCESS.to_string(), all));

    let mut all = Vec::new();
    for Group { name, cases } in cases::error_groups() {
        for case in &cases {
            if let Err(e) = case.check() {
                error!(description = %case.description, "Built-in case does not hold: {e}");
                failed += 1;
            }
        }
        let records: Vec<Record> = cases.iter().map(|case| case.record()).collect();
        all.extend(records.iter().cloned());
        files.push((name.to_string(), records));
    }
    files.push((ALL_ERRORS.to_string(), all));

    if failed > 0 {
        bail!("{failed} built-in case(s) do not hold, refusing to write fixtures");
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let files = build().unwrap();
        let names: Vec<_> = files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names.first(), Some(&"TestDecode_Atomic"));
        assert!(names.contains(&"TestDecodeError_InvalidMap"));
        assert!(names.contains(&ALL_SUCCESS));
        assert_eq!(names.last(), Some(&ALL_ERRORS));

        let count = |name: &str| {
            files
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, records)| records.len())
                .unwrap()
        };
        let success: usize = files
            .iter()
            .filter(|(n, _)| n.starts_with("TestDecode_"))
            .map(|(_, records)| records.len())
            .sum();
        let errors: usize = files
            .iter()
            .filter(|(n, _)| n.starts_with("TestDecodeError_"))
            .map(|(_, records)| records.len())
            .sum();
        assert_eq!(count(ALL_SUCCESS), success);
        assert_eq!(count(ALL_ERRORS), errors);
    }

    #[test]
    fn records_are_shaped_by_kind() {
        let files = build().unwrap();
        for (name, records) in &files {
            let errors = name.starts_with(ALL_ERRORS);
            for record in records {
                assert_eq!(matches!(record, Record::Error(_)), errors, "{name}");
            }
        }
    }

    #[test]
    fn json_shape() {
        let files = build().unwrap();
        let (_, atomic) = &files[0];
        let json = serde_json::to_value(&atomic[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "description": "atomic - uint/0/min",
                "input": "00",
                "expect": {"uint": 0}
            })
        );
    }
}
