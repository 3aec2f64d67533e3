/*!
Verify command - run JSON fixture files against the decoder
*/

use super::io::Input;
use anyhow::{Context, bail};
use clap::Parser;
use tessera_cbor::fixture::Record;
use tracing::debug;

/// Check fixture files against the decoder
#[derive(Parser, Debug)]
#[command(about = "Run JSON fixture files against the decoder", long_about = None)]
pub struct Command {
    /// Fixture files (use '-' for stdin)
    #[arg(required = true)]
    inputs: Vec<Input>,
}

/// Outcome of checking a batch of records.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    passed: usize,
    failed: Vec<String>,
}

impl Summary {
    fn check(&mut self, records: &[Record]) {
        for record in records {
            match record.verify() {
                Ok(()) => self.passed += 1,
                Err(e) => self.failed.push(format!("{}: {e}", record.description())),
            }
        }
    }
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let mut summary = Summary::default();
        for input in &self.inputs {
            let text = input
                .read_to_string()
                .with_context(|| format!("Failed to read {input}"))?;
            let records: Vec<Record> = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse fixtures in {input}"))?;
            debug!(records = records.len(), "Checking {input}");
            summary.check(&records);
        }

        for failure in &summary.failed {
            println!("FAIL {failure}");
        }
        println!(
            "{} passed, {} failed",
            summary.passed,
            summary.failed.len()
        );

        if !summary.failed.is_empty() {
            bail!("{} fixture record(s) failed", summary.failed.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary() {
        let records: Vec<Record> = serde_json::from_str(
            r#"[
                {"description": "ok", "input": "20", "expect": {"negint": 0}},
                {"description": "wrong", "input": "01", "expect": {"uint": 2}},
                {"description": "fails", "input": "18"},
                {"description": "decodes", "input": "f6"}
            ]"#,
        )
        .unwrap();

        let mut summary = Summary::default();
        summary.check(&records);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed.len(), 2);
        assert!(summary.failed[0].starts_with("wrong: "));
        assert!(summary.failed[1].starts_with("decodes: "));
    }
}
