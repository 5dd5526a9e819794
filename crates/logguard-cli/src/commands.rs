//! Subcommand implementations

use anyhow::{Context, Result};
use logguard_classifiers::{HybridClassifier, LogGuardConfig};
use logguard_core::ClassificationResult;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

/// One output record in `--json` mode
#[derive(Debug, Serialize)]
struct ClassifiedLine<'a> {
    input: &'a str,
    label: &'a str,
    method: String,
}

impl<'a> ClassifiedLine<'a> {
    fn new(input: &'a str, result: &ClassificationResult) -> Self {
        Self {
            input,
            label: result.label_str(),
            method: result.method_string(),
        }
    }
}

/// Classify arguments, or stdin lines when there are none
pub fn classify(config: &LogGuardConfig, texts: &[String], json: bool, rules_only: bool) -> Result<()> {
    let classifier = build_classifier(config, rules_only)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if texts.is_empty() {
        info!("Reading log lines from stdin");
        classify_lines(io::stdin().lock(), &mut out, &classifier, json)?;
    } else {
        for text in texts {
            write_result(&mut out, &classifier, text, json)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Print the rule table in precedence order
pub fn rules(config: &LogGuardConfig) -> Result<()> {
    let rules = config.rules.build().context("Failed to build rule table")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, rule) in rules.rules().iter().enumerate() {
        let name = rule.name.as_deref().unwrap_or("-");
        writeln!(out, "{:>3}  {:<20}  {:<16}  {}", index, rule.label.as_str(), name, rule.pattern)?;
    }
    writeln!(out, "{} rules", rules.len())?;
    Ok(())
}

/// Acquire the scorer and report its state
pub fn status(config: &LogGuardConfig) -> Result<()> {
    let classifier = HybridClassifier::from_config(config).context("Failed to build classifier")?;
    let status = classifier.warm_up();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Rules:  {}", classifier.rules().len())?;
    writeln!(out, "Scorer: {}", status)?;
    Ok(())
}

fn build_classifier(config: &LogGuardConfig, rules_only: bool) -> Result<HybridClassifier> {
    if rules_only {
        let rules = config.rules.build().context("Failed to build rule table")?;
        return Ok(HybridClassifier::rules_only(Arc::new(rules)));
    }
    HybridClassifier::from_config(config).context("Failed to build classifier")
}

/// Classify each line of `reader`; invalid UTF-8 is replaced rather than
/// ending the stream.
fn classify_lines(
    mut reader: impl BufRead,
    out: &mut impl Write,
    classifier: &HybridClassifier,
    json: bool,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).context("Failed to read stdin")?;
        if read == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf);
        write_result(out, classifier, &line, json)?;
    }
}

fn write_result(
    out: &mut impl Write,
    classifier: &HybridClassifier,
    text: &str,
    json: bool,
) -> Result<()> {
    let result = classifier.classify(text);
    if json {
        let record = ClassifiedLine::new(text, &result);
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
    } else {
        writeln!(out, "{}\t{}\t{}", result.label, result.method, text)?;
    }
    Ok(())
}
