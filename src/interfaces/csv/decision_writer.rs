use crate::application::router::ScanDecision;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct DecisionRow<'a> {
    code: &'a str,
    category: &'static str,
    rule: &'static str,
    merchant_id: &'a str,
    method: &'static str,
    action: &'static str,
    target: Option<&'a str>,
    payee: Option<String>,
}

impl<'a> From<&'a ScanDecision> for DecisionRow<'a> {
    fn from(decision: &'a ScanDecision) -> Self {
        let merchant = &decision.resolution.merchant;
        Self {
            code: &decision.code,
            category: decision.classification.category.as_str(),
            rule: decision.classification.rule.as_str(),
            merchant_id: &merchant.id,
            method: decision.resolution.method.as_str(),
            action: decision.action.kind(),
            target: decision.action.target(),
            payee: merchant.payee_address(),
        }
    }
}

/// Writes routing decisions as CSV, one row per scan.
pub struct DecisionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DecisionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, decision: &ScanDecision) -> Result<()> {
        self.writer.serialize(DecisionRow::from(decision))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
