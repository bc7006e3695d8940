use std::io::{self, Write};

use serde::Serialize;

use crate::report::GenerationReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Json,
    Text,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &GenerationReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_report(report: &GenerationReport) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "{} language file(s) cached, {} failed",
            report.succeeded_count(),
            report.failed_count()
        )?;
        for failure in &report.failed {
            let language = failure.language.as_deref().unwrap_or("*");
            writeln!(
                stdout,
                "  FAILED {} {}/{}: {}",
                failure.domain, failure.subject, language, failure.reason
            )?;
        }
        Ok(())
    }
}

pub fn print_report(mode: OutputMode, report: &GenerationReport) -> io::Result<()> {
    match mode {
        OutputMode::Json => JsonOutput::print_report(report),
        OutputMode::Text => TextOutput::print_report(report),
    }
}
