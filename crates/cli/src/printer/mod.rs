use std::{
    io::{self, Write},
    path::Path,
    time::Duration,
};

use sttree_fs::FileRecord;
use sttree_indexer::IndexSource;
use sttree_preview::PreviewPlan;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Static context about one index run.
#[derive(Debug)]
pub struct IndexPrintContext<'a> {
    pub root: &'a Path,
    pub total: usize,
    pub source: IndexSource,
    pub elapsed: Duration,
}

fn source_label(source: IndexSource) -> &'static str {
    match source {
        IndexSource::Cache => "cache",
        IndexSource::Scan => "scan",
    }
}

/// Output sink for the `index` and `preview` commands.
///
/// Results go to `out`; summaries and notices go to `err` so that `out`
/// stays pipeable.
pub trait Printer {
    fn print_record(&mut self, record: &FileRecord) -> io::Result<()>;

    /// Called once after all records are printed.
    fn finish_index(&mut self, ctx: &IndexPrintContext) -> io::Result<()>;

    fn print_plan(&mut self, plan: &PreviewPlan) -> io::Result<()>;

    fn print_unavailable(&mut self, path: &str, extension: Option<&str>) -> io::Result<()>;

    fn print_failed(&mut self, path: &str, message: &str) -> io::Result<()>;
}

pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }
}

/// Printer on stdout/stderr for the requested format.
pub fn make_printer(format: OutputFormat) -> Box<dyn Printer> {
    match format {
        OutputFormat::Human => Box::new(HumanPrinter::new(io::stdout(), io::stderr())),
        OutputFormat::Json => Box::new(JsonPrinter::new(io::stdout(), io::stderr())),
    }
}

impl<W: Write, E: Write> Printer for HumanPrinter<W, E> {
    fn print_record(&mut self, record: &FileRecord) -> io::Result<()> {
        if record.is_placeholder() {
            writeln!(self.out, "{:>12}  {}", "-", record.path)
        } else {
            writeln!(self.out, "{:>12}  {}", record.size, record.path)
        }
    }

    fn finish_index(&mut self, ctx: &IndexPrintContext) -> io::Result<()> {
        writeln!(
            self.err,
            "\n[index] {} records under {} from {} in {:.2}ms",
            ctx.total,
            ctx.root.display(),
            source_label(ctx.source),
            ctx.elapsed.as_secs_f64() * 1000.0,
        )
    }

    fn print_plan(&mut self, plan: &PreviewPlan) -> io::Result<()> {
        let capability = plan
            .capability
            .map(|c| c.as_str())
            .unwrap_or("none");

        writeln!(self.out, "path:       {}", plan.record.path)?;
        writeln!(self.out, "capability: {capability}")?;
        if let Some(mime) = &plan.mime {
            writeln!(self.out, "mime:       {mime}")?;
        }
        writeln!(self.out, "local:      {}", plan.local_path.display())?;
        if let Some(url) = &plan.remote_url {
            writeln!(self.out, "remote:     {url}")?;
        }
        writeln!(
            self.out,
            "raw text:   {}",
            if plan.raw_text { "yes" } else { "no" }
        )
    }

    fn print_unavailable(&mut self, path: &str, extension: Option<&str>) -> io::Result<()> {
        match extension {
            Some(ext) => writeln!(self.err, "[preview] no viewer for {path} (.{ext})"),
            None => writeln!(self.err, "[preview] no viewer for {path}"),
        }
    }

    fn print_failed(&mut self, path: &str, message: &str) -> io::Result<()> {
        writeln!(self.err, "[preview] {path}: {message}")
    }
}

impl<W: Write, E: Write> Printer for JsonPrinter<W, E> {
    fn print_record(&mut self, record: &FileRecord) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")
    }

    fn finish_index(&mut self, ctx: &IndexPrintContext) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "summary",
            "root": ctx.root.display().to_string(),
            "total": ctx.total,
            "source": source_label(ctx.source),
            "elapsed_ms": ctx.elapsed.as_secs_f64() * 1000.0,
        });
        writeln!(self.err, "{obj}")
    }

    fn print_plan(&mut self, plan: &PreviewPlan) -> io::Result<()> {
        let line = serde_json::to_string(plan).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")
    }

    fn print_unavailable(&mut self, path: &str, extension: Option<&str>) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "unavailable",
            "path": path,
            "extension": extension,
        });
        writeln!(self.out, "{obj}")
    }

    fn print_failed(&mut self, path: &str, message: &str) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "failed",
            "path": path,
            "message": message,
        });
        writeln!(self.out, "{obj}")
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
