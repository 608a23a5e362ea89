//! Loading typed trees from disk, checking them and reporting the results.

use std::path::{Path, PathBuf};

use crossbeam_channel::unbounded;
use serde::Serialize;
use tracing::{debug, info};

use crate::ast::Module;
use crate::config::OutputFormat;
use crate::diagnostics::{self, CompileError, Diagnostic, Diagnostics};
use crate::span::Span;
use crate::validate::validate_module;

/// The diagnostics produced for one module.
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub module: String,
    pub source: Option<PathBuf>,
    pub diagnostics: Diagnostics,
}

impl ModuleReport {
    fn new(module: &Module, diagnostics: Diagnostics) -> Self {
        Self { module: module.name.clone(), source: module.source.clone(), diagnostics }
    }
}

/// Read a type-checked module serialized as JSON.
pub fn load_module(path: &Path) -> Result<Module, CompileError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CompileError::io(format!("could not read file: {e}"), path.to_path_buf()))?;
    let mut module: Module = serde_json::from_str(&content)
        .map_err(|e| CompileError::tree(e.to_string(), path.to_path_buf()))?;

    // Relative source paths are relative to the tree file.
    if let (Some(source), Some(dir)) = (&module.source, path.parent()) {
        if source.is_relative() {
            module.source = Some(dir.join(source));
        }
    }
    Ok(module)
}

/// Check every module with its own validator.
///
/// With more than one job the modules are spread over worker threads. Reports
/// come back in the order of `modules` regardless of which worker finished first.
pub fn check_modules(modules: &[Module], jobs: usize) -> Result<Vec<ModuleReport>, CompileError> {
    let workers = jobs.min(modules.len());
    if workers <= 1 {
        return modules
            .iter()
            .map(|module| validate_module(module).map(|d| ModuleReport::new(module, d)))
            .collect();
    }

    info!(modules = modules.len(), workers, "checking modules in parallel");

    let (job_tx, job_rx) = unbounded::<(usize, &Module)>();
    let (result_tx, result_rx) = unbounded();

    for job in modules.iter().enumerate() {
        job_tx
            .send(job)
            .map_err(|_| CompileError::internal("module queue closed early", Span::dummy()))?;
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, module) in job_rx.iter() {
                    debug!(worker, module = %module.name, "checking module");
                    let result = validate_module(module).map(|d| ModuleReport::new(module, d));
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<ModuleReport>> = vec![None; modules.len()];
    for (index, result) in result_rx.iter() {
        slots[index] = Some(result?);
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| CompileError::internal("a module was never checked", Span::dummy()))
        })
        .collect()
}

pub fn error_count(reports: &[ModuleReport]) -> usize {
    reports.iter().map(|r| r.diagnostics.len()).sum()
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    module: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a Path>,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

/// One JSON object per line, per diagnostic.
pub fn json_lines(reports: &[ModuleReport]) -> Result<Vec<String>, CompileError> {
    let mut lines = Vec::new();
    for report in reports {
        for diagnostic in &report.diagnostics {
            let record = JsonDiagnostic {
                module: &report.module,
                file: report.source.as_deref(),
                diagnostic,
            };
            let line = serde_json::to_string(&record)
                .map_err(|e| CompileError::internal(e.to_string(), diagnostic.span))?;
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Print all diagnostics in the requested format and return how many there were.
pub fn emit_reports(reports: &[ModuleReport], format: OutputFormat) -> Result<usize, CompileError> {
    match format {
        OutputFormat::Json => {
            for line in json_lines(reports)? {
                println!("{line}");
            }
        }
        OutputFormat::Human => {
            for report in reports {
                emit_human(report)?;
            }
            let count = error_count(reports);
            if count > 0 {
                eprintln!("error: {count} throw error(s) found in {} module(s)", reports.len());
            }
        }
    }
    Ok(error_count(reports))
}

fn emit_human(report: &ModuleReport) -> Result<(), CompileError> {
    if report.diagnostics.is_empty() {
        return Ok(());
    }

    let source = report.source.as_deref().and_then(|path| std::fs::read_to_string(path).ok());
    let origin = report
        .source
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| report.module.clone());

    for diagnostic in &report.diagnostics {
        diagnostics::render_diagnostic(&origin, source.as_deref(), diagnostic)
            .map_err(|e| CompileError::io(e.to_string(), PathBuf::from(&origin)))?;
    }
    Ok(())
}
