pub mod span;
pub mod diagnostics;
pub mod types;
pub mod ast;
pub mod validate;
pub mod config;
pub mod driver;

use diagnostics::CompileError;
use driver::ModuleReport;
use std::path::Path;

/// Load typed trees from `files` and run the throw pass over each of them.
pub fn check_files(files: &[impl AsRef<Path>], jobs: usize) -> Result<Vec<ModuleReport>, CompileError> {
    let modules = files
        .iter()
        .map(|f| driver::load_module(f.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    driver::check_modules(&modules, jobs)
}
