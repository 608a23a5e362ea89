//! Passes that check an already type-checked tree without changing it.

mod throw;

pub use throw::ThrowValidator;

use crate::ast::Module;
use crate::diagnostics::{CompileError, Diagnostics};

/// Run the throw pass over a module with a fresh sink.
pub fn validate_module(module: &Module) -> Result<Diagnostics, CompileError> {
    let mut diagnostics = Diagnostics::new();
    ThrowValidator::new(module, &mut diagnostics).run(&module.body)?;
    Ok(diagnostics)
}
