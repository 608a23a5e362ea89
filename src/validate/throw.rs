use tracing::debug;

use crate::ast::{Module, Node, NodeKind};
use crate::diagnostics::{CompileError, DiagnosticSink};
use crate::span::Span;
use crate::types::{BlockType, Type, TypeQuery};

/// What the nearest enclosing block allows to be thrown.
#[derive(Debug, Clone, Copy)]
struct ThrowContext<'a> {
    throws: Option<&'a Type>,
    /// Set only for the module's own top-level body.
    top_level: bool,
}

impl<'a> ThrowContext<'a> {
    fn module(module: &'a Module) -> Self {
        Self { throws: module.body_type.throws(), top_level: true }
    }

    fn block(block_type: &'a BlockType) -> Self {
        Self { throws: block_type.throws(), top_level: false }
    }
}

/// Verifies that every error a module may throw is either handled by a `try`
/// or propagated through a block that declares it.
///
/// A validator checks exactly one module: `run` consumes it.
pub struct ThrowValidator<'m, 'd, S: DiagnosticSink> {
    module: &'m Module,
    diagnostics: &'d mut S,
    try_nesting: usize,
}

impl<'m, 'd, S: DiagnosticSink> ThrowValidator<'m, 'd, S> {
    pub fn new(module: &'m Module, diagnostics: &'d mut S) -> Self {
        Self { module, diagnostics, try_nesting: 0 }
    }

    /// Walk the tree, reporting every violation. The tree is returned as is.
    pub fn run<'t>(mut self, ast: &'t Node) -> Result<Vec<&'t Node>, CompileError> {
        debug!(module = %self.module.name, "validating throws");

        let context = ThrowContext::module(self.module);
        self.process_node(ast, context)?;

        Ok(vec![ast])
    }

    fn process_nodes<'a>(
        &mut self,
        nodes: &'a [Node],
        context: ThrowContext<'a>,
    ) -> Result<(), CompileError> {
        for node in nodes {
            self.process_node(node, context)?;
        }
        Ok(())
    }

    fn process_node<'a>(
        &mut self,
        node: &'a Node,
        context: ThrowContext<'a>,
    ) -> Result<(), CompileError> {
        match &node.kind {
            NodeKind::Block { arguments, body, block_type }
            | NodeKind::Method { arguments, body, block_type, .. } => {
                let inner = ThrowContext::block(block_type);
                self.process_nodes(arguments, inner)?;
                self.process_node(body, inner)
            }
            NodeKind::Object { body, block_type, .. }
            | NodeKind::Trait { body, block_type, .. }
            | NodeKind::TraitImplementation { body, block_type, .. } => {
                self.process_node(body, ThrowContext::block(block_type))
            }
            NodeKind::Body { expressions } => self.process_nodes(expressions, context),
            NodeKind::DefineVariable { value, .. }
            | NodeKind::KeywordArgument { value, .. }
            | NodeKind::ReassignVariable { value, .. } => self.process_node(value, context),
            NodeKind::DefineArgument { default: value, .. } | NodeKind::Return { value } => {
                match value {
                    Some(value) => self.process_node(value, context),
                    None => Ok(()),
                }
            }
            NodeKind::RawInstruction { arguments, .. } => self.process_nodes(arguments, context),
            NodeKind::Send { receiver, arguments, block_type, .. } => {
                self.error_for_missing_try(block_type.as_ref(), node.span);

                if let Some(receiver) = receiver {
                    self.process_node(receiver, context)?;
                }
                self.process_nodes(arguments, context)
            }
            NodeKind::Identifier { block_type, .. } => {
                self.error_for_missing_try(block_type.as_ref(), node.span);
                Ok(())
            }
            NodeKind::Throw { value } => self.on_throw(node, value, context),
            NodeKind::Try { expression, else_body, throw_type, .. } => {
                self.on_try(node, expression, else_body, throw_type.as_ref(), context)
            }
        }
    }

    fn on_throw<'a>(
        &mut self,
        node: &'a Node,
        value: &'a Node,
        context: ThrowContext<'a>,
    ) -> Result<(), CompileError> {
        self.process_node(value, context)?;

        // Inside a try with nothing declared, the thrown type is never looked at.
        if context.throws.is_none() && self.in_try() {
            return Ok(());
        }

        let thrown = value
            .ty
            .as_ref()
            .ok_or_else(|| CompileError::internal("thrown value has no type", value.span))?;

        if let Some(expected) = context.throws {
            if !thrown.type_compatible(expected) {
                self.diagnostics.type_error(expected, thrown, node.span);
            }
        }

        if self.in_try() {
            return Ok(());
        }

        if context.top_level && context.throws.is_none() {
            self.diagnostics.throw_at_top_level_error(thrown, node.span);
        } else {
            self.error_for_undefined_throw(thrown, context, node.span);
        }
        Ok(())
    }

    fn on_try<'a>(
        &mut self,
        node: &'a Node,
        expression: &'a Node,
        else_body: &'a Node,
        throw_type: Option<&'a Type>,
        context: ThrowContext<'a>,
    ) -> Result<(), CompileError> {
        self.try_nesting += 1;
        self.process_node(expression, context)?;
        self.process_node(else_body, context)?;
        self.try_nesting -= 1;

        if !else_body.is_empty() {
            return Ok(());
        }

        // Without an else the error propagates to the enclosing block.
        let throw_type = throw_type
            .ok_or_else(|| CompileError::internal("try expression has no throw type", node.span))?;

        if context.top_level {
            self.diagnostics.throw_at_top_level_error(throw_type, node.span);
        } else {
            self.error_for_undefined_throw(throw_type, context, node.span);
        }
        Ok(())
    }

    fn error_for_missing_try(&mut self, block_type: Option<&BlockType>, span: Span) {
        let Some(throw_type) = block_type.and_then(BlockType::throws) else {
            return;
        };

        if throw_type.is_optional() || self.in_try() {
            return;
        }

        self.diagnostics.missing_try_error(throw_type, span);
    }

    fn error_for_undefined_throw(&mut self, throw_type: &Type, context: ThrowContext<'_>, span: Span) {
        if context.throws.is_some() {
            return;
        }

        self.diagnostics.throw_without_throw_defined_error(throw_type, span);
    }

    fn in_try(&self) -> bool {
        self.try_nesting > 0
    }
}
