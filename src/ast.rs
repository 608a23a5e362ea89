//! The typed syntax tree handed over by the type checker.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::types::{BlockType, Type};

/// A type-checked module ready for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// The file the module was parsed from, used when rendering diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Signature of the module's top-level body.
    #[serde(default)]
    pub body_type: BlockType,
    pub body: Node,
}

impl Module {
    pub fn new(name: impl Into<String>, body: Node) -> Self {
        Self { name: name.into(), source: None, body_type: BlockType::new(), body }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_body_type(mut self, body_type: BlockType) -> Self {
        self.body_type = body_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// The node's own static type, where the type checker assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    Block {
        #[serde(default)]
        arguments: Vec<Node>,
        body: Box<Node>,
        block_type: BlockType,
    },
    Body {
        #[serde(default)]
        expressions: Vec<Node>,
    },
    DefineVariable {
        name: String,
        value: Box<Node>,
    },
    DefineArgument {
        name: String,
        #[serde(default)]
        default: Option<Box<Node>>,
    },
    KeywordArgument {
        name: String,
        value: Box<Node>,
    },
    Method {
        name: String,
        #[serde(default)]
        arguments: Vec<Node>,
        body: Box<Node>,
        block_type: BlockType,
    },
    Object {
        name: String,
        body: Box<Node>,
        block_type: BlockType,
    },
    Trait {
        name: String,
        body: Box<Node>,
        block_type: BlockType,
    },
    TraitImplementation {
        trait_name: String,
        object_name: String,
        body: Box<Node>,
        block_type: BlockType,
    },
    RawInstruction {
        name: String,
        #[serde(default)]
        arguments: Vec<Node>,
    },
    ReassignVariable {
        name: String,
        value: Box<Node>,
    },
    Return {
        #[serde(default)]
        value: Option<Box<Node>>,
    },
    Send {
        name: String,
        #[serde(default)]
        receiver: Option<Box<Node>>,
        #[serde(default)]
        arguments: Vec<Node>,
        /// Signature of the method being sent to, if known statically.
        #[serde(default)]
        block_type: Option<BlockType>,
    },
    Identifier {
        name: String,
        /// Signature of the referenced method, when the identifier is a call.
        #[serde(default)]
        block_type: Option<BlockType>,
    },
    Throw {
        value: Box<Node>,
    },
    Try {
        expression: Box<Node>,
        #[serde(default)]
        else_argument: Option<String>,
        else_body: Box<Node>,
        /// The type the protected expression may throw.
        #[serde(default)]
        throw_type: Option<Type>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span, ty: None }
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// True for a body without any expressions.
    pub fn is_empty(&self) -> bool {
        matches!(&self.kind, NodeKind::Body { expressions } if expressions.is_empty())
    }

    pub fn body(expressions: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::Body { expressions }, span)
    }

    pub fn block(arguments: Vec<Node>, body: Node, block_type: BlockType, span: Span) -> Self {
        let ty = Type::Block(block_type.clone());
        Self::new(NodeKind::Block { arguments, body: Box::new(body), block_type }, span).with_type(ty)
    }

    pub fn method(
        name: impl Into<String>,
        arguments: Vec<Node>,
        body: Node,
        block_type: BlockType,
        span: Span,
    ) -> Self {
        let ty = Type::Block(block_type.clone());
        Self::new(
            NodeKind::Method { name: name.into(), arguments, body: Box::new(body), block_type },
            span,
        )
        .with_type(ty)
    }

    pub fn object(name: impl Into<String>, body: Node, block_type: BlockType, span: Span) -> Self {
        Self::new(NodeKind::Object { name: name.into(), body: Box::new(body), block_type }, span)
    }

    pub fn trait_definition(
        name: impl Into<String>,
        body: Node,
        block_type: BlockType,
        span: Span,
    ) -> Self {
        Self::new(NodeKind::Trait { name: name.into(), body: Box::new(body), block_type }, span)
    }

    pub fn trait_implementation(
        trait_name: impl Into<String>,
        object_name: impl Into<String>,
        body: Node,
        block_type: BlockType,
        span: Span,
    ) -> Self {
        Self::new(
            NodeKind::TraitImplementation {
                trait_name: trait_name.into(),
                object_name: object_name.into(),
                body: Box::new(body),
                block_type,
            },
            span,
        )
    }

    pub fn define_variable(name: impl Into<String>, value: Node, span: Span) -> Self {
        let ty = value.ty.clone();
        Self { kind: NodeKind::DefineVariable { name: name.into(), value: Box::new(value) }, span, ty }
    }

    pub fn define_argument(name: impl Into<String>, default: Option<Node>, span: Span) -> Self {
        Self::new(
            NodeKind::DefineArgument { name: name.into(), default: default.map(Box::new) },
            span,
        )
    }

    pub fn keyword_argument(name: impl Into<String>, value: Node, span: Span) -> Self {
        let ty = value.ty.clone();
        Self { kind: NodeKind::KeywordArgument { name: name.into(), value: Box::new(value) }, span, ty }
    }

    pub fn raw_instruction(name: impl Into<String>, arguments: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::RawInstruction { name: name.into(), arguments }, span)
    }

    pub fn reassign_variable(name: impl Into<String>, value: Node, span: Span) -> Self {
        let ty = value.ty.clone();
        Self { kind: NodeKind::ReassignVariable { name: name.into(), value: Box::new(value) }, span, ty }
    }

    pub fn return_value(value: Option<Node>, span: Span) -> Self {
        Self::new(NodeKind::Return { value: value.map(Box::new) }, span)
    }

    /// A message send. The result type is taken from the callee's return type.
    pub fn send(
        name: impl Into<String>,
        receiver: Option<Node>,
        arguments: Vec<Node>,
        block_type: Option<BlockType>,
        span: Span,
    ) -> Self {
        let ty = block_type.as_ref().and_then(|b| b.returns().cloned());
        Self {
            kind: NodeKind::Send {
                name: name.into(),
                receiver: receiver.map(Box::new),
                arguments,
                block_type,
            },
            span,
            ty,
        }
    }

    pub fn identifier(name: impl Into<String>, block_type: Option<BlockType>, span: Span) -> Self {
        let ty = block_type.as_ref().and_then(|b| b.returns().cloned());
        Self { kind: NodeKind::Identifier { name: name.into(), block_type }, span, ty }
    }

    pub fn throw(value: Node, span: Span) -> Self {
        Self::new(NodeKind::Throw { value: Box::new(value) }, span)
    }

    pub fn try_else(
        expression: Node,
        else_argument: Option<String>,
        else_body: Node,
        throw_type: Option<Type>,
        span: Span,
    ) -> Self {
        let ty = expression.ty.clone();
        Self {
            kind: NodeKind::Try {
                expression: Box::new(expression),
                else_argument,
                else_body: Box::new(else_body),
                throw_type,
            },
            span,
            ty,
        }
    }
}
