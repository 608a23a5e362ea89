//! Tree builders shared by the integration tests.
#![allow(dead_code)]

use std::process::Command;

use throwck::ast::{Module, Node};
use throwck::diagnostics::{DiagnosticKind, Diagnostics};
use throwck::span::Span;
use throwck::types::{BlockType, Type};
use throwck::validate::validate_module;

pub fn throwck() -> Command {
    Command::new(env!("CARGO_BIN_EXE_throwck"))
}

pub fn error_type() -> Type {
    Type::object("Error")
}

/// Signature of a method that may throw `ty`.
pub fn throws(ty: Type) -> BlockType {
    BlockType::new().throwing(ty).returning(Type::object("Nil"))
}

pub fn at(start: usize) -> Span {
    Span::new(start, start + 1)
}

pub fn body(expressions: Vec<Node>) -> Node {
    Node::body(expressions, Span::dummy())
}

pub fn send(name: &str, callee: BlockType, start: usize) -> Node {
    Node::send(name, None, vec![], Some(callee), Span::new(start, start + name.len()))
}

pub fn value(name: &str, ty: Type, start: usize) -> Node {
    Node::identifier(name, None, Span::new(start, start + name.len())).with_type(ty)
}

pub fn throw(value: Node, start: usize) -> Node {
    Node::throw(value, Span::new(start, start + 5))
}

pub fn try_else(expression: Node, else_body: Vec<Node>, start: usize) -> Node {
    let throw_type = error_type();
    Node::try_else(expression, None, body(else_body), Some(throw_type), Span::new(start, start + 3))
}

pub fn method(name: &str, block_type: BlockType, expressions: Vec<Node>) -> Node {
    Node::method(name, vec![], body(expressions), block_type, Span::dummy())
}

pub fn module(expressions: Vec<Node>) -> Module {
    Module::new("main", body(expressions))
}

pub fn check(module: &Module) -> Diagnostics {
    validate_module(module).expect("validation should not fail internally")
}

pub fn kinds(module: &Module) -> Vec<DiagnosticKind> {
    check(module).kinds()
}
