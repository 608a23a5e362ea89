//! Property-based tests for the throw pass.
//!
//! Trees are generated from a small grammar of sends, throws, tries and nested
//! blocks, then checked against invariants that must hold for any tree.

use proptest::prelude::*;
use throwck::ast::{Module, Node};
use throwck::diagnostics::DiagnosticKind;
use throwck::span::Span;
use throwck::types::{BlockType, Type};
use throwck::validate::validate_module;

fn error() -> Type {
    Type::object("Error")
}

fn arb_throw_type() -> impl Strategy<Value = Option<Type>> {
    prop_oneof![
        Just(None),
        Just(Some(error())),
        Just(Some(Type::optional(error()))),
        Just(Some(Type::object("String"))),
    ]
}

fn arb_block_type() -> impl Strategy<Value = BlockType> {
    arb_throw_type().prop_map(|throws| match throws {
        Some(ty) => BlockType::new().throwing(ty),
        None => BlockType::new(),
    })
}

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        (arb_block_type(), 0usize..1000)
            .prop_map(|(callee, start)| Node::send("call", None, vec![], Some(callee), Span::new(start, start + 4))),
        (arb_block_type(), 0usize..1000)
            .prop_map(|(callee, start)| Node::identifier("name", Some(callee), Span::new(start, start + 4))),
        (prop_oneof![Just(error()), Just(Type::object("String"))], 0usize..1000).prop_map(|(ty, start)| {
            let value = Node::identifier("value", None, Span::new(start + 6, start + 11)).with_type(ty);
            Node::throw(value, Span::new(start, start + 11))
        }),
    ]
}

fn arb_tree() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|exprs| Node::body(exprs, Span::dummy())),
            (inner.clone(), prop::collection::vec(inner.clone(), 0..3)).prop_map(|(expr, recovery)| {
                Node::try_else(expr, None, Node::body(recovery, Span::dummy()), Some(error()), Span::new(0, 3))
            }),
            (arb_block_type(), prop::collection::vec(inner.clone(), 0..4)).prop_map(|(block_type, exprs)| {
                Node::method("m", vec![], Node::body(exprs, Span::dummy()), block_type, Span::dummy())
            }),
            (arb_block_type(), prop::collection::vec(inner, 0..4)).prop_map(|(block_type, exprs)| {
                Node::block(vec![], Node::body(exprs, Span::dummy()), block_type, Span::dummy())
            }),
        ]
    })
}

fn arb_module() -> impl Strategy<Value = Module> {
    prop::collection::vec(arb_tree(), 0..4)
        .prop_map(|exprs| Module::new("generated", Node::body(exprs, Span::dummy())))
}

fn missing_try_count(module: &Module) -> usize {
    validate_module(module)
        .unwrap()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::MissingTry)
        .count()
}

fn in_method(block_type: BlockType, expressions: Vec<Node>) -> Module {
    let method = Node::method("m", vec![], Node::body(expressions, Span::dummy()), block_type, Span::dummy());
    Module::new("generated", Node::body(vec![method], Span::dummy()))
}

proptest! {
    /// Property: validation is deterministic and leaves the tree untouched
    #[test]
    fn validation_is_idempotent(module in arb_module()) {
        let before = module.clone();
        let first = validate_module(&module).unwrap();
        let second = validate_module(&module).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(module, before);
    }

    /// Property: optional throw types never require a try
    #[test]
    fn optional_throws_never_need_try(depth in 0usize..4, identifier in any::<bool>()) {
        let callee = BlockType::new().throwing(Type::optional(error()));
        let mut node = if identifier {
            Node::identifier("risky", Some(callee), Span::new(0, 5))
        } else {
            Node::send("risky", None, vec![], Some(callee), Span::new(0, 5))
        };
        for _ in 0..depth {
            node = Node::try_else(node, None, Node::body(vec![], Span::dummy()), Some(error()), Span::dummy());
        }

        prop_assert_eq!(missing_try_count(&in_method(BlockType::new(), vec![node])), 0);
    }

    /// Property: unprotected calls to mandatory throwers are always reported, once each
    #[test]
    fn unprotected_mandatory_throws_are_reported(count in 1usize..8, declared in arb_block_type()) {
        let callee = BlockType::new().throwing(error());
        let calls = (0..count)
            .map(|i| Node::send("risky", None, vec![], Some(callee.clone()), Span::new(i * 10, i * 10 + 5)))
            .collect();

        prop_assert_eq!(missing_try_count(&in_method(declared, calls)), count);
    }

    /// Property: a throw in a block without a throw type is always reported
    #[test]
    fn throws_without_declaration_are_reported(top_level in any::<bool>()) {
        let value = Node::identifier("e", None, Span::new(6, 7)).with_type(error());
        let throw = Node::throw(value, Span::new(0, 7));
        let (module, expected) = if top_level {
            (Module::new("generated", Node::body(vec![throw], Span::dummy())), DiagnosticKind::ThrowAtTopLevel)
        } else {
            (in_method(BlockType::new(), vec![throw]), DiagnosticKind::ThrowWithoutThrowDefined)
        };

        prop_assert_eq!(validate_module(&module).unwrap().kinds(), vec![expected]);
    }

    /// Property: mismatched throws are type errors regardless of try nesting
    #[test]
    fn mismatched_throws_are_type_errors(depth in 0usize..4) {
        let value = Node::identifier("s", None, Span::new(6, 7)).with_type(Type::object("String"));
        let mut node = Node::throw(value, Span::new(0, 7));
        for _ in 0..depth {
            let recovery = Node::body(vec![Node::identifier("x", None, Span::dummy())], Span::dummy());
            node = Node::try_else(node, None, recovery, Some(error()), Span::dummy());
        }

        let kinds = validate_module(&in_method(BlockType::new().throwing(error()), vec![node])).unwrap().kinds();
        prop_assert_eq!(kinds, vec![DiagnosticKind::TypeError]);
    }

    /// Property: every reported diagnostic comes from a node in the tree, and the
    /// count never exceeds the number of sends, throws and tries
    #[test]
    fn diagnostics_are_bounded_by_tree_size(module in arb_module()) {
        let diagnostics = validate_module(&module).unwrap();
        prop_assert!(diagnostics.len() <= 2 * count_checked_nodes(&module.body));
    }
}

fn count_checked_nodes(node: &Node) -> usize {
    use throwck::ast::NodeKind;

    match &node.kind {
        NodeKind::Body { expressions } => expressions.iter().map(count_checked_nodes).sum(),
        NodeKind::Method { body, .. } | NodeKind::Block { body, .. } => count_checked_nodes(body),
        NodeKind::Send { .. } | NodeKind::Identifier { .. } => 1,
        NodeKind::Throw { value } => 1 + count_checked_nodes(value),
        NodeKind::Try { expression, else_body, .. } => {
            1 + count_checked_nodes(expression) + count_checked_nodes(else_body)
        }
        _ => 0,
    }
}
