//! The slice of the type system the throw pass relies on.
//!
//! Types are produced by the type checker and attached to tree nodes before any
//! validation runs. This module only answers questions about them: how they are
//! named, whether one may stand in for another, and how they change when type
//! parameters get bound.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod optional;

pub use optional::Optional;

/// Type parameter bindings, keyed by parameter name.
pub type TypeArguments = BTreeMap<String, Type>;

/// Queries every type value answers.
///
/// Implemented by `Type` itself and by the `Optional` wrapper. No method has a
/// default body, so every new query must be spelled out for the wrapper too.
pub trait TypeQuery {
    fn type_name(&self) -> String;

    /// Whether a value of this type may be used where `other` is expected.
    fn type_compatible(&self, other: &Type) -> bool;

    fn is_generic_type(&self) -> bool;
    fn is_type_parameter(&self) -> bool;
    fn is_block(&self) -> bool;
    fn is_regular_object(&self) -> bool;
    fn is_trait(&self) -> bool;
    fn is_optional(&self) -> bool;

    /// Substitute bound type parameters.
    fn resolve_type(&self, arguments: &TypeArguments) -> Type;

    /// Instantiate a generic object with the given bindings.
    fn initialize_as(&self, arguments: &TypeArguments) -> Type;

    fn as_block(&self) -> Option<&BlockType>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Object(ObjectType),
    Trait(TraitType),
    Block(BlockType),
    TypeParameter(TypeParameter),
    GenericInstance(GenericInstance),
    Optional(Optional),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implemented_traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_traits: Vec<String>,
}

/// A generic object with its type parameters bound, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericInstance {
    pub object: ObjectType,
    pub arguments: Vec<Type>,
}

/// The signature of a closure, lambda or method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockType {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Box<Type>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throws: Option<Box<Type>>,
}

impl Type {
    pub fn object(name: impl Into<String>) -> Self {
        Type::Object(ObjectType::new(name))
    }

    pub fn trait_named(name: impl Into<String>) -> Self {
        Type::Trait(TraitType { name: name.into(), required_traits: Vec::new() })
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Type::TypeParameter(TypeParameter { name: name.into(), required_traits: Vec::new() })
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Optional::new(inner))
    }

    /// Whether this type meets every requirement of `param`.
    fn satisfies(&self, param: &TypeParameter) -> bool {
        match self {
            Type::TypeParameter(own) => {
                own.name == param.name
                    || param.required_traits.iter().all(|t| own.required_traits.contains(t))
            }
            _ => param
                .required_traits
                .iter()
                .all(|t| self.type_compatible(&Type::trait_named(t.clone()))),
        }
    }
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), implemented_traits: Vec::new(), type_parameters: Vec::new() }
    }

    pub fn implementing(mut self, trait_name: impl Into<String>) -> Self {
        self.implemented_traits.push(trait_name.into());
        self
    }

    pub fn with_type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    pub fn implements(&self, trait_name: &str) -> bool {
        self.implemented_traits.iter().any(|t| t == trait_name)
    }
}

impl BlockType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_argument(mut self, ty: Type) -> Self {
        self.arguments.push(ty);
        self
    }

    pub fn returning(mut self, ty: Type) -> Self {
        self.returns = Some(Box::new(ty));
        self
    }

    pub fn throwing(mut self, ty: Type) -> Self {
        self.throws = Some(Box::new(ty));
        self
    }

    /// The declared throw type, if the block may throw at all.
    pub fn throws(&self) -> Option<&Type> {
        self.throws.as_deref()
    }

    pub fn returns(&self) -> Option<&Type> {
        self.returns.as_deref()
    }

    fn block_compatible(&self, other: &BlockType) -> bool {
        if self.arguments.len() != other.arguments.len() {
            return false;
        }

        // Arguments are contravariant.
        let arguments = self
            .arguments
            .iter()
            .zip(&other.arguments)
            .all(|(ours, theirs)| theirs.type_compatible(ours));

        let returns = match (self.returns(), other.returns()) {
            (Some(ours), Some(theirs)) => ours.type_compatible(theirs),
            (_, None) => true,
            (None, Some(_)) => false,
        };

        let throws = match (self.throws(), other.throws()) {
            (None, _) => true,
            (Some(ours), Some(theirs)) => ours.type_compatible(theirs),
            (Some(_), None) => false,
        };

        arguments && returns && throws
    }

    fn resolve(&self, arguments: &TypeArguments) -> BlockType {
        BlockType {
            arguments: self.arguments.iter().map(|a| a.resolve_type(arguments)).collect(),
            returns: self.returns.as_ref().map(|r| Box::new(r.resolve_type(arguments))),
            throws: self.throws.as_ref().map(|t| Box::new(t.resolve_type(arguments))),
        }
    }
}

impl TypeQuery for Type {
    fn type_name(&self) -> String {
        match self {
            Type::Object(object) => object.name.clone(),
            Type::Trait(trait_type) => trait_type.name.clone(),
            Type::TypeParameter(param) => param.name.clone(),
            Type::GenericInstance(instance) => {
                let args: Vec<String> = instance.arguments.iter().map(|a| a.type_name()).collect();
                format!("{}[{}]", instance.object.name, args.join(", "))
            }
            Type::Block(block) => {
                let mut name = String::from("do");
                if !block.arguments.is_empty() {
                    let args: Vec<String> = block.arguments.iter().map(|a| a.type_name()).collect();
                    name.push_str(&format!(" ({})", args.join(", ")));
                }
                if let Some(throws) = block.throws() {
                    name.push_str(&format!(" !! {}", throws.type_name()));
                }
                if let Some(returns) = block.returns() {
                    name.push_str(&format!(" -> {}", returns.type_name()));
                }
                name
            }
            Type::Optional(optional) => optional.type_name(),
        }
    }

    fn type_compatible(&self, other: &Type) -> bool {
        if let Type::Optional(optional) = self {
            return optional.type_compatible(other);
        }

        match (self, other) {
            (_, Type::Optional(expected)) => self.type_compatible(expected.inner()),
            (_, Type::TypeParameter(param)) => self.satisfies(param),
            (Type::Object(ours), Type::Object(theirs)) => ours.name == theirs.name,
            (Type::Object(object), Type::Trait(expected)) => object.implements(&expected.name),
            (Type::Trait(ours), Type::Trait(theirs)) => {
                ours.name == theirs.name || ours.required_traits.contains(&theirs.name)
            }
            (Type::TypeParameter(param), Type::Trait(expected)) => {
                param.required_traits.contains(&expected.name)
            }
            (Type::Block(ours), Type::Block(theirs)) => ours.block_compatible(theirs),
            (Type::GenericInstance(ours), Type::GenericInstance(theirs)) => {
                ours.object.name == theirs.object.name
                    && ours.arguments.len() == theirs.arguments.len()
                    && ours
                        .arguments
                        .iter()
                        .zip(&theirs.arguments)
                        .all(|(a, b)| a.type_compatible(b))
            }
            (Type::GenericInstance(instance), Type::Object(object)) => {
                instance.object.name == object.name
            }
            (Type::GenericInstance(instance), Type::Trait(expected)) => {
                instance.object.implements(&expected.name)
            }
            _ => false,
        }
    }

    fn is_generic_type(&self) -> bool {
        match self {
            Type::Object(object) => !object.type_parameters.is_empty(),
            Type::GenericInstance(_) => true,
            Type::Optional(optional) => optional.is_generic_type(),
            _ => false,
        }
    }

    fn is_type_parameter(&self) -> bool {
        match self {
            Type::TypeParameter(_) => true,
            Type::Optional(optional) => optional.is_type_parameter(),
            _ => false,
        }
    }

    fn is_block(&self) -> bool {
        match self {
            Type::Block(_) => true,
            Type::Optional(optional) => optional.is_block(),
            _ => false,
        }
    }

    fn is_regular_object(&self) -> bool {
        match self {
            Type::Object(_) | Type::GenericInstance(_) => true,
            Type::Optional(optional) => optional.is_regular_object(),
            _ => false,
        }
    }

    fn is_trait(&self) -> bool {
        match self {
            Type::Trait(_) => true,
            Type::Optional(optional) => optional.is_trait(),
            _ => false,
        }
    }

    fn is_optional(&self) -> bool {
        match self {
            Type::Optional(optional) => optional.is_optional(),
            _ => false,
        }
    }

    fn resolve_type(&self, arguments: &TypeArguments) -> Type {
        match self {
            Type::Object(_) | Type::Trait(_) => self.clone(),
            Type::TypeParameter(param) => {
                arguments.get(&param.name).cloned().unwrap_or_else(|| self.clone())
            }
            Type::Block(block) => Type::Block(block.resolve(arguments)),
            Type::GenericInstance(instance) => Type::GenericInstance(GenericInstance {
                object: instance.object.clone(),
                arguments: instance.arguments.iter().map(|a| a.resolve_type(arguments)).collect(),
            }),
            Type::Optional(optional) => optional.resolve_type(arguments),
        }
    }

    fn initialize_as(&self, arguments: &TypeArguments) -> Type {
        match self {
            Type::Object(object) if !object.type_parameters.is_empty() => {
                Type::GenericInstance(GenericInstance {
                    object: object.clone(),
                    arguments: object
                        .type_parameters
                        .iter()
                        .map(|p| arguments.get(p).cloned().unwrap_or_else(|| Type::parameter(p.clone())))
                        .collect(),
                })
            }
            Type::Optional(optional) => optional.initialize_as(arguments),
            _ => self.resolve_type(arguments),
        }
    }

    fn as_block(&self) -> Option<&BlockType> {
        match self {
            Type::Block(block) => Some(block),
            Type::Optional(optional) => optional.as_block(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
