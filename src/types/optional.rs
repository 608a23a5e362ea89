use serde::{Deserialize, Serialize};

use super::{BlockType, Type, TypeArguments, TypeQuery};

/// A type that may be absent, written `?T`.
///
/// Apart from reporting itself as optional, the wrapper answers every query
/// exactly like the type it wraps. Substitution and instantiation re-wrap their
/// result so optionality survives specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optional {
    inner: Box<Type>,
}

impl Optional {
    pub fn new(inner: Type) -> Self {
        Self { inner: Box::new(inner) }
    }

    pub fn inner(&self) -> &Type {
        &self.inner
    }
}

impl TypeQuery for Optional {
    fn type_name(&self) -> String {
        format!("?{}", self.inner.type_name())
    }

    fn type_compatible(&self, other: &Type) -> bool {
        self.inner.type_compatible(other)
    }

    fn is_generic_type(&self) -> bool {
        self.inner.is_generic_type()
    }

    fn is_type_parameter(&self) -> bool {
        self.inner.is_type_parameter()
    }

    fn is_block(&self) -> bool {
        self.inner.is_block()
    }

    fn is_regular_object(&self) -> bool {
        self.inner.is_regular_object()
    }

    fn is_trait(&self) -> bool {
        self.inner.is_trait()
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn resolve_type(&self, arguments: &TypeArguments) -> Type {
        Type::Optional(Optional::new(self.inner.resolve_type(arguments)))
    }

    fn initialize_as(&self, arguments: &TypeArguments) -> Type {
        Type::Optional(Optional::new(self.inner.initialize_as(arguments)))
    }

    fn as_block(&self) -> Option<&BlockType> {
        self.inner.as_block()
    }
}
