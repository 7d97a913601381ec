//! Type mirrors: the types elements declare and reference.
//!
//! A [`DeclaredType`] written in source (a field type, a type argument) is
//! resolved on first use rather than when its element is built, so loading a
//! class does not pull in every type its members mention.

use std::fmt;
use std::sync::{Arc, OnceLock};

use jabi_common::Name;
use jabi_java_parser::ast::PrimitiveType;
use jabi_source::Span;

use crate::element::Element;
use crate::errors::ModelError;
use crate::ids::ElementId;
use crate::resolve::Scope;
use crate::session::{ResolutionSession, SessionToken};

/// The kind of a [`TypeMirror`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `char`
    Char,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `void`
    Void,
    /// No type, e.g. the superclass of an interface.
    None,
    /// The pseudo-type of a package.
    Package,
    /// An array type.
    Array,
    /// A class or interface type.
    Declared,
    /// A type variable.
    TypeVar,
    /// A wildcard type argument.
    Wildcard,
    /// A type that failed to parse.
    Error,
}

/// The flavors of [`TypeMirror::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoTypeKind {
    /// No type at all.
    None,
    /// `void`.
    Void,
    /// A package's type.
    Package,
}

/// A type.
#[derive(Debug, Clone)]
pub enum TypeMirror {
    /// A primitive type.
    Primitive(PrimitiveType),
    /// `void`, a package type, or the absence of a type.
    None(NoTypeKind),
    /// A class or interface type with its arguments.
    Declared(Arc<DeclaredType>),
    /// An array of the component type.
    Array(Arc<TypeMirror>),
    /// A use of a type parameter.
    TypeVar(TypeVariable),
    /// `?`, `? extends T` or `? super T`.
    Wildcard(WildcardType),
    /// A type that failed to parse.
    Error,
}

/// A type parameter reference and the element that declares the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    /// The parameter's name.
    pub name: Name,
    /// The declaring type.
    pub owner: ElementId,
}

/// A wildcard type argument. At most one bound is set.
#[derive(Debug, Clone, Default)]
pub struct WildcardType {
    /// The `extends` bound.
    pub extends_bound: Option<Arc<TypeMirror>>,
    /// The `super` bound.
    pub super_bound: Option<Arc<TypeMirror>>,
}

/// A type reference as written, to be resolved in its scope.
#[derive(Debug, Clone)]
pub(crate) struct TypeReference {
    pub scope: Scope,
    pub path: Vec<Name>,
    pub span: Span,
}

/// A class or interface type.
///
/// Only the session that made the type can resolve it; any other session gets
/// [`ModelError::MalformedTree`].
#[derive(Debug)]
pub struct DeclaredType {
    origin: SessionToken,
    target: OnceLock<Result<ElementId, ModelError>>,
    reference: Option<TypeReference>,
    type_args: Vec<TypeMirror>,
    enclosing: TypeMirror,
}

impl DeclaredType {
    pub(crate) fn resolved(
        origin: SessionToken,
        target: ElementId,
        type_args: Vec<TypeMirror>,
        enclosing: TypeMirror,
    ) -> Self {
        Self {
            origin,
            target: OnceLock::from(Ok(target)),
            reference: None,
            type_args,
            enclosing,
        }
    }

    pub(crate) fn deferred(
        origin: SessionToken,
        reference: TypeReference,
        type_args: Vec<TypeMirror>,
        enclosing: TypeMirror,
    ) -> Self {
        Self {
            origin,
            target: OnceLock::new(),
            reference: Some(reference),
            type_args,
            enclosing,
        }
    }

    /// The element this type names, resolving it on first call.
    pub fn element_id(&self, session: &ResolutionSession) -> Result<ElementId, ModelError> {
        if self.origin != session.token() {
            return Err(ModelError::malformed(
                "type used with a session that did not make it",
            ));
        }
        self.target
            .get_or_init(|| match &self.reference {
                Some(reference) => session.resolve_reference(reference),
                None => Err(ModelError::malformed("declared type without a target")),
            })
            .clone()
    }

    /// The element this type names.
    pub fn element<'s>(&self, session: &'s ResolutionSession) -> Result<Element<'s>, ModelError> {
        self.element_id(session).map(|id| session.element(id))
    }

    /// Returns `true` once the target is known, successfully or not.
    pub fn is_resolved(&self) -> bool {
        self.target.get().is_some()
    }

    /// Type arguments; empty for a raw or non-generic type.
    pub fn type_arguments(&self) -> &[TypeMirror] {
        &self.type_args
    }

    /// The parameterized outer type of an inner class type, else
    /// [`TypeMirror::None`].
    pub fn enclosing_type(&self) -> &TypeMirror {
        &self.enclosing
    }

    /// Returns `true` if the type, or any type enclosing it, has arguments.
    pub fn is_parameterized(&self) -> bool {
        !self.type_args.is_empty() || self.enclosing.kind() == TypeKind::Declared
    }

    /// Where the reference was written, for types taken from source.
    pub fn span(&self) -> Option<Span> {
        self.reference.as_ref().map(|r| r.span)
    }

    fn written_name(&self, session: &ResolutionSession) -> Option<String> {
        if self.origin != session.token() {
            return None;
        }
        let reference = self.reference.as_ref()?;
        let segments: Vec<&str> = reference
            .path
            .iter()
            .map(|name| session.names().resolve(*name))
            .collect();
        Some(segments.join("."))
    }
}

impl TypeMirror {
    /// [`TypeMirror::None`] of kind [`NoTypeKind::None`].
    pub fn none() -> Self {
        TypeMirror::None(NoTypeKind::None)
    }

    /// The mirror's kind.
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeMirror::Primitive(p) => match p {
                PrimitiveType::Boolean => TypeKind::Boolean,
                PrimitiveType::Byte => TypeKind::Byte,
                PrimitiveType::Short => TypeKind::Short,
                PrimitiveType::Int => TypeKind::Int,
                PrimitiveType::Long => TypeKind::Long,
                PrimitiveType::Char => TypeKind::Char,
                PrimitiveType::Float => TypeKind::Float,
                PrimitiveType::Double => TypeKind::Double,
            },
            TypeMirror::None(NoTypeKind::None) => TypeKind::None,
            TypeMirror::None(NoTypeKind::Void) => TypeKind::Void,
            TypeMirror::None(NoTypeKind::Package) => TypeKind::Package,
            TypeMirror::Declared(_) => TypeKind::Declared,
            TypeMirror::Array(_) => TypeKind::Array,
            TypeMirror::TypeVar(_) => TypeKind::TypeVar,
            TypeMirror::Wildcard(_) => TypeKind::Wildcard,
            TypeMirror::Error => TypeKind::Error,
        }
    }

    /// The declared type, if this is one.
    pub fn as_declared(&self) -> Option<&DeclaredType> {
        match self {
            TypeMirror::Declared(declared) => Some(declared),
            _ => None,
        }
    }

    /// The element a declared type names; `None` for every other kind.
    pub fn as_element<'s>(
        &self,
        session: &'s ResolutionSession,
    ) -> Result<Option<Element<'s>>, ModelError> {
        match self {
            TypeMirror::Declared(declared) => declared.element(session).map(Some),
            _ => Ok(None),
        }
    }

    /// Formats the type as Java source, resolving names through `session`.
    pub fn display<'a>(&'a self, session: &'a ResolutionSession) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, session }
    }
}

/// Java source rendering of a [`TypeMirror`]; see [`TypeMirror::display`].
pub struct TypeDisplay<'a> {
    ty: &'a TypeMirror,
    session: &'a ResolutionSession,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.session.names();
        match self.ty {
            TypeMirror::Primitive(p) => f.write_str(p.keyword()),
            TypeMirror::None(NoTypeKind::None) => f.write_str("none"),
            TypeMirror::None(NoTypeKind::Void) => f.write_str("void"),
            TypeMirror::None(NoTypeKind::Package) => f.write_str("package"),
            TypeMirror::Error => f.write_str("<error>"),
            TypeMirror::TypeVar(var) => f.write_str(names.resolve(var.name)),
            TypeMirror::Array(component) => {
                write!(f, "{}[]", component.display(self.session))
            }
            TypeMirror::Wildcard(wildcard) => {
                f.write_str("?")?;
                if let Some(bound) = &wildcard.extends_bound {
                    write!(f, " extends {}", bound.display(self.session))?;
                }
                if let Some(bound) = &wildcard.super_bound {
                    write!(f, " super {}", bound.display(self.session))?;
                }
                Ok(())
            }
            TypeMirror::Declared(declared) => {
                match declared.element(self.session) {
                    Ok(element) => write!(f, "{element}")?,
                    Err(_) => match declared.written_name(self.session) {
                        Some(written) => f.write_str(&written)?,
                        None => f.write_str("<error>")?,
                    },
                }
                if let Some((first, rest)) = declared.type_args.split_first() {
                    write!(f, "<{}", first.display(self.session))?;
                    for arg in rest {
                        write!(f, ", {}", arg.display(self.session))?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(TypeMirror::none().kind(), TypeKind::None);
        assert_eq!(TypeMirror::None(NoTypeKind::Void).kind(), TypeKind::Void);
        assert_eq!(
            TypeMirror::Primitive(PrimitiveType::Long).kind(),
            TypeKind::Long
        );
        let array = TypeMirror::Array(Arc::new(TypeMirror::Primitive(PrimitiveType::Int)));
        assert_eq!(array.kind(), TypeKind::Array);
        assert!(array.as_declared().is_none());
    }

    #[test]
    fn resolved_declared_type() {
        let origin = SessionToken::next();
        let declared =
            DeclaredType::resolved(origin, ElementId::from_raw(3), Vec::new(), TypeMirror::none());
        assert!(declared.is_resolved());
        assert!(!declared.is_parameterized());
        assert!(declared.span().is_none());

        let generic = DeclaredType::resolved(
            origin,
            ElementId::from_raw(4),
            vec![TypeMirror::TypeVar(TypeVariable {
                name: Name::from_raw(1),
                owner: ElementId::from_raw(4),
            })],
            TypeMirror::none(),
        );
        assert!(generic.is_parameterized());
    }
}
