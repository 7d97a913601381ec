//! Elements: packages, types, fields and enum constants.
//!
//! An element's identifying data (kind, names, modifiers, enclosing element)
//! is fixed when it is constructed. Supertypes, enclosed elements and the
//! element's own type are computed on first request and then kept, so every
//! answer is stable for the rest of the session.

use std::fmt;
use std::sync::{Arc, OnceLock};

use jabi_common::Name;
use jabi_java_parser::ast::{Modifier, TypeDeclKind, TypeRef};
use jabi_source::Span;
use serde::Serialize;

use crate::delegate::{SymbolDescriptor, SymbolKind};
use crate::errors::ModelError;
use crate::ids::{DeclId, ElementId, UnitId};
use crate::session::ResolutionSession;
use crate::types::{DeclaredType, NoTypeKind, TypeMirror, TypeVariable};

/// The canonical name of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualifiedName {
    /// A dotted name, e.g. `com.example.Foo.Bar`.
    Named(Name),
    /// Anonymous classes, and types declared inside them, have no canonical
    /// name.
    Anonymous,
    /// Fields and enum constants are not named by qualification.
    NotApplicable,
}

impl QualifiedName {
    /// The name, if there is one.
    pub fn as_name(self) -> Option<Name> {
        match self {
            QualifiedName::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` for [`QualifiedName::Anonymous`].
    pub fn is_anonymous(self) -> bool {
        self == QualifiedName::Anonymous
    }
}

/// What kind of declaration an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A package.
    Package,
    /// A class, including anonymous enum-constant bodies.
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An `@interface`.
    AnnotationType,
    /// A record.
    Record,
    /// A field, one per declarator.
    Field,
    /// An enum constant.
    EnumConstant,
}

impl ElementKind {
    /// Returns `true` for the five type kinds.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            ElementKind::Class
                | ElementKind::Interface
                | ElementKind::Enum
                | ElementKind::AnnotationType
                | ElementKind::Record
        )
    }

    pub(crate) fn of_decl(kind: TypeDeclKind) -> Self {
        match kind {
            TypeDeclKind::Class => ElementKind::Class,
            TypeDeclKind::Interface => ElementKind::Interface,
            TypeDeclKind::Enum => ElementKind::Enum,
            TypeDeclKind::Annotation => ElementKind::AnnotationType,
            TypeDeclKind::Record => ElementKind::Record,
        }
    }

    pub(crate) fn of_symbol(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Class => ElementKind::Class,
            SymbolKind::Interface => ElementKind::Interface,
            SymbolKind::Enum => ElementKind::Enum,
            SymbolKind::Annotation => ElementKind::AnnotationType,
            SymbolKind::Record => ElementKind::Record,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ElementKind::Package => "package",
            ElementKind::Class => "class",
            ElementKind::Interface => "interface",
            ElementKind::Enum => "enum",
            ElementKind::AnnotationType => "annotation type",
            ElementKind::Record => "record",
            ElementKind::Field => "field",
            ElementKind::EnumConstant => "enum constant",
        };
        f.write_str(text)
    }
}

/// Where an element's data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementOrigin {
    /// A declaration in the batch's syntax trees.
    Tree,
    /// A descriptor supplied by the resolution delegate.
    Opaque,
    /// Created by the session itself (packages).
    Synthetic,
}

/// Cache key of an element. One key, one element, per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ElementKey {
    Package(Name),
    /// A type with a canonical name, from the batch or the delegate.
    Type(Name),
    /// A type without a canonical name.
    Unnamed(DeclId),
    Field {
        decl: DeclId,
        member: u32,
        declarator: u32,
    },
    Constant {
        decl: DeclId,
        member: u32,
    },
}

/// The syntax a tree-backed type was built from, copied out of its
/// declaration.
#[derive(Debug)]
pub(crate) struct TreeShape {
    pub decl: DeclId,
    pub unit: UnitId,
    pub constant_body: bool,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<ElementKey>,
}

#[derive(Debug)]
pub(crate) enum ElementSource {
    Tree(TreeShape),
    Field { ty: TypeRef },
    Constant { body: Option<DeclId> },
    Opaque(SymbolDescriptor),
    Package,
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub kind: ElementKind,
    pub simple_name: Name,
    pub qualified_name: QualifiedName,
    pub enclosing: Option<ElementId>,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<Name>,
    pub span: Option<Span>,
    pub source: ElementSource,
    pub as_type: OnceLock<TypeMirror>,
    pub superclass: OnceLock<Result<TypeMirror, ModelError>>,
    pub interfaces: OnceLock<Result<Vec<TypeMirror>, ModelError>>,
    pub enclosed: OnceLock<Result<Vec<ElementId>, ModelError>>,
}

impl ElementData {
    pub fn new(
        kind: ElementKind,
        simple_name: Name,
        qualified_name: QualifiedName,
        enclosing: Option<ElementId>,
        source: ElementSource,
    ) -> Self {
        Self {
            kind,
            simple_name,
            qualified_name,
            enclosing,
            modifiers: Vec::new(),
            type_params: Vec::new(),
            span: None,
            source,
            as_type: OnceLock::new(),
            superclass: OnceLock::new(),
            interfaces: OnceLock::new(),
            enclosed: OnceLock::new(),
        }
    }

    pub fn origin(&self) -> ElementOrigin {
        match self.source {
            ElementSource::Opaque(_) => ElementOrigin::Opaque,
            ElementSource::Package => ElementOrigin::Synthetic,
            _ => ElementOrigin::Tree,
        }
    }

    pub fn tree(&self) -> Option<&TreeShape> {
        match &self.source {
            ElementSource::Tree(shape) => Some(shape),
            _ => None,
        }
    }
}

/// A view of one element within its session.
///
/// Views are cheap to clone. Two views are equal exactly when they denote the
/// same canonical element of the same session.
#[derive(Clone)]
pub struct Element<'s> {
    session: &'s ResolutionSession,
    id: ElementId,
    data: Arc<ElementData>,
}

impl<'s> Element<'s> {
    pub(crate) fn new(session: &'s ResolutionSession, id: ElementId, data: Arc<ElementData>) -> Self {
        Self { session, id, data }
    }

    /// The element's canonical identity.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The session this element belongs to.
    pub fn session(&self) -> &'s ResolutionSession {
        self.session
    }

    /// The element's kind.
    pub fn kind(&self) -> ElementKind {
        self.data.kind
    }

    /// Where the element's data comes from.
    pub fn origin(&self) -> ElementOrigin {
        self.data.origin()
    }

    /// The simple name; empty for anonymous classes and the unnamed package.
    pub fn simple_name(&self) -> Name {
        self.data.simple_name
    }

    /// The simple name's text.
    pub fn simple_name_str(&self) -> &'s str {
        self.session.names().resolve(self.data.simple_name)
    }

    /// The canonical name.
    pub fn qualified_name(&self) -> QualifiedName {
        self.data.qualified_name
    }

    /// The canonical name's text, if the element has one.
    pub fn qualified_name_str(&self) -> Option<&'s str> {
        self.data
            .qualified_name
            .as_name()
            .map(|name| self.session.names().resolve(name))
    }

    /// Declared modifiers. Enum constants report their implicit
    /// `public static final`.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.data.modifiers
    }

    /// Returns `true` if the element carries `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.data.modifiers.contains(&modifier)
    }

    /// Type parameter names in declaration order.
    pub fn type_parameters(&self) -> &[Name] {
        &self.data.type_params
    }

    /// Location of the declaring name, for tree-backed elements.
    pub fn span(&self) -> Option<Span> {
        self.data.span
    }

    /// The element that lexically contains this one.
    ///
    /// A nested type's is its outer type, a top-level type's its package. An
    /// anonymous enum-constant body is enclosed by its constant. Packages and
    /// types in the unnamed package have none.
    pub fn enclosing_element(&self) -> Option<Element<'s>> {
        self.data.enclosing.map(|id| self.session.element(id))
    }

    /// The package this element belongs to, if it is a named one.
    pub fn package(&self) -> Option<Element<'s>> {
        let mut current = self.clone();
        loop {
            if current.kind() == ElementKind::Package {
                return Some(current);
            }
            current = current.enclosing_element()?;
        }
    }

    /// The type this element declares or has.
    ///
    /// For a type, a declared type whose arguments are its own type variables;
    /// for a field, its declared type; for an enum constant, its enum's type.
    pub fn as_type(&self) -> TypeMirror {
        self.data
            .as_type
            .get_or_init(|| self.session.compute_as_type(self.id, &self.data))
            .clone()
    }

    /// The direct superclass, or [`TypeMirror::None`] for interfaces,
    /// annotation types, the root object type and non-type elements.
    pub fn superclass(&self) -> Result<TypeMirror, ModelError> {
        self.data
            .superclass
            .get_or_init(|| self.session.compute_superclass(self.id, &self.data))
            .clone()
    }

    /// The direct superinterfaces in declaration order.
    pub fn interfaces(&self) -> Result<Vec<TypeMirror>, ModelError> {
        self.data
            .interfaces
            .get_or_init(|| self.session.compute_interfaces(self.id, &self.data))
            .clone()
    }

    /// Member types, fields and enum constants in declaration order; for a
    /// package, the batch's top-level types in it.
    pub fn enclosed_elements(&self) -> Result<Vec<Element<'s>>, ModelError> {
        let ids = self
            .data
            .enclosed
            .get_or_init(|| self.session.compute_enclosed(&self.data))
            .clone()?;
        Ok(ids.into_iter().map(|id| self.session.element(id)).collect())
    }

    /// For an enum constant, the anonymous class its body declares.
    pub fn anonymous_body(&self) -> Result<Option<Element<'s>>, ModelError> {
        match self.data.source {
            ElementSource::Constant { body: Some(decl) } => {
                let id = self.session.element_of_decl(decl)?;
                Ok(Some(self.session.element(id)))
            }
            _ => Ok(None),
        }
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.session, other.session) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl std::hash::Hash for Element<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The qualified name when there is one, else the simple name.
impl fmt::Display for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualified_name_str() {
            Some(text) => f.write_str(text),
            None => f.write_str(self.simple_name_str()),
        }
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.data.kind)
            .field("name", &self.to_string())
            .finish()
    }
}

impl ResolutionSession {
    pub(crate) fn compute_as_type(&self, id: ElementId, data: &ElementData) -> TypeMirror {
        match &data.source {
            ElementSource::Package => TypeMirror::None(NoTypeKind::Package),
            ElementSource::Field { ty } => match self.scope_of(id) {
                Ok(scope) => self.mirror_of(ty, &scope),
                Err(_) => TypeMirror::Error,
            },
            ElementSource::Constant { .. } => match data.enclosing {
                Some(owner) => self.element(owner).as_type(),
                None => TypeMirror::Error,
            },
            ElementSource::Tree(_) | ElementSource::Opaque(_) => {
                let args = data
                    .type_params
                    .iter()
                    .map(|name| {
                        TypeMirror::TypeVar(TypeVariable {
                            name: *name,
                            owner: id,
                        })
                    })
                    .collect();
                let enclosing = self.enclosing_instance_type(data);
                TypeMirror::Declared(Arc::new(DeclaredType::resolved(
                    self.token(),
                    id,
                    args,
                    enclosing,
                )))
            }
        }
    }

    /// The outer type an inner class's type is qualified by: only non-static
    /// classes nested in a class whose own type is parameterized.
    fn enclosing_instance_type(&self, data: &ElementData) -> TypeMirror {
        let Some(outer) = data.enclosing else {
            return TypeMirror::none();
        };
        if data.kind != ElementKind::Class || data.modifiers.contains(&Modifier::Static) {
            return TypeMirror::none();
        }
        let outer = self.element(outer);
        if !matches!(
            outer.kind(),
            ElementKind::Class | ElementKind::Enum | ElementKind::Record
        ) {
            return TypeMirror::none();
        }
        let outer_type = outer.as_type();
        match outer_type.as_declared() {
            Some(declared) if declared.is_parameterized() => outer_type,
            _ => TypeMirror::none(),
        }
    }

    pub(crate) fn compute_superclass(
        &self,
        id: ElementId,
        data: &ElementData,
    ) -> Result<TypeMirror, ModelError> {
        if matches!(
            data.kind,
            ElementKind::Interface | ElementKind::AnnotationType
        ) || !data.kind.is_type()
        {
            return Ok(TypeMirror::none());
        }
        let at = data.span.unwrap_or(Span::DUMMY);
        match &data.source {
            ElementSource::Tree(shape) => {
                if shape.constant_body {
                    // The body of `A { ... }` extends its enum.
                    let owner = data
                        .enclosing
                        .and_then(|constant| self.element(constant).enclosing_element())
                        .ok_or_else(|| ModelError::malformed("enum constant body outside an enum"))?;
                    return Ok(owner.as_type());
                }
                match data.kind {
                    ElementKind::Enum => {
                        let base = self.find_type(self.well_known().enum_base).map_err(|e| e.located(at))?;
                        let own = self.element(id).as_type();
                        Ok(TypeMirror::Declared(Arc::new(DeclaredType::resolved(
                            self.token(),
                            base,
                            vec![own],
                            TypeMirror::none(),
                        ))))
                    }
                    ElementKind::Record => self.declared_of(self.well_known().record_base, at),
                    _ if data.qualified_name == QualifiedName::Named(self.well_known().root_object) => {
                        Ok(TypeMirror::none())
                    }
                    _ => match shape.extends.first() {
                        Some(written) => {
                            let scope = self.header_scope_of(id)?;
                            self.resolve_supertype(written, &scope)
                        }
                        None => self.declared_of(self.well_known().root_object, at),
                    },
                }
            }
            ElementSource::Opaque(descriptor) => match &descriptor.superclass {
                Some(name) => self.declared_of(self.names().intern(name), at),
                None => Ok(TypeMirror::none()),
            },
            _ => Ok(TypeMirror::none()),
        }
    }

    pub(crate) fn compute_interfaces(
        &self,
        id: ElementId,
        data: &ElementData,
    ) -> Result<Vec<TypeMirror>, ModelError> {
        let at = data.span.unwrap_or(Span::DUMMY);
        match &data.source {
            ElementSource::Tree(shape) => {
                if data.kind == ElementKind::AnnotationType {
                    return Ok(vec![self.declared_of(self.well_known().annotation_base, at)?]);
                }
                let written = if data.kind == ElementKind::Interface {
                    &shape.extends
                } else {
                    &shape.implements
                };
                if written.is_empty() {
                    return Ok(Vec::new());
                }
                let scope = self.header_scope_of(id)?;
                written
                    .iter()
                    .map(|ty| self.resolve_supertype(ty, &scope))
                    .collect()
            }
            ElementSource::Opaque(descriptor) => descriptor
                .interfaces
                .iter()
                .map(|name| self.declared_of(self.names().intern(name), at))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    pub(crate) fn compute_enclosed(&self, data: &ElementData) -> Result<Vec<ElementId>, ModelError> {
        match &data.source {
            ElementSource::Tree(shape) => shape
                .members
                .iter()
                .map(|key| self.canonical(key.clone()))
                .collect(),
            ElementSource::Package => {
                let package = data.qualified_name.as_name();
                let mut types = Vec::new();
                for decl in self.top_level_decls() {
                    if self.package_of_decl(*decl) != package {
                        continue;
                    }
                    let id = self.element_of_decl(*decl)?;
                    if !types.contains(&id) {
                        types.push(id);
                    }
                }
                Ok(types)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// A declared type with no arguments naming `name`.
    fn declared_of(&self, name: Name, at: Span) -> Result<TypeMirror, ModelError> {
        let target = self.find_type(name).map_err(|e| e.located(at))?;
        Ok(TypeMirror::Declared(Arc::new(DeclaredType::resolved(
            self.token(),
            target,
            Vec::new(),
            TypeMirror::none(),
        ))))
    }
}
