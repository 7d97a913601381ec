//! Resolution of type names written in source.
//!
//! A simple name is looked up in the enclosing declarations first, innermost
//! first. At each level the declaration's own member types come first, then
//! the member types it inherits from its supertypes, then its type
//! parameters. Past the outermost declaration the name is looked up among:
//!
//! 1. single-type imports (including static ones);
//! 2. types of the unit's own package;
//! 3. on-demand imports;
//! 4. the implicit imports (`java.lang` by default).
//!
//! Names in a declaration's `extends` and `implements` clauses see its type
//! parameters but not its members.
//!
//! A qualified name resolves its first segment the same way (without type
//! parameters) and then descends member by member. If the first segment is no
//! type at all, the whole name is taken as canonical.
//!
//! Every candidate goes through [`ResolutionSession::find_type`], so the batch
//! is consulted before the delegate and the result is canonical.

use std::collections::VecDeque;
use std::sync::Arc;

use jabi_common::Name;
use jabi_java_parser::ast::{BoundKind, ClassTypeRef, Modifier, TypeRef};

use crate::element::{ElementKind, ElementSource, QualifiedName};
use crate::errors::ModelError;
use crate::ids::{DeclId, ElementId, UnitId};
use crate::session::ResolutionSession;
use crate::types::{DeclaredType, NoTypeKind, TypeMirror, TypeReference, TypeVariable, WildcardType};

/// The lexical context a type reference was written in.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub unit: UnitId,
    /// Enclosing type declarations and their elements, innermost first.
    pub chain: Vec<(DeclId, ElementId)>,
    /// Set for the header of `chain[0]`, whose members are not in scope.
    pub header: bool,
}

impl ResolutionSession {
    /// The scope of names visible inside element `id`.
    pub(crate) fn scope_of(&self, id: ElementId) -> Result<Scope, ModelError> {
        let mut chain = Vec::new();
        let mut unit = None;
        let mut current = Some(id);
        while let Some(element) = current {
            let data = self.data(element);
            if let ElementSource::Tree(shape) = &data.source {
                chain.push((shape.decl, element));
                unit.get_or_insert(shape.unit);
            } else if data.kind == ElementKind::Package {
                break;
            }
            current = data.enclosing;
        }
        let unit = unit.ok_or_else(|| ModelError::malformed("element has no source scope"))?;
        Ok(Scope {
            unit,
            chain,
            header: false,
        })
    }

    /// The scope of the supertype clauses of type `id`.
    pub(crate) fn header_scope_of(&self, id: ElementId) -> Result<Scope, ModelError> {
        let mut scope = self.scope_of(id)?;
        scope.header = true;
        Ok(scope)
    }

    /// Builds the mirror of a written type. Class types stay unresolved until
    /// their element is asked for.
    pub(crate) fn mirror_of(&self, ty: &TypeRef, scope: &Scope) -> TypeMirror {
        match ty {
            TypeRef::Primitive(p, _) => TypeMirror::Primitive(*p),
            TypeRef::Void(_) => TypeMirror::None(NoTypeKind::Void),
            TypeRef::Error(_) => TypeMirror::Error,
            TypeRef::Array(component, _) => {
                TypeMirror::Array(Arc::new(self.mirror_of(component, scope)))
            }
            TypeRef::Wildcard { bound, .. } => {
                let mut wildcard = WildcardType::default();
                if let Some(bound) = bound {
                    let mirror = Arc::new(self.mirror_of(&bound.ty, scope));
                    match bound.kind {
                        BoundKind::Extends => wildcard.extends_bound = Some(mirror),
                        BoundKind::Super => wildcard.super_bound = Some(mirror),
                    }
                }
                TypeMirror::Wildcard(wildcard)
            }
            TypeRef::Class(class) => {
                if let [only] = class.segments.as_slice() {
                    if let Some(var) = self.type_variable(only.name, scope) {
                        return TypeMirror::TypeVar(var);
                    }
                }
                self.class_mirror(class, class.segments.len(), scope)
            }
        }
    }

    /// The mirror of the first `len` segments of `class`.
    fn class_mirror(&self, class: &ClassTypeRef, len: usize, scope: &Scope) -> TypeMirror {
        let segments = &class.segments[..len];
        let args = segments
            .last()
            .map(|last| {
                last.type_args
                    .iter()
                    .map(|arg| self.mirror_of(arg, scope))
                    .collect()
            })
            .unwrap_or_default();
        // `Outer<String>.Inner` is qualified by its parameterized outer type.
        let enclosing = segments[..len.saturating_sub(1)]
            .iter()
            .rposition(|segment| !segment.type_args.is_empty())
            .map(|index| self.class_mirror(class, index + 1, scope))
            .unwrap_or_else(TypeMirror::none);
        let reference = TypeReference {
            scope: scope.clone(),
            path: segments.iter().map(|segment| segment.name).collect(),
            span: class.span,
        };
        TypeMirror::Declared(Arc::new(DeclaredType::deferred(
            self.token(),
            reference,
            args,
            enclosing,
        )))
    }

    /// The type parameter `name` denotes, unless a member type at the same
    /// level or closer shadows it.
    fn type_variable(&self, name: Name, scope: &Scope) -> Option<TypeVariable> {
        let level = scope
            .chain
            .iter()
            .position(|(decl, _)| self.decls().get(*decl).type_params.contains(&name))?;
        let shadowed =
            (0..=level).any(|at| matches!(self.member_type_at(scope, at, name), Ok(Some(_))));
        if shadowed {
            return None;
        }
        Some(TypeVariable {
            name,
            owner: scope.chain[level].1,
        })
    }

    /// Resolves a written supertype eagerly, so an unknown supertype surfaces
    /// as an error of the query that asked for it.
    pub(crate) fn resolve_supertype(&self, ty: &TypeRef, scope: &Scope) -> Result<TypeMirror, ModelError> {
        let mirror = self.mirror_of(ty, scope);
        match &mirror {
            TypeMirror::Declared(declared) => {
                declared.element_id(self)?;
                Ok(mirror)
            }
            TypeMirror::Error => Err(ModelError::malformed("unparsable supertype")),
            _ => Ok(mirror),
        }
    }

    pub(crate) fn resolve_reference(&self, reference: &TypeReference) -> Result<ElementId, ModelError> {
        self.resolve_path(&reference.path, &reference.scope)
            .map_err(|e| e.located(reference.span))
    }

    fn resolve_path(&self, path: &[Name], scope: &Scope) -> Result<ElementId, ModelError> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| ModelError::malformed("empty type name"))?;
        match self.resolve_simple(*first, scope)? {
            Some(mut current) => {
                for segment in rest {
                    current = self.member_of(current, *segment)?;
                }
                Ok(current)
            }
            None if rest.is_empty() => Err(ModelError::unknown(self.names().resolve(*first))),
            None => {
                let canonical = path
                    .iter()
                    .fold(None, |acc, segment| Some(self.names().qualify(acc, *segment)));
                match canonical {
                    Some(name) => self.find_type(name),
                    None => Err(ModelError::malformed("empty type name")),
                }
            }
        }
    }

    /// The member type `simple` of type `owner`, declared or inherited.
    fn member_of(&self, owner: ElementId, simple: Name) -> Result<ElementId, ModelError> {
        if let Some(found) = self.declared_member_type(owner, simple)? {
            return Ok(found);
        }
        if let Some(found) = self.inherited_member_type(owner, simple)? {
            return Ok(found);
        }
        let name = match self.data(owner).qualified_name {
            QualifiedName::Named(outer) => self.names().qualify(Some(outer), simple),
            _ => simple,
        };
        Err(ModelError::unknown(self.names().resolve(name)))
    }

    /// Resolves a simple type name; `Ok(None)` when nothing declares it.
    fn resolve_simple(&self, simple: Name, scope: &Scope) -> Result<Option<ElementId>, ModelError> {
        for level in 0..scope.chain.len() {
            if let Some(found) = self.member_type_at(scope, level, simple)? {
                return Ok(Some(found));
            }
        }

        let imports = self.decls().imports_of(scope.unit);
        if let Some(imports) = imports {
            for (imported, canonical) in &imports.single {
                if *imported == simple {
                    if let Some(found) = self.try_type(*canonical)? {
                        return Ok(Some(found));
                    }
                }
            }
        }

        let package = self.decls().package_of(scope.unit);
        if let Some(found) = self.try_type(self.names().qualify(package, simple))? {
            return Ok(Some(found));
        }

        if let Some(imports) = imports {
            for on_demand in &imports.on_demand {
                if let Some(found) = self.try_type(self.names().qualify(Some(*on_demand), simple))? {
                    return Ok(Some(found));
                }
            }
        }

        for implicit in &self.well_known().implicit_imports {
            if let Some(found) = self.try_type(self.names().qualify(Some(*implicit), simple))? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// The member type `simple` visible at one level of `scope`.
    fn member_type_at(
        &self,
        scope: &Scope,
        level: usize,
        simple: Name,
    ) -> Result<Option<ElementId>, ModelError> {
        if scope.header && level == 0 {
            return Ok(None);
        }
        let Some((decl, element)) = scope.chain.get(level) else {
            return Ok(None);
        };
        if let Some(member) = self.decls().member_type(*decl, simple) {
            return self.element_of_decl(member).map(Some);
        }
        self.inherited_member_type(*element, simple)
    }

    /// A member type `owner` itself declares.
    fn declared_member_type(
        &self,
        owner: ElementId,
        simple: Name,
    ) -> Result<Option<ElementId>, ModelError> {
        let data = self.data(owner);
        match (&data.source, data.qualified_name) {
            (ElementSource::Tree(shape), _) => match self.decls().member_type(shape.decl, simple) {
                Some(child) => self.element_of_decl(child).map(Some),
                None => Ok(None),
            },
            (ElementSource::Opaque(_), QualifiedName::Named(outer)) => {
                self.try_type(self.names().qualify(Some(outer), simple))
            }
            _ => Ok(None),
        }
    }

    /// A non-private member type `owner` inherits, searching its supertypes
    /// breadth first.
    fn inherited_member_type(
        &self,
        owner: ElementId,
        simple: Name,
    ) -> Result<Option<ElementId>, ModelError> {
        let mut visited = vec![owner];
        let mut pending: VecDeque<ElementId> = self.direct_supertypes(owner).into();
        while let Some(current) = pending.pop_front() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);
            if let Some(found) = self.declared_member_type(current, simple)? {
                if !self.data(found).modifiers.contains(&Modifier::Private) {
                    return Ok(Some(found));
                }
            }
            pending.extend(self.direct_supertypes(current));
        }
        Ok(None)
    }

    /// The types `id` directly extends or implements, as far as they
    /// resolve. Empty while `id`'s own list is still being computed.
    fn direct_supertypes(&self, id: ElementId) -> Vec<ElementId> {
        self.supertype_cache()
            .get_or_create(&id, || self.compute_direct_supertypes(id))
            .unwrap_or_default()
    }

    fn compute_direct_supertypes(&self, id: ElementId) -> Vec<ElementId> {
        let data = self.data(id);
        let mut found = Vec::new();
        match &data.source {
            ElementSource::Tree(shape) if shape.constant_body => {
                // constant body -> constant -> enum
                found.extend(data.enclosing.and_then(|constant| self.data(constant).enclosing));
            }
            ElementSource::Tree(shape) => {
                let well_known = self.well_known();
                let implicit = match data.kind {
                    ElementKind::Enum => Some(well_known.enum_base),
                    ElementKind::Record => Some(well_known.record_base),
                    ElementKind::AnnotationType => Some(well_known.annotation_base),
                    ElementKind::Class
                        if shape.extends.is_empty()
                            && data.qualified_name != QualifiedName::Named(well_known.root_object) =>
                    {
                        Some(well_known.root_object)
                    }
                    _ => None,
                };
                found.extend(implicit.and_then(|name| self.find_type(name).ok()));
                if let Ok(scope) = self.header_scope_of(id) {
                    for written in shape.extends.iter().chain(&shape.implements) {
                        if let TypeMirror::Declared(declared) = self.mirror_of(written, &scope) {
                            found.extend(declared.element_id(self).ok());
                        }
                    }
                }
            }
            ElementSource::Opaque(descriptor) => {
                for name in descriptor.superclass.iter().chain(&descriptor.interfaces) {
                    found.extend(self.find_type(self.names().intern(name)).ok());
                }
            }
            _ => {}
        }
        found
    }

    /// Like [`find_type`](Self::find_type), but an unknown name is `Ok(None)`.
    fn try_type(&self, name: Name) -> Result<Option<ElementId>, ModelError> {
        match self.find_type(name) {
            Ok(id) => Ok(Some(id)),
            Err(e) if e.is_unknown_symbol() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
