//! The resolution session: one batch of parsed sources and every element
//! built from it.
//!
//! Elements are created on demand and canonicalized through a
//! [`CanonicalCache`], so however a symbol is reached (by name, through a
//! supertype, as a member) the same [`ElementId`] comes back. The session is
//! `Sync`; queries may run on any number of threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use jabi_common::{Name, NameTable};
use jabi_diagnostics::DiagnosticSink;
use jabi_java_parser::ast::{CompilationUnit, Member, Modifier, TypeRef};
use tracing::{debug, info, trace};

use crate::arena::Arena;
use crate::cache::{CanonicalCache, Reentrant};
use crate::delegate::{ResolutionDelegate, SymbolDescriptor};
use crate::element::{Element, ElementData, ElementKey, ElementKind, ElementSource, QualifiedName, TreeShape};
use crate::errors::{warn_duplicate_type, ModelError};
use crate::ids::{DeclId, ElementId};
use crate::index::DeclTable;

/// Names the model treats specially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Canonical name of the implicit superclass of every class.
    pub root_object: String,
    /// Packages whose types are visible without an import.
    pub implicit_imports: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            root_object: "java.lang.Object".to_string(),
            implicit_imports: vec!["java.lang".to_string()],
        }
    }
}

#[derive(Debug)]
pub(crate) struct WellKnown {
    pub root_object: Name,
    pub enum_base: Name,
    pub record_base: Name,
    pub annotation_base: Name,
    pub implicit_imports: Vec<Name>,
}

impl WellKnown {
    fn new(config: &ModelConfig, names: &NameTable) -> Self {
        Self {
            root_object: names.intern(&config.root_object),
            enum_base: names.intern("java.lang.Enum"),
            record_base: names.intern("java.lang.Record"),
            annotation_base: names.intern("java.lang.annotation.Annotation"),
            implicit_imports: config
                .implicit_imports
                .iter()
                .filter(|package| !package.is_empty())
                .map(|package| names.intern(package))
                .collect(),
        }
    }
}

type ElementResult = Result<ElementId, ModelError>;

/// Identifies the session a type mirror was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Symbols of one batch of compilation units.
pub struct ResolutionSession {
    token: SessionToken,
    units: Vec<CompilationUnit>,
    names: Arc<NameTable>,
    delegate: Arc<dyn ResolutionDelegate>,
    config: ModelConfig,
    well_known: WellKnown,
    decls: DeclTable,
    cache: CanonicalCache<ElementKey, ElementResult>,
    /// Direct supertypes per type, for member type lookup.
    supertypes: CanonicalCache<ElementId, Vec<ElementId>>,
    elements: RwLock<Arena<ElementId, Arc<ElementData>>>,
}

impl ResolutionSession {
    /// Indexes `units` and prepares to answer queries about them.
    ///
    /// `names` must be the table the units were parsed with.
    pub fn new(
        units: Vec<CompilationUnit>,
        names: Arc<NameTable>,
        delegate: Arc<dyn ResolutionDelegate>,
        config: ModelConfig,
    ) -> Self {
        let decls = DeclTable::build(&units, &names);
        let well_known = WellKnown::new(&config, &names);
        info!(
            units = units.len(),
            declarations = decls.len(),
            duplicates = decls.duplicates().len(),
            "indexed batch"
        );
        Self {
            token: SessionToken::next(),
            units,
            names,
            delegate,
            config,
            well_known,
            decls,
            cache: CanonicalCache::new(),
            supertypes: CanonicalCache::new(),
            elements: RwLock::new(Arena::new()),
        }
    }

    /// The session's name table.
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// The batch, in the order it was given.
    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Looks up a type by canonical name: the batch first, then the delegate.
    pub fn lookup_type(&self, qualified_name: &str) -> Result<Element<'_>, ModelError> {
        if qualified_name.is_empty() {
            return Err(ModelError::unknown(qualified_name));
        }
        let id = self.find_type(self.names.intern(qualified_name))?;
        Ok(self.element(id))
    }

    /// The element of a named package. Packages always exist.
    pub fn lookup_package(&self, qualified_name: &str) -> Result<Element<'_>, ModelError> {
        if qualified_name.is_empty() {
            return Err(ModelError::unknown(qualified_name));
        }
        let id = self.canonical(ElementKey::Package(self.names.intern(qualified_name)))?;
        Ok(self.element(id))
    }

    /// Every top-level type of the batch, in declaration order.
    ///
    /// A type declared twice appears once, as its first declaration.
    pub fn top_level_types(&self) -> Result<Vec<Element<'_>>, ModelError> {
        let mut seen = Vec::new();
        for decl in self.decls.top_level() {
            let id = self.element_of_decl(*decl)?;
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        Ok(seen.into_iter().map(|id| self.element(id)).collect())
    }

    /// The element with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another session.
    pub fn element(&self, id: ElementId) -> Element<'_> {
        Element::new(self, id, self.data(id))
    }

    /// Reports every type declared more than once in the batch.
    pub fn report_duplicates(&self, sink: &DiagnosticSink) {
        for (duplicate, first) in self.decls.duplicates() {
            let dup = self.decls.get(*duplicate);
            let Some(name) = dup.qualified_name.as_name() else {
                continue;
            };
            sink.emit(warn_duplicate_type(
                self.names.resolve(name),
                dup.name_span,
                self.decls.get(*first).name_span,
            ));
        }
    }

    /// Number of elements constructed so far.
    pub fn element_count(&self) -> usize {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `(hits, misses)` of the canonicalization cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    pub(crate) fn token(&self) -> SessionToken {
        self.token
    }

    pub(crate) fn supertype_cache(&self) -> &CanonicalCache<ElementId, Vec<ElementId>> {
        &self.supertypes
    }

    pub(crate) fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    pub(crate) fn decls(&self) -> &DeclTable {
        &self.decls
    }

    pub(crate) fn top_level_decls(&self) -> &[DeclId] {
        self.decls.top_level()
    }

    pub(crate) fn package_of_decl(&self, decl: DeclId) -> Option<Name> {
        self.decls.package_of(self.decls.get(decl).unit)
    }

    pub(crate) fn data(&self, id: ElementId) -> Arc<ElementData> {
        let elements = self.elements.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(elements.get(id))
    }

    /// The canonical type element for a canonical name.
    pub(crate) fn find_type(&self, name: Name) -> ElementResult {
        self.canonical(ElementKey::Type(name))
    }

    /// The element of a declaration in the batch.
    pub(crate) fn element_of_decl(&self, decl: DeclId) -> ElementResult {
        self.canonical(self.decl_key(decl))
    }

    fn decl_key(&self, decl: DeclId) -> ElementKey {
        match self.decls.get(decl).qualified_name {
            QualifiedName::Named(name) => ElementKey::Type(name),
            _ => ElementKey::Unnamed(decl),
        }
    }

    pub(crate) fn canonical(&self, key: ElementKey) -> ElementResult {
        self.cache
            .get_or_create(&key, || {
                debug!(key = %self.describe(&key), "cache miss");
                let data = self.construct(&key)?;
                Ok(self.alloc(data))
            })
            .unwrap_or_else(|Reentrant| {
                Err(ModelError::CyclicConstruction {
                    key: self.describe(&key),
                })
            })
    }

    fn alloc(&self, data: ElementData) -> ElementId {
        let kind = data.kind;
        let mut elements = self.elements.write().unwrap_or_else(PoisonError::into_inner);
        let id = elements.alloc(Arc::new(data));
        trace!(id = id.as_raw(), %kind, "element constructed");
        id
    }

    fn describe(&self, key: &ElementKey) -> String {
        match key {
            ElementKey::Package(name) => format!("package `{}`", self.names.resolve(*name)),
            ElementKey::Type(name) => format!("type `{}`", self.names.resolve(*name)),
            ElementKey::Unnamed(decl) => format!("anonymous type #{}", decl.as_raw()),
            ElementKey::Field {
                decl,
                member,
                declarator,
            } => format!("field {member}.{declarator} of type #{}", decl.as_raw()),
            ElementKey::Constant { decl, member } => {
                format!("enum constant {member} of type #{}", decl.as_raw())
            }
        }
    }

    fn construct(&self, key: &ElementKey) -> Result<ElementData, ModelError> {
        match key {
            ElementKey::Package(name) => Ok(self.build_package(*name)),
            ElementKey::Type(name) => match self.decls.lookup(*name) {
                Some(decl) => self.build_tree_type(decl),
                None => {
                    let text = self.names.resolve(*name);
                    debug!(name = text, "forwarding to resolution delegate");
                    match self.delegate.resolve(text) {
                        Some(descriptor) if descriptor.qualified_name != text => {
                            Err(ModelError::malformed(format!(
                                "delegate answered `{text}` with `{}`",
                                descriptor.qualified_name
                            )))
                        }
                        Some(descriptor) => self.build_opaque(descriptor),
                        None => Err(ModelError::unknown(text)),
                    }
                }
            },
            ElementKey::Unnamed(decl) => self.build_tree_type(*decl),
            ElementKey::Field {
                decl,
                member,
                declarator,
            } => self.build_field(*decl, *member, *declarator),
            ElementKey::Constant { decl, member } => self.build_constant(*decl, *member),
        }
    }

    fn build_package(&self, name: Name) -> ElementData {
        let text = self.names.resolve(name);
        let simple = text.rsplit('.').next().unwrap_or(text);
        ElementData::new(
            ElementKind::Package,
            self.names.intern(simple),
            QualifiedName::Named(name),
            None,
            ElementSource::Package,
        )
    }

    fn package_element(&self, package: Option<Name>) -> Result<Option<ElementId>, ModelError> {
        match package {
            Some(name) if !self.names.is_empty(name) => {
                self.canonical(ElementKey::Package(name)).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn build_tree_type(&self, decl: DeclId) -> Result<ElementData, ModelError> {
        let info = self.decls.get(decl);
        let tree = self
            .decls
            .type_decl(&self.units, decl)
            .ok_or_else(|| ModelError::malformed(format!("no declaration at {:?}", info.path)))?;

        let enclosing = match (info.parent, info.constant) {
            (Some(parent), Some(member)) => Some(self.canonical(ElementKey::Constant {
                decl: parent,
                member,
            })?),
            (Some(parent), None) => Some(self.element_of_decl(parent)?),
            (None, _) => self.package_element(self.decls.package_of(info.unit))?,
        };

        let mut members = Vec::new();
        for (index, member) in tree.members.iter().enumerate() {
            let index = index as u32;
            match member {
                Member::Type(_) => {
                    if let Some(child) = self.decls.child(decl, index) {
                        members.push(self.decl_key(child));
                    }
                }
                Member::Field(field) => {
                    for declarator in 0..field.declarators.len() {
                        members.push(ElementKey::Field {
                            decl,
                            member: index,
                            declarator: declarator as u32,
                        });
                    }
                }
                Member::EnumConstant(_) => members.push(ElementKey::Constant {
                    decl,
                    member: index,
                }),
            }
        }

        let shape = TreeShape {
            decl,
            unit: info.unit,
            constant_body: info.constant.is_some(),
            extends: tree.extends.clone(),
            implements: tree.implements.clone(),
            members,
        };
        let mut data = ElementData::new(
            ElementKind::of_decl(tree.kind),
            info.simple_name,
            info.qualified_name,
            enclosing,
            ElementSource::Tree(shape),
        );
        data.modifiers = tree.modifiers.clone();
        data.type_params = info.type_params.clone();
        data.span = Some(info.name_span);
        Ok(data)
    }

    fn build_field(&self, decl: DeclId, member: u32, declarator: u32) -> Result<ElementData, ModelError> {
        let tree = self
            .decls
            .type_decl(&self.units, decl)
            .ok_or_else(|| ModelError::malformed("field owner is missing"))?;
        let Some(Member::Field(field)) = tree.members.get(member as usize) else {
            return Err(ModelError::malformed(format!("member {member} is not a field")));
        };
        let var = field
            .declarators
            .get(declarator as usize)
            .ok_or_else(|| ModelError::malformed(format!("field has no declarator {declarator}")))?;
        let owner = self.element_of_decl(decl)?;

        // `int x[]` declares an `int[]`.
        let mut ty = field.ty.clone();
        for _ in 0..var.dims {
            ty = TypeRef::Array(Box::new(ty), var.span);
        }
        let mut data = ElementData::new(
            ElementKind::Field,
            var.name,
            QualifiedName::NotApplicable,
            Some(owner),
            ElementSource::Field { ty },
        );
        data.modifiers = field.modifiers.clone();
        data.span = Some(var.span);
        Ok(data)
    }

    fn build_constant(&self, decl: DeclId, member: u32) -> Result<ElementData, ModelError> {
        let tree = self
            .decls
            .type_decl(&self.units, decl)
            .ok_or_else(|| ModelError::malformed("enum constant owner is missing"))?;
        let Some(Member::EnumConstant(constant)) = tree.members.get(member as usize) else {
            return Err(ModelError::malformed(format!(
                "member {member} is not an enum constant"
            )));
        };
        let owner = self.element_of_decl(decl)?;
        let mut data = ElementData::new(
            ElementKind::EnumConstant,
            constant.name,
            QualifiedName::NotApplicable,
            Some(owner),
            ElementSource::Constant {
                body: self.decls.child(decl, member),
            },
        );
        data.modifiers = vec![Modifier::Public, Modifier::Static, Modifier::Final];
        data.span = Some(constant.span);
        Ok(data)
    }

    fn build_opaque(&self, descriptor: SymbolDescriptor) -> Result<ElementData, ModelError> {
        let qualified = self.names.intern(&descriptor.qualified_name);
        let enclosing = match descriptor.enclosing_type() {
            Some(outer) => match self.find_type(self.names.intern(outer)) {
                Ok(id) => Some(id),
                Err(e) if e.is_unknown_symbol() => {
                    self.package_element(Some(self.names.intern(&descriptor.package)))?
                }
                Err(e) => return Err(e),
            },
            None => self.package_element(Some(self.names.intern(&descriptor.package)))?,
        };
        let kind = ElementKind::of_symbol(descriptor.kind);
        let simple = self.names.intern(descriptor.simple_name());
        let modifiers = descriptor.modifiers.clone();
        let type_params = descriptor
            .type_parameters
            .iter()
            .map(|param| self.names.intern(param))
            .collect();
        let mut data = ElementData::new(
            kind,
            simple,
            QualifiedName::Named(qualified),
            enclosing,
            ElementSource::Opaque(descriptor),
        );
        data.modifiers = modifiers;
        data.type_params = type_params;
        Ok(data)
    }
}

impl std::fmt::Debug for ResolutionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionSession")
            .field("units", &self.units.len())
            .field("declarations", &self.decls.len())
            .field("elements", &self.element_count())
            .finish()
    }
}
