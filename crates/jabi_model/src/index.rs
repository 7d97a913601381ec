//! Flattened index of every type declaration in the batch.
//!
//! The index is built once, before any element exists. It records where each
//! declaration sits in its compilation unit (as a member-index path), its
//! canonical name, and the per-unit package and import tables that simple-name
//! resolution consults. Elements are built lazily from it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use jabi_common::{Name, NameTable};
use jabi_java_parser::ast::{CompilationUnit, Member, TypeDecl};
use jabi_source::Span;

use crate::arena::Arena;
use crate::element::QualifiedName;
use crate::ids::{DeclId, UnitId};

/// One type declaration.
#[derive(Debug, Clone)]
pub(crate) struct DeclInfo {
    pub unit: UnitId,
    pub parent: Option<DeclId>,
    /// Member indices from the unit's type list down to this declaration.
    pub path: Vec<u32>,
    /// Empty for anonymous enum-constant bodies.
    pub simple_name: Name,
    pub qualified_name: QualifiedName,
    pub type_params: Vec<Name>,
    pub name_span: Span,
    /// For an enum-constant body, the constant's member index in `parent`.
    pub constant: Option<u32>,
    /// Named member types, in declaration order.
    pub member_types: Vec<DeclId>,
}

/// Imports of one compilation unit, pre-qualified.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnitImports {
    /// `(simple name, canonical name)` for single-type imports, static or not.
    pub single: Vec<(Name, Name)>,
    /// Packages and types whose members are imported on demand.
    pub on_demand: Vec<Name>,
}

#[derive(Debug, Default)]
pub(crate) struct DeclTable {
    decls: Arena<DeclId, DeclInfo>,
    by_name: HashMap<Name, DeclId>,
    children: HashMap<(DeclId, u32), DeclId>,
    top_level: Vec<DeclId>,
    packages: Vec<Option<Name>>,
    imports: Vec<UnitImports>,
    duplicates: Vec<(DeclId, DeclId)>,
}

fn qualify_segments(names: &NameTable, segments: &[Name]) -> Option<Name> {
    segments
        .iter()
        .fold(None, |acc, segment| Some(names.qualify(acc, *segment)))
}

impl DeclTable {
    pub fn build(units: &[CompilationUnit], names: &NameTable) -> Self {
        let mut table = DeclTable::default();
        for (index, unit) in units.iter().enumerate() {
            let unit_id = UnitId::from_raw(index as u32);
            let package = unit
                .package
                .as_ref()
                .and_then(|p| qualify_segments(names, &p.name.segments));
            table.packages.push(package);

            let mut imports = UnitImports::default();
            for import in &unit.imports {
                let Some(path) = qualify_segments(names, &import.path.segments) else {
                    continue;
                };
                if import.on_demand {
                    imports.on_demand.push(path);
                } else if let Some(last) = import.path.segments.last() {
                    imports.single.push((*last, path));
                }
            }
            table.imports.push(imports);

            for (member, decl) in unit.types.iter().enumerate() {
                let qualified = match decl.name {
                    Some(simple) => QualifiedName::Named(names.qualify(package, simple)),
                    None => QualifiedName::Anonymous,
                };
                let id = table.add(
                    unit_id,
                    None,
                    vec![member as u32],
                    decl,
                    qualified,
                    None,
                    true,
                    names,
                );
                table.top_level.push(id);
            }
        }
        table
    }

    /// Indexes `decl` and its nested types.
    ///
    /// Only `reachable` declarations enter the name index; the nested types
    /// of a duplicate declaration stay out of it along with their outer type.
    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        unit: UnitId,
        parent: Option<DeclId>,
        path: Vec<u32>,
        decl: &TypeDecl,
        qualified_name: QualifiedName,
        constant: Option<u32>,
        reachable: bool,
        names: &NameTable,
    ) -> DeclId {
        let id = self.decls.alloc(DeclInfo {
            unit,
            parent,
            path: path.clone(),
            simple_name: decl.name.unwrap_or_else(|| names.empty()),
            qualified_name,
            type_params: decl.type_params.iter().map(|p| p.name).collect(),
            name_span: decl.name_span,
            constant,
            member_types: Vec::new(),
        });
        let mut reachable = reachable;
        if let (QualifiedName::Named(name), true) = (qualified_name, reachable) {
            match self.by_name.entry(name) {
                Entry::Occupied(first) => {
                    self.duplicates.push((id, *first.get()));
                    reachable = false;
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let mut member_types = Vec::new();
        for (index, member) in decl.members.iter().enumerate() {
            let index = index as u32;
            let mut child_path = path.clone();
            child_path.push(index);
            match member {
                Member::Type(nested) => {
                    let nested_name = match (qualified_name, nested.name) {
                        (QualifiedName::Named(outer), Some(simple)) => {
                            QualifiedName::Named(names.qualify(Some(outer), simple))
                        }
                        _ => QualifiedName::Anonymous,
                    };
                    let child = self.add(
                        unit,
                        Some(id),
                        child_path,
                        nested,
                        nested_name,
                        None,
                        reachable,
                        names,
                    );
                    self.children.insert((id, index), child);
                    member_types.push(child);
                }
                Member::EnumConstant(constant) => {
                    if let Some(body) = &constant.body {
                        let child = self.add(
                            unit,
                            Some(id),
                            child_path,
                            body,
                            QualifiedName::Anonymous,
                            Some(index),
                            reachable,
                            names,
                        );
                        self.children.insert((id, index), child);
                    }
                }
                Member::Field(_) => {}
            }
        }
        self.decls.get_mut(id).member_types = member_types;
        id
    }

    pub fn get(&self, id: DeclId) -> &DeclInfo {
        self.decls.get(id)
    }

    /// The first declaration with this canonical name.
    pub fn lookup(&self, name: Name) -> Option<DeclId> {
        self.by_name.get(&name).copied()
    }

    /// The type declared by member `member` of `parent`: a nested type or an
    /// enum constant's body.
    pub fn child(&self, parent: DeclId, member: u32) -> Option<DeclId> {
        self.children.get(&(parent, member)).copied()
    }

    pub fn member_type(&self, owner: DeclId, simple: Name) -> Option<DeclId> {
        self.get(owner)
            .member_types
            .iter()
            .copied()
            .find(|child| self.get(*child).simple_name == simple)
    }

    pub fn top_level(&self) -> &[DeclId] {
        &self.top_level
    }

    /// The unit's package, `None` for the unnamed package.
    pub fn package_of(&self, unit: UnitId) -> Option<Name> {
        self.packages.get(unit.as_raw() as usize).copied().flatten()
    }

    pub fn imports_of(&self, unit: UnitId) -> Option<&UnitImports> {
        self.imports.get(unit.as_raw() as usize)
    }

    /// `(duplicate, first)` pairs in declaration order.
    pub fn duplicates(&self) -> &[(DeclId, DeclId)] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Follows the recorded path back into the syntax tree.
    pub fn type_decl<'u>(&self, units: &'u [CompilationUnit], id: DeclId) -> Option<&'u TypeDecl> {
        let info = self.decls.try_get(id)?;
        let unit = units.get(info.unit.as_raw() as usize)?;
        let (first, rest) = info.path.split_first()?;
        let mut decl = unit.types.get(*first as usize)?;
        for index in rest {
            decl = match decl.members.get(*index as usize)? {
                Member::Type(nested) => nested,
                Member::EnumConstant(constant) => constant.body.as_deref()?,
                Member::Field(_) => return None,
            };
        }
        Some(decl)
    }
}
