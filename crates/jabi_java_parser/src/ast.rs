//! Declaration-level syntax tree for Java compilation units.
//!
//! Only the ABI-relevant surface is kept: packages, imports, type declarations,
//! their headers, member types, fields and enum constants. Every node carries a
//! [`Span`]. Executable code never reaches the tree.

use jabi_common::Name;
use jabi_source::Span;
use serde::{Deserialize, Serialize};

// ============================================================================
// Compilation unit
// ============================================================================

/// One parsed `.java` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// The `package` declaration; `None` for the unnamed package.
    pub package: Option<PackageDecl>,
    /// Import declarations in source order.
    pub imports: Vec<ImportDecl>,
    /// Top-level type declarations in source order.
    pub types: Vec<TypeDecl>,
    /// Span of the whole unit.
    pub span: Span,
}

/// `package a.b.c;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDecl {
    /// The package path.
    pub name: QualifiedIdent,
    /// Source span.
    pub span: Span,
}

/// A dotted identifier path such as `java.util.Map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedIdent {
    /// Segments from left to right; never empty.
    pub segments: Vec<Name>,
    /// Source span.
    pub span: Span,
}

/// An `import` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    /// `import static ...`
    pub is_static: bool,
    /// Imported path, without the trailing `.*`.
    pub path: QualifiedIdent,
    /// `true` for `import a.b.*;`
    pub on_demand: bool,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Type declarations
// ============================================================================

/// The flavor of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDeclKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `@interface`
    Annotation,
    /// `record`
    Record,
}

/// A class, interface, enum, annotation type or record declaration.
///
/// The anonymous class body of an enum constant is also a `TypeDecl`, with
/// `name == None` and kind [`TypeDeclKind::Class`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declaration flavor.
    pub kind: TypeDeclKind,
    /// Simple name; `None` only for enum-constant bodies.
    pub name: Option<Name>,
    /// Span of the name token (or of the body for anonymous declarations).
    pub name_span: Span,
    /// Declared modifiers, annotations excluded.
    pub modifiers: Vec<Modifier>,
    /// Type parameters.
    pub type_params: Vec<TypeParam>,
    /// The `extends` list: at most one entry for classes, any number for interfaces.
    pub extends: Vec<TypeRef>,
    /// The `implements` list.
    pub implements: Vec<TypeRef>,
    /// Members in declaration order.
    pub members: Vec<Member>,
    /// Source span.
    pub span: Span,
}

impl TypeDecl {
    /// Returns `true` for the anonymous body of an enum constant.
    pub fn is_enum_constant_body(&self) -> bool {
        self.name.is_none()
    }

    /// Returns `true` if `modifier` was declared.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Member type declarations in declaration order.
    pub fn member_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(decl) => Some(decl),
            _ => None,
        })
    }

    /// Enum constants in declaration order.
    pub fn enum_constants(&self) -> impl Iterator<Item = &EnumConstant> {
        self.members.iter().filter_map(|m| match m {
            Member::EnumConstant(constant) => Some(constant),
            _ => None,
        })
    }

    /// Field declarations in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }
}

/// A member of a type body that is visible in an ABI stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Member {
    /// A nested type declaration.
    Type(TypeDecl),
    /// A field declaration, possibly declaring several variables.
    Field(FieldDecl),
    /// An enum constant.
    EnumConstant(EnumConstant),
}

/// `private static final int A = 1, B[] = {};`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Declared modifiers.
    pub modifiers: Vec<Modifier>,
    /// The declared base type, before any per-declarator dimensions.
    pub ty: TypeRef,
    /// One entry per declared variable.
    pub declarators: Vec<VarDeclarator>,
    /// Source span.
    pub span: Span,
}

/// A single variable in a field declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDeclarator {
    /// Variable name.
    pub name: Name,
    /// Extra array dimensions written after the name (`int a[][]`).
    pub dims: u32,
    /// Span of the name.
    pub span: Span,
}

/// An enum constant, with its anonymous body if it declares one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Constant name.
    pub name: Name,
    /// `A { ... }` body; always nameless.
    pub body: Option<Box<TypeDecl>>,
    /// Source span.
    pub span: Span,
}

/// A declaration modifier. Serialized as its source keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modifier {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `abstract`
    Abstract,
    /// `static`
    Static,
    /// `final`
    Final,
    /// `sealed`
    Sealed,
    /// `non-sealed`
    NonSealed,
    /// `transient`
    Transient,
    /// `volatile`
    Volatile,
    /// `synchronized`
    Synchronized,
    /// `native`
    Native,
    /// `strictfp`
    Strictfp,
    /// `default`
    Default,
}

impl Modifier {
    /// The modifier's source keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
        }
    }
}

/// `T extends Comparable<T> & Serializable`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParam {
    /// Parameter name.
    pub name: Name,
    /// Bounds in declaration order.
    pub bounds: Vec<TypeRef>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Type references
// ============================================================================

/// A primitive type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
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
}

impl PrimitiveType {
    /// The type's source keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

/// A reference to a type as written in source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeRef {
    /// A primitive type.
    Primitive(PrimitiveType, Span),
    /// `void`
    Void(Span),
    /// A (possibly qualified, possibly parameterized) class or interface type.
    Class(ClassTypeRef),
    /// `T[]`
    Array(Box<TypeRef>, Span),
    /// `?`, `? extends T` or `? super T`; only valid as a type argument.
    Wildcard {
        /// The bound, if any.
        bound: Option<WildcardBound>,
        /// Source span.
        span: Span,
    },
    /// Produced during error recovery.
    Error(Span),
}

impl TypeRef {
    /// Source span of the reference.
    pub fn span(&self) -> Span {
        match self {
            TypeRef::Primitive(_, span)
            | TypeRef::Void(span)
            | TypeRef::Array(_, span)
            | TypeRef::Wildcard { span, .. }
            | TypeRef::Error(span) => *span,
            TypeRef::Class(class) => class.span,
        }
    }
}

/// `java.util.Map.Entry<K, V>` or `Outer<A>.Inner<B>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTypeRef {
    /// Path segments, each with the type arguments written after it.
    pub segments: Vec<ClassTypeSegment>,
    /// Source span.
    pub span: Span,
}

impl ClassTypeRef {
    /// Segment names in order.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.segments.iter().map(|s| s.name)
    }

    /// Type arguments of the last segment.
    pub fn type_args(&self) -> &[TypeRef] {
        self.segments.last().map_or(&[], |s| s.type_args.as_slice())
    }
}

/// One segment of a class type path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTypeSegment {
    /// Segment identifier.
    pub name: Name,
    /// Type arguments; empty when none were written.
    pub type_args: Vec<TypeRef>,
}

/// The bound of a wildcard type argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildcardBound {
    /// Upper (`extends`) or lower (`super`).
    pub kind: BoundKind,
    /// The bounding type.
    pub ty: Box<TypeRef>,
}

/// Direction of a wildcard bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    /// `? extends T`
    Extends,
    /// `? super T`
    Super,
}
