//! Type declarations and their members.
//!
//! Handles class, interface, enum, annotation type and record headers, member
//! types, fields and enum constants. Methods, constructors and initializer
//! blocks are recognized and skipped; they contribute nothing to the tree.
//!
//! **Member detection:** after modifiers, a type followed by an identifier and
//! `(` is a method; an identifier directly followed by `(` is a constructor;
//! anything else that starts with a type is a field declaration.

use crate::ast::*;
use crate::parser::JavaParser;
use crate::token::JavaToken;
use jabi_source::Span;

impl JavaParser<'_> {
    /// Returns `true` at the keyword that starts a type declaration.
    pub(crate) fn at_type_decl_start(&self) -> bool {
        match self.current() {
            JavaToken::Class | JavaToken::Interface | JavaToken::Enum => true,
            JavaToken::At => self.peek_kind(1) == JavaToken::Interface,
            JavaToken::Identifier => self.at_record_start(),
            _ => false,
        }
    }

    fn at_record_start(&self) -> bool {
        self.at_word("record")
            && self.peek_kind(1) == JavaToken::Identifier
            && matches!(self.peek_kind(2), JavaToken::LeftParen | JavaToken::Less)
    }

    /// Parses modifiers and annotations, then a type declaration. Returns
    /// `None` without reporting if no declaration keyword follows.
    pub(crate) fn parse_type_decl_with_modifiers(&mut self) -> Option<TypeDecl> {
        let start = self.current_span();
        let modifiers = self.parse_modifiers();
        if !self.at_type_decl_start() {
            return None;
        }
        Some(self.parse_type_decl(modifiers, start))
    }

    /// Parses modifier keywords, `sealed`/`non-sealed`, and skips annotations.
    pub(crate) fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.current() {
                JavaToken::At if self.at_annotation() => {
                    self.skip_annotation();
                    continue;
                }
                JavaToken::Public => Modifier::Public,
                JavaToken::Protected => Modifier::Protected,
                JavaToken::Private => Modifier::Private,
                JavaToken::Abstract => Modifier::Abstract,
                JavaToken::Static => Modifier::Static,
                JavaToken::Final => Modifier::Final,
                JavaToken::Transient => Modifier::Transient,
                JavaToken::Volatile => Modifier::Volatile,
                JavaToken::Synchronized => Modifier::Synchronized,
                JavaToken::Native => Modifier::Native,
                JavaToken::Strictfp => Modifier::Strictfp,
                JavaToken::Default => Modifier::Default,
                JavaToken::Identifier if self.at_word("sealed") && self.modifier_follows(1) => {
                    Modifier::Sealed
                }
                JavaToken::Identifier
                    if self.at_word("non")
                        && self.peek_kind(1) == JavaToken::Minus
                        && self.text_at(2) == "sealed"
                        && self.modifier_follows(3) =>
                {
                    self.advance();
                    self.advance();
                    Modifier::NonSealed
                }
                _ => return modifiers,
            };
            self.advance();
            if !modifiers.contains(&modifier) {
                modifiers.push(modifier);
            }
        }
    }

    /// Contextual modifiers only count when a declaration continues after them.
    fn modifier_follows(&self, offset: usize) -> bool {
        let next = self.peek_kind(offset);
        next.is_modifier()
            || matches!(
                next,
                JavaToken::Class | JavaToken::Interface | JavaToken::At
            )
    }

    fn parse_type_decl(&mut self, modifiers: Vec<Modifier>, start: Span) -> TypeDecl {
        let kind = match self.current() {
            JavaToken::Class => TypeDeclKind::Class,
            JavaToken::Interface => TypeDeclKind::Interface,
            JavaToken::Enum => TypeDeclKind::Enum,
            JavaToken::At => {
                self.advance();
                TypeDeclKind::Annotation
            }
            _ => TypeDeclKind::Record,
        };
        self.advance();

        let name_span = self.current_span();
        let name = Some(self.expect_ident());
        let type_params = if self.at(JavaToken::Less) {
            self.parse_type_params()
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut members = Vec::new();

        if kind == TypeDeclKind::Record {
            members.extend(self.parse_record_components().into_iter().map(Member::Field));
        }
        if self.eat(JavaToken::Extends) {
            match kind {
                TypeDeclKind::Class => extends.push(self.parse_type()),
                TypeDeclKind::Interface => extends = self.parse_type_list(),
                _ => {
                    self.error("only classes and interfaces may have an `extends` clause");
                    self.parse_type_list();
                }
            }
        }
        if self.eat(JavaToken::Implements) {
            implements = self.parse_type_list();
            if matches!(kind, TypeDeclKind::Interface | TypeDeclKind::Annotation) {
                self.error("interfaces cannot have an `implements` clause");
            }
        }
        if self.at_word("permits") {
            self.advance();
            self.parse_type_list();
        }

        if kind == TypeDeclKind::Enum {
            members.extend(self.parse_enum_body());
        } else {
            members.extend(self.parse_class_body());
        }

        TypeDecl {
            kind,
            name,
            name_span,
            modifiers,
            type_params,
            extends,
            implements,
            members,
            span: self.span_from(start),
        }
    }

    /// Record components become `private final` fields.
    fn parse_record_components(&mut self) -> Vec<FieldDecl> {
        let mut fields = Vec::new();
        self.expect(JavaToken::LeftParen);
        while !self.at(JavaToken::RightParen) && !self.at_eof() {
            let start = self.current_span();
            self.skip_annotations();
            let mut ty = self.parse_type();
            if self.eat(JavaToken::Ellipsis) {
                ty = TypeRef::Array(Box::new(ty), self.span_from(start));
            }
            let name_span = self.current_span();
            let name = self.expect_ident();
            fields.push(FieldDecl {
                modifiers: vec![Modifier::Private, Modifier::Final],
                ty,
                declarators: vec![VarDeclarator {
                    name,
                    dims: 0,
                    span: name_span,
                }],
                span: self.span_from(start),
            });
            if !self.eat(JavaToken::Comma) {
                break;
            }
        }
        self.expect(JavaToken::RightParen);
        fields
    }

    /// Parses `{ members }`.
    fn parse_class_body(&mut self) -> Vec<Member> {
        let mut members = Vec::new();
        self.expect(JavaToken::LeftBrace);
        self.parse_members_until_close(&mut members);
        self.expect(JavaToken::RightBrace);
        members
    }

    fn parse_members_until_close(&mut self, members: &mut Vec<Member>) {
        while !self.at(JavaToken::RightBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(member) = self.parse_member() {
                members.push(member);
            }
            if self.pos == before {
                self.advance();
            }
        }
    }

    fn parse_member(&mut self) -> Option<Member> {
        match self.current() {
            JavaToken::Semicolon => {
                self.advance();
                return None;
            }
            JavaToken::LeftBrace => {
                self.skip_balanced(JavaToken::LeftBrace, JavaToken::RightBrace);
                return None;
            }
            JavaToken::Static if self.peek_kind(1) == JavaToken::LeftBrace => {
                self.advance();
                self.skip_balanced(JavaToken::LeftBrace, JavaToken::RightBrace);
                return None;
            }
            _ => {}
        }

        let start = self.current_span();
        let modifiers = self.parse_modifiers();

        if self.at_type_decl_start() {
            return Some(Member::Type(self.parse_type_decl(modifiers, start)));
        }
        if self.at(JavaToken::Less) {
            // Generic method or constructor.
            self.skip_balanced(JavaToken::Less, JavaToken::Greater);
            self.skip_method_or_constructor();
            return None;
        }
        if self.at(JavaToken::Identifier) {
            match self.peek_kind(1) {
                JavaToken::LeftParen => {
                    self.skip_method_or_constructor();
                    return None;
                }
                // Compact canonical constructor of a record.
                JavaToken::LeftBrace => {
                    self.advance();
                    self.skip_balanced(JavaToken::LeftBrace, JavaToken::RightBrace);
                    return None;
                }
                _ => {}
            }
        }

        let ty = self.parse_type();
        if matches!(ty, TypeRef::Error(_)) {
            self.recover_member();
            return None;
        }
        if self.at(JavaToken::Identifier) && self.peek_kind(1) == JavaToken::LeftParen {
            self.skip_method_or_constructor();
            return None;
        }
        Some(Member::Field(self.parse_field_rest(modifiers, ty, start)))
    }

    /// Skips `[type] name(params) [dims] [throws ...] [default value] (body | ;)`.
    fn skip_method_or_constructor(&mut self) {
        loop {
            match self.current() {
                JavaToken::LeftParen => {
                    self.skip_balanced(JavaToken::LeftParen, JavaToken::RightParen);
                }
                JavaToken::LeftBrace => {
                    self.skip_balanced(JavaToken::LeftBrace, JavaToken::RightBrace);
                    return;
                }
                JavaToken::Semicolon => {
                    self.advance();
                    return;
                }
                JavaToken::Default => {
                    self.advance();
                    self.skip_expression();
                    self.expect(JavaToken::Semicolon);
                    return;
                }
                JavaToken::Eof | JavaToken::RightBrace => {
                    self.expected("method body or `;`");
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    fn parse_field_rest(&mut self, modifiers: Vec<Modifier>, ty: TypeRef, start: Span) -> FieldDecl {
        let mut declarators = Vec::new();
        loop {
            let span = self.current_span();
            let name = self.expect_ident();
            let mut dims = 0;
            while self.at(JavaToken::LeftBracket) && self.peek_kind(1) == JavaToken::RightBracket {
                self.advance();
                self.advance();
                dims += 1;
            }
            declarators.push(VarDeclarator { name, dims, span });
            if self.eat(JavaToken::Assign) {
                self.skip_expression();
            }
            if !self.eat(JavaToken::Comma) {
                break;
            }
        }
        if !self.eat(JavaToken::Semicolon) {
            self.expected("`;` after field declaration");
            self.recover_member();
        }
        FieldDecl {
            modifiers,
            ty,
            declarators,
            span: self.span_from(start),
        }
    }

    /// Skips an initializer or default value up to a `;` or a declarator
    /// separating `,` at nesting depth zero. Neither is consumed.
    fn skip_expression(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                JavaToken::Eof => return,
                JavaToken::LeftParen | JavaToken::LeftBrace | JavaToken::LeftBracket => depth += 1,
                JavaToken::RightParen | JavaToken::RightBrace | JavaToken::RightBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                JavaToken::Semicolon if depth == 0 => return,
                JavaToken::Comma if depth == 0 && self.at_next_declarator() => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// At a `,` followed by `name =`, `name,`, `name;` or `name[`.
    fn at_next_declarator(&self) -> bool {
        self.peek_kind(1) == JavaToken::Identifier
            && matches!(
                self.peek_kind(2),
                JavaToken::Assign | JavaToken::Comma | JavaToken::Semicolon | JavaToken::LeftBracket
            )
    }

    /// Parses `{ CONSTANTS [; members] }`.
    fn parse_enum_body(&mut self) -> Vec<Member> {
        let mut members = Vec::new();
        self.expect(JavaToken::LeftBrace);

        loop {
            self.skip_annotations();
            if !self.at(JavaToken::Identifier) {
                break;
            }
            members.push(Member::EnumConstant(self.parse_enum_constant()));
            if !self.eat(JavaToken::Comma) {
                break;
            }
        }

        if self.eat(JavaToken::Semicolon) {
            self.parse_members_until_close(&mut members);
        } else if !self.at(JavaToken::RightBrace) {
            self.expected("`,`, `;` or `}` in enum body");
            self.parse_members_until_close(&mut members);
        }
        self.expect(JavaToken::RightBrace);
        members
    }

    fn parse_enum_constant(&mut self) -> EnumConstant {
        let start = self.current_span();
        let name = self.expect_ident();
        if self.at(JavaToken::LeftParen) {
            self.skip_balanced(JavaToken::LeftParen, JavaToken::RightParen);
        }
        let body = if self.at(JavaToken::LeftBrace) {
            let body_start = self.current_span();
            let members = self.parse_class_body();
            Some(Box::new(TypeDecl {
                kind: TypeDeclKind::Class,
                name: None,
                name_span: body_start,
                modifiers: Vec::new(),
                type_params: Vec::new(),
                extends: Vec::new(),
                implements: Vec::new(),
                members,
                span: self.span_from(body_start),
            }))
        } else {
            None
        };
        EnumConstant {
            name,
            body,
            span: self.span_from(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;
    use jabi_common::NameTable;

    fn parse_ok(source: &str, names: &NameTable) -> CompilationUnit {
        let (unit, errors) = parse_source(source, names);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        unit
    }

    fn single_type(source: &str, names: &NameTable) -> TypeDecl {
        let mut unit = parse_ok(source, names);
        assert_eq!(unit.types.len(), 1);
        unit.types.remove(0)
    }

    #[test]
    fn class_header() {
        let names = NameTable::new();
        let decl = single_type(
            "public abstract class Foo<T extends Comparable<T>> extends Bar implements A, B<T> {}",
            &names,
        );
        assert_eq!(decl.kind, TypeDeclKind::Class);
        assert_eq!(names.resolve(decl.name.unwrap()), "Foo");
        assert_eq!(decl.modifiers, vec![Modifier::Public, Modifier::Abstract]);
        assert_eq!(decl.type_params.len(), 1);
        assert_eq!(decl.type_params[0].bounds.len(), 1);
        assert_eq!(decl.extends.len(), 1);
        assert_eq!(decl.implements.len(), 2);
        assert!(!decl.is_enum_constant_body());
    }

    #[test]
    fn interface_extends_many() {
        let names = NameTable::new();
        let decl = single_type("interface I extends A, B, C {}", &names);
        assert_eq!(decl.kind, TypeDeclKind::Interface);
        assert_eq!(decl.extends.len(), 3);
        assert!(decl.implements.is_empty());
    }

    #[test]
    fn annotation_type() {
        let names = NameTable::new();
        let decl = single_type(
            "@Retention(RUNTIME) public @interface Marker { String value() default \"x\"; int[] n() default {1, 2}; }",
            &names,
        );
        assert_eq!(decl.kind, TypeDeclKind::Annotation);
        assert_eq!(decl.modifiers, vec![Modifier::Public]);
        assert!(decl.members.is_empty());
    }

    #[test]
    fn record_components_become_fields() {
        let names = NameTable::new();
        let decl = single_type(
            "public record Point<T>(int x, @Nullable T y, String... tags) implements Shape { Point { } static int z; }",
            &names,
        );
        assert_eq!(decl.kind, TypeDeclKind::Record);
        let fields: Vec<_> = decl.fields().collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].modifiers, vec![Modifier::Private, Modifier::Final]);
        assert!(matches!(fields[2].ty, TypeRef::Array(..)));
        assert_eq!(fields[3].modifiers, vec![Modifier::Static]);
        assert_eq!(decl.implements.len(), 1);
    }

    #[test]
    fn sealed_hierarchy() {
        let names = NameTable::new();
        let unit = parse_ok(
            "sealed interface S permits A, B {}\n\
             final class A implements S {}\n\
             non-sealed class B implements S {}",
            &names,
        );
        assert_eq!(unit.types[0].modifiers, vec![Modifier::Sealed]);
        assert_eq!(unit.types[2].modifiers, vec![Modifier::NonSealed]);
    }

    #[test]
    fn nested_types_and_fields() {
        let names = NameTable::new();
        let decl = single_type(
            "class Foo {\n\
                 private int a = 1, b[] = {1, 2}, c;\n\
                 static final java.util.Map<String, List<Integer>> M = new HashMap<String, List<Integer>>();\n\
                 class Bar {}\n\
                 static interface Baz {}\n\
                 enum E { X }\n\
             }",
            &names,
        );
        let fields: Vec<_> = decl.fields().collect();
        assert_eq!(fields.len(), 2);
        let declared: Vec<_> = fields[0]
            .declarators
            .iter()
            .map(|d| (names.resolve(d.name), d.dims))
            .collect();
        assert_eq!(declared, [("a", 0), ("b", 1), ("c", 0)]);
        let nested: Vec<_> = decl
            .member_types()
            .map(|t| names.resolve(t.name.unwrap()))
            .collect();
        assert_eq!(nested, ["Bar", "Baz", "E"]);
    }

    #[test]
    fn methods_constructors_and_initializers_are_skipped() {
        let names = NameTable::new();
        let decl = single_type(
            "class Foo {\n\
                 static { init(); }\n\
                 { count++; }\n\
                 Foo() { this(1); }\n\
                 Foo(int x) throws Exception { if (x > 0) { x--; } }\n\
                 public <T extends Comparable<T>> T max(T a, T b) { return a.compareTo(b) > 0 ? a : b; }\n\
                 abstract void run();\n\
                 int[] values()[] { return null; }\n\
                 String name;\n\
             }",
            &names,
        );
        assert_eq!(decl.members.len(), 1);
        assert_eq!(decl.fields().count(), 1);
    }

    #[test]
    fn field_initializer_with_lambda_and_generics() {
        let names = NameTable::new();
        let decl = single_type(
            "class Foo {\n\
                 Runnable r = () -> { System.out.println(\"a, b\"); }, s = () -> {};\n\
                 java.util.function.BiFunction<Integer, Integer, Integer> f = (a, b) -> a << b;\n\
                 boolean t = x < y, u = a > b;\n\
             }",
            &names,
        );
        let counts: Vec<_> = decl.fields().map(|f| f.declarators.len()).collect();
        assert_eq!(counts, [2, 1, 2]);
    }

    #[test]
    fn enum_constants_with_bodies() {
        let names = NameTable::new();
        let decl = single_type(
            "enum Op implements IntBinaryOperator {\n\
                 PLUS(\"+\") { public int applyAsInt(int a, int b) { return a + b; } },\n\
                 @Deprecated MINUS(\"-\") { int x; },\n\
                 NOP;\n\
                 private final String symbol;\n\
                 Op(String symbol) { this.symbol = symbol; }\n\
             }",
            &names,
        );
        assert_eq!(decl.kind, TypeDeclKind::Enum);
        assert_eq!(decl.implements.len(), 1);
        let constants: Vec<_> = decl.enum_constants().collect();
        assert_eq!(constants.len(), 3);
        let plus = constants[0].body.as_ref().unwrap();
        assert!(plus.is_enum_constant_body());
        assert!(plus.members.is_empty());
        assert_eq!(constants[1].body.as_ref().unwrap().fields().count(), 1);
        assert!(constants[2].body.is_none());
        assert_eq!(decl.fields().count(), 1);
    }

    #[test]
    fn enum_trailing_comma() {
        let names = NameTable::new();
        let decl = single_type("enum E { A, B, }", &names);
        assert_eq!(decl.enum_constants().count(), 2);
        let decl = single_type("enum E { A, B, ; int x; }", &names);
        assert_eq!(decl.enum_constants().count(), 2);
        assert_eq!(decl.fields().count(), 1);
    }

    #[test]
    fn member_error_recovers() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("class A { int = 3; int ok; }", &names);
        assert!(!errors.is_empty());
        assert_eq!(unit.types[0].fields().count(), 2);
    }

    #[test]
    fn record_keyword_is_contextual() {
        let names = NameTable::new();
        let decl = single_type("class A { record r; Record<String> record; }", &names);
        assert_eq!(decl.fields().count(), 2);
        assert_eq!(decl.member_types().count(), 0);
    }
}
