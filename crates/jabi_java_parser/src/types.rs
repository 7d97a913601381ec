//! Type references, type arguments and type parameters.

use crate::ast::*;
use crate::parser::JavaParser;
use crate::token::JavaToken;

impl JavaParser<'_> {
    /// Parses a type: primitive, `void`, or class type, followed by any `[]`.
    ///
    /// Leading type annotations are skipped. On failure an error is reported
    /// and [`TypeRef::Error`] is returned without consuming the bad token.
    pub(crate) fn parse_type(&mut self) -> TypeRef {
        self.skip_annotations();
        let start = self.current_span();
        let mut ty = match self.current() {
            JavaToken::Identifier => TypeRef::Class(self.parse_class_type()),
            JavaToken::Void => {
                self.advance();
                TypeRef::Void(start)
            }
            kind if kind.is_primitive() => {
                let prim = primitive_of(kind);
                self.advance();
                TypeRef::Primitive(prim, start)
            }
            _ => {
                self.expected("type");
                return TypeRef::Error(start);
            }
        };
        while self.at(JavaToken::LeftBracket) && self.peek_kind(1) == JavaToken::RightBracket {
            self.advance();
            self.advance();
            ty = TypeRef::Array(Box::new(ty), self.span_from(start));
        }
        ty
    }

    /// Parses `a.b.C<X>.D<Y>`.
    pub(crate) fn parse_class_type(&mut self) -> ClassTypeRef {
        let start = self.current_span();
        let mut segments = Vec::new();
        loop {
            let name = self.expect_ident();
            let type_args = if self.at(JavaToken::Less) {
                self.parse_type_args()
            } else {
                Vec::new()
            };
            segments.push(ClassTypeSegment { name, type_args });

            if self.at(JavaToken::Dot)
                && matches!(self.peek_kind(1), JavaToken::Identifier | JavaToken::At)
            {
                self.advance();
                self.skip_annotations();
            } else {
                break;
            }
        }
        ClassTypeRef {
            segments,
            span: self.span_from(start),
        }
    }

    /// Parses `<A, ? extends B, ? super C>`. The diamond `<>` yields no arguments.
    fn parse_type_args(&mut self) -> Vec<TypeRef> {
        let mut args = Vec::new();
        self.expect(JavaToken::Less);
        if self.eat(JavaToken::Greater) {
            return args;
        }
        loop {
            args.push(self.parse_type_arg());
            if !self.eat(JavaToken::Comma) {
                break;
            }
        }
        self.expect(JavaToken::Greater);
        args
    }

    fn parse_type_arg(&mut self) -> TypeRef {
        self.skip_annotations();
        if !self.at(JavaToken::Question) {
            return self.parse_type();
        }
        let start = self.current_span();
        self.advance();
        let kind = if self.eat(JavaToken::Extends) {
            Some(BoundKind::Extends)
        } else if self.eat(JavaToken::Super) {
            Some(BoundKind::Super)
        } else {
            None
        };
        let bound = kind.map(|kind| WildcardBound {
            kind,
            ty: Box::new(self.parse_type()),
        });
        TypeRef::Wildcard {
            bound,
            span: self.span_from(start),
        }
    }

    /// Parses `<T, U extends A & B>`.
    pub(crate) fn parse_type_params(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        self.expect(JavaToken::Less);
        loop {
            self.skip_annotations();
            let start = self.current_span();
            let name = self.expect_ident();
            let mut bounds = Vec::new();
            if self.eat(JavaToken::Extends) {
                bounds.push(self.parse_type());
                while self.eat(JavaToken::Ampersand) {
                    bounds.push(self.parse_type());
                }
            }
            params.push(TypeParam {
                name,
                bounds,
                span: self.span_from(start),
            });
            if !self.eat(JavaToken::Comma) {
                break;
            }
        }
        self.expect(JavaToken::Greater);
        params
    }

    /// Parses a comma-separated list of types.
    pub(crate) fn parse_type_list(&mut self) -> Vec<TypeRef> {
        let mut types = vec![self.parse_type()];
        while self.eat(JavaToken::Comma) {
            types.push(self.parse_type());
        }
        types
    }
}

fn primitive_of(kind: JavaToken) -> PrimitiveType {
    match kind {
        JavaToken::Boolean => PrimitiveType::Boolean,
        JavaToken::Byte => PrimitiveType::Byte,
        JavaToken::Short => PrimitiveType::Short,
        JavaToken::Long => PrimitiveType::Long,
        JavaToken::Char => PrimitiveType::Char,
        JavaToken::Float => PrimitiveType::Float,
        JavaToken::Double => PrimitiveType::Double,
        _ => PrimitiveType::Int,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;
    use jabi_common::NameTable;

    fn field_type(decl: &str, names: &NameTable) -> TypeRef {
        let source = format!("class T {{ {decl} }}");
        let (mut unit, errors) = parse_source(&source, names);
        assert!(errors.is_empty(), "{errors:?}");
        let ty = unit.types.remove(0);
        let field = ty.fields().next().cloned().unwrap();
        field.ty
    }

    #[test]
    fn primitives_and_arrays() {
        let names = NameTable::new();
        assert!(matches!(
            field_type("long x;", &names),
            TypeRef::Primitive(PrimitiveType::Long, _)
        ));
        match field_type("char[][] x;", &names) {
            TypeRef::Array(inner, _) => match *inner {
                TypeRef::Array(elem, _) => {
                    assert!(matches!(*elem, TypeRef::Primitive(PrimitiveType::Char, _)))
                }
                other => panic!("expected nested array, got {other:?}"),
            },
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn qualified_parameterized_class() {
        let names = NameTable::new();
        let TypeRef::Class(class) = field_type("java.util.Map.Entry<String, int[]> e;", &names) else {
            panic!("expected class type");
        };
        let path: Vec<_> = class.names().map(|n| names.resolve(n)).collect();
        assert_eq!(path, ["java", "util", "Map", "Entry"]);
        assert_eq!(class.type_args().len(), 2);
        assert!(matches!(class.type_args()[1], TypeRef::Array(..)));
    }

    #[test]
    fn inner_class_of_parameterized_outer() {
        let names = NameTable::new();
        let TypeRef::Class(class) = field_type("Outer<String>.Inner<Integer> x;", &names) else {
            panic!("expected class type");
        };
        assert_eq!(class.segments.len(), 2);
        assert_eq!(class.segments[0].type_args.len(), 1);
        assert_eq!(class.segments[1].type_args.len(), 1);
    }

    #[test]
    fn wildcards() {
        let names = NameTable::new();
        let TypeRef::Class(class) =
            field_type("Map<?, ? extends Number> m; ", &names)
        else {
            panic!("expected class type");
        };
        let args = class.type_args();
        assert!(matches!(args[0], TypeRef::Wildcard { bound: None, .. }));
        match &args[1] {
            TypeRef::Wildcard {
                bound: Some(bound), ..
            } => assert_eq!(bound.kind, BoundKind::Extends),
            other => panic!("expected bounded wildcard, got {other:?}"),
        }

        let TypeRef::Class(class) = field_type("Comparator<? super T> c;", &names) else {
            panic!("expected class type");
        };
        match &class.type_args()[0] {
            TypeRef::Wildcard {
                bound: Some(bound), ..
            } => assert_eq!(bound.kind, BoundKind::Super),
            other => panic!("expected lower-bounded wildcard, got {other:?}"),
        }
    }

    #[test]
    fn nested_type_args_close() {
        let names = NameTable::new();
        let TypeRef::Class(class) = field_type("List<List<List<String>>> deep;", &names) else {
            panic!("expected class type");
        };
        assert_eq!(class.type_args().len(), 1);
    }

    #[test]
    fn type_params_with_intersection_bounds() {
        let names = NameTable::new();
        let (unit, errors) = parse_source(
            "class C<K, V extends Comparable<? super V> & java.io.Serializable> {}",
            &names,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let params = &unit.types[0].type_params;
        assert_eq!(params.len(), 2);
        assert!(params[0].bounds.is_empty());
        assert_eq!(params[1].bounds.len(), 2);
    }

    #[test]
    fn type_annotations_are_skipped() {
        let names = NameTable::new();
        let TypeRef::Class(class) = field_type("java.lang.@NonNull String s;", &names) else {
            panic!("expected class type");
        };
        assert_eq!(class.segments.len(), 3);
    }

    #[test]
    fn missing_type_reports() {
        let names = NameTable::new();
        let (_, errors) = parse_source("class C extends {}", &names);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("expected type"));
    }
}
