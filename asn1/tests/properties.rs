use asn1::{ast::*, parse, parse_with, DiagnosticKind, Features, LineCommentEnd};
use rstest::rstest;

fn module(body: &str) -> ModuleDefinition {
    let (mut ast, diagnostics) = parse(&format!("M DEFINITIONS ::= BEGIN {body} END"));
    assert_eq!(diagnostics, vec![], "{body}");
    assert_eq!(ast.modules.len(), 1);
    ast.modules.remove(0)
}

fn range(lower: EndpointValue, upper: EndpointValue) -> Constraint {
    Constraint {
        spec: ConstraintSpec::Subtype(ElementSetSpecs {
            root: Some(ElementSetSpec::Unions(vec![Intersection(vec![
                IntersectionElement {
                    elements: Elements::Subtype(SubtypeElement::ValueRange {
                        lower: RangeEndpoint {
                            value: lower,
                            open: false,
                        },
                        upper: RangeEndpoint {
                            value: upper,
                            open: false,
                        },
                    }),
                    except: None,
                },
            ])])),
            extensible: false,
            additional: None,
        }),
        exception: None,
    }
}

#[rstest]
#[case("Empty DEFINITIONS ::= BEGIN END", "Empty")]
#[case("Tagged DEFINITIONS AUTOMATIC TAGS ::= BEGIN T ::= BOOLEAN END", "Tagged")]
#[case("With-Oid { iso standard 8824 } DEFINITIONS ::= BEGIN v INTEGER ::= 1 END", "With-Oid")]
#[case(
    "Extensible DEFINITIONS EXPLICIT TAGS EXTENSIBILITY IMPLIED ::= BEGIN END",
    "Extensible"
)]
fn valid_modules_have_no_diagnostics(#[case] source: &str, #[case] name: &str) {
    let (ast, diagnostics) = parse(source);
    assert_eq!(diagnostics, vec![]);
    assert_eq!(ast.modules.len(), 1);
    assert_eq!(ast.modules[0].identifier.name, name);
}

#[test]
fn several_modules_in_one_source() {
    let (ast, diagnostics) = parse(
        "A DEFINITIONS ::= BEGIN T ::= INTEGER END
         B DEFINITIONS ::= BEGIN U ::= BOOLEAN END",
    );
    assert_eq!(diagnostics, vec![]);
    let names: Vec<_> = ast.modules.iter().map(|m| m.identifier.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn names_are_told_apart_by_case() {
    let module = module("Foo-Type ::= INTEGER foo-value Foo-Type ::= 5");
    assert_eq!(module.assignments.len(), 2);

    assert_eq!(module.assignments[0].name, "Foo-Type");
    assert_eq!(
        module.assignments[0].kind,
        AssignmentKind::Type(Type::new(TypeKind::Integer(vec![])))
    );

    assert_eq!(module.assignments[1].name, "foo-value");
    assert_eq!(
        module.assignments[1].kind,
        AssignmentKind::Value {
            governor: Type::new(TypeKind::Referenced(Reference::local("Foo-Type"))),
            value: Value::Integer(5),
        }
    );
}

#[test]
fn extension_additions_are_kept_apart_from_the_root() {
    let module = module("T ::= SEQUENCE { a INTEGER, ..., b BOOLEAN }");
    let AssignmentKind::Type(Type {
        kind: TypeKind::Sequence(lists),
        ..
    }) = &module.assignments[0].kind
    else {
        panic!("not a sequence");
    };

    assert_eq!(
        lists.root,
        vec![ComponentType::Named {
            name: "a".into(),
            ty: Type::new(TypeKind::Integer(vec![])),
            presence: None,
        }]
    );
    let extension = lists.extension.as_ref().expect("extension");
    assert_eq!(
        extension.additions,
        vec![ExtensionAddition::Single(ComponentType::Named {
            name: "b".into(),
            ty: Type::new(TypeKind::Boolean),
            presence: None,
        })]
    );
    assert!(!extension.end_marker);
    assert!(lists.trailing_root.is_empty());
}

#[rstest]
#[case("(1..10)", EndpointValue::Value(Value::Integer(1)), EndpointValue::Value(Value::Integer(10)))]
#[case("(1..MAX)", EndpointValue::Value(Value::Integer(1)), EndpointValue::Max)]
#[case("(MIN..0)", EndpointValue::Min, EndpointValue::Value(Value::Integer(0)))]
fn value_ranges(#[case] text: &str, #[case] lower: EndpointValue, #[case] upper: EndpointValue) {
    let module = module(&format!("T ::= INTEGER {text}"));
    let AssignmentKind::Type(ty) = &module.assignments[0].kind else {
        panic!("not a type");
    };
    assert_eq!(ty.kind, TypeKind::Integer(vec![]));
    assert_eq!(ty.constraints, vec![range(lower, upper)]);
}

#[test]
fn objects_are_matched_against_the_class_syntax() {
    let module = module(
        "MY-CLASS ::= CLASS { &id INTEGER UNIQUE, &Type }
             WITH SYNTAX { ID &id TYPE &Type }
         obj MY-CLASS ::= { ID 5 TYPE BOOLEAN }",
    );

    let AssignmentKind::Object { class, object } = &module.assignments[1].kind else {
        panic!("not an object");
    };
    assert_eq!(class, &DefinedObjectClass::Reference(Reference::local("MY-CLASS")));
    assert_eq!(object.setting("&id"), Some(&Setting::Value(Value::Integer(5))));
    assert_eq!(
        object.setting("&Type"),
        Some(&Setting::Type(Type::new(TypeKind::Boolean)))
    );
}

#[test]
fn objects_out_of_order_do_not_match() {
    let (ast, diagnostics) = parse(
        "M DEFINITIONS ::= BEGIN
         MY-CLASS ::= CLASS { &id INTEGER UNIQUE, &Type }
             WITH SYNTAX { ID &id TYPE &Type }
         obj MY-CLASS ::= { TYPE BOOLEAN ID 5 }
         END",
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::SyntaxMatch);
    assert_eq!(ast.modules[0].assignments.len(), 1);
}

#[test]
fn parsing_continues_after_a_missing_comma() {
    let source = "M DEFINITIONS ::= BEGIN
        T ::= SEQUENCE { a INTEGER b BOOLEAN }
        U ::= BOOLEAN
        END";
    let (ast, diagnostics) = parse(source);

    assert_eq!(diagnostics.len(), 1);
    let diag = &diagnostics[0];
    assert_eq!(diag.kind, DiagnosticKind::Structural);
    assert_eq!(&source[diag.location.clone()], "b");
    assert!(diag.expected.contains(&"`,`".to_string()));
    assert!(diag.expected.contains(&"`}`".to_string()));
    assert_eq!(diag.start.line, 2);

    let names: Vec<_> = ast.modules[0].assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["U"]);
}

#[test]
fn nested_optional_groups_do_not_hide_later_assignments() {
    let module = module(
        "OP ::= CLASS { &code INTEGER UNIQUE, &Arg OPTIONAL, &Res OPTIONAL }
             WITH SYNTAX { CODE &code [ARGUMENT &Arg [RESULT &Res]] }
         op OP ::= { CODE 1 ARGUMENT BOOLEAN RESULT NULL }
         T ::= INTEGER",
    );
    let names: Vec<_> = module.assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["OP", "op", "T"]);

    let AssignmentKind::Object { object, .. } = &module.assignments[1].kind else {
        panic!("not an object");
    };
    assert_eq!(
        object.setting("&Res"),
        Some(&Setting::Type(Type::new(TypeKind::Null)))
    );
}

#[test]
fn unclosed_brace_costs_only_its_own_assignment() {
    let (ast, diagnostics) = parse(
        "M DEFINITIONS ::= BEGIN
        T ::= SEQUENCE { a INTEGER
        U ::= BOOLEAN
        V ::= NULL
        END",
    );
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Structural);

    let names: Vec<_> = ast.modules[0].assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["U", "V"]);
}

#[test]
fn trailing_tokens_do_not_swallow_the_next_header() {
    let (ast, diagnostics) = parse(
        "M DEFINITIONS ::= BEGIN
        T ::= INTEGER oops oops
        U ::= BOOLEAN
        V ::= NULL
        END",
    );
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");

    let names: Vec<_> = ast.modules[0].assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["U", "V"]);
}

#[test]
fn xml_free_text_does_not_hide_later_assignments() {
    let module = module(
        "a ::= <T>it's</T>
         b ::= <T>\"quoted</T>
         c ::= <T>END</T>
         U ::= INTEGER",
    );
    let names: Vec<_> = module.assignments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "U"]);
}

#[test]
fn integers_are_unbounded() {
    let module = module("big INTEGER ::= 123456789012345678901234567890123456789012345");
    assert_eq!(
        module.assignments[0].kind,
        AssignmentKind::Value {
            governor: Type::new(TypeKind::Integer(vec![])),
            value: Value::LargeInteger("123456789012345678901234567890123456789012345".into()),
        }
    );
}

#[test]
fn broken_modules_do_not_hide_later_ones() {
    let (ast, diagnostics) = parse(
        "A DEFINITIONS ::= BEGIN IMPORTS T FROM END
         B DEFINITIONS ::= BEGIN U ::= BOOLEAN END",
    );
    assert!(!diagnostics.is_empty());
    assert!(ast.modules.iter().any(|m| m.identifier.name == "B"));
}

#[test]
fn imported_symbols() {
    let module = module("IMPORTS Foo, bar FROM Other-Module; v Foo ::= 1");
    let imports = module.imports.expect("imports");
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].module.name, "Other-Module");
    assert_eq!(imports[0].module.assigned_identifier, None);

    let names: Vec<_> = imports[0].symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Foo", "bar"]);

    assert_eq!(module.assignments[0].name, "v");
}

#[rstest]
#[case("T ::= SEQUENCE { a INTEGER (1..5, ...) OPTIONAL, b BOOLEAN DEFAULT TRUE }")]
#[case("T ::= CHOICE { a [0] IMPLICIT OCTET STRING, ..., b UTF8String (SIZE (1..4)) }")]
#[case("E ::= ENUMERATED { red, green (5), ..., blue } e E ::= green")]
#[case("oid OBJECT IDENTIFIER ::= { iso(1) member-body(2) 840 }")]
#[case(
    "ID ::= CLASS { &id INTEGER UNIQUE, &Type } WITH SYNTAX { ID &id [TYPE &Type] }
     Set ID ::= { { ID 1 TYPE BOOLEAN } | { ID 2 }, ... }
     Msg ::= SEQUENCE { id ID.&id ({Set}), val ID.&Type ({Set}{@id}) }"
)]
#[case("Wrapper { Inner } ::= SEQUENCE { value Inner } W ::= Wrapper { INTEGER }")]
#[case(
    "OP ::= CLASS { &code INTEGER, &Arg OPTIONAL, &Res OPTIONAL }
         WITH SYNTAX { CODE &code [ARGUMENT &Arg [RESULT &Res]] }
     T ::= INTEGER"
)]
#[case("v ::= <Pair><a>007</a><b>it's</b></Pair> w ::= <BIT_STRING>0011</BIT_STRING>")]
#[case("big INTEGER ::= -123456789012345678901234567890123456789012345")]
fn printing_is_idempotent(#[case] body: &str) {
    let source = format!("M DEFINITIONS AUTOMATIC TAGS ::= BEGIN {body} END");
    let (first, diagnostics) = parse(&source);
    assert_eq!(diagnostics, vec![], "{source}");

    let printed = first.to_string();
    let (second, diagnostics) = parse(&printed);
    assert_eq!(diagnostics, vec![], "{printed}");

    assert_eq!(second.to_string(), printed);
    assert_eq!(
        second.modules[0].assignments.len(),
        first.modules[0].assignments.len()
    );
}

#[test]
fn comments_may_end_with_hyphens() {
    let source = "M DEFINITIONS ::= BEGIN -- note -- T ::= INTEGER\nEND";

    let (ast, diagnostics) = parse(source);
    assert_eq!(diagnostics, vec![]);
    assert!(ast.modules[0].assignments.is_empty());

    let features = Features {
        line_comments: LineCommentEnd::EndOfLineOrHyphens,
        ..Features::default()
    };
    let (ast, diagnostics) = parse_with(source, &features);
    assert_eq!(diagnostics, vec![]);
    assert_eq!(ast.modules[0].assignments[0].name, "T");
}

#[test]
fn deep_nesting_is_reported() {
    let depth = 64;
    let source = format!(
        "M DEFINITIONS ::= BEGIN T ::= {}INTEGER END",
        "SEQUENCE OF ".repeat(depth)
    );
    let features = Features {
        max_depth: 32,
        ..Features::default()
    };

    let (_, diagnostics) = parse_with(&source, &features);
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::DepthExceeded));

    let (ast, diagnostics) = parse_with(
        &format!("M DEFINITIONS ::= BEGIN T ::= {}INTEGER END", "SEQUENCE OF ".repeat(8)),
        &features,
    );
    assert_eq!(diagnostics, vec![]);
    assert_eq!(ast.modules[0].assignments.len(), 1);
}

#[test]
fn lexical_errors_are_reported() {
    let source = "M DEFINITIONS ::= BEGIN s IA5String ::= \"open END";
    let (_, diagnostics) = parse(source);
    assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Lexical));
}
