//! Schema language: syntax (parse success/failure) and resolution (references, tags).

use jcepack::{decode, encode, parse, parse_schemas, CodecError, FieldMap, Value};

// ==================== Syntax ====================

#[test]
fn parse_empty_source() {
    let doc = parse("").expect("empty source can parse");
    assert!(doc.structs.is_empty());
}

#[test]
fn parse_minimal_struct() {
    let doc = parse("struct M { x = 0; }").expect("parse");
    assert_eq!(doc.structs.len(), 1);
    assert_eq!(doc.structs[0].name, "M");
    assert_eq!(doc.structs[0].fields.len(), 1);
    assert_eq!(doc.structs[0].fields[0].name, "x");
    assert_eq!(doc.structs[0].fields[0].tag, 0);
    assert!(doc.structs[0].fields[0].nested.is_none());
}

#[test]
fn parse_with_comments_and_nesting() {
    let src = r#"
// inner struct
struct Inner {
  foo = 1;
  bar = 3; /* block */
}

struct Outer {
  qaz = 0;
  rfv = 4: Inner;
  yhn = 255;
}
"#;
    let doc = parse(src).expect("parse");
    assert_eq!(doc.structs.len(), 2);
    let rfv = &doc.structs[1].fields[1];
    assert_eq!(rfv.name, "rfv");
    assert_eq!(rfv.tag, 4);
    assert_eq!(rfv.nested.as_deref(), Some("Inner"));
}

#[test]
fn parse_rejects_bad_syntax() {
    for src in [
        "struct { a = 0; }",
        "struct M { a = ; }",
        "struct M { a = 0 }",
        "struct M { a = -1; }",
        "struct M { 1a = 0; }",
        "struct M { a = 0;",
    ] {
        assert!(
            matches!(parse(src), Err(CodecError::Schema(_))),
            "expected parse error for {:?}",
            src
        );
    }
}

// ==================== Resolution ====================

#[test]
fn resolve_nested_reference() {
    let set = parse_schemas(
        "struct Outer { a = 0; inner = 1: Inner; } struct Inner { x = 15; }",
    )
    .expect("resolve");
    assert_eq!(set.len(), 2);
    assert_eq!(set.names().collect::<Vec<_>>(), ["Outer", "Inner"]);

    let outer = set.get("Outer").expect("Outer");
    let inner = outer.get("inner").and_then(|f| f.nested.clone()).expect("nested");
    assert_eq!(inner.get("x").map(|f| f.tag), Some(15));
    assert!(set.get("Missing").is_none());
}

#[test]
fn resolve_errors() {
    let cases = [
        "struct A { x = 0; } struct A { y = 1; }",
        "struct A { x = 0: B; }",
        "struct A { x = 0: A; }",
        "struct A { x = 0: B; } struct B { y = 0: A; }",
        "struct A { x = 0; y = 0; }",
        "struct A { x = 0; x = 1; }",
        "struct A { x = 99999999999; }",
    ];
    for src in cases {
        assert!(
            matches!(parse_schemas(src), Err(CodecError::Schema(_))),
            "expected schema error for {:?}",
            src
        );
    }
    assert!(matches!(
        parse_schemas("struct A { x = 256; }"),
        Err(CodecError::TagOutOfRange(256))
    ));
}

#[test]
fn parsed_schema_drives_codec() {
    let set = parse_schemas(
        r#"
struct Point { x = 0; y = 1; }
struct Shape {
  name = 0;
  origin = 1: Point;
  tags = 2;
}
"#,
    )
    .expect("resolve");
    let shape = set.get("Shape").expect("Shape");

    let mut origin = FieldMap::new();
    origin.insert("x".into(), Value::Int(-4));
    origin.insert("y".into(), Value::Int(1000));
    let mut values = FieldMap::new();
    values.insert("name".into(), Value::from("square"));
    values.insert("origin".into(), Value::Struct(origin));
    values.insert("tags".into(), Value::List(vec![Value::from("a"), Value::from("b")]));

    let bytes = encode(&values, &shape).expect("encode");
    assert_eq!(decode(&bytes, &shape).expect("decode"), values);
}
