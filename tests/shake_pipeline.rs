//! End-to-end pipeline tests over crafted archives.
//!
//! Input jars are built with the crate's own writer, shaken through the full
//! analyze/rewrite/emit pipeline, and the output archive is read back through a
//! fresh [`ClasspathIndex`] to assert on what survived.

use std::path::PathBuf;

use jarshake::classfile::{
    ClassAccessFlags, ClassModel, CodeRef, FieldAccessFlags, FieldModel, MethodAccessFlags,
    MethodBody, MethodModel,
};
use jarshake::shake::{ClassDeclarations, DeclarationTable, MemberSig, Property};
use jarshake::{analyze, rewrite, shake, write_archive, ClassResolver, ClasspathIndex, RootSignature};

fn class(name: &str) -> ClassModel {
    ClassModel {
        minor_version: 0,
        major_version: 52,
        access: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        name: name.to_string(),
        super_name: Some("java/lang/Object".to_string()),
        interfaces: Vec::new(),
        signature: None,
        source_file: None,
        source_debug: None,
        enclosing_class: None,
        enclosing_method: None,
        nest_host: None,
        nest_members: Vec::new(),
        permitted_subclasses: Vec::new(),
        record_components: None,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        inner_classes: Vec::new(),
        declarations: None,
        deprecated: false,
        fields: Vec::new(),
        methods: Vec::new(),
    }
}

fn field(name: &str, descriptor: &str) -> FieldModel {
    FieldModel {
        access: FieldAccessFlags::PUBLIC,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        signature: None,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        deprecated: false,
    }
}

fn method(name: &str, descriptor: &str) -> MethodModel {
    MethodModel {
        access: MethodAccessFlags::PUBLIC,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        signature: None,
        exceptions: Vec::new(),
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_parameter_annotations: Vec::new(),
        invisible_parameter_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        annotation_default: None,
        body: Some(MethodBody::Original { refs: Vec::new() }),
        deprecated: false,
    }
}

fn jar(dir: &std::path::Path, file: &str, models: &[ClassModel]) -> PathBuf {
    let entries: Vec<(String, Vec<u8>)> = models
        .iter()
        .map(|model| (model.name.clone(), model.to_bytes().unwrap()))
        .collect();
    let path = dir.join(file);
    write_archive(&path, &entries).unwrap();
    path
}

#[test]
fn pipeline_keeps_closure_and_drops_the_rest() {
    let dir = tempfile::tempdir().unwrap();

    let mut class_a = class("a/A");
    class_a.methods.push(method("foo", "()Lb/B;"));
    class_a.methods.push(method("bar", "()V"));

    let mut class_b = class("b/B");
    class_b.fields.push(field("x", "I"));
    class_b.methods.push(method("<init>", "()V"));
    class_b.methods.push(method("unused", "()J"));

    let class_c = class("c/C");

    let input = jar(dir.path(), "in.jar", &[class_a, class_b, class_c]);
    let missing = dir.path().join("not-there.jar");
    let index = ClasspathIndex::new(&[input, missing]).unwrap();

    let roots = RootSignature::parse_list("a/A#foo()Lb/B;\nb/B#<init>()V");
    let output = dir.path().join("out/min.jar");
    let summary = shake(&index, &roots, &output).unwrap();

    assert_eq!(summary.classes, 2);
    assert_eq!(summary.methods, 2);
    assert_eq!(summary.fields, 0);

    let out_index = ClasspathIndex::new(&[output]).unwrap();
    assert!(out_index.contains("a/A"));
    assert!(out_index.contains("b/B"));
    assert!(!out_index.contains("c/C"));

    let rewritten_a = out_index.resolve("a/A").unwrap();
    assert_eq!(rewritten_a.methods.len(), 1);
    assert_eq!(rewritten_a.methods[0].name, "foo");
    // The reference-returning stub has a body that touches nothing.
    assert_eq!(
        rewritten_a.methods[0].body,
        Some(MethodBody::Original { refs: Vec::new() })
    );

    let rewritten_b = out_index.resolve("b/B").unwrap();
    assert!(rewritten_b.fields.is_empty());
    assert_eq!(rewritten_b.methods.len(), 1);
    let constructor = &rewritten_b.methods[0];
    assert_eq!(constructor.name, "<init>");
    // The constructor stub decodes back to a super call.
    assert_eq!(
        constructor.body,
        Some(MethodBody::Original {
            refs: vec![CodeRef::Method(
                "java/lang/Object".to_string(),
                "<init>".to_string(),
                "()V".to_string()
            )]
        })
    );
}

#[test]
fn every_kept_class_header_reference_is_kept() {
    let dir = tempfile::tempdir().unwrap();

    let mut base = class("p/Base");
    base.methods.push(method("<init>", "()V"));
    let mut iface = class("p/Iface");
    iface.access = ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT;
    iface.super_name = Some("java/lang/Object".to_string());

    let mut leaf = class("p/Leaf");
    leaf.super_name = Some("p/Base".to_string());
    leaf.interfaces.push("p/Iface".to_string());
    leaf.methods.push(method("<init>", "()V"));

    let input = jar(dir.path(), "in.jar", &[base, iface, leaf]);
    let index = ClasspathIndex::new(&[input]).unwrap();

    let kept = analyze(&index, &RootSignature::parse_list("p/Leaf"));

    // Closure completeness over the classes the repository can resolve.
    for name in kept.classes() {
        let Some(model) = index.resolve(name) else {
            continue;
        };
        if let Some(super_name) = &model.super_name {
            assert!(kept.contains_class(super_name), "super of {name} not kept");
        }
        for interface in &model.interfaces {
            assert!(kept.contains_class(interface), "interface of {name} not kept");
        }
    }
    assert!(kept.contains_class("p/Base"));
    assert!(kept.contains_class("p/Iface"));
}

#[test]
fn synthetic_default_constructor_appears_in_output() {
    let dir = tempfile::tempdir().unwrap();

    let mut model = class("d/D");
    model.methods.push(method("<init>", "(I)V"));
    model.methods.push(method("m", "()V"));

    let input = jar(dir.path(), "in.jar", &[model]);
    let index = ClasspathIndex::new(&[input]).unwrap();

    let output = dir.path().join("out.jar");
    shake(&index, &RootSignature::parse_list("d/D#m()V"), &output).unwrap();

    let out_index = ClasspathIndex::new(&[output]).unwrap();
    let rewritten = out_index.resolve("d/D").unwrap();

    let constructors: Vec<_> = rewritten
        .methods
        .iter()
        .filter(|candidate| candidate.name == "<init>")
        .collect();
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].descriptor, "()V");
    assert!(constructors[0].access.contains(MethodAccessFlags::PUBLIC));
    assert!(constructors[0].body.is_some());
}

#[test]
fn declaration_metadata_tracks_stripped_members() {
    let dir = tempfile::tempdir().unwrap();

    let sig = |name: &str, descriptor: &str| MemberSig {
        name: name.to_string(),
        descriptor: descriptor.to_string(),
    };

    let mut model = class("e/E");
    model.methods.push(method("<init>", "()V"));
    model.methods.push(method("getCount", "()I"));
    model.methods.push(method("gone", "()V"));
    model.fields.push(field("count", "I"));
    model.declarations = Some(
        DeclarationTable::Class(ClassDeclarations {
            constructors: vec![sig("<init>", "()V")],
            functions: vec![sig("gone", "()V")],
            properties: vec![Property {
                name: "count".to_string(),
                getter: Some(sig("getCount", "()I")),
                setter: None,
                field: Some(sig("count", "I")),
            }],
        })
        .encode(),
    );

    let input = jar(dir.path(), "in.jar", &[model]);
    let index = ClasspathIndex::new(&[input]).unwrap();

    let output = dir.path().join("out.jar");
    shake(
        &index,
        &RootSignature::parse_list("e/E#getCount()I\ne/E#<init>()V"),
        &output,
    )
    .unwrap();

    let out_index = ClasspathIndex::new(&[output]).unwrap();
    let rewritten = out_index.resolve("e/E").unwrap();
    let table = DeclarationTable::decode(rewritten.declarations.as_ref().unwrap()).unwrap();

    let DeclarationTable::Class(declarations) = table else {
        panic!("declaration shape changed");
    };
    // No surviving entry names a stripped member.
    assert_eq!(declarations.constructors, vec![sig("<init>", "()V")]);
    assert!(declarations.functions.is_empty());
    assert_eq!(declarations.properties.len(), 1);
    assert_eq!(declarations.properties[0].name, "count");

    for function in &declarations.functions {
        assert!(rewritten
            .methods
            .iter()
            .any(|m| m.name == function.name && m.descriptor == function.descriptor));
    }
}

#[test]
fn rewrite_preserves_discovery_order() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = class("z/First");
    first.methods.push(method("go", "()La/Mid;"));
    let mid = class("a/Mid");
    let last = class("b/Last");

    let input = jar(dir.path(), "in.jar", &[mid.clone(), first, last.clone()]);
    let index = ClasspathIndex::new(&[input]).unwrap();

    let roots = RootSignature::parse_list("z/First#go()La/Mid;\nb/Last");
    let kept = analyze(&index, &roots);
    let rewritten = rewrite(&kept, &index);

    let order: Vec<&str> = rewritten.iter().map(|(name, _)| name.as_str()).collect();
    // Seed order first (roots in line order), then discovered classes.
    assert_eq!(order, vec!["z/First", "b/Last", "a/Mid"]);
}
