//! Class-file encoding: [`ClassModel`] to raw bytes.
//!
//! Encoding always builds a fresh constant pool: the retained member set of a
//! rewritten class differs from the original, so original pool indices are
//! meaningless. Every carried attribute is re-encoded against the new pool.
//!
//! `Code` attributes are emitted only for [`MethodBody::Stub`] bodies. Stubs are
//! straight-line sequences without branch targets, so no `StackMapTable` is
//! written; `max_stack` and `max_locals` are derived from the stub variant, which
//! is the whole of the "recompute verification data from scratch" obligation for
//! bodies this simple.

use crate::{
    classfile::{
        annotations::{
            encode_annotations, encode_element_value, encode_type_annotations, Annotation,
            TypeAnnotation,
        },
        descriptor::ReturnCategory,
        model::{ClassModel, FieldModel, MethodBody, MethodModel, StubBody, DECLARATIONS_ATTRIBUTE},
        pool::PoolBuilder,
        reader::CLASS_MAGIC,
    },
    Result,
};

/// Encode a class model into class-file bytes.
///
/// # Errors
/// Returns an error if the freshly built constant pool outgrows the 16-bit index
/// space of the format.
pub(crate) fn write_class(model: &ClassModel) -> Result<Vec<u8>> {
    let mut pool = PoolBuilder::new();
    let mut body = Vec::new();

    body.extend_from_slice(&model.access.bits().to_be_bytes());

    let this_index = pool.class(&model.name);
    body.extend_from_slice(&this_index.to_be_bytes());

    let super_index = match model.super_name.as_deref() {
        Some(super_name) => pool.class(super_name),
        None => 0,
    };
    body.extend_from_slice(&super_index.to_be_bytes());

    body.extend_from_slice(&(model.interfaces.len() as u16).to_be_bytes());
    for interface in &model.interfaces {
        let interface_index = pool.class(interface);
        body.extend_from_slice(&interface_index.to_be_bytes());
    }

    body.extend_from_slice(&(model.fields.len() as u16).to_be_bytes());
    for field in &model.fields {
        write_field(field, &mut pool, &mut body);
    }

    body.extend_from_slice(&(model.methods.len() as u16).to_be_bytes());
    for method in &model.methods {
        write_method(method, &mut pool, &mut body);
    }

    let class_attributes = class_attributes(model, &mut pool);
    write_attribute_list(&class_attributes, &mut pool, &mut body);

    let mut out = Vec::with_capacity(body.len() + 64);
    out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
    out.extend_from_slice(&model.minor_version.to_be_bytes());
    out.extend_from_slice(&model.major_version.to_be_bytes());
    pool.encode(&mut out)?;
    out.extend_from_slice(&body);
    Ok(out)
}

/// A named attribute with its already-encoded info bytes.
type NamedAttribute = (&'static str, Vec<u8>);

fn write_attribute_list(attributes: &[NamedAttribute], pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for (name, info) in attributes {
        let name_index = pool.utf8(name);
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(info);
    }
}

fn utf8_ref_attribute(value: &str, pool: &mut PoolBuilder) -> Vec<u8> {
    pool.utf8(value).to_be_bytes().to_vec()
}

fn class_list_attribute(names: &[String], pool: &mut PoolBuilder) -> Vec<u8> {
    let mut info = Vec::with_capacity(2 + names.len() * 2);
    info.extend_from_slice(&(names.len() as u16).to_be_bytes());
    for name in names {
        let index = pool.class(name);
        info.extend_from_slice(&index.to_be_bytes());
    }
    info
}

fn annotation_attributes(
    visible: &[Annotation],
    invisible: &[Annotation],
    visible_type: &[TypeAnnotation],
    invisible_type: &[TypeAnnotation],
    pool: &mut PoolBuilder,
    attributes: &mut Vec<NamedAttribute>,
) {
    if !visible.is_empty() {
        let mut info = Vec::new();
        encode_annotations(visible, pool, &mut info);
        attributes.push(("RuntimeVisibleAnnotations", info));
    }
    if !invisible.is_empty() {
        let mut info = Vec::new();
        encode_annotations(invisible, pool, &mut info);
        attributes.push(("RuntimeInvisibleAnnotations", info));
    }
    if !visible_type.is_empty() {
        let mut info = Vec::new();
        encode_type_annotations(visible_type, pool, &mut info);
        attributes.push(("RuntimeVisibleTypeAnnotations", info));
    }
    if !invisible_type.is_empty() {
        let mut info = Vec::new();
        encode_type_annotations(invisible_type, pool, &mut info);
        attributes.push(("RuntimeInvisibleTypeAnnotations", info));
    }
}

fn class_attributes(model: &ClassModel, pool: &mut PoolBuilder) -> Vec<NamedAttribute> {
    let mut attributes = Vec::new();

    if let Some(signature) = &model.signature {
        attributes.push(("Signature", utf8_ref_attribute(signature, pool)));
    }
    if let Some(source_file) = &model.source_file {
        attributes.push(("SourceFile", utf8_ref_attribute(source_file, pool)));
    }
    if let Some(source_debug) = &model.source_debug {
        attributes.push(("SourceDebugExtension", source_debug.clone()));
    }
    if !model.inner_classes.is_empty() {
        let mut info = Vec::new();
        info.extend_from_slice(&(model.inner_classes.len() as u16).to_be_bytes());
        for entry in &model.inner_classes {
            let inner_index = pool.class(&entry.inner);
            let outer_index = match entry.outer.as_deref() {
                Some(outer) => pool.class(outer),
                None => 0,
            };
            let inner_name_index = match entry.inner_name.as_deref() {
                Some(inner_name) => pool.utf8(inner_name),
                None => 0,
            };
            info.extend_from_slice(&inner_index.to_be_bytes());
            info.extend_from_slice(&outer_index.to_be_bytes());
            info.extend_from_slice(&inner_name_index.to_be_bytes());
            info.extend_from_slice(&entry.access.to_be_bytes());
        }
        attributes.push(("InnerClasses", info));
    }
    if let Some(enclosing_class) = &model.enclosing_class {
        let class_index = pool.class(enclosing_class);
        let method_index = match &model.enclosing_method {
            Some((method_name, descriptor)) => pool.name_and_type(method_name, descriptor),
            None => 0,
        };
        let mut info = Vec::with_capacity(4);
        info.extend_from_slice(&class_index.to_be_bytes());
        info.extend_from_slice(&method_index.to_be_bytes());
        attributes.push(("EnclosingMethod", info));
    }
    if let Some(nest_host) = &model.nest_host {
        let index = pool.class(nest_host);
        attributes.push(("NestHost", index.to_be_bytes().to_vec()));
    }
    if !model.nest_members.is_empty() {
        attributes.push(("NestMembers", class_list_attribute(&model.nest_members, pool)));
    }
    if !model.permitted_subclasses.is_empty() {
        attributes.push((
            "PermittedSubclasses",
            class_list_attribute(&model.permitted_subclasses, pool),
        ));
    }
    if let Some(components) = &model.record_components {
        let mut info = Vec::new();
        info.extend_from_slice(&(components.len() as u16).to_be_bytes());
        for component in components {
            let name_index = pool.utf8(&component.name);
            let descriptor_index = pool.utf8(&component.descriptor);
            info.extend_from_slice(&name_index.to_be_bytes());
            info.extend_from_slice(&descriptor_index.to_be_bytes());

            let mut component_attributes = Vec::new();
            if let Some(signature) = &component.signature {
                component_attributes.push(("Signature", utf8_ref_attribute(signature, pool)));
            }
            annotation_attributes(
                &component.visible_annotations,
                &component.invisible_annotations,
                &component.visible_type_annotations,
                &component.invisible_type_annotations,
                pool,
                &mut component_attributes,
            );
            write_attribute_list(&component_attributes, pool, &mut info);
        }
        attributes.push(("Record", info));
    }
    annotation_attributes(
        &model.visible_annotations,
        &model.invisible_annotations,
        &model.visible_type_annotations,
        &model.invisible_type_annotations,
        pool,
        &mut attributes,
    );
    if model.deprecated {
        attributes.push(("Deprecated", Vec::new()));
    }
    if let Some(declarations) = &model.declarations {
        attributes.push((DECLARATIONS_ATTRIBUTE, declarations.clone()));
    }

    attributes
}

fn write_field(field: &FieldModel, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    out.extend_from_slice(&field.access.bits().to_be_bytes());
    let name_index = pool.utf8(&field.name);
    let descriptor_index = pool.utf8(&field.descriptor);
    out.extend_from_slice(&name_index.to_be_bytes());
    out.extend_from_slice(&descriptor_index.to_be_bytes());

    let mut attributes = Vec::new();
    if let Some(signature) = &field.signature {
        attributes.push(("Signature", utf8_ref_attribute(signature, pool)));
    }
    annotation_attributes(
        &field.visible_annotations,
        &field.invisible_annotations,
        &field.visible_type_annotations,
        &field.invisible_type_annotations,
        pool,
        &mut attributes,
    );
    if field.deprecated {
        attributes.push(("Deprecated", Vec::new()));
    }
    write_attribute_list(&attributes, pool, out);
}

fn write_method(method: &MethodModel, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    out.extend_from_slice(&method.access.bits().to_be_bytes());
    let name_index = pool.utf8(&method.name);
    let descriptor_index = pool.utf8(&method.descriptor);
    out.extend_from_slice(&name_index.to_be_bytes());
    out.extend_from_slice(&descriptor_index.to_be_bytes());

    let mut attributes = Vec::new();
    if let Some(MethodBody::Stub(stub)) = &method.body {
        attributes.push(("Code", encode_stub(stub, pool)));
    }
    if !method.exceptions.is_empty() {
        attributes.push(("Exceptions", class_list_attribute(&method.exceptions, pool)));
    }
    if let Some(signature) = &method.signature {
        attributes.push(("Signature", utf8_ref_attribute(signature, pool)));
    }
    annotation_attributes(
        &method.visible_annotations,
        &method.invisible_annotations,
        &method.visible_type_annotations,
        &method.invisible_type_annotations,
        pool,
        &mut attributes,
    );
    if !method.visible_parameter_annotations.is_empty() {
        attributes.push((
            "RuntimeVisibleParameterAnnotations",
            parameter_annotations_attribute(&method.visible_parameter_annotations, pool),
        ));
    }
    if !method.invisible_parameter_annotations.is_empty() {
        attributes.push((
            "RuntimeInvisibleParameterAnnotations",
            parameter_annotations_attribute(&method.invisible_parameter_annotations, pool),
        ));
    }
    if let Some(default) = &method.annotation_default {
        let mut info = Vec::new();
        encode_element_value(default, pool, &mut info);
        attributes.push(("AnnotationDefault", info));
    }
    if method.deprecated {
        attributes.push(("Deprecated", Vec::new()));
    }
    write_attribute_list(&attributes, pool, out);
}

fn parameter_annotations_attribute(
    parameters: &[Vec<Annotation>],
    pool: &mut PoolBuilder,
) -> Vec<u8> {
    let mut info = Vec::new();
    info.push(parameters.len() as u8);
    for annotations in parameters {
        encode_annotations(annotations, pool, &mut info);
    }
    info
}

/// Encode a stub body as a `Code` attribute payload.
fn encode_stub(stub: &StubBody, pool: &mut PoolBuilder) -> Vec<u8> {
    let (max_stack, max_locals, code) = match stub {
        StubBody::SuperConstructor {
            super_name,
            argument_slots,
        } => {
            let super_init = pool.methodref(super_name, "<init>", "()V");
            let mut code = vec![0x2A, 0xB7]; // aload_0; invokespecial
            code.extend_from_slice(&super_init.to_be_bytes());
            code.push(0xB1); // return
            (1_u16, 1 + argument_slots, code)
        }
        StubBody::DefaultReturn {
            category,
            local_slots,
        } => {
            let code = match category {
                ReturnCategory::Void => vec![0xB1],
                ReturnCategory::Int => vec![0x03, 0xAC],
                ReturnCategory::Long => vec![0x09, 0xAD],
                ReturnCategory::Float => vec![0x0B, 0xAE],
                ReturnCategory::Double => vec![0x0E, 0xAF],
                ReturnCategory::Reference => vec![0x01, 0xB0],
            };
            (category.stack_slots(), *local_slots, code)
        }
    };

    let mut info = Vec::with_capacity(12 + code.len());
    info.extend_from_slice(&max_stack.to_be_bytes());
    info.extend_from_slice(&max_locals.to_be_bytes());
    info.extend_from_slice(&(code.len() as u32).to_be_bytes());
    info.extend_from_slice(&code);
    info.extend_from_slice(&0_u16.to_be_bytes()); // empty exception table
    info.extend_from_slice(&0_u16.to_be_bytes()); // no code attributes
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::access::{ClassAccessFlags, MethodAccessFlags};
    use crate::classfile::model::CodeRef;
    use crate::testutil::{bare_class, method};

    fn stub_method(name: &str, descriptor: &str, stub: StubBody) -> MethodModel {
        method(name, descriptor, Some(MethodBody::Stub(stub)))
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut model = bare_class("a/A");
        model.interfaces.push("b/Iface".to_string());
        model.signature = Some("Ljava/lang/Object;Lb/Iface;".to_string());
        model.methods.push(stub_method(
            "<init>",
            "()V",
            StubBody::SuperConstructor {
                super_name: "java/lang/Object".to_string(),
                argument_slots: 0,
            },
        ));
        model.methods.push(stub_method(
            "value",
            "()I",
            StubBody::DefaultReturn {
                category: ReturnCategory::Int,
                local_slots: 1,
            },
        ));

        let bytes = write_class(&model).unwrap();
        let decoded = ClassModel::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.name, "a/A");
        assert_eq!(decoded.interfaces, vec!["b/Iface".to_string()]);
        assert_eq!(decoded.signature.as_deref(), Some("Ljava/lang/Object;Lb/Iface;"));
        assert_eq!(decoded.methods.len(), 2);

        // The constructor stub decodes to a body calling the super constructor.
        let Some(MethodBody::Original { refs }) = &decoded.methods[0].body else {
            panic!("constructor lost its body");
        };
        assert_eq!(
            refs,
            &[CodeRef::Method(
                "java/lang/Object".to_string(),
                "<init>".to_string(),
                "()V".to_string()
            )]
        );
    }

    #[test]
    fn rich_metadata_round_trips() {
        use crate::classfile::annotations::{Annotation, ElementValue};
        use crate::classfile::model::{InnerClass, RecordComponent};
        use crate::testutil::field;

        let mut model = bare_class("a/Ann");
        model.source_file = Some("Ann.java".to_string());
        model.nest_members.push("a/Ann$In".to_string());
        model.inner_classes.push(InnerClass {
            inner: "a/Ann$In".to_string(),
            outer: Some("a/Ann".to_string()),
            inner_name: Some("In".to_string()),
            access: 0x0009,
        });
        model.visible_annotations.push(Annotation {
            type_descriptor: "La/Marker;".to_string(),
            elements: vec![
                ("num".to_string(), ElementValue::Int { tag: b'I', value: 7 }),
                ("wide".to_string(), ElementValue::Long(-1)),
                ("name".to_string(), ElementValue::Str("x".to_string())),
                (
                    "kind".to_string(),
                    ElementValue::Enum {
                        type_descriptor: "La/Kind;".to_string(),
                        const_name: "ON".to_string(),
                    },
                ),
                ("cls".to_string(), ElementValue::Class("Lb/T;".to_string())),
                (
                    "list".to_string(),
                    ElementValue::Array(vec![ElementValue::Double(0.5)]),
                ),
                (
                    "nested".to_string(),
                    ElementValue::Annotation(Box::new(Annotation {
                        type_descriptor: "La/Inner;".to_string(),
                        elements: Vec::new(),
                    })),
                ),
            ],
        });
        model.record_components = Some(vec![RecordComponent {
            name: "part".to_string(),
            descriptor: "Lc/Part;".to_string(),
            signature: Some("Lc/Part<Ljava/lang/String;>;".to_string()),
            visible_annotations: vec![Annotation {
                type_descriptor: "La/Marker;".to_string(),
                elements: Vec::new(),
            }],
            invisible_annotations: Vec::new(),
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
        }]);

        let mut annotated_field = field("count", "I");
        annotated_field.signature = Some("TT;".to_string());
        annotated_field.invisible_annotations.push(Annotation {
            type_descriptor: "La/Tag;".to_string(),
            elements: Vec::new(),
        });
        model.fields.push(annotated_field);

        let mut annotated_method = stub_method(
            "run",
            "(I)V",
            StubBody::DefaultReturn {
                category: ReturnCategory::Void,
                local_slots: 2,
            },
        );
        annotated_method.exceptions.push("e/Boom".to_string());
        annotated_method.signature = Some("(I)V^Le/Boom;".to_string());
        annotated_method.visible_parameter_annotations = vec![vec![Annotation {
            type_descriptor: "La/NotNull;".to_string(),
            elements: Vec::new(),
        }]];
        annotated_method.annotation_default = Some(ElementValue::Str("d".to_string()));
        model.methods.push(annotated_method);

        let bytes = write_class(&model).unwrap();
        let decoded = ClassModel::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.source_file, model.source_file);
        assert_eq!(decoded.nest_members, model.nest_members);
        assert_eq!(decoded.inner_classes, model.inner_classes);
        assert_eq!(decoded.visible_annotations, model.visible_annotations);
        assert_eq!(decoded.record_components, model.record_components);

        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields[0].signature, model.fields[0].signature);
        assert_eq!(
            decoded.fields[0].invisible_annotations,
            model.fields[0].invisible_annotations
        );

        let decoded_method = &decoded.methods[0];
        assert_eq!(decoded_method.exceptions, vec!["e/Boom".to_string()]);
        assert_eq!(decoded_method.signature.as_deref(), Some("(I)V^Le/Boom;"));
        assert_eq!(
            decoded_method.visible_parameter_annotations,
            model.methods[0].visible_parameter_annotations
        );
        assert_eq!(
            decoded_method.annotation_default,
            Some(ElementValue::Str("d".to_string()))
        );
    }

    #[test]
    fn abstract_methods_stay_bodyless() {
        let mut model = bare_class("a/Abs");
        model.access |= ClassAccessFlags::ABSTRACT;
        let mut method = stub_method(
            "todo",
            "()V",
            StubBody::DefaultReturn {
                category: ReturnCategory::Void,
                local_slots: 1,
            },
        );
        method.access = MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT;
        method.body = None;
        model.methods.push(method);

        let bytes = write_class(&model).unwrap();
        let decoded = ClassModel::from_bytes(&bytes).unwrap();
        assert!(decoded.methods[0].body.is_none());
        assert!(decoded.methods[0].is_abstract());
    }
}
