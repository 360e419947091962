//! Class-file decoding: raw bytes to [`ClassModel`].
//!
//! The reader is strict about structure (constant pool, member tables, attribute
//! framing) and forgiving about content: a malformed annotation, signature or code
//! attribute contributes nothing instead of failing the class. Structural failures
//! bubble up as errors, which the repository then treats as an unresolvable class.
//!
//! Method bodies are not decoded into instructions. Each `Code` attribute is
//! scanned once for the constant-pool references its instruction stream and
//! exception table make, and the body is stored as that reference summary
//! ([`CodeRef`]); see the module docs of [`crate::classfile::model`] for why.

use crate::{
    classfile::{
        access::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
        annotations::{parse_annotations, parse_element_value, parse_type_annotations},
        model::{
            ClassModel, CodeRef, FieldModel, InnerClass, MethodBody, MethodModel, RecordComponent,
            DECLARATIONS_ATTRIBUTE,
        },
        pool::{Constant, ConstantPool},
    },
    file::Parser,
    Result,
};

/// Highest class-file major version this library accepts.
pub const MAX_SUPPORTED_MAJOR: u16 = 69;

/// Magic number at the start of every class file.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Decode a class from raw bytes.
///
/// # Errors
/// Returns an error if the magic or version is unacceptable, or if the constant
/// pool, member tables or attribute framing are structurally invalid.
pub(crate) fn read_class(data: &[u8]) -> Result<ClassModel> {
    let mut parser = Parser::new(data);

    let magic = parser.read_u32()?;
    if magic != CLASS_MAGIC {
        return Err(malformed_error!("Class - bad magic {:#010x}", magic));
    }

    let minor_version = parser.read_u16()?;
    let major_version = parser.read_u16()?;
    if major_version > MAX_SUPPORTED_MAJOR {
        return Err(crate::Error::UnsupportedVersion(major_version));
    }

    let pool = ConstantPool::parse(&mut parser)?;

    let access = ClassAccessFlags::from_bits_retain(parser.read_u16()?);
    let name = pool.class_name(parser.read_u16()?)?.to_string();
    let super_name = pool.opt_class_name(parser.read_u16()?)?.map(String::from);

    let interface_count = parser.read_u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(parser.read_u16()?)?.to_string());
    }

    let field_count = parser.read_u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        fields.push(read_field(&mut parser, &pool)?);
    }

    let method_count = parser.read_u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        methods.push(read_method(&mut parser, &pool)?);
    }

    let mut model = ClassModel {
        minor_version,
        major_version,
        access,
        name,
        super_name,
        interfaces,
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
        fields,
        methods,
    };

    let attribute_count = parser.read_u16()?;
    for _ in 0..attribute_count {
        let (attr_name, info) = read_attribute(&mut parser, &pool)?;
        let mut sub = Parser::new(info);
        match attr_name {
            "Signature" => model.signature = sub.read_u16().ok().and_then(|i| pool.utf8(i).ok()).map(String::from),
            "SourceFile" => model.source_file = sub.read_u16().ok().and_then(|i| pool.utf8(i).ok()).map(String::from),
            "SourceDebugExtension" => model.source_debug = Some(info.to_vec()),
            "EnclosingMethod" => {
                let class_index = sub.read_u16()?;
                let method_index = sub.read_u16()?;
                model.enclosing_class = pool.opt_class_name(class_index)?.map(String::from);
                if method_index != 0 {
                    if let Ok((method_name, descriptor)) = pool.name_and_type(method_index) {
                        model.enclosing_method =
                            Some((method_name.to_string(), descriptor.to_string()));
                    }
                }
            }
            "NestHost" => {
                model.nest_host = sub.read_u16().ok().and_then(|i| pool.class_name(i).ok()).map(String::from);
            }
            "NestMembers" => model.nest_members = read_class_list(&mut sub, &pool)?,
            "PermittedSubclasses" => model.permitted_subclasses = read_class_list(&mut sub, &pool)?,
            "Record" => {
                let component_count = sub.read_u16()?;
                let mut components = Vec::with_capacity(component_count as usize);
                for _ in 0..component_count {
                    components.push(read_record_component(&mut sub, &pool)?);
                }
                model.record_components = Some(components);
            }
            "InnerClasses" => {
                let entry_count = sub.read_u16()?;
                for _ in 0..entry_count {
                    let inner_index = sub.read_u16()?;
                    let outer_index = sub.read_u16()?;
                    let inner_name_index = sub.read_u16()?;
                    let inner_access = sub.read_u16()?;
                    let inner = match pool.class_name(inner_index) {
                        Ok(value) => value.to_string(),
                        Err(_) => continue,
                    };
                    model.inner_classes.push(InnerClass {
                        inner,
                        outer: pool.opt_class_name(outer_index)?.map(String::from),
                        inner_name: if inner_name_index == 0 {
                            None
                        } else {
                            pool.utf8(inner_name_index).ok().map(String::from)
                        },
                        access: inner_access,
                    });
                }
            }
            "RuntimeVisibleAnnotations" => {
                model.visible_annotations = parse_annotations(&mut sub, &pool).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                model.invisible_annotations =
                    parse_annotations(&mut sub, &pool).unwrap_or_default();
            }
            "RuntimeVisibleTypeAnnotations" => {
                model.visible_type_annotations =
                    parse_type_annotations(&mut sub, &pool).unwrap_or_default();
            }
            "RuntimeInvisibleTypeAnnotations" => {
                model.invisible_type_annotations =
                    parse_type_annotations(&mut sub, &pool).unwrap_or_default();
            }
            "Deprecated" => model.deprecated = true,
            DECLARATIONS_ATTRIBUTE => model.declarations = Some(info.to_vec()),
            _ => {}
        }
    }

    Ok(model)
}

/// Read one attribute header, returning the resolved name and the info bytes.
///
/// An unresolvable attribute name yields an empty name, which no dispatcher
/// matches; the attribute is skipped rather than failing the class.
fn read_attribute<'a, 'p>(
    parser: &mut Parser<'a>,
    pool: &'p ConstantPool,
) -> Result<(&'p str, &'a [u8])> {
    let name_index = parser.read_u16()?;
    let length = parser.read_u32()? as usize;
    let info = parser.read_bytes(length)?;
    Ok((pool.utf8(name_index).unwrap_or(""), info))
}

fn read_class_list(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<Vec<String>> {
    let count = parser.read_u16()?;
    let mut names = Vec::with_capacity(count as usize);
    for _ in 0..count {
        names.push(pool.class_name(parser.read_u16()?)?.to_string());
    }
    Ok(names)
}

fn read_record_component(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<RecordComponent> {
    let name = pool.utf8(parser.read_u16()?)?.to_string();
    let descriptor = pool.utf8(parser.read_u16()?)?.to_string();

    let mut component = RecordComponent {
        name,
        descriptor,
        signature: None,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
    };

    let attribute_count = parser.read_u16()?;
    for _ in 0..attribute_count {
        let (attr_name, info) = read_attribute(parser, pool)?;
        let mut sub = Parser::new(info);
        match attr_name {
            "Signature" => {
                component.signature =
                    sub.read_u16().ok().and_then(|i| pool.utf8(i).ok()).map(String::from);
            }
            "RuntimeVisibleAnnotations" => {
                component.visible_annotations =
                    parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                component.invisible_annotations =
                    parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeVisibleTypeAnnotations" => {
                component.visible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleTypeAnnotations" => {
                component.invisible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            _ => {}
        }
    }

    Ok(component)
}

fn read_field(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<FieldModel> {
    let access = FieldAccessFlags::from_bits_retain(parser.read_u16()?);
    let name = pool.utf8(parser.read_u16()?)?.to_string();
    let descriptor = pool.utf8(parser.read_u16()?)?.to_string();

    let mut field = FieldModel {
        access,
        name,
        descriptor,
        signature: None,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        deprecated: false,
    };

    let attribute_count = parser.read_u16()?;
    for _ in 0..attribute_count {
        let (attr_name, info) = read_attribute(parser, pool)?;
        let mut sub = Parser::new(info);
        match attr_name {
            "Signature" => field.signature = sub.read_u16().ok().and_then(|i| pool.utf8(i).ok()).map(String::from),
            "RuntimeVisibleAnnotations" => {
                field.visible_annotations = parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                field.invisible_annotations = parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeVisibleTypeAnnotations" => {
                field.visible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleTypeAnnotations" => {
                field.invisible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            "Deprecated" => field.deprecated = true,
            // ConstantValue is intentionally not carried; rewritten fields lose it.
            _ => {}
        }
    }

    Ok(field)
}

fn read_method(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<MethodModel> {
    let access = MethodAccessFlags::from_bits_retain(parser.read_u16()?);
    let name = pool.utf8(parser.read_u16()?)?.to_string();
    let descriptor = pool.utf8(parser.read_u16()?)?.to_string();

    let mut method = MethodModel {
        access,
        name,
        descriptor,
        signature: None,
        exceptions: Vec::new(),
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_parameter_annotations: Vec::new(),
        invisible_parameter_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        annotation_default: None,
        body: None,
        deprecated: false,
    };

    let attribute_count = parser.read_u16()?;
    for _ in 0..attribute_count {
        let (attr_name, info) = read_attribute(parser, pool)?;
        let mut sub = Parser::new(info);
        match attr_name {
            "Code" => {
                method.body = Some(MethodBody::Original {
                    refs: scan_code(info, pool),
                });
            }
            "Exceptions" => method.exceptions = read_class_list(&mut sub, pool)?,
            "Signature" => method.signature = sub.read_u16().ok().and_then(|i| pool.utf8(i).ok()).map(String::from),
            "RuntimeVisibleAnnotations" => {
                method.visible_annotations = parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                method.invisible_annotations =
                    parse_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeVisibleParameterAnnotations" => {
                method.visible_parameter_annotations =
                    parse_parameter_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleParameterAnnotations" => {
                method.invisible_parameter_annotations =
                    parse_parameter_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeVisibleTypeAnnotations" => {
                method.visible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            "RuntimeInvisibleTypeAnnotations" => {
                method.invisible_type_annotations =
                    parse_type_annotations(&mut sub, pool).unwrap_or_default();
            }
            "AnnotationDefault" => {
                method.annotation_default = parse_element_value(&mut sub, pool).ok();
            }
            "Deprecated" => method.deprecated = true,
            _ => {}
        }
    }

    Ok(method)
}

fn parse_parameter_annotations(
    parser: &mut Parser<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Vec<crate::classfile::annotations::Annotation>>> {
    let parameter_count = parser.read_u8()?;
    let mut parameters = Vec::with_capacity(parameter_count as usize);
    for _ in 0..parameter_count {
        parameters.push(parse_annotations(parser, pool)?);
    }
    Ok(parameters)
}

/// Scan a `Code` attribute for the symbolic references its instructions and
/// exception table make. Forgiving: any inconsistency ends the scan and whatever
/// was collected so far is returned.
fn scan_code(info: &[u8], pool: &ConstantPool) -> Vec<CodeRef> {
    let mut refs = Vec::new();
    let _ = scan_code_inner(info, pool, &mut refs);
    refs
}

fn scan_code_inner(info: &[u8], pool: &ConstantPool, refs: &mut Vec<CodeRef>) -> Result<()> {
    let mut parser = Parser::new(info);
    let _max_stack = parser.read_u16()?;
    let _max_locals = parser.read_u16()?;
    let code_length = parser.read_u32()? as usize;
    let code = parser.read_bytes(code_length)?;

    scan_instructions(code, pool, refs)?;

    let exception_count = parser.read_u16()?;
    for _ in 0..exception_count {
        let _start = parser.read_u16()?;
        let _end = parser.read_u16()?;
        let _handler = parser.read_u16()?;
        let catch_type = parser.read_u16()?;
        if catch_type != 0 {
            if let Ok(catch_name) = pool.class_name(catch_type) {
                refs.push(CodeRef::Class(catch_name.to_string()));
            }
        }
    }

    Ok(())
}

fn scan_instructions(code: &[u8], pool: &ConstantPool, refs: &mut Vec<CodeRef>) -> Result<()> {
    let mut pc = 0_usize;
    while pc < code.len() {
        let opcode = code[pc];
        let operand_len = match opcode {
            // Pool-referencing instructions are handled explicitly below.
            0x12 => {
                // ldc
                let index = u16::from(*code.get(pc + 1).ok_or(out_of_bounds_error!())?);
                push_constant_ref(index, pool, refs);
                1
            }
            0x13 | 0x14 => {
                // ldc_w / ldc2_w
                let index = read_code_u16(code, pc + 1)?;
                push_constant_ref(index, pool, refs);
                2
            }
            0xB2..=0xB5 => {
                // getstatic / putstatic / getfield / putfield
                let index = read_code_u16(code, pc + 1)?;
                if let Ok((owner, member_name, descriptor)) = pool.member_ref(index) {
                    refs.push(CodeRef::Field(
                        owner.to_string(),
                        member_name.to_string(),
                        descriptor.to_string(),
                    ));
                }
                2
            }
            0xB6..=0xB8 => {
                // invokevirtual / invokespecial / invokestatic
                let index = read_code_u16(code, pc + 1)?;
                if let Ok((owner, member_name, descriptor)) = pool.member_ref(index) {
                    refs.push(CodeRef::Method(
                        owner.to_string(),
                        member_name.to_string(),
                        descriptor.to_string(),
                    ));
                }
                2
            }
            0xB9 => {
                // invokeinterface: index, count, zero
                let index = read_code_u16(code, pc + 1)?;
                if let Ok((owner, member_name, descriptor)) = pool.member_ref(index) {
                    refs.push(CodeRef::Method(
                        owner.to_string(),
                        member_name.to_string(),
                        descriptor.to_string(),
                    ));
                }
                4
            }
            0xBA => 4, // invokedynamic; bootstrap references live in BootstrapMethods
            0xBB | 0xBD | 0xC0 | 0xC1 => {
                // new / anewarray / checkcast / instanceof
                let index = read_code_u16(code, pc + 1)?;
                if let Ok(class_name) = pool.class_name(index) {
                    refs.push(CodeRef::Class(class_name.to_string()));
                }
                2
            }
            0xC5 => {
                // multianewarray: index, dimensions
                let index = read_code_u16(code, pc + 1)?;
                if let Ok(class_name) = pool.class_name(index) {
                    refs.push(CodeRef::Class(class_name.to_string()));
                }
                3
            }
            // Fixed-length operand groups.
            0x10 | 0xBC => 1,                       // bipush / newarray
            0x11 => 2,                              // sipush
            0x15..=0x19 | 0x36..=0x3A | 0xA9 => 1,  // loads / stores / ret
            0x84 => 2,                              // iinc
            0x99..=0xA8 | 0xC6 | 0xC7 => 2,         // branches
            0xC8 | 0xC9 => 4,                       // goto_w / jsr_w
            0xC4 => {
                // wide: modified opcode plus 16-bit index, iinc adds a constant
                if code.get(pc + 1) == Some(&0x84) {
                    5
                } else {
                    3
                }
            }
            0xAA => {
                // tableswitch
                let aligned = align4(pc + 1);
                let low = read_code_i32(code, aligned + 4)?;
                let high = read_code_i32(code, aligned + 8)?;
                let jumps = i64::from(high) - i64::from(low) + 1;
                if jumps < 0 || jumps > code.len() as i64 {
                    return Err(malformed_error!("Code - tableswitch range {}", jumps));
                }
                aligned + 12 + (jumps as usize) * 4 - pc - 1
            }
            0xAB => {
                // lookupswitch
                let aligned = align4(pc + 1);
                let pairs = read_code_i32(code, aligned + 4)?;
                if pairs < 0 || pairs as i64 > code.len() as i64 {
                    return Err(malformed_error!("Code - lookupswitch pairs {}", pairs));
                }
                aligned + 8 + (pairs as usize) * 8 - pc - 1
            }
            _ => 0,
        };

        pc += 1 + operand_len;
    }

    Ok(())
}

fn push_constant_ref(index: u16, pool: &ConstantPool, refs: &mut Vec<CodeRef>) {
    match pool.get(index) {
        Some(Constant::Class(name_index)) => {
            if let Ok(class_name) = pool.utf8(*name_index) {
                refs.push(CodeRef::Class(class_name.to_string()));
            }
        }
        Some(Constant::MethodType(descriptor_index)) => {
            if let Ok(descriptor) = pool.utf8(*descriptor_index) {
                refs.push(CodeRef::MethodType(descriptor.to_string()));
            }
        }
        Some(Constant::MethodHandle(kind, reference_index)) => {
            if let Ok((owner, member_name, descriptor)) = pool.member_ref(*reference_index) {
                let code_ref = if *kind <= 4 {
                    CodeRef::Field(
                        owner.to_string(),
                        member_name.to_string(),
                        descriptor.to_string(),
                    )
                } else {
                    CodeRef::Method(
                        owner.to_string(),
                        member_name.to_string(),
                        descriptor.to_string(),
                    )
                };
                refs.push(code_ref);
            }
        }
        _ => {}
    }
}

fn read_code_u16(code: &[u8], at: usize) -> Result<u16> {
    if at + 2 > code.len() {
        return Err(out_of_bounds_error!());
    }
    Ok(u16::from_be_bytes([code[at], code[at + 1]]))
}

fn read_code_i32(code: &[u8], at: usize) -> Result<i32> {
    if at + 4 > code.len() {
        return Err(out_of_bounds_error!());
    }
    Ok(i32::from_be_bytes([
        code[at],
        code[at + 1],
        code[at + 2],
        code[at + 3],
    ]))
}

fn align4(value: usize) -> usize {
    (value + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::pool::PoolBuilder;

    /// Hand-assemble a minimal class: one method `go()V` whose body calls
    /// `b/B.<init>()V` on a fresh `b/B`, inside a handler for `e/Err`.
    fn crafted_class_bytes() -> Vec<u8> {
        let mut pool = PoolBuilder::new();
        let this_class = pool.class("a/A");
        let super_class = pool.class("java/lang/Object");
        let target_ctor = pool.methodref("b/B", "<init>", "()V");
        let target_class = pool.class("b/B");
        let catch_class = pool.class("e/Err");
        let method_name = pool.utf8("go");
        let method_descriptor = pool.utf8("()V");
        let code_attr = pool.utf8("Code");

        // new b/B; dup; invokespecial b/B.<init>()V; return
        let mut code = Vec::new();
        code.push(0xBB);
        code.extend_from_slice(&target_class.to_be_bytes());
        code.push(0x59);
        code.push(0xB7);
        code.extend_from_slice(&target_ctor.to_be_bytes());
        code.push(0xB1);

        let mut code_info = Vec::new();
        code_info.extend_from_slice(&2_u16.to_be_bytes()); // max_stack
        code_info.extend_from_slice(&1_u16.to_be_bytes()); // max_locals
        code_info.extend_from_slice(&(code.len() as u32).to_be_bytes());
        code_info.extend_from_slice(&code);
        code_info.extend_from_slice(&1_u16.to_be_bytes()); // exception table
        code_info.extend_from_slice(&0_u16.to_be_bytes());
        code_info.extend_from_slice(&(code.len() as u16).to_be_bytes());
        code_info.extend_from_slice(&0_u16.to_be_bytes());
        code_info.extend_from_slice(&catch_class.to_be_bytes());
        code_info.extend_from_slice(&0_u16.to_be_bytes()); // code attributes

        let mut out = Vec::new();
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes());
        out.extend_from_slice(&52_u16.to_be_bytes());
        pool.encode(&mut out).unwrap();
        out.extend_from_slice(&0x0021_u16.to_be_bytes()); // public super
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes()); // interfaces
        out.extend_from_slice(&0_u16.to_be_bytes()); // fields
        out.extend_from_slice(&1_u16.to_be_bytes()); // methods
        out.extend_from_slice(&0x0001_u16.to_be_bytes());
        out.extend_from_slice(&method_name.to_be_bytes());
        out.extend_from_slice(&method_descriptor.to_be_bytes());
        out.extend_from_slice(&1_u16.to_be_bytes()); // one attribute
        out.extend_from_slice(&code_attr.to_be_bytes());
        out.extend_from_slice(&(code_info.len() as u32).to_be_bytes());
        out.extend_from_slice(&code_info);
        out.extend_from_slice(&0_u16.to_be_bytes()); // class attributes
        out
    }

    #[test]
    fn decodes_crafted_class_and_code_refs() {
        let bytes = crafted_class_bytes();
        let model = read_class(&bytes).unwrap();

        assert_eq!(model.name, "a/A");
        assert_eq!(model.super_name.as_deref(), Some("java/lang/Object"));
        assert_eq!(model.methods.len(), 1);

        let method = &model.methods[0];
        assert_eq!(method.name, "go");
        let Some(MethodBody::Original { refs }) = &method.body else {
            panic!("expected an original body");
        };
        assert!(refs.contains(&CodeRef::Class("b/B".to_string())));
        assert!(refs.contains(&CodeRef::Method(
            "b/B".to_string(),
            "<init>".to_string(),
            "()V".to_string()
        )));
        assert!(refs.contains(&CodeRef::Class("e/Err".to_string())));
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = [0_u8; 16];
        assert!(read_class(&bytes).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = crafted_class_bytes();
        bytes[6] = 0xFF; // major version high byte
        assert!(matches!(
            read_class(&bytes),
            Err(crate::Error::UnsupportedVersion(_))
        ));
    }
}
