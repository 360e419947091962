//! Structured annotation decoding and encoding.
//!
//! Annotations are the one attribute family that must be carried through a rewrite
//! fully decoded: their element values embed constant-pool indices, and a rewritten
//! class gets a freshly built pool. The types here mirror the `annotation` and
//! `element_value` structures of the class-file format.
//!
//! Type annotations additionally carry a target description (what the annotation is
//! attached to: a type parameter, a throws clause, ...). The target contains no pool
//! references, so it is preserved as raw bytes and only the trailing annotation is
//! decoded.

use crate::{
    classfile::pool::{ConstantPool, PoolBuilder},
    file::Parser,
    Result,
};

/// One decoded annotation: the annotation type's descriptor plus named element values.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, e.g. `Ljava/lang/Deprecated;`
    pub type_descriptor: String,
    /// Element name/value pairs in declaration order
    pub elements: Vec<(String, ElementValue)>,
}

/// A decoded `element_value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Integral constant; `tag` distinguishes `B`, `C`, `I`, `S`, `Z`
    Int {
        /// Original element tag byte
        tag: u8,
        /// The constant value
        value: i32,
    },
    /// `J` constant
    Long(i64),
    /// `F` constant
    Float(f32),
    /// `D` constant
    Double(f64),
    /// `s` constant
    Str(String),
    /// `e` enum constant: type descriptor and constant name
    Enum {
        /// Field descriptor of the enum type
        type_descriptor: String,
        /// Name of the enum constant
        const_name: String,
    },
    /// `c` class literal: the return descriptor of the referenced type
    Class(String),
    /// `@` nested annotation
    Annotation(Box<Annotation>),
    /// `[` array of element values
    Array(Vec<ElementValue>),
}

/// A decoded type annotation: raw target description plus the annotation proper.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    /// `target_type`, `target_info` and `target_path`, byte-identical to the input
    pub target: Vec<u8>,
    /// The annotation attached to the target
    pub annotation: Annotation,
}

/// Decode a `u16`-counted annotation list.
///
/// # Errors
/// Returns an error on truncated data, unknown element tags, or dangling pool indices.
pub fn parse_annotations(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<Vec<Annotation>> {
    let count = parser.read_u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(parser, pool)?);
    }
    Ok(annotations)
}

/// Decode a single annotation structure.
///
/// # Errors
/// Returns an error on truncated data, unknown element tags, or dangling pool indices.
pub fn parse_annotation(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<Annotation> {
    let type_index = parser.read_u16()?;
    let type_descriptor = pool.utf8(type_index)?.to_string();

    let pair_count = parser.read_u16()?;
    let mut elements = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name_index = parser.read_u16()?;
        let name = pool.utf8(name_index)?.to_string();
        elements.push((name, parse_element_value(parser, pool)?));
    }

    Ok(Annotation {
        type_descriptor,
        elements,
    })
}

/// Decode a single `element_value`.
///
/// # Errors
/// Returns an error on truncated data, an unknown tag, or a dangling pool index.
pub fn parse_element_value(parser: &mut Parser<'_>, pool: &ConstantPool) -> Result<ElementValue> {
    let tag = parser.read_u8()?;
    match tag {
        b'B' | b'C' | b'I' | b'S' | b'Z' => {
            let index = parser.read_u16()?;
            match pool.get(index) {
                Some(crate::classfile::pool::Constant::Integer(value)) => {
                    Ok(ElementValue::Int { tag, value: *value })
                }
                _ => Err(malformed_error!(
                    "ElementValue - index {} is not Integer",
                    index
                )),
            }
        }
        b'J' => {
            let index = parser.read_u16()?;
            match pool.get(index) {
                Some(crate::classfile::pool::Constant::Long(value)) => {
                    Ok(ElementValue::Long(*value))
                }
                _ => Err(malformed_error!("ElementValue - index {} is not Long", index)),
            }
        }
        b'F' => {
            let index = parser.read_u16()?;
            match pool.get(index) {
                Some(crate::classfile::pool::Constant::Float(value)) => {
                    Ok(ElementValue::Float(*value))
                }
                _ => Err(malformed_error!("ElementValue - index {} is not Float", index)),
            }
        }
        b'D' => {
            let index = parser.read_u16()?;
            match pool.get(index) {
                Some(crate::classfile::pool::Constant::Double(value)) => {
                    Ok(ElementValue::Double(*value))
                }
                _ => Err(malformed_error!("ElementValue - index {} is not Double", index)),
            }
        }
        b's' => {
            let index = parser.read_u16()?;
            Ok(ElementValue::Str(pool.utf8(index)?.to_string()))
        }
        b'e' => {
            let type_index = parser.read_u16()?;
            let name_index = parser.read_u16()?;
            Ok(ElementValue::Enum {
                type_descriptor: pool.utf8(type_index)?.to_string(),
                const_name: pool.utf8(name_index)?.to_string(),
            })
        }
        b'c' => {
            let index = parser.read_u16()?;
            Ok(ElementValue::Class(pool.utf8(index)?.to_string()))
        }
        b'@' => Ok(ElementValue::Annotation(Box::new(parse_annotation(
            parser, pool,
        )?))),
        b'[' => {
            let count = parser.read_u16()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(parser, pool)?);
            }
            Ok(ElementValue::Array(values))
        }
        _ => Err(malformed_error!("ElementValue - unknown tag {}", tag)),
    }
}

/// Decode a `u16`-counted type-annotation list, preserving targets as raw bytes.
///
/// # Errors
/// Returns an error on truncated data or an unknown target type.
pub fn parse_type_annotations(
    parser: &mut Parser<'_>,
    pool: &ConstantPool,
) -> Result<Vec<TypeAnnotation>> {
    let count = parser.read_u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let target_start = parser.pos();
        skip_target(parser)?;
        skip_type_path(parser)?;
        let target = parser.slice(target_start, parser.pos())?.to_vec();

        let annotation = parse_annotation(parser, pool)?;
        annotations.push(TypeAnnotation { target, annotation });
    }
    Ok(annotations)
}

/// Advance the parser past `target_type` and `target_info`.
fn skip_target(parser: &mut Parser<'_>) -> Result<()> {
    let target_type = parser.read_u8()?;
    let info_len = match target_type {
        0x00 | 0x01 | 0x16 => 1,
        0x10 | 0x11 | 0x12 | 0x17 | 0x42 | 0x43 | 0x44 | 0x45 | 0x46 => 2,
        0x13 | 0x14 | 0x15 => 0,
        0x47 | 0x48 | 0x49 | 0x4A | 0x4B => 3,
        0x40 | 0x41 => {
            let entry_count = parser.read_u16()?;
            return parser.advance_by(entry_count as usize * 6);
        }
        _ => {
            return Err(malformed_error!(
                "TypeAnnotation - unknown target type {:#x}",
                target_type
            ))
        }
    };
    parser.advance_by(info_len)
}

/// Advance the parser past a `type_path`.
fn skip_type_path(parser: &mut Parser<'_>) -> Result<()> {
    let path_length = parser.read_u8()?;
    parser.advance_by(path_length as usize * 2)
}

/// Encode an annotation list with its count word.
pub fn encode_annotations(annotations: &[Annotation], pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for annotation in annotations {
        encode_annotation(annotation, pool, out);
    }
}

/// Encode a single annotation structure.
pub fn encode_annotation(annotation: &Annotation, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    let type_index = pool.utf8(&annotation.type_descriptor);
    out.extend_from_slice(&type_index.to_be_bytes());
    out.extend_from_slice(&(annotation.elements.len() as u16).to_be_bytes());
    for (name, value) in &annotation.elements {
        let name_index = pool.utf8(name);
        out.extend_from_slice(&name_index.to_be_bytes());
        encode_element_value(value, pool, out);
    }
}

/// Encode a single `element_value`.
pub fn encode_element_value(value: &ElementValue, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
    match value {
        ElementValue::Int { tag, value } => {
            out.push(*tag);
            let index = pool.integer(*value);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Long(v) => {
            out.push(b'J');
            let index = pool.long(*v);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Float(v) => {
            out.push(b'F');
            let index = pool.float(*v);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Double(v) => {
            out.push(b'D');
            let index = pool.double(*v);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Str(v) => {
            out.push(b's');
            let index = pool.utf8(v);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => {
            out.push(b'e');
            let type_index = pool.utf8(type_descriptor);
            let name_index = pool.utf8(const_name);
            out.extend_from_slice(&type_index.to_be_bytes());
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        ElementValue::Class(descriptor) => {
            out.push(b'c');
            let index = pool.utf8(descriptor);
            out.extend_from_slice(&index.to_be_bytes());
        }
        ElementValue::Annotation(nested) => {
            out.push(b'@');
            encode_annotation(nested, pool, out);
        }
        ElementValue::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&(values.len() as u16).to_be_bytes());
            for nested in values {
                encode_element_value(nested, pool, out);
            }
        }
    }
}

/// Encode a type-annotation list, replaying the preserved target bytes.
pub fn encode_type_annotations(
    annotations: &[TypeAnnotation],
    pool: &mut PoolBuilder,
    out: &mut Vec<u8>,
) {
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for annotation in annotations {
        out.extend_from_slice(&annotation.target);
        encode_annotation(&annotation.annotation, pool, out);
    }
}
