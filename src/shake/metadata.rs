//! Declaration-metadata pruning.
//!
//! Some toolchains attach a structured side record to a class describing its
//! source-level declarations at a finer grain than bytecode signatures: a
//! property is really a getter/setter/backing-field triple, a file facade is a
//! bag of top-level functions. After members are stripped, that record must not
//! keep naming them; reflective frameworks that trust it would resolve ghosts.
//!
//! The record travels in the [`DECLARATIONS_ATTRIBUTE`] class attribute and is
//! pruned here, directly on the already-encoded class bytes: the payload is
//! self-contained (no constant-pool references), so replacing it is a splice of
//! the attribute body plus a length patch. Everything is best-effort and
//! fail-open: any parse or mapping failure leaves the bytes untouched and
//! reports nothing.

use crate::{
    classfile::{pool::ConstantPool, DECLARATIONS_ATTRIBUTE},
    file::Parser,
    shake::types::{KeepSets, MemberKey},
    Result,
};

/// A bytecode-level member signature named by a declaration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSig {
    /// Member name (`<init>` for constructors)
    pub name: String,
    /// Field or method descriptor
    pub descriptor: String,
}

/// A property declaration: up to three underlying members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name as declared in source
    pub name: String,
    /// Getter method signature, if the property has one
    pub getter: Option<MemberSig>,
    /// Setter method signature, if the property has one
    pub setter: Option<MemberSig>,
    /// Backing-field signature, if the property has one
    pub field: Option<MemberSig>,
}

/// Declarations of a class-shaped record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDeclarations {
    /// Declared constructors
    pub constructors: Vec<MemberSig>,
    /// Declared functions
    pub functions: Vec<MemberSig>,
    /// Declared properties
    pub properties: Vec<Property>,
}

/// Declarations of a file/package-shaped record (top-level declarations).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDeclarations {
    /// Declared functions
    pub functions: Vec<MemberSig>,
    /// Declared properties
    pub properties: Vec<Property>,
}

/// The decoded logical shape of a declaration-metadata blob.
///
/// Pruning is defined for the first two shapes only; anything unrecognized
/// passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationTable {
    /// A class-level declaration table
    Class(ClassDeclarations),
    /// A file- or package-level declaration table
    Package(PackageDeclarations),
    /// A shape this library does not interpret
    Unsupported,
}

const FORMAT_VERSION: u8 = 1;
const SHAPE_CLASS: u8 = 1;
const SHAPE_PACKAGE: u8 = 2;

impl DeclarationTable {
    /// Decode a blob payload.
    ///
    /// Unknown versions and shape tags decode to [`DeclarationTable::Unsupported`]
    /// rather than erroring; only truncation and malformed strings are errors.
    ///
    /// # Errors
    /// Returns an error if the payload is truncated or a string is not UTF-8.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut parser = Parser::new(payload);
        let version = parser.read_u8()?;
        if version != FORMAT_VERSION {
            return Ok(DeclarationTable::Unsupported);
        }

        match parser.read_u8()? {
            SHAPE_CLASS => Ok(DeclarationTable::Class(ClassDeclarations {
                constructors: read_member_sigs(&mut parser)?,
                functions: read_member_sigs(&mut parser)?,
                properties: read_properties(&mut parser)?,
            })),
            SHAPE_PACKAGE => Ok(DeclarationTable::Package(PackageDeclarations {
                functions: read_member_sigs(&mut parser)?,
                properties: read_properties(&mut parser)?,
            })),
            _ => Ok(DeclarationTable::Unsupported),
        }
    }

    /// Encode the table into a fresh payload.
    ///
    /// [`DeclarationTable::Unsupported`] has no encoding; callers never re-encode
    /// a shape they did not decode.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![FORMAT_VERSION];
        match self {
            DeclarationTable::Class(declarations) => {
                out.push(SHAPE_CLASS);
                write_member_sigs(&declarations.constructors, &mut out);
                write_member_sigs(&declarations.functions, &mut out);
                write_properties(&declarations.properties, &mut out);
            }
            DeclarationTable::Package(declarations) => {
                out.push(SHAPE_PACKAGE);
                write_member_sigs(&declarations.functions, &mut out);
                write_properties(&declarations.properties, &mut out);
            }
            DeclarationTable::Unsupported => {}
        }
        out
    }
}

fn read_string(parser: &mut Parser<'_>) -> Result<String> {
    let length = parser.read_u16()? as usize;
    let bytes = parser.read_bytes(length)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| malformed_error!("Declarations - string is not UTF-8"))
}

fn read_member_sig(parser: &mut Parser<'_>) -> Result<MemberSig> {
    Ok(MemberSig {
        name: read_string(parser)?,
        descriptor: read_string(parser)?,
    })
}

fn read_member_sigs(parser: &mut Parser<'_>) -> Result<Vec<MemberSig>> {
    let count = parser.read_u16()?;
    let mut sigs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        sigs.push(read_member_sig(parser)?);
    }
    Ok(sigs)
}

fn read_properties(parser: &mut Parser<'_>) -> Result<Vec<Property>> {
    let count = parser.read_u16()?;
    let mut properties = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = read_string(parser)?;
        let flags = parser.read_u8()?;
        let getter = if flags & 1 != 0 {
            Some(read_member_sig(parser)?)
        } else {
            None
        };
        let setter = if flags & 2 != 0 {
            Some(read_member_sig(parser)?)
        } else {
            None
        };
        let field = if flags & 4 != 0 {
            Some(read_member_sig(parser)?)
        } else {
            None
        };
        properties.push(Property {
            name,
            getter,
            setter,
            field,
        });
    }
    Ok(properties)
}

fn write_string(value: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn write_member_sig(sig: &MemberSig, out: &mut Vec<u8>) {
    write_string(&sig.name, out);
    write_string(&sig.descriptor, out);
}

fn write_member_sigs(sigs: &[MemberSig], out: &mut Vec<u8>) {
    out.extend_from_slice(&(sigs.len() as u16).to_be_bytes());
    for sig in sigs {
        write_member_sig(sig, out);
    }
}

fn write_properties(properties: &[Property], out: &mut Vec<u8>) {
    out.extend_from_slice(&(properties.len() as u16).to_be_bytes());
    for property in properties {
        write_string(&property.name, out);
        let mut flags = 0_u8;
        if property.getter.is_some() {
            flags |= 1;
        }
        if property.setter.is_some() {
            flags |= 2;
        }
        if property.field.is_some() {
            flags |= 4;
        }
        out.push(flags);
        for sig in [&property.getter, &property.setter, &property.field]
            .into_iter()
            .flatten()
        {
            write_member_sig(sig, out);
        }
    }
}

/// Prune the declaration attribute of already-encoded class bytes.
///
/// Returns the re-encoded bytes if any entry was dropped, `None` when nothing
/// changed or anything failed to parse or map; the caller then keeps the input
/// bytes as they are.
#[must_use]
pub(crate) fn prune_class_bytes(data: &[u8], kept: &KeepSets) -> Option<Vec<u8>> {
    let located = locate_declarations(data).ok()??;
    let table = DeclarationTable::decode(&data[located.info_start..located.info_end]).ok()?;

    let (pruned, changed) = prune_table(table, &located.owner, kept);
    if !changed {
        return None;
    }

    let payload = pruned.encode();
    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..located.info_start - 4]);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&data[located.info_end..]);
    Some(out)
}

/// Apply the keep-set filter to a decoded table.
///
/// A constructor or function survives iff its method signature was kept; a
/// property survives iff any accessor was kept as a method or its backing field
/// was kept as a field. Unsupported shapes pass through untouched.
fn prune_table(table: DeclarationTable, owner: &str, kept: &KeepSets) -> (DeclarationTable, bool) {
    let method_kept = |sig: &MemberSig| {
        kept.methods
            .contains(&MemberKey::new(owner, &sig.name, &sig.descriptor))
    };
    let property_kept = |property: &Property| {
        property.getter.iter().any(method_kept)
            || property.setter.iter().any(method_kept)
            || property
                .field
                .iter()
                .any(|sig| kept.field_kept(owner, &sig.name, &sig.descriptor))
    };

    match table {
        DeclarationTable::Class(mut declarations) => {
            let before = declarations.constructors.len()
                + declarations.functions.len()
                + declarations.properties.len();
            declarations.constructors.retain(method_kept);
            declarations.functions.retain(method_kept);
            declarations.properties.retain(property_kept);
            let after = declarations.constructors.len()
                + declarations.functions.len()
                + declarations.properties.len();
            (DeclarationTable::Class(declarations), after != before)
        }
        DeclarationTable::Package(mut declarations) => {
            let before = declarations.functions.len() + declarations.properties.len();
            declarations.functions.retain(method_kept);
            declarations.properties.retain(property_kept);
            let after = declarations.functions.len() + declarations.properties.len();
            (DeclarationTable::Package(declarations), after != before)
        }
        DeclarationTable::Unsupported => (DeclarationTable::Unsupported, false),
    }
}

/// Byte range of the declaration attribute's payload within raw class bytes.
struct LocatedAttribute {
    owner: String,
    info_start: usize,
    info_end: usize,
}

/// Walk the class-file structure to the class-level attribute table and find the
/// declaration attribute, if present.
fn locate_declarations(data: &[u8]) -> Result<Option<LocatedAttribute>> {
    let mut parser = Parser::new(data);
    parser.advance_by(8)?; // magic, minor, major
    let pool = ConstantPool::parse(&mut parser)?;

    parser.advance_by(2)?; // access
    let owner = pool.class_name(parser.read_u16()?)?.to_string();
    parser.advance_by(2)?; // super
    let interface_count = parser.read_u16()?;
    parser.advance_by(interface_count as usize * 2)?;

    for _ in 0..2 {
        // fields, then methods
        let member_count = parser.read_u16()?;
        for _ in 0..member_count {
            parser.advance_by(6)?; // access, name, descriptor
            skip_attributes(&mut parser)?;
        }
    }

    let attribute_count = parser.read_u16()?;
    for _ in 0..attribute_count {
        let name_index = parser.read_u16()?;
        let length = parser.read_u32()? as usize;
        let info_start = parser.pos();
        parser.advance_by(length)?;

        if pool.utf8(name_index).ok() == Some(DECLARATIONS_ATTRIBUTE) {
            return Ok(Some(LocatedAttribute {
                owner,
                info_start,
                info_end: info_start + length,
            }));
        }
    }

    Ok(None)
}

fn skip_attributes(parser: &mut Parser<'_>) -> Result<()> {
    let count = parser.read_u16()?;
    for _ in 0..count {
        parser.advance_by(2)?;
        let length = parser.read_u32()? as usize;
        parser.advance_by(length)?;
    }
    Ok(())
}
