//! Constant-pool decoding and encoding.
//!
//! The constant pool is the indirection table every other class-file structure points
//! into. Two types live here:
//!
//! - [`ConstantPool`] - the decoded pool of an existing class, with typed accessors
//!   that resolve the index chains (`Class -> Utf8`, `NameAndType -> Utf8 + Utf8`, ...)
//!   used throughout the reader.
//! - [`PoolBuilder`] - a deduplicating builder used when encoding a rewritten class.
//!   Rewritten classes always get a freshly built pool; indices from the original pool
//!   are never reused because the retained member set (and therefore the set of live
//!   constants) has changed.
//!
//! `Long` and `Double` entries occupy two pool slots in both directions, per the
//! class-file format.

use std::collections::HashMap;

use crate::{file::Parser, Result};

/// One decoded constant-pool entry.
///
/// Index operands are kept raw (`u16`); resolution to strings happens through the
/// typed accessors on [`ConstantPool`] so that a dangling index is reported at the
/// use site rather than during pool decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Modified-UTF-8 string data
    Utf8(String),
    /// 32-bit integer
    Integer(i32),
    /// 32-bit float
    Float(f32),
    /// 64-bit integer, occupies two slots
    Long(i64),
    /// 64-bit float, occupies two slots
    Double(f64),
    /// Class reference: index of the name `Utf8`
    Class(u16),
    /// String literal: index of the value `Utf8`
    String(u16),
    /// Field reference: class index, name-and-type index
    Fieldref(u16, u16),
    /// Method reference: class index, name-and-type index
    Methodref(u16, u16),
    /// Interface method reference: class index, name-and-type index
    InterfaceMethodref(u16, u16),
    /// Name and descriptor pair: name `Utf8` index, descriptor `Utf8` index
    NameAndType(u16, u16),
    /// Method handle: reference kind, reference index
    MethodHandle(u8, u16),
    /// Method type: index of the descriptor `Utf8`
    MethodType(u16),
    /// Dynamically computed constant: bootstrap index, name-and-type index
    Dynamic(u16, u16),
    /// Dynamically computed call site: bootstrap index, name-and-type index
    InvokeDynamic(u16, u16),
    /// Module name reference
    Module(u16),
    /// Package name reference
    Package(u16),
    /// Unusable slot following a `Long` or `Double`
    Wide,
}

/// The decoded constant pool of one class.
pub struct ConstantPool {
    /// Entries indexed 1..count; slot 0 is unused by the format.
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Decode a constant pool from the parser's current position.
    ///
    /// On success the parser is left positioned immediately after the pool, which the
    /// metadata pruner relies on when walking raw class bytes.
    ///
    /// # Errors
    /// Returns an error if an entry tag is unknown or the data is truncated.
    pub fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let count = parser.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Wide); // slot 0

        while entries.len() < count as usize {
            let tag = parser.read_u8()?;
            let constant = match tag {
                1 => Constant::Utf8(parser.read_prefixed_str()?),
                3 => Constant::Integer(parser.read_i32()?),
                4 => Constant::Float(f32::from_bits(parser.read_u32()?)),
                5 => Constant::Long(parser.read_u64()? as i64),
                6 => Constant::Double(f64::from_bits(parser.read_u64()?)),
                7 => Constant::Class(parser.read_u16()?),
                8 => Constant::String(parser.read_u16()?),
                9 => Constant::Fieldref(parser.read_u16()?, parser.read_u16()?),
                10 => Constant::Methodref(parser.read_u16()?, parser.read_u16()?),
                11 => Constant::InterfaceMethodref(parser.read_u16()?, parser.read_u16()?),
                12 => Constant::NameAndType(parser.read_u16()?, parser.read_u16()?),
                15 => Constant::MethodHandle(parser.read_u8()?, parser.read_u16()?),
                16 => Constant::MethodType(parser.read_u16()?),
                17 => Constant::Dynamic(parser.read_u16()?, parser.read_u16()?),
                18 => Constant::InvokeDynamic(parser.read_u16()?, parser.read_u16()?),
                19 => Constant::Module(parser.read_u16()?),
                20 => Constant::Package(parser.read_u16()?),
                _ => return Err(malformed_error!("ConstantPool - unknown tag {}", tag)),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            if wide {
                entries.push(Constant::Wide);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Look up an entry by pool index.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize)
    }

    /// Resolve an index that must name a `Utf8` entry.
    ///
    /// # Errors
    /// Returns a malformed error if the index is dangling or names another tag.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(malformed_error!("ConstantPool - index {} is not Utf8", index)),
        }
    }

    /// Resolve an index that must name a `Class` entry, yielding the class name.
    ///
    /// The resulting string is an internal class name, or an array descriptor for
    /// array classes referenced by instructions like `checkcast`.
    ///
    /// # Errors
    /// Returns a malformed error if either link in the chain is invalid.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => Err(malformed_error!("ConstantPool - index {} is not Class", index)),
        }
    }

    /// Resolve an optional `Class` index, where 0 means absent.
    ///
    /// # Errors
    /// Returns a malformed error for a nonzero index that is not a valid class chain.
    pub fn opt_class_name(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Resolve an index that must name a `NameAndType` entry.
    ///
    /// # Errors
    /// Returns a malformed error if any link in the chain is invalid.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index) {
            Some(Constant::NameAndType(name_index, descriptor_index)) => {
                Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
            }
            _ => Err(malformed_error!(
                "ConstantPool - index {} is not NameAndType",
                index
            )),
        }
    }

    /// Resolve a `Fieldref`/`Methodref`/`InterfaceMethodref` entry into
    /// `(owner, name, descriptor)`.
    ///
    /// # Errors
    /// Returns a malformed error if the index names another tag or a link is dangling.
    pub fn member_ref(&self, index: u16) -> Result<(&str, &str, &str)> {
        match self.get(index) {
            Some(
                Constant::Fieldref(class_index, nat_index)
                | Constant::Methodref(class_index, nat_index)
                | Constant::InterfaceMethodref(class_index, nat_index),
            ) => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*nat_index)?;
                Ok((owner, name, descriptor))
            }
            _ => Err(malformed_error!(
                "ConstantPool - index {} is not a member reference",
                index
            )),
        }
    }
}

/// Write-side constant, hashable for deduplication.
///
/// Float and double values are keyed by their bit patterns so that `NaN` payloads and
/// signed zeros dedup exactly the way they will be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolEntry {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    NameAndType(u16, u16),
    Methodref(u16, u16),
}

impl PoolEntry {
    fn is_wide(&self) -> bool {
        matches!(self, PoolEntry::Long(_) | PoolEntry::Double(_))
    }
}

/// A deduplicating constant-pool builder for encoding rewritten classes.
///
/// Interning the same constant twice yields the same index. The builder hands out
/// indices eagerly so that structure encoders can embed them while the pool is still
/// growing; [`PoolBuilder::encode`] is called last, once every structure has interned
/// what it needs.
#[derive(Default)]
pub struct PoolBuilder {
    entries: Vec<PoolEntry>,
    lookup: HashMap<PoolEntry, u16>,
    next_index: u16,
}

impl PoolBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        PoolBuilder {
            entries: Vec::new(),
            lookup: HashMap::new(),
            next_index: 1,
        }
    }

    fn intern(&mut self, entry: PoolEntry) -> u16 {
        if let Some(existing) = self.lookup.get(&entry) {
            return *existing;
        }

        let index = self.next_index;
        self.next_index += if entry.is_wide() { 2 } else { 1 };
        self.lookup.insert(entry.clone(), index);
        self.entries.push(entry);
        index
    }

    /// Intern a `Utf8` entry.
    pub fn utf8(&mut self, value: &str) -> u16 {
        self.intern(PoolEntry::Utf8(value.to_string()))
    }

    /// Intern an `Integer` entry.
    pub fn integer(&mut self, value: i32) -> u16 {
        self.intern(PoolEntry::Integer(value))
    }

    /// Intern a `Float` entry.
    pub fn float(&mut self, value: f32) -> u16 {
        self.intern(PoolEntry::Float(value.to_bits()))
    }

    /// Intern a `Long` entry (occupies two slots).
    pub fn long(&mut self, value: i64) -> u16 {
        self.intern(PoolEntry::Long(value))
    }

    /// Intern a `Double` entry (occupies two slots).
    pub fn double(&mut self, value: f64) -> u16 {
        self.intern(PoolEntry::Double(value.to_bits()))
    }

    /// Intern a `Class` entry for an internal class name.
    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.intern(PoolEntry::Class(name_index))
    }

    /// Intern a `NameAndType` entry.
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.intern(PoolEntry::NameAndType(name_index, descriptor_index))
    }

    /// Intern a `Methodref` entry.
    pub fn methodref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        self.intern(PoolEntry::Methodref(class_index, nat_index))
    }

    /// Number of pool slots used so far, including slot 0 and wide padding.
    #[must_use]
    pub fn slot_count(&self) -> u16 {
        self.next_index
    }

    /// Encode the pool (count word plus entries) into `out`.
    ///
    /// # Errors
    /// Returns a malformed error if the pool outgrew the format's 16-bit index space.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        if self.entries.len() >= u16::MAX as usize {
            return Err(malformed_error!("ConstantPool - too many entries"));
        }

        out.extend_from_slice(&self.next_index.to_be_bytes());
        for entry in &self.entries {
            match entry {
                PoolEntry::Utf8(value) => {
                    out.push(1);
                    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                PoolEntry::Integer(value) => {
                    out.push(3);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                PoolEntry::Float(bits) => {
                    out.push(4);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                PoolEntry::Long(value) => {
                    out.push(5);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                PoolEntry::Double(bits) => {
                    out.push(6);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                PoolEntry::Class(name_index) => {
                    out.push(7);
                    out.extend_from_slice(&name_index.to_be_bytes());
                }
                PoolEntry::NameAndType(name_index, descriptor_index) => {
                    out.push(12);
                    out.extend_from_slice(&name_index.to_be_bytes());
                    out.extend_from_slice(&descriptor_index.to_be_bytes());
                }
                PoolEntry::Methodref(class_index, nat_index) => {
                    out.push(10);
                    out.extend_from_slice(&class_index.to_be_bytes());
                    out.extend_from_slice(&nat_index.to_be_bytes());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_dedups() {
        let mut pool = PoolBuilder::new();
        let a = pool.class("a/B");
        let b = pool.class("a/B");
        assert_eq!(a, b);

        let first = pool.utf8("a/B");
        // The class entry interned its name Utf8 first.
        assert_eq!(first, 1);
    }

    #[test]
    fn wide_entries_take_two_slots() {
        let mut pool = PoolBuilder::new();
        let long_index = pool.long(7);
        let after = pool.utf8("x");
        assert_eq!(after, long_index + 2);
    }

    #[test]
    fn encode_parse_round_trip() {
        let mut pool = PoolBuilder::new();
        pool.methodref("java/lang/Object", "<init>", "()V");
        pool.integer(-3);
        pool.double(2.5);

        let mut bytes = Vec::new();
        pool.encode(&mut bytes).unwrap();

        let mut parser = Parser::new(&bytes);
        let decoded = ConstantPool::parse(&mut parser).unwrap();
        assert_eq!(parser.pos(), bytes.len());

        // Methodref was interned as: Utf8(name), Class, Utf8(<init>), Utf8(()V), NameAndType, Methodref.
        let (owner, name, descriptor) = decoded.member_ref(6).unwrap();
        assert_eq!(owner, "java/lang/Object");
        assert_eq!(name, "<init>");
        assert_eq!(descriptor, "()V");
        assert_eq!(decoded.get(7), Some(&Constant::Integer(-3)));
        assert_eq!(decoded.get(8), Some(&Constant::Double(2.5)));
        assert_eq!(decoded.get(9), Some(&Constant::Wide));
    }
}
