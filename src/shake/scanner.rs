//! Extraction of referenced class names from descriptors, generic signatures and
//! annotations.
//!
//! These are pure functions: each returns the internal class names it could
//! extract, and nothing else. Scanning is deliberately forgiving: a malformed
//! signature or annotation value contributes whatever was recognized before the
//! malformation and is otherwise ignored. Internally every scan is an explicit
//! `Result` so the bail-out points are visible; the public functions discard the
//! error and return the partial harvest, which callers union into their frontier.

use crate::classfile::{
    annotations::{Annotation, ElementValue, TypeAnnotation},
    descriptor,
};

/// Class names referenced by a field descriptor.
///
/// Array dimensions are unwrapped; primitives contribute nothing.
#[must_use]
pub fn field_descriptor_types(descriptor_text: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(name) = descriptor::class_at(descriptor_text.as_bytes(), 0) {
        out.push(name.to_string());
    }
    out
}

/// Class names referenced by a method descriptor: every parameter type plus the
/// return type.
#[must_use]
pub fn method_descriptor_types(descriptor_text: &str) -> Vec<String> {
    let bytes = descriptor_text.as_bytes();
    let mut out = Vec::new();

    let mut position = match descriptor_text.find('(') {
        Some(index) => index + 1,
        None => return out,
    };
    while position < bytes.len() && bytes[position] != b')' {
        if let Some(name) = descriptor::class_at(bytes, position) {
            out.push(name.to_string());
        }
        match descriptor::scan_type(bytes, position) {
            Some((next, _)) => position = next,
            None => return out,
        }
    }

    if position < bytes.len() {
        if let Some(name) = descriptor::class_at(bytes, position + 1) {
            out.push(name.to_string());
        }
    }
    out
}

/// Class names referenced by a generic signature string.
///
/// Accepts class, method and field signatures alike; the grammar is unified at
/// the top. Only the outermost name of each class type is collected; inner-class
/// suffixes qualify the outer name rather than referencing a separate constant.
#[must_use]
pub fn signature_types(signature: &str) -> Vec<String> {
    let mut scanner = SignatureScanner {
        bytes: signature.as_bytes(),
        position: 0,
        out: Vec::new(),
    };
    let _ = scanner.scan_top();
    scanner.out
}

/// Class names referenced by an annotation list: each annotation's own type plus
/// everything reachable through its element values (class literals, enum types,
/// nested annotations, arrays thereof).
#[must_use]
pub fn annotation_types(annotations: &[Annotation]) -> Vec<String> {
    let mut out = Vec::new();
    for annotation in annotations {
        collect_annotation(annotation, &mut out);
    }
    out
}

/// Class names referenced by a type-annotation list.
#[must_use]
pub fn type_annotation_types(annotations: &[TypeAnnotation]) -> Vec<String> {
    let mut out = Vec::new();
    for type_annotation in annotations {
        collect_annotation(&type_annotation.annotation, &mut out);
    }
    out
}

fn collect_annotation(annotation: &Annotation, out: &mut Vec<String>) {
    if let Some(name) = descriptor::class_at(annotation.type_descriptor.as_bytes(), 0) {
        out.push(name.to_string());
    }
    for (_, value) in &annotation.elements {
        collect_element_value(value, out);
    }
}

fn collect_element_value(value: &ElementValue, out: &mut Vec<String>) {
    match value {
        ElementValue::Class(descriptor_text) => {
            if let Some(name) = descriptor::class_at(descriptor_text.as_bytes(), 0) {
                out.push(name.to_string());
            }
        }
        ElementValue::Enum {
            type_descriptor, ..
        } => {
            if let Some(name) = descriptor::class_at(type_descriptor.as_bytes(), 0) {
                out.push(name.to_string());
            }
        }
        ElementValue::Annotation(nested) => collect_annotation(nested, out),
        ElementValue::Array(values) => {
            for nested in values {
                collect_element_value(nested, out);
            }
        }
        _ => {}
    }
}

/// Recursive-descent scanner over the signature grammar.
struct SignatureScanner<'a> {
    bytes: &'a [u8],
    position: usize,
    out: Vec<String>,
}

impl SignatureScanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn bump(&mut self) {
        self.position += 1;
    }

    /// ClassSignature, MethodSignature and FieldSignature share a prefix shape:
    /// optional type parameters, then either a parenthesized parameter list with
    /// return and throws, or a plain run of types.
    fn scan_top(&mut self) -> Result<(), ()> {
        if self.peek() == Some(b'<') {
            self.scan_type_parameters()?;
        }

        if self.peek() == Some(b'(') {
            self.bump();
            while self.peek() != Some(b')') {
                if self.peek().is_none() {
                    return Err(());
                }
                self.scan_type()?;
            }
            self.bump();
            self.scan_type()?; // return type, V included
            while self.peek() == Some(b'^') {
                self.bump();
                self.scan_type()?;
            }
        } else {
            while self.peek().is_some() {
                self.scan_type()?;
            }
        }

        Ok(())
    }

    /// `< Identifier : ClassBound? (: InterfaceBound)* ... >`
    fn scan_type_parameters(&mut self) -> Result<(), ()> {
        self.bump(); // '<'
        while self.peek() != Some(b'>') {
            if self.peek().is_none() {
                return Err(());
            }
            // Identifier up to the first bound colon.
            while !matches!(self.peek(), Some(b':') | None) {
                self.bump();
            }
            if self.peek().is_none() {
                return Err(());
            }
            // One or more bounds, the class bound possibly empty.
            while self.peek() == Some(b':') {
                self.bump();
                if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                    self.scan_type()?;
                }
            }
        }
        self.bump(); // '>'
        Ok(())
    }

    fn scan_type(&mut self) -> Result<(), ()> {
        match self.peek() {
            None => Err(()),
            Some(b'[') => {
                self.bump();
                self.scan_type()
            }
            Some(b'L') => self.scan_class_type(),
            Some(b'T') => {
                // Type variable: skip to the terminating ';'.
                while !matches!(self.peek(), Some(b';') | None) {
                    self.bump();
                }
                if self.peek().is_none() {
                    return Err(());
                }
                self.bump();
                Ok(())
            }
            Some(b'*') => {
                self.bump();
                Ok(())
            }
            Some(b'+' | b'-') => {
                self.bump();
                self.scan_type()
            }
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V') => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(()),
        }
    }

    fn scan_class_type(&mut self) -> Result<(), ()> {
        self.bump(); // 'L'
        let start = self.position;
        while !matches!(self.peek(), Some(b';' | b'<' | b'.') | None) {
            self.bump();
        }
        if self.position > start {
            if let Ok(name) = std::str::from_utf8(&self.bytes[start..self.position]) {
                self.out.push(name.to_string());
            }
        }

        loop {
            match self.peek() {
                Some(b';') => {
                    self.bump();
                    return Ok(());
                }
                Some(b'<') => {
                    self.bump();
                    while self.peek() != Some(b'>') {
                        if self.peek().is_none() {
                            return Err(());
                        }
                        self.scan_type()?;
                    }
                    self.bump();
                }
                Some(b'.') => {
                    // Inner-class suffix; the segment name is not a separate reference.
                    self.bump();
                    while !matches!(self.peek(), Some(b';' | b'<' | b'.') | None) {
                        self.bump();
                    }
                }
                _ => return Err(()),
            }
        }
    }
}
