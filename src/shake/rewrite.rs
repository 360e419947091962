//! The bytecode rewriter: kept sets in, filtered class bytes out.
//!
//! For every kept class a *new* model is assembled (header and class-level
//! metadata copied verbatim, members filtered down to the kept sets) and encoded
//! against a fresh constant pool. Class-level metadata (signatures, annotations,
//! nesting info, record components) is never filtered per-member: the analyzer
//! already restricted attention to kept types, and shrinking these tables would
//! risk dangling references for no size win that matters.
//!
//! Every retained concrete method gets a synthesized stub body; abstract and
//! native methods keep their flags and stay bodyless. A concrete class that
//! declared at least one constructor but kept none receives a synthetic public
//! no-argument constructor, so reflection-based instantiation keeps working.
//!
//! Rewriting one class is a pure function of the immutable repository snapshot
//! and the keep sets, so classes are rewritten in parallel; output order stays
//! deterministic (discovery order) because results are collected by index.

use rayon::prelude::*;

use crate::{
    classfile::{
        descriptor::{argument_slots, ReturnCategory},
        ClassModel, MethodAccessFlags, MethodBody, MethodModel, StubBody,
    },
    classpath::ClassResolver,
    shake::{metadata, types::KeepSets},
};

/// Rewrite every kept class, returning `(name, bytes)` pairs in discovery order.
///
/// Classes the repository can no longer resolve, and the rare class that fails
/// to re-encode, are skipped, mirroring the pipeline-wide policy that per-item
/// failures never abort a run.
#[must_use]
pub fn rewrite<R>(kept: &KeepSets, resolver: &R) -> Vec<(String, Vec<u8>)>
where
    R: ClassResolver + Sync + ?Sized,
{
    kept.classes()
        .par_iter()
        .map(|name| {
            let model = resolver.resolve(name)?;
            let filtered = filter_class(&model, kept);
            let bytes = filtered.to_bytes().ok()?;
            let bytes = match metadata::prune_class_bytes(&bytes, kept) {
                Some(pruned) => pruned,
                None => bytes,
            };
            Some((name.clone(), bytes))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Assemble the filtered model for one kept class.
pub(crate) fn filter_class(model: &ClassModel, kept: &KeepSets) -> ClassModel {
    let mut out = model.clone();

    out.fields
        .retain(|field| kept.field_kept(&model.name, &field.name, &field.descriptor));

    let had_constructor = model.methods.iter().any(MethodModel::is_constructor);

    out.methods
        .retain(|method| kept.method_kept(&model.name, &method.name, &method.descriptor));
    for method in &mut out.methods {
        method.body = stub_body(method, model.super_name.as_deref());
    }

    let kept_constructor = out.methods.iter().any(MethodModel::is_constructor);
    let concrete = !model.is_interface() && !model.is_abstract();
    if concrete && had_constructor && !kept_constructor {
        out.methods.push(synthetic_default_constructor(
            model.super_name.as_deref(),
        ));
    }

    out
}

/// The replacement body for a retained method, or `None` for abstract/native ones.
fn stub_body(method: &MethodModel, super_name: Option<&str>) -> Option<MethodBody> {
    if method.is_abstract() || method.is_native() {
        return None;
    }

    let slots = argument_slots(&method.descriptor);
    let stub = if method.is_constructor() {
        StubBody::SuperConstructor {
            super_name: super_name.unwrap_or("java/lang/Object").to_string(),
            argument_slots: slots,
        }
    } else {
        StubBody::DefaultReturn {
            category: ReturnCategory::of_method_descriptor(&method.descriptor),
            local_slots: if method.is_static() { slots } else { 1 + slots },
        }
    };
    Some(MethodBody::Stub(stub))
}

fn synthetic_default_constructor(super_name: Option<&str>) -> MethodModel {
    MethodModel {
        access: MethodAccessFlags::PUBLIC,
        name: "<init>".to_string(),
        descriptor: "()V".to_string(),
        signature: None,
        exceptions: Vec::new(),
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_parameter_annotations: Vec::new(),
        invisible_parameter_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        annotation_default: None,
        body: Some(MethodBody::Stub(StubBody::SuperConstructor {
            super_name: super_name.unwrap_or("java/lang/Object").to_string(),
            argument_slots: 0,
        })),
        deprecated: false,
    }
}
