//! The reachability analyzer: worklist-based closure over classes, fields and
//! methods.
//!
//! # Algorithm
//!
//! Three FIFO queues (classes, fields, methods) are drained with class work
//! always taking priority, so a class's header edges are discovered before its
//! members are revisited. Enqueueing is guarded by keep-set insertion, so every
//! item is processed at most once and termination follows from the classpath
//! being finite. The drain priority affects discovery order (and therefore the
//! deterministic emission order of the output), never the final fixpoint: every
//! edge source is re-scanned when the item carrying it is processed, and
//! re-enqueueing an already-kept item is a no-op.
//!
//! # Edges
//!
//! Processing a *class* discovers its superclass, interfaces, generic signature,
//! class-level annotations (recursively through element values), enclosing class
//! and exact enclosing method, nest host and members, permitted subclasses,
//! record components, every declared member's descriptor/signature/annotations/
//! thrown exceptions, and both sides of every inner-class relation. Processing a
//! *field* or *method* re-scans its own descriptor, keeps its owner, and adds the
//! declared member's signature, annotation and exception edges; a kept method
//! additionally contributes the symbolic references of its body, which is what
//! pulls in the classes and members its instructions actually touch.
//!
//! Unresolvable references are dead ends, never errors: classpaths routinely
//! omit platform classes. A field root whose descriptor cannot be resolved
//! (owner missing from the classpath) degrades to keeping the owning class only.

use std::collections::VecDeque;

use crate::{
    classfile::{CodeRef, FieldModel, MethodBody, MethodModel, RecordComponent},
    classpath::ClassResolver,
    shake::{
        scanner::{
            annotation_types, field_descriptor_types, method_descriptor_types, signature_types,
            type_annotation_types,
        },
        types::{KeepSets, MemberKey},
        RootSignature,
    },
};

/// Compute the keep sets reachable from the given roots.
///
/// # Examples
///
/// ```rust,no_run
/// use jarshake::{analyze, ClasspathIndex, RootSignature};
/// use std::path::PathBuf;
///
/// let index = ClasspathIndex::new(&[PathBuf::from("app.jar")])?;
/// let roots = RootSignature::parse_list("com/example/Api#run()V");
/// let kept = analyze(&index, &roots);
/// println!("{} classes retained", kept.classes().len());
/// # Ok::<(), jarshake::Error>(())
/// ```
#[must_use]
pub fn analyze<R: ClassResolver + ?Sized>(resolver: &R, roots: &[RootSignature]) -> KeepSets {
    let mut analyzer = Analyzer {
        resolver,
        keep: KeepSets::new(),
        class_queue: VecDeque::new(),
        field_queue: VecDeque::new(),
        method_queue: VecDeque::new(),
    };
    analyzer.seed(roots);
    analyzer.run();
    analyzer.keep
}

struct Analyzer<'a, R: ?Sized> {
    resolver: &'a R,
    keep: KeepSets,
    class_queue: VecDeque<String>,
    field_queue: VecDeque<MemberKey>,
    method_queue: VecDeque<MemberKey>,
}

impl<R: ClassResolver + ?Sized> Analyzer<'_, R> {
    fn seed(&mut self, roots: &[RootSignature]) {
        for root in roots {
            match root {
                RootSignature::Class { owner } => self.add_class(owner),
                RootSignature::Field {
                    owner,
                    name,
                    descriptor,
                } => {
                    let resolved = descriptor
                        .clone()
                        .or_else(|| self.resolve_field_descriptor(owner, name));
                    match resolved {
                        Some(descriptor) => self.add_field(owner, name, &descriptor),
                        // Degrade to a class-only keep; never an error.
                        None => self.add_class(owner),
                    }
                }
                RootSignature::Method {
                    owner,
                    name,
                    descriptor,
                } => self.add_method(owner, name, descriptor),
            }
        }
    }

    fn resolve_field_descriptor(&self, owner: &str, name: &str) -> Option<String> {
        let model = self.resolver.resolve(owner)?;
        model
            .fields
            .iter()
            .find(|candidate| candidate.name == name)
            .map(|candidate| candidate.descriptor.clone())
    }

    fn run(&mut self) {
        loop {
            if let Some(class_name) = self.class_queue.pop_front() {
                self.process_class(&class_name);
            } else if let Some(key) = self.field_queue.pop_front() {
                self.process_field(&key);
            } else if let Some(key) = self.method_queue.pop_front() {
                self.process_method(&key);
            } else {
                return;
            }
        }
    }

    fn add_class(&mut self, name: &str) {
        // Array "classes" reference their element type.
        if name.starts_with('[') {
            for element in field_descriptor_types(name) {
                self.add_class(&element);
            }
            return;
        }

        if self.keep.insert_class(name) {
            self.class_queue.push_back(name.to_string());
        }
    }

    fn add_class_names(&mut self, names: Vec<String>) {
        for name in names {
            self.add_class(&name);
        }
    }

    fn add_field(&mut self, owner: &str, name: &str, descriptor: &str) {
        if owner.starts_with('[') {
            self.add_class(owner);
            return;
        }

        let key = MemberKey::new(owner, name, descriptor);
        if self.keep.fields.insert(key.clone()) {
            self.field_queue.push_back(key);
        }
        self.add_class(owner);
    }

    fn add_method(&mut self, owner: &str, name: &str, descriptor: &str) {
        if owner.starts_with('[') {
            self.add_class(owner);
            return;
        }

        let key = MemberKey::new(owner, name, descriptor);
        if self.keep.methods.insert(key.clone()) {
            self.method_queue.push_back(key);
        }
        self.add_class(owner);
    }

    fn process_class(&mut self, name: &str) {
        let Some(model) = self.resolver.resolve(name) else {
            return;
        };

        if let Some(super_name) = &model.super_name {
            self.add_class(super_name);
        }
        for interface in &model.interfaces {
            self.add_class(interface);
        }
        if let Some(signature) = &model.signature {
            self.add_class_names(signature_types(signature));
        }

        if let Some(enclosing_class) = &model.enclosing_class {
            self.add_class(enclosing_class);
            if let Some((method_name, descriptor)) = &model.enclosing_method {
                self.add_method(enclosing_class, method_name, descriptor);
            }
        }
        if let Some(nest_host) = &model.nest_host {
            self.add_class(nest_host);
        }
        for member in &model.nest_members {
            self.add_class(member);
        }
        for permitted in &model.permitted_subclasses {
            self.add_class(permitted);
        }
        if let Some(components) = &model.record_components {
            for component in components {
                self.record_component_edges(component);
            }
        }

        self.add_class_names(annotation_types(&model.visible_annotations));
        self.add_class_names(annotation_types(&model.invisible_annotations));
        self.add_class_names(type_annotation_types(&model.visible_type_annotations));
        self.add_class_names(type_annotation_types(&model.invisible_type_annotations));

        for field in &model.fields {
            self.field_header_edges(field);
        }
        for method in &model.methods {
            self.method_header_edges(method);
        }

        for relation in &model.inner_classes {
            self.add_class(&relation.inner);
            if let Some(outer) = &relation.outer {
                self.add_class(outer);
            }
        }
    }

    fn record_component_edges(&mut self, component: &RecordComponent) {
        self.add_class_names(field_descriptor_types(&component.descriptor));
        if let Some(signature) = &component.signature {
            self.add_class_names(signature_types(signature));
        }
        self.add_class_names(annotation_types(&component.visible_annotations));
        self.add_class_names(annotation_types(&component.invisible_annotations));
        self.add_class_names(type_annotation_types(&component.visible_type_annotations));
        self.add_class_names(type_annotation_types(&component.invisible_type_annotations));
    }

    fn field_header_edges(&mut self, field: &FieldModel) {
        self.add_class_names(field_descriptor_types(&field.descriptor));
        if let Some(signature) = &field.signature {
            self.add_class_names(signature_types(signature));
        }
        self.add_class_names(annotation_types(&field.visible_annotations));
        self.add_class_names(annotation_types(&field.invisible_annotations));
        self.add_class_names(type_annotation_types(&field.visible_type_annotations));
        self.add_class_names(type_annotation_types(&field.invisible_type_annotations));
    }

    fn method_header_edges(&mut self, method: &MethodModel) {
        self.add_class_names(method_descriptor_types(&method.descriptor));
        for exception in &method.exceptions {
            self.add_class(exception);
        }
        if let Some(signature) = &method.signature {
            self.add_class_names(signature_types(signature));
        }
        self.add_class_names(annotation_types(&method.visible_annotations));
        self.add_class_names(annotation_types(&method.invisible_annotations));
        for parameter in &method.visible_parameter_annotations {
            self.add_class_names(annotation_types(parameter));
        }
        for parameter in &method.invisible_parameter_annotations {
            self.add_class_names(annotation_types(parameter));
        }
        self.add_class_names(type_annotation_types(&method.visible_type_annotations));
        self.add_class_names(type_annotation_types(&method.invisible_type_annotations));
    }

    fn process_field(&mut self, key: &MemberKey) {
        self.add_class_names(field_descriptor_types(&key.descriptor));

        let Some(model) = self.resolver.resolve(&key.owner) else {
            return;
        };
        let declared = model.fields.iter().find(|candidate| {
            candidate.name == key.name
                && (key.descriptor.is_empty() || candidate.descriptor == key.descriptor)
        });
        if let Some(field) = declared {
            self.field_header_edges(field);
        }
    }

    fn process_method(&mut self, key: &MemberKey) {
        self.add_class_names(method_descriptor_types(&key.descriptor));

        let Some(model) = self.resolver.resolve(&key.owner) else {
            return;
        };
        let declared = model
            .methods
            .iter()
            .find(|candidate| candidate.name == key.name && candidate.descriptor == key.descriptor);
        let Some(method) = declared else {
            return;
        };

        self.method_header_edges(method);

        // A kept method pulls in what its body actually touches.
        if let Some(MethodBody::Original { refs }) = &method.body {
            for reference in refs {
                match reference {
                    CodeRef::Class(class_name) => self.add_class(class_name),
                    CodeRef::Field(owner, field_name, descriptor) => {
                        self.add_field(owner, field_name, descriptor);
                    }
                    CodeRef::Method(owner, method_name, descriptor) => {
                        self.add_method(owner, method_name, descriptor);
                    }
                    CodeRef::MethodType(descriptor) => {
                        self.add_class_names(method_descriptor_types(descriptor));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::MethodBody;
    use crate::testutil::{bare_class, empty_body, field, method, MapResolver};

    /// The classic scenario: `A.foo()` constructs a `B`; `C` is unrelated.
    fn scenario() -> MapResolver {
        let mut class_a = bare_class("a/A");
        class_a.methods.push(method(
            "foo",
            "()V",
            Some(MethodBody::Original {
                refs: vec![
                    CodeRef::Class("b/B".to_string()),
                    CodeRef::Method("b/B".to_string(), "<init>".to_string(), "()V".to_string()),
                ],
            }),
        ));

        let mut class_b = bare_class("b/B");
        class_b.fields.push(field("x", "I"));
        class_b.methods.push(method(
            "<init>",
            "()V",
            Some(MethodBody::Original {
                refs: vec![CodeRef::Method(
                    "java/lang/Object".to_string(),
                    "<init>".to_string(),
                    "()V".to_string(),
                )],
            }),
        ));
        class_b.methods.push(method("unused", "()I", empty_body()));

        let class_c = bare_class("c/C");

        MapResolver::of(vec![class_a, class_b, class_c])
    }

    #[test]
    fn method_root_pulls_called_constructor() {
        let resolver = scenario();
        let roots = RootSignature::parse_list("a/A#foo()V");
        let kept = analyze(&resolver, &roots);

        assert!(kept.contains_class("a/A"));
        assert!(kept.contains_class("b/B"));
        assert!(!kept.contains_class("c/C"));

        assert!(kept.method_kept("a/A", "foo", "()V"));
        assert!(kept.method_kept("b/B", "<init>", "()V"));
        assert!(!kept.method_kept("b/B", "unused", "()I"));
        assert!(!kept.field_kept("b/B", "x", "I"));
    }

    #[test]
    fn analysis_is_idempotent() {
        let resolver = scenario();
        let roots = RootSignature::parse_list("a/A#foo()V\nb/B#x");

        let first = analyze(&resolver, &roots);
        let second = analyze(&resolver, &roots);

        assert_eq!(first.classes(), second.classes());
        assert_eq!(first.fields, second.fields);
        assert_eq!(first.methods, second.methods);
    }

    #[test]
    fn keep_sets_grow_monotonically_with_roots() {
        let resolver = scenario();
        let small = analyze(&resolver, &RootSignature::parse_list("a/A#foo()V"));
        let large = analyze(&resolver, &RootSignature::parse_list("a/A#foo()V\nc/C"));

        for class_name in small.classes() {
            assert!(large.contains_class(class_name));
        }
        assert!(large.methods.is_superset(&small.methods));
        assert!(large.fields.is_superset(&small.fields));
        assert!(large.contains_class("c/C"));
    }

    #[test]
    fn field_root_resolves_descriptor_by_name() {
        let resolver = scenario();
        let kept = analyze(&resolver, &RootSignature::parse_list("b/B#x"));

        assert!(kept.field_kept("b/B", "x", "I"));
        assert!(kept.contains_class("b/B"));
    }

    #[test]
    fn field_root_with_missing_owner_degrades_to_class_keep() {
        let resolver = scenario();
        let kept = analyze(&resolver, &RootSignature::parse_list("ghost/Gone#phantom"));

        assert!(kept.contains_class("ghost/Gone"));
        assert!(kept.fields.is_empty());
    }

    #[test]
    fn class_processing_discovers_header_edges() {
        let mut class_a = bare_class("a/A");
        class_a.interfaces.push("i/Face".to_string());
        class_a.signature = Some("Ljava/lang/Object;Lg/Generic<Lt/Arg;>;".to_string());
        class_a.nest_host = Some("n/Host".to_string());
        class_a.permitted_subclasses.push("s/Sub".to_string());
        class_a.enclosing_class = Some("o/Outer".to_string());
        class_a.enclosing_method = Some(("make".to_string(), "()La/A;".to_string()));
        class_a.inner_classes.push(crate::classfile::InnerClass {
            inner: "a/A$In".to_string(),
            outer: Some("a/A".to_string()),
            inner_name: Some("In".to_string()),
            access: 0,
        });

        let mut outer = bare_class("o/Outer");
        outer.methods.push(method("make", "()La/A;", empty_body()));

        let resolver = MapResolver::of(vec![class_a, outer]);
        let kept = analyze(&resolver, &RootSignature::parse_list("a/A"));

        for expected in [
            "i/Face", "g/Generic", "t/Arg", "n/Host", "s/Sub", "o/Outer", "a/A$In",
        ] {
            assert!(kept.contains_class(expected), "missing {expected}");
        }
        assert!(kept.method_kept("o/Outer", "make", "()La/A;"));
    }

    #[test]
    fn member_descriptors_contribute_class_edges_without_keeping_members() {
        let mut class_a = bare_class("a/A");
        class_a.fields.push(field("dep", "Ld/Dep;"));
        class_a
            .methods
            .push(method("use", "(Lp/Param;)Lr/Ret;", empty_body()));

        let resolver = MapResolver::of(vec![class_a]);
        let kept = analyze(&resolver, &RootSignature::parse_list("a/A"));

        assert!(kept.contains_class("d/Dep"));
        assert!(kept.contains_class("p/Param"));
        assert!(kept.contains_class("r/Ret"));
        assert!(kept.fields.is_empty());
        assert!(kept.methods.is_empty());
    }
}
