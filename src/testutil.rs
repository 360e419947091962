//! Builders shared by unit tests: compact construction of class models and an
//! in-memory [`ClassResolver`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::classfile::{
    ClassAccessFlags, ClassModel, FieldAccessFlags, FieldModel, MethodAccessFlags, MethodBody,
    MethodModel,
};
use crate::classpath::ClassResolver;

/// A concrete public class extending `java/lang/Object`, no members.
pub fn bare_class(name: &str) -> ClassModel {
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

/// A public instance field.
pub fn field(name: &str, descriptor: &str) -> FieldModel {
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

/// A public concrete method with the given body.
pub fn method(name: &str, descriptor: &str, body: Option<MethodBody>) -> MethodModel {
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
        body,
        deprecated: false,
    }
}

/// A body with no interesting references.
pub fn empty_body() -> Option<MethodBody> {
    Some(MethodBody::Original { refs: Vec::new() })
}

/// An in-memory class resolver backed by a map.
#[derive(Default)]
pub struct MapResolver {
    classes: HashMap<String, Arc<ClassModel>>,
}

impl MapResolver {
    /// Build a resolver from a list of models.
    pub fn of(models: Vec<ClassModel>) -> Self {
        let mut classes = HashMap::new();
        for model in models {
            classes.insert(model.name.clone(), Arc::new(model));
        }
        MapResolver { classes }
    }
}

impl ClassResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<Arc<ClassModel>> {
        self.classes.get(name).cloned()
    }
}
