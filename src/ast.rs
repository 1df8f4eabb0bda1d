//! Parsed schema definitions and their resolution into [`Schema`] values.

use crate::codec::CodecError;
use crate::schema::Schema;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Root of a schema source: struct definitions in source order.
#[derive(Debug, Clone, Default)]
pub struct SchemaDoc {
    pub structs: Vec<StructDef>,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub tag: u32,
    /// Name of the struct this field nests, if any.
    pub nested: Option<String>,
}

/// Resolved schemas by struct name.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: HashMap<String, Arc<Schema>>,
    order: Vec<String>,
}

impl SchemaSet {
    pub fn resolve(doc: &SchemaDoc) -> Result<Self, CodecError> {
        let mut defs = HashMap::new();
        for s in &doc.structs {
            if defs.insert(s.name.as_str(), s).is_some() {
                return Err(CodecError::Schema(format!("Duplicate struct name: {}", s.name)));
            }
        }
        let mut set = SchemaSet::default();
        for s in &doc.structs {
            let mut visiting = HashSet::new();
            set.resolve_struct(&s.name, &defs, &mut visiting)?;
            set.order.push(s.name.clone());
        }
        Ok(set)
    }

    fn resolve_struct(
        &mut self,
        name: &str,
        defs: &HashMap<&str, &StructDef>,
        visiting: &mut HashSet<String>,
    ) -> Result<Arc<Schema>, CodecError> {
        if let Some(s) = self.schemas.get(name) {
            return Ok(s.clone());
        }
        let def = defs
            .get(name)
            .ok_or_else(|| CodecError::Schema(format!("Unknown struct: {}", name)))?;
        if !visiting.insert(name.to_string()) {
            return Err(CodecError::Schema(format!("Recursive struct reference: {}", name)));
        }
        let mut builder = Schema::builder();
        for f in &def.fields {
            builder = match &f.nested {
                Some(inner) => {
                    let sub = self.resolve_struct(inner, defs, visiting)?;
                    builder.nested(f.name.clone(), f.tag, sub)
                }
                None => builder.field(f.name.clone(), f.tag),
            };
        }
        let schema = builder
            .build()
            .map_err(|e| match e {
                CodecError::Schema(msg) => CodecError::Schema(format!("struct {}: {}", name, msg)),
                other => other,
            })?;
        visiting.remove(name);
        let schema = Arc::new(schema);
        self.schemas.insert(name.to_string(), schema.clone());
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Struct names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
