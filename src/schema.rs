//! Schema: field name ↔ tag mapping, with optional nested sub-schemas.
//!
//! A [`Schema`] is immutable once built and cheap to share (`Arc` for nested ones).
//! Fields keep declaration order, which is the order encode emits them in.

use crate::codec::CodecError;
use crate::wire::MAX_TAG;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub tag: u8,
    /// Sub-schema when this field holds a nested struct.
    pub nested: Option<Arc<Schema>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<SchemaField>,
    by_name: HashMap<String, usize>,
    by_tag: HashMap<u8, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build from plain `(name, tag)` pairs.
    pub fn from_tags<'a, I>(pairs: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        pairs
            .into_iter()
            .fold(Schema::builder(), |b, (name, tag)| b.field(name, tag))
            .build()
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Reverse lookup used on decode.
    pub fn by_tag(&self, tag: u8) -> Option<&SchemaField> {
        self.by_tag.get(&tag).map(|&i| &self.fields[i])
    }
}

/// Collects fields, checking names and tags once in [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, u32, Option<Arc<Schema>>)>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, tag: u32) -> Self {
        self.fields.push((name.into(), tag, None));
        self
    }

    pub fn nested(mut self, name: impl Into<String>, tag: u32, schema: impl Into<Arc<Schema>>) -> Self {
        self.fields.push((name.into(), tag, Some(schema.into())));
        self
    }

    pub fn build(self) -> Result<Schema, CodecError> {
        let mut schema = Schema::default();
        for (name, tag, nested) in self.fields {
            if tag > MAX_TAG {
                return Err(CodecError::TagOutOfRange(tag));
            }
            let tag = tag as u8;
            let idx = schema.fields.len();
            if schema.by_name.insert(name.clone(), idx).is_some() {
                return Err(CodecError::Schema(format!("duplicate field name: {}", name)));
            }
            if let Some(prev) = schema.by_tag.insert(tag, idx) {
                return Err(CodecError::Schema(format!(
                    "duplicate tag {}: {} and {}",
                    tag, schema.fields[prev].name, name
                )));
            }
            schema.fields.push(SchemaField { name, tag, nested });
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_both_ways() {
        let inner = Schema::from_tags([("foo", 1)]).unwrap();
        let s = Schema::builder()
            .field("a", 0)
            .nested("n", 20, inner)
            .build()
            .unwrap();
        assert_eq!(s.get("a").map(|f| f.tag), Some(0));
        assert_eq!(s.by_tag(20).map(|f| f.name.as_str()), Some("n"));
        assert!(s.by_tag(20).and_then(|f| f.nested.as_ref()).is_some());
        assert!(s.by_tag(3).is_none());
        let names: Vec<_> = s.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "n"]);
    }

    #[test]
    fn rejects_duplicates_and_wide_tags() {
        assert!(matches!(
            Schema::from_tags([("a", 0), ("b", 0)]),
            Err(CodecError::Schema(_))
        ));
        assert!(matches!(
            Schema::from_tags([("a", 0), ("a", 1)]),
            Err(CodecError::Schema(_))
        ));
        assert!(matches!(
            Schema::from_tags([("a", 256)]),
            Err(CodecError::TagOutOfRange(256))
        ));
    }
}
