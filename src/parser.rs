//! Parse schema source into AST using PEST.
//!
//! ```text
//! struct Inner { foo = 1; bar = 3; }
//! struct Outer {
//!   qaz = 0;
//!   rfv = 4: Inner;   // nested struct
//!   yhn = 255;
//! }
//! ```

use crate::ast::*;
use crate::codec::CodecError;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaParser;

/// Parse schema source into AST.
pub fn parse(source: &str) -> Result<SchemaDoc, CodecError> {
    let pairs = SchemaParser::parse(Rule::schemas, source)
        .map_err(|e| CodecError::Schema(format!("Parse error: {}", e)))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| CodecError::Schema("Empty parse".to_string()))?;
    let mut structs = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::struct_def {
            structs.push(build_struct(inner)?);
        }
    }
    Ok(SchemaDoc { structs })
}

/// Parse and resolve in one step.
pub fn parse_schemas(source: &str) -> Result<SchemaSet, CodecError> {
    SchemaSet::resolve(&parse(source)?)
}

fn build_struct(pair: pest::iterators::Pair<Rule>) -> Result<StructDef, CodecError> {
    let mut name = None;
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::field => fields.push(build_field(inner)?),
            _ => {}
        }
    }
    Ok(StructDef {
        name: name.ok_or_else(|| CodecError::Schema("struct: missing name".to_string()))?,
        fields,
    })
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldDef, CodecError> {
    let mut name = None;
    let mut tag = None;
    let mut nested = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::tag => {
                let t = inner
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| CodecError::Schema(format!("tag too large: {}", inner.as_str())))?;
                tag = Some(t);
            }
            Rule::nested_ref => {
                nested = inner.into_inner().next().map(|p| p.as_str().to_string());
            }
            _ => {}
        }
    }
    Ok(FieldDef {
        name: name.ok_or_else(|| CodecError::Schema("field: missing name".to_string()))?,
        tag: tag.ok_or_else(|| CodecError::Schema("field: missing tag".to_string()))?,
        nested,
    })
}
