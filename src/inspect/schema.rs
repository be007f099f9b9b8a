//! Declarative composition schemas
//!
//! A schema names traits and hosts with their members. Member bodies are not
//! expressible in data, so schema methods and properties materialize as
//! callables returning `unit`; the point is to inspect the composition, not to
//! run it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::runtime::value::{Signature, Value};
use crate::traits::{AttributeError, HostBuilder, HostType, Trait, TraitBuilder};

/// Schema source format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    #[default]
    Ron,
    Json,
}

impl SchemaFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Some(SchemaFormat::Ron),
            Some("json") => Some(SchemaFormat::Json),
            _ => None,
        }
    }
}

impl FromStr for SchemaFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ron" => Ok(SchemaFormat::Ron),
            "json" => Ok(SchemaFormat::Json),
            other => Err(anyhow!("unknown schema format: {}", other)),
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SchemaFormat::Ron => write!(f, "ron"),
            SchemaFormat::Json => write!(f, "json"),
        }
    }
}

/// Literal data value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::from(s.as_str()),
        }
    }
}

/// Method declaration: name plus parameter names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSchema {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

/// Trait declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSchema {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodSchema>,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub data: IndexMap<String, Literal>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// Host type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSchema {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// `None` inherits the parent's traits
    #[serde(default)]
    pub traits: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Vec<MethodSchema>,
    #[serde(default)]
    pub data: IndexMap<String, Literal>,
    #[serde(default)]
    pub required: Vec<String>,
    /// Names the host's own fallback hook answers
    #[serde(default)]
    pub fallback: Option<Vec<String>>,
}

/// A full schema file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub traits: Vec<TraitSchema>,
    #[serde(default)]
    pub hosts: Vec<HostSchema>,
}

impl Schema {
    /// Parse schema source
    pub fn parse(
        source: &str,
        format: SchemaFormat,
    ) -> Result<Self> {
        match format {
            SchemaFormat::Ron => ron::from_str(source).context("Failed to parse RON schema"),
            SchemaFormat::Json => {
                serde_json::from_str(source).context("Failed to parse JSON schema")
            }
        }
    }

    /// Read and parse a schema file, falling back to `default_format` for unknown extensions
    pub fn from_path(
        path: &Path,
        default_format: SchemaFormat,
    ) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema: {}", path.display()))?;
        let format = SchemaFormat::from_path(path).unwrap_or(default_format);
        debug!(path = %path.display(), %format, "loading schema");
        Self::parse(&source, format).with_context(|| format!("in {}", path.display()))
    }

    /// Define every trait, then every host, in declaration order
    pub fn materialize(&self) -> Result<Model> {
        let mut model = Model::default();

        for decl in &self.traits {
            let mut builder = Trait::builder(&decl.name);
            for base in &decl.bases {
                let base = model
                    .traits
                    .get(base)
                    .ok_or_else(|| anyhow!("trait `{}` names unknown base `{}`", decl.name, base))?;
                builder = builder.base(base);
            }
            let defined = add_trait_members(builder, decl)
                .build()
                .with_context(|| format!("while defining trait `{}`", decl.name))?;
            if model.traits.insert(decl.name.clone(), defined).is_some() {
                bail!("trait `{}` is declared twice", decl.name);
            }
        }

        for decl in &self.hosts {
            let mut builder = HostType::builder(&decl.name);
            if let Some(parent) = &decl.parent {
                let parent = model
                    .hosts
                    .get(parent)
                    .ok_or_else(|| anyhow!("host `{}` names unknown parent `{}`", decl.name, parent))?;
                builder = builder.parent(parent);
            }
            if let Some(names) = &decl.traits {
                let traits = names
                    .iter()
                    .map(|name| {
                        model
                            .traits
                            .get(name)
                            .ok_or_else(|| anyhow!("host `{}` names unknown trait `{}`", decl.name, name))
                    })
                    .collect::<Result<Vec<_>>>()?;
                builder = builder.traits(traits);
            }
            let defined = add_host_members(builder, decl)
                .define()
                .with_context(|| format!("while defining host `{}`", decl.name))?;
            if model.hosts.insert(decl.name.clone(), defined).is_some() {
                bail!("host `{}` is declared twice", decl.name);
            }
        }

        Ok(model)
    }
}

fn signature_of(method: &MethodSchema) -> Signature {
    method
        .params
        .iter()
        .fold(Signature::new(), |sig, param| sig.param(param))
}

fn add_trait_members(
    mut builder: TraitBuilder,
    decl: &TraitSchema,
) -> TraitBuilder {
    for method in &decl.methods {
        builder = builder.method(&method.name, signature_of(method), |_, _| Ok(Value::Unit));
    }
    for property in &decl.properties {
        builder = builder.property(property, |_| Ok(Value::Unit));
    }
    for (name, literal) in &decl.data {
        builder = builder.data(name, Value::from(literal));
    }
    for name in &decl.required {
        builder = builder.required(name);
    }
    builder
}

fn add_host_members(
    mut builder: HostBuilder,
    decl: &HostSchema,
) -> HostBuilder {
    for method in &decl.methods {
        builder = builder.method(&method.name, signature_of(method), |_, _| Ok(Value::Unit));
    }
    for (name, literal) in &decl.data {
        builder = builder.data(name, Value::from(literal));
    }
    for name in &decl.required {
        builder = builder.required(name);
    }
    if let Some(answered) = &decl.fallback {
        let answered = answered.clone();
        builder = builder.fallback(move |obj, attr| {
            if answered.iter().any(|name| name == attr) {
                Ok(Value::Unit)
            } else {
                Err(AttributeError::Missing {
                    type_name: obj.type_name().to_string(),
                    attr: attr.to_string(),
                })
            }
        });
    }
    builder
}

/// Materialized traits and hosts, keyed by name in declaration order
#[derive(Debug, Default)]
pub struct Model {
    pub traits: IndexMap<String, Arc<Trait>>,
    pub hosts: IndexMap<String, Arc<HostType>>,
}

impl Model {
    pub fn host(
        &self,
        name: &str,
    ) -> Result<&Arc<HostType>> {
        self.hosts
            .get(name)
            .ok_or_else(|| anyhow!("no host named `{}` in schema", name))
    }
}
