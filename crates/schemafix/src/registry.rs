use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;
use url::Url;

use crate::{
    compiler::CompileOptions,
    error::{Error, SchemaError},
    paths::Location,
    schema::CompiledSchema,
};

/// Resolves external `$ref` targets: absolute URI -> compiled schema.
///
/// The registry is closed; nothing is ever fetched over the network.
/// Mutation requires exclusive access by construction, so the recommended
/// discipline is to build it fully before sharing it across threads.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: AHashMap<String, Arc<CompiledSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> SchemaRegistry {
        SchemaRegistry::default()
    }

    /// Compile and register a schema document under a URI.
    pub fn register(&mut self, uri: &str, schema: &Value) -> Result<(), Error> {
        self.register_with(uri, schema, &CompileOptions::default())
    }

    pub fn register_with(
        &mut self,
        uri: &str,
        schema: &Value,
        options: &CompileOptions,
    ) -> Result<(), Error> {
        let key = normalize(uri)?;
        // The registered URI is the document's own base, so references back
        // to it resolve locally instead of through the registry.
        let compiled = options.clone().with_base_uri(&key)?.compile(schema)?;
        self.schemas.insert(key, Arc::new(compiled));
        Ok(())
    }

    pub fn get(&self, uri: &str) -> Option<&CompiledSchema> {
        self.schemas.get(uri).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn normalize(uri: &str) -> Result<String, Error> {
    let mut url = Url::parse(uri).map_err(|error| {
        SchemaError::new(
            "$id",
            Location::new(),
            format!("invalid registry URI \"{uri}\": {error}"),
        )
    })?;
    url.set_fragment(None);
    Ok(url.to_string())
}
