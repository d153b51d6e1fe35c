//! Full-text index over the document catalog, built with tantivy.
//!
//! The schema mirrors the FTS entry projection exactly: searchable columns
//! for library, kind, title, description, keyword blob, control name and
//! namespace, plus stored-only identifier, relative file and snippet count.
//! The index is rebuilt from the catalog only and is read-only at runtime.

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT, Value};
use tantivy::{Index, IndexReader, doc};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::{Error, Result};

/// Maximum candidates fetched per query variant.
pub const CANDIDATES_PER_VARIANT: usize = 100;

/// Tantivy-backed search index over the catalog.
pub struct SearchIndex {
    index: Index,
    id_field: Field,
    library_field: Field,
    kind_field: Field,
    title_field: Field,
    description_field: Field,
    keywords_field: Field,
    control_field: Field,
    namespace_field: Field,
    reader: IndexReader,
}

impl SearchIndex {
    fn schema() -> (Schema, [Field; 8]) {
        let mut builder = Schema::builder();
        let id = builder.add_text_field("id", STORED);
        let library = builder.add_text_field("library", STRING | STORED);
        let kind = builder.add_text_field("kind", STRING | STORED);
        let title = builder.add_text_field("title", TEXT | STORED);
        let description = builder.add_text_field("description", TEXT);
        let keywords = builder.add_text_field("keywords", TEXT);
        let control = builder.add_text_field("control", STRING | STORED);
        let namespace = builder.add_text_field("namespace", STRING);
        // Stored-only columns, never searched.
        builder.add_text_field("rel_file", STORED);
        builder.add_u64_field("snippet_count", STORED);
        let schema = builder.build();
        (
            schema,
            [id, library, kind, title, description, keywords, control, namespace],
        )
    }

    /// Builds a fresh index from the catalog, replacing any previous index
    /// directory. The whole insertion happens inside one commit.
    pub fn build(index_dir: &Path, catalog: &Catalog) -> Result<Self> {
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)
                .map_err(|e| Error::Index(format!("Failed to clear index directory: {e}")))?;
        }
        std::fs::create_dir_all(index_dir)
            .map_err(|e| Error::Index(format!("Failed to create index directory: {e}")))?;

        let (schema, _) = Self::schema();
        let index = Index::create_in_dir(index_dir, schema.clone())
            .map_err(|e| Error::Index(format!("Failed to create index: {e}")))?;

        let opened = Self::from_index(index)?;
        opened.insert_catalog(catalog)?;
        info!(documents = catalog.len(), "FTS index built");
        Ok(opened)
    }

    /// Opens an existing index directory.
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| Error::Index(format!("Failed to open index: {e}")))?;
        Self::from_index(index)
    }

    fn from_index(index: Index) -> Result<Self> {
        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| Error::Index(format!("Missing {name} field")))
        };
        let reader = index
            .reader_builder()
            .reload_policy(tantivy::ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            id_field: field("id")?,
            library_field: field("library")?,
            kind_field: field("kind")?,
            title_field: field("title")?,
            description_field: field("description")?,
            keywords_field: field("keywords")?,
            control_field: field("control")?,
            namespace_field: field("namespace")?,
            reader,
            index,
        })
    }

    fn insert_catalog(&self, catalog: &Catalog) -> Result<()> {
        let mut writer = self
            .index
            .writer(50_000_000)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        let schema = self.index.schema();
        let rel_file_field = schema
            .get_field("rel_file")
            .map_err(|_| Error::Index("Missing rel_file field".into()))?;
        let snippet_field = schema
            .get_field("snippet_count")
            .map_err(|_| Error::Index("Missing snippet_count field".into()))?;

        for document in catalog.iter() {
            let (control, namespace, keyword_blob) = document.metadata.as_ref().map_or_else(
                || (String::new(), String::new(), String::new()),
                |meta| (meta.control_name.clone(), meta.namespace.clone(), meta.keyword_blob()),
            );

            writer
                .add_document(doc!(
                    self.id_field => document.id.as_str(),
                    self.library_field => document.library.as_str(),
                    self.kind_field => document.kind.as_str(),
                    self.title_field => document.title.as_str(),
                    self.description_field => document.description.as_str(),
                    self.keywords_field => keyword_blob.as_str(),
                    self.control_field => control.as_str(),
                    self.namespace_field => namespace.as_str(),
                    rel_file_field => document.rel_file.as_str(),
                    snippet_field => document.snippet_count as u64,
                ))
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::Index(format!("Failed to reload reader: {e}")))?;
        Ok(())
    }

    /// Candidate document identifiers for one query variant.
    ///
    /// Candidates come back in BM25 order but carry no score; the hybrid
    /// scorer re-scores them from the catalog.
    pub fn candidates(&self, variant: &str, limit: usize) -> Result<Vec<String>> {
        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(
            &self.index,
            vec![
                self.title_field,
                self.description_field,
                self.keywords_field,
                self.control_field,
                self.namespace_field,
            ],
        );

        let escaped = escape_query(variant);
        if escaped.trim().is_empty() {
            return Ok(Vec::new());
        }
        let query = parser
            .parse_query(&escaped)
            .map_err(|e| Error::Index(format!("Failed to parse query: {e}")))?;

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Index(format!("Search failed: {e}")))?;

        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: tantivy::TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;
            if let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()) {
                ids.push(id.to_string());
            }
        }
        debug!(variant, hits = ids.len(), "FTS candidates");
        Ok(ids)
    }
}

fn escape_query(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() * 2);
    for ch in query.chars() {
        match ch {
            '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '~' | ':' | '!' | '*' => {
                escaped.push('\\');
                escaped.push(ch);
            },
            _ => escaped.push(ch),
        }
    }
    escaped
}
