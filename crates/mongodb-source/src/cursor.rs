//! MongoDB connection and per-collection cursors.

use bson::Document;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{bson::doc, options::ClientOptions, Client as MongoClient, Cursor, Database};
use mongodb_types::BsonDocument;
use std::time::Duration;
use sync_core::{DocumentCursor, DocumentSource, SourceError};

/// Environment variable that enables per-document debug logging.
const DEBUG_ENV: &str = "MONGO_SQL_SYNC_DEBUG";

/// Source database connection options (MongoDB-specific, library type without clap)
#[derive(Clone, Debug)]
pub struct SourceOpts {
    pub source_uri: String,
    pub source_database: Option<String>,
}

/// A MongoDB database read one collection at a time.
pub struct MongoDocumentSource {
    client: MongoClient,
    database: Database,
}

/// Connect to MongoDB and verify the server is reachable.
pub async fn connect(opts: &SourceOpts) -> Result<MongoDocumentSource, SourceError> {
    let database_name = opts
        .source_database
        .clone()
        .ok_or_else(|| SourceError::Connection("MongoDB source database name is required".into()))?;

    tracing::debug!(
        "Parsing MongoDB connection options from URI: {}",
        opts.source_uri
    );
    let mut mongo_options = ClientOptions::parse(&opts.source_uri)
        .await
        .map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection options: {}", e);
            SourceError::Connection(e.to_string())
        })?;
    // Add connection timeout to prevent hanging
    mongo_options.connect_timeout = Some(Duration::from_secs(10));
    mongo_options.server_selection_timeout = Some(Duration::from_secs(10));

    let client = MongoClient::with_options(mongo_options)
        .map_err(|e| SourceError::Connection(e.to_string()))?;
    let database = client.database(&database_name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| SourceError::Connection(e.to_string()))?;
    tracing::info!("Connected to MongoDB database: {}", database_name);

    Ok(MongoDocumentSource { client, database })
}

impl MongoDocumentSource {
    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

/// Errors that mean the server can no longer be reached abort the run;
/// everything else only fails the current collection.
fn classify(collection: &str, e: MongoError) -> SourceError {
    match *e.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            SourceError::Connection(e.to_string())
        }
        _ => SourceError::Read {
            collection: collection.to_string(),
            message: e.to_string(),
        },
    }
}

#[async_trait::async_trait]
impl DocumentSource for MongoDocumentSource {
    type Cursor = MongoDocumentCursor;

    async fn open_cursor(&self, collection: &str) -> Result<Self::Cursor, SourceError> {
        tracing::debug!("Creating cursor for collection: {}", collection);
        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(doc! {})
            .await
            .map_err(|e| classify(collection, e))?;

        Ok(MongoDocumentCursor {
            collection: collection.to_string(),
            cursor,
            position: 0,
            debug: std::env::var(DEBUG_ENV).is_ok(),
        })
    }
}

/// Forward-only cursor over one collection.
pub struct MongoDocumentCursor {
    collection: String,
    cursor: Cursor<Document>,
    position: u64,
    debug: bool,
}

impl MongoDocumentCursor {
    /// Number of documents returned so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

#[async_trait::async_trait]
impl DocumentCursor for MongoDocumentCursor {
    type Document = BsonDocument;

    async fn next_document(&mut self) -> Result<Option<Self::Document>, SourceError> {
        let more = self
            .cursor
            .advance()
            .await
            .map_err(|e| classify(&self.collection, e))?;
        if !more {
            tracing::debug!(
                "Collection '{}' exhausted after {} documents",
                self.collection,
                self.position
            );
            return Ok(None);
        }

        let doc = Document::try_from(self.cursor.current()).map_err(|e| SourceError::Decode {
            collection: self.collection.clone(),
            message: e.to_string(),
        })?;
        self.position += 1;

        if self.debug {
            tracing::debug!(
                "BSON document {} in '{}': {:?}",
                self.position,
                self.collection,
                doc
            );
        }

        Ok(Some(BsonDocument::from(doc)))
    }
}
