//! SciFun quiz platform API server.
//!
//! Serves the admin REST API backed by a document store and a search
//! index. Without `MONGO_URI`/`ELASTICSEARCH_NODE` the in-memory backends
//! are used, which is enough for local development.

use std::sync::Arc;

use clap::Parser;
use scifun_persistence::index::MemoryIndex;
use scifun_persistence::store::MemoryStore;
use scifun_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "mongodb")]
use scifun_persistence::store::MongoStore;

#[cfg(feature = "elasticsearch")]
use scifun_persistence::index::{ElasticAuth, ElasticConfig, ElasticIndex};

/// Connects the MongoDB store from the server configuration.
#[cfg(feature = "mongodb")]
async fn create_mongo_store(config: &ServerConfig, uri: &str) -> anyhow::Result<MongoStore> {
    info!(database = %config.mongo_db, "Connecting to MongoDB");
    let store = MongoStore::connect(uri, &config.mongo_db).await?;
    Ok(store)
}

/// Connects the Elasticsearch index from the server configuration.
#[cfg(feature = "elasticsearch")]
fn create_elastic_index(config: &ServerConfig, node: &str) -> anyhow::Result<ElasticIndex> {
    info!(node = %node, "Connecting to Elasticsearch");
    let es_config = ElasticConfig {
        node: node.to_string(),
        auth: config
            .elasticsearch_api_key
            .clone()
            .map(|key| ElasticAuth::ApiKey { key }),
        ..Default::default()
    };
    Ok(ElasticIndex::new(&es_config)?)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Starts the server with in-memory backends.
async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(MemoryIndex::new());
    let app = create_app_with_config(store, index, config.clone());
    serve(app, &config).await
}

/// Starts the server with MongoDB + Elasticsearch backends.
#[cfg(all(feature = "mongodb", feature = "elasticsearch"))]
async fn start_live(config: ServerConfig, uri: String, node: String) -> anyhow::Result<()> {
    let store = Arc::new(create_mongo_store(&config, &uri).await?);
    let index = Arc::new(create_elastic_index(&config, &node)?);
    let app = create_app_with_config(store, index, config.clone());
    serve(app, &config).await
}

/// Fallback when the live backend features are not enabled.
#[cfg(not(all(feature = "mongodb", feature = "elasticsearch")))]
async fn start_live(_config: ServerConfig, _uri: String, _node: String) -> anyhow::Result<()> {
    anyhow::bail!(
        "Live backends require the 'mongodb' and 'elasticsearch' features. \
         Build with: cargo build -p scifun-server --features mongodb,elasticsearch"
    )
}

/// Starts the server with MongoDB and the in-memory search index.
#[cfg(feature = "mongodb")]
async fn start_mongo_only(config: ServerConfig, uri: String) -> anyhow::Result<()> {
    let store = Arc::new(create_mongo_store(&config, &uri).await?);
    let index = Arc::new(MemoryIndex::new());
    let app = create_app_with_config(store, index, config.clone());
    serve(app, &config).await
}

/// Fallback when the mongodb feature is not enabled.
#[cfg(not(feature = "mongodb"))]
async fn start_mongo_only(_config: ServerConfig, _uri: String) -> anyhow::Result<()> {
    anyhow::bail!(
        "The MongoDB backend requires the 'mongodb' feature. \
         Build with: cargo build -p scifun-server --features mongodb"
    )
}

/// Starts the server with the in-memory store and Elasticsearch.
#[cfg(feature = "elasticsearch")]
async fn start_elastic_only(config: ServerConfig, node: String) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(create_elastic_index(&config, &node)?);
    let app = create_app_with_config(store, index, config.clone());
    serve(app, &config).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn start_elastic_only(_config: ServerConfig, _node: String) -> anyhow::Result<()> {
    anyhow::bail!(
        "The Elasticsearch backend requires the 'elasticsearch' feature. \
         Build with: cargo build -p scifun-server --features elasticsearch"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        "Starting SciFun API server"
    );

    match (
        config.mongo_uri.clone(),
        config.elasticsearch_node.clone(),
    ) {
        (Some(uri), Some(node)) => start_live(config, uri, node).await?,
        (Some(uri), None) => start_mongo_only(config, uri).await?,
        (None, Some(node)) => start_elastic_only(config, node).await?,
        (None, None) => start_memory(config).await?,
    }

    Ok(())
}
