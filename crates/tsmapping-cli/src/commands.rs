use clap::Args;
use serde::Serialize;
use serde_json::{Value, json};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error as ThisError;
use tsmapping::{
    config::Config,
    db::{Db, Index, IndexSettings},
    schema::node::Mapping,
};

///
/// IndexArgs
///

#[derive(Args)]
pub struct IndexArgs {
    /// Index name
    #[arg(short, long, default_value = "metrics")]
    pub name: String,

    /// Create-index body (settings and mappings), or - for stdin
    #[arg(short, long)]
    pub definition: PathBuf,
}

///
/// CommandError
///

#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Request(#[from] tsmapping::Error),
}

impl CommandError {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Request(err) => json!({ "error": err.body(), "status": err.status() }),
            other => json!({
                "error": { "type": "cli_error", "reason": other.to_string() },
                "status": 1
            }),
        }
    }
}

pub fn create(config: Config, args: &IndexArgs) -> Result<String, CommandError> {
    #[derive(Serialize)]
    struct Created<'a> {
        acknowledged: bool,
        index: &'a str,
        settings: &'a IndexSettings,
        mappings: Mapping,
    }

    let (_, index) = open(config, args)?;

    render(&Created {
        acknowledged: true,
        index: index.name(),
        settings: index.settings(),
        mappings: index.mapping()?,
    })
}

pub fn bulk(config: Config, args: &IndexArgs, file: &Path) -> Result<String, CommandError> {
    let (db, index) = open(config, args)?;
    let body = read(file)?;

    let response = db.bulk_ndjson(&body, Some(index.name()))?;
    tracing::info!(
        items = response.items.len(),
        failures = response.failures(),
        mapping_version = index.mapping_version(),
        "bulk finished"
    );

    render(&response)
}

pub fn search(config: Config, args: &IndexArgs, body: &Path) -> Result<String, CommandError> {
    let (db, index) = open(config, args)?;
    let body = read_json(body)?;

    db.check_search(index.name(), &body)?;

    Ok(json!({ "acknowledged": true }).to_string())
}

// open
fn open(config: Config, args: &IndexArgs) -> Result<(Db, Arc<Index>), CommandError> {
    let definition = read_json(&args.definition)?;
    let db = Db::new(config);
    let index = db.create_index(&args.name, &definition)?;

    Ok((db, index))
}

fn read(path: &Path) -> Result<String, CommandError> {
    let io_err = |source| CommandError::Io {
        path: path.display().to_string(),
        source,
    };

    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        return Ok(buf);
    }

    fs::read_to_string(path).map_err(io_err)
}

fn read_json(path: &Path) -> Result<Value, CommandError> {
    let raw = read(path)?;

    serde_json::from_str(&raw).map_err(|source| CommandError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn render<T: Serialize>(value: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value).map_err(|source| CommandError::Json {
        path: "<output>".to_string(),
        source,
    })
}
