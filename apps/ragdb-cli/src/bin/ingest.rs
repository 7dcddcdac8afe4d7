use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ragdb_core::config::{expand_path, Config};
use ragdb_core::Chunker;
use ragdb_embed::default_provider;
use ragdb_index::RetrievalIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <data_dir> [db_path] [table_name]", args[0]);
        eprintln!("Example: {} ./content ./data/lancedb snippets", args[0]);
        std::process::exit(1);
    }
    let data_dir = expand_path(&args[1]);

    let config = Config::load()?;
    let db_path = args
        .get(2)
        .map(|p| expand_path(p))
        .unwrap_or_else(|| expand_path(config.get_or("vector.db_path", "./data/lancedb".to_string())));
    let table_name = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| config.get_or("vector.table", "snippets".to_string()));
    let max_tokens: usize = config.get_or("chunker.max_tokens", 32);

    let mut chunker = Chunker::new(max_tokens);
    if let Ok(exceptions) = config.get::<Vec<String>>("chunker.sentence_exceptions") {
        chunker = chunker.with_exceptions(exceptions);
    }

    println!("ragdb-ingest");
    println!("============");
    println!("Data dir: {}", data_dir.display());
    println!("Database: {}", db_path.display());
    println!("Table:    {table_name}");

    let provider = default_provider()?;
    let index = RetrievalIndex::open(&db_path, &table_name, chunker, provider).await?;

    let files = list_txt_files(&data_dir);
    if files.is_empty() {
        println!("No .txt files found under {}.", data_dir.display());
        return Ok(());
    }

    let mut total_records = 0usize;
    for (i, file_path) in files.iter().enumerate() {
        println!("Ingesting file {}/{}: {}", i + 1, files.len(), file_path.display());
        let content = read_file_content(file_path)?;
        let resource_id = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string());
        let written = index
            .ingest_resource(&content, resource_id.as_deref())
            .await?;
        total_records += written;
    }
    println!(
        "Ingested {} files into {} records ({} total stored)",
        files.len(),
        total_records,
        index.stored_records().await?
    );
    Ok(())
}

fn read_file_content(path: &Path) -> std::io::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") {
            txt_files.push(path.to_path_buf());
        }
    }
    txt_files.sort();
    txt_files
}
