use std::path::Path;

use anyhow::{Context, Result};
use kbsync_domain::{FileService, Table};

pub struct KbFileService;

impl Default for KbFileService {
    fn default() -> Self {
        Self::new()
    }
}

impl KbFileService {
    pub fn new() -> Self {
        Self
    }
}

/// Encodes a table as comma-separated text with a header row.
pub fn encode_table(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .context("Failed to encode header row")?;
    for row in &table.rows {
        writer.write_record(row).context("Failed to encode row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush table: {}", e))
}

#[async_trait::async_trait]
impl FileService for KbFileService {
    async fn write_table(&self, path: &Path, table: &Table) -> Result<()> {
        let contents = encode_table(table)?;
        self.write(path, &contents).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dirs_all(parent).await?;
        }
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write file {}", path.display()))
    }

    async fn create_dirs_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create dir {}", path.display()))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_encode_table_quotes_when_needed() {
        let mut table = Table::new(&["question", "sql"]);
        table.push(vec!["Top teachers".to_string(), "SELECT name, score FROM t".to_string()]);
        let actual = String::from_utf8(encode_table(&table).unwrap()).unwrap();
        assert_eq!(actual, "question,sql\nTop teachers,\"SELECT name, score FROM t\"\n");
    }

    #[tokio::test]
    async fn test_write_table_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/sql_pairs.csv");
        let table = Table::new(&["question", "sql"]);

        KbFileService::new().write_table(&path, &table).await.unwrap();

        let actual = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(actual, "question,sql\n");
    }
}
