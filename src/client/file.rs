use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, Source};

/// 直接读取数据目录里的 `<resource>.json`，不经过服务端
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    description: String,
}

impl FileSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let description = format!("file: {}", dir.display());
        Self { dir, description }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Source for FileSource {
    async fn fetch(&self, resource: &str) -> Result<Value, ClientError> {
        let path = self.dir.join(format!("{resource}.json"));
        let text = tokio::fs::read_to_string(&path).await?;
        if text.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Parse(format!("{}: {e}", path.display())))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_resource_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sales.json"), r#"[{"id": "V-000001"}]"#).unwrap();
        std::fs::write(dir.path().join("orders.json"), "  \n").unwrap();
        std::fs::write(dir.path().join("products.json"), "{not json").unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(source.fetch("sales").await.unwrap(), json!([{"id": "V-000001"}]));
        assert_eq!(source.fetch("orders").await.unwrap(), json!([]));
        assert!(matches!(source.fetch("products").await, Err(ClientError::Parse(_))));
        assert!(matches!(source.fetch("users").await, Err(ClientError::Io(_))));
        assert!(source.description().starts_with("file: "));
    }
}
