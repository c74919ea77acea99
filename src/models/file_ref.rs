use std::path::Path;

use anyhow::Result;

/// Where an uploaded receipt lives, and the key of the bill it reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub file_url: String,
    pub key: String,
}

/// A receipt picked by the user, not yet validated.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self { name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Upload payload sent to the store.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub email: String,
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extension_is_lowercased() {
        let file = SelectedFile::new("Receipt.JPEG", Vec::new());
        assert_eq!(file.extension().as_deref(), Some("jpeg"));
        assert_eq!(SelectedFile::new("receipt", Vec::new()).extension(), None);
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let selected = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(selected.name, "hello.png");
        assert_eq!(selected.bytes, b"hello");
    }
}
