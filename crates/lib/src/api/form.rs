//! Multipart form construction for the form-based endpoints (add task, route, waypoints).

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

/// Text and file fields collected before the form is built.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    text: Vec<(String, String)>,
    files: Vec<(String, PathBuf)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push((name.into(), path.into()));
        self
    }

    /// Read every file and build the form. Text fields come first, in insertion order.
    pub async fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.text {
            form = form.text(name, value);
        }
        for (name, path) in self.files {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading form file {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let part = Part::bytes(data)
                .file_name(file_name)
                .mime_str(mime_for(&path))
                .with_context(|| format!("setting content type for {}", path.display()))?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// Split `key=value` at the first `=`. The key must be non-empty; the value may be empty.
pub fn parse_pair(s: &str) -> Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .with_context(|| format!("expected key=value, got {:?}", s))?;
    let k = k.trim();
    if k.is_empty() {
        anyhow::bail!("empty field name in {:?}", s);
    }
    Ok((k.to_string(), v.to_string()))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "zip" => "application/zip",
        "json" => "application/json",
        "kml" => "application/vnd.google-earth.kml+xml",
        "kmz" => "application/vnd.google-earth.kmz",
        "csv" => "text/csv",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_splits_on_first_equals() {
        assert_eq!(
            parse_pair("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_pair("k=").unwrap(), ("k".to_string(), String::new()));
    }

    #[test]
    fn parse_pair_rejects_missing_or_empty_key() {
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(Path::new("a/PANEL.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("route.kml")), "application/vnd.google-earth.kml+xml");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }
}
