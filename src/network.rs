use crate::render::Renderer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The network currently deployed on the device, as far as the overlay cares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSelection {
    #[serde(default)]
    pub model_name: String,

    /// Identifier of the post-processor producing the detections
    pub model_post_processor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Newline-separated class names, used when `labels` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels_file: Option<PathBuf>,
}

impl NetworkSelection {
    pub fn new(post_processor: impl Into<String>) -> Self {
        Self {
            model_post_processor: post_processor.into(),
            ..Self::default()
        }
    }

    /// Load a selection from JSON, resolving `labels_file` next to it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading network selection from {}", path.display());

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read network selection at {}", path.display()))?;
        let mut selection: NetworkSelection = serde_json::from_slice(&bytes)
            .with_context(|| format!("Malformed network selection in {}", path.display()))?;

        if selection.labels.is_none() {
            if let Some(labels_file) = &selection.labels_file {
                let labels_path = match path.parent() {
                    Some(dir) if labels_file.is_relative() => dir.join(labels_file),
                    _ => labels_file.clone(),
                };
                selection.labels = Some(read_labels(&labels_path)?);
            }
        }

        tracing::info!(
            "Selected network {:?} with post-processor {} ({} labels)",
            selection.model_name,
            selection.model_post_processor,
            selection.labels.as_ref().map_or(0, Vec::len)
        );
        Ok(selection)
    }

    pub fn renderer(&self) -> Option<Renderer> {
        Renderer::select(&self.model_post_processor)
    }
}

/// Read class names, one per line
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels from {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_inline_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        fs::write(
            &path,
            r#"{"model_name":"ssd","model_post_processor":"pp_od_bscn","labels":["cat","dog"],"model_file":"x.rpk"}"#,
        )
        .unwrap();

        let selection = NetworkSelection::load(&path).unwrap();
        assert_eq!(selection.renderer(), Some(Renderer::Detection));
        assert_eq!(selection.labels, Some(vec!["cat".to_string(), "dog".to_string()]));
    }

    #[test]
    fn reads_labels_file_relative_to_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut labels = fs::File::create(dir.path().join("labels.txt")).unwrap();
        writeln!(labels, "background\nperson\nbicycle").unwrap();
        let path = dir.path().join("network.json");
        fs::write(
            &path,
            r#"{"model_post_processor":"pp_cls","labels_file":"labels.txt"}"#,
        )
        .unwrap();

        let selection = NetworkSelection::load(&path).unwrap();
        let labels = selection.labels.unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[1], "person");
    }

    #[test]
    fn unknown_post_processor_has_no_renderer() {
        assert_eq!(NetworkSelection::new("pp_unknown").renderer(), None);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = NetworkSelection::load("/nonexistent/network.json").unwrap_err();
        assert!(format!("{err:#}").contains("network selection"));
    }
}
