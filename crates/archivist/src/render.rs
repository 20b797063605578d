use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use thiserror::Error;

use crate::routes::join_path;

/// A page synthesized by one of the generators, for the host to render.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct VirtualPage {
    /// The root-relative directory the page is written to.
    pub dir: String,
    /// The page's file name within `dir`.
    pub name: String,
    /// The name of the layout to render the page with.
    pub layout: String,
    /// The data handed to the layout.
    pub data: serde_json::Value,
}

impl VirtualPage {
    pub fn output_path(&self) -> String {
        join_path(&self.dir, &self.name)
    }

    /// Returns the page's pre-rendered content, if it has any.
    pub fn content(&self) -> Option<&str> {
        self.data.get("content").and_then(serde_json::Value::as_str)
    }
}

pub trait PageRenderer {
    type Error: std::error::Error;

    fn render_page(&self, page: &VirtualPage) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum DiskRenderError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to serialize page data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes pages below an output directory.
///
/// Pages with pre-rendered content (feeds, sitemaps) are written as is. Any
/// other page is written as its layout name and data, as pretty-printed JSON,
/// for a template engine to pick up.
pub struct DiskRenderer {
    output_path: PathBuf,
}

impl DiskRenderer {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl PageRenderer for DiskRenderer {
    type Error = DiskRenderError;

    fn render_page(&self, page: &VirtualPage) -> Result<(), Self::Error> {
        let output_dir = self.output_path.join(page.dir.trim_start_matches('/'));

        fs::create_dir_all(&output_dir)?;

        let contents = match page.content() {
            Some(content) => content.to_string(),
            None => serde_json::to_string_pretty(page)?,
        };

        let output_path = output_dir.join(&page.name);
        let mut output_file = File::create(&output_path)?;

        output_file.write_all(contents.as_bytes())?;

        Ok(())
    }
}

/// Collects pages into a shared map keyed by output path.
pub struct InMemoryRenderer {
    storage: Arc<RwLock<HashMap<String, VirtualPage>>>,
}

impl InMemoryRenderer {
    pub fn new(storage: Arc<RwLock<HashMap<String, VirtualPage>>>) -> Self {
        Self { storage }
    }
}

#[derive(Error, Debug)]
pub enum InMemoryRenderError {
    #[error("poisoned")]
    Poisoned,
}

impl PageRenderer for InMemoryRenderer {
    type Error = InMemoryRenderError;

    fn render_page(&self, page: &VirtualPage) -> Result<(), Self::Error> {
        self.storage
            .write()
            .map_err(|_| InMemoryRenderError::Poisoned)?
            .insert(page.output_path(), page.clone());

        Ok(())
    }
}
