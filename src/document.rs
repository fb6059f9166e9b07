//! Document assembly
//!
//! A [`Document`] is an ordered list of entities with exactly one [`Header`].
//! Rendering writes every entity in insertion order into one [`CzmlStream`],
//! skipping an entity whose id equals the id of the entity right before it, and
//! releases each entity's buffers as soon as it has been written.
//!
//! Files are written atomically: the whole document is rendered in memory,
//! written to a sibling temporary file and renamed into place.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::czml::CzmlStream;
use crate::entities::{Entity, Header};
use crate::error::{CzmlError, Result};
use crate::reference::EntityKind;

/// Collects entities and places the header first
#[derive(Default)]
pub struct DocumentBuilder {
    header: Option<Header>,
    entities: Vec<Box<dyn Entity>>,
    pretty: bool,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    /// Add an entity after the ones already added
    pub fn with(mut self, entity: impl Entity + 'static) -> Self {
        self.entities.push(Box::new(entity));
        self
    }

    pub fn with_boxed(mut self, entity: Box<dyn Entity>) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_all<E: Entity + 'static>(mut self, entities: impl IntoIterator<Item = E>) -> Self {
        for entity in entities {
            self.entities.push(Box::new(entity));
        }
        self
    }

    /// Indented output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn build(self) -> Result<Document> {
        let header = self.header.ok_or(CzmlError::NoHeader)?;
        let mut entities: Vec<Box<dyn Entity>> = Vec::with_capacity(self.entities.len() + 1);
        entities.push(Box::new(header));
        entities.extend(self.entities);
        Ok(Document {
            entities,
            pretty: self.pretty,
        })
    }
}

/// Ordered entities ready to be serialized once
pub struct Document {
    entities: Vec<Box<dyn Entity>>,
    pretty: bool,
}

impl Document {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Raw entity list; header rules are checked when rendering
    pub fn from_entities(entities: Vec<Box<dyn Entity>>) -> Self {
        Self {
            entities,
            pretty: false,
        }
    }

    /// Indented output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.id()).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(CzmlError::NoEntities);
        }
        let headers = self
            .entities
            .iter()
            .filter(|e| e.kind() == EntityKind::Header)
            .count();
        match headers {
            0 => Err(CzmlError::NoHeader),
            1 => {
                if self.entities.len() == 1 {
                    log::warn!("Document only holds its header");
                }
                Ok(())
            }
            n => Err(CzmlError::MultipleHeaders(n)),
        }
    }

    /// Serialize all entities and return the document bytes
    pub fn render(self) -> Result<Vec<u8>> {
        self.render_with(|_, _| {})
    }

    /// Like [`Document::render`], calling `on_entity(index, id)` before each entity
    pub fn render_with(self, mut on_entity: impl FnMut(usize, &str)) -> Result<Vec<u8>> {
        self.validate()?;

        let mut stream = if self.pretty {
            CzmlStream::pretty()
        } else {
            CzmlStream::new()
        };

        let mut previous: Option<String> = None;
        let mut skipped = 0usize;
        for (index, mut entity) in self.entities.into_iter().enumerate() {
            on_entity(index, entity.id());

            if previous.as_deref() == Some(entity.id()) {
                log::debug!("Skipping {}: same id as the previous entity", entity.id());
                skipped += 1;
                entity.release();
                continue;
            }

            log::debug!("Writing {} ({:?})", entity.id(), entity.kind());
            let written = entity.write_block(&mut stream);
            entity.release();
            written?;
            previous = Some(entity.id().to_string());
        }

        if skipped > 0 {
            log::info!("Skipped {} adjacent duplicate entities", skipped);
        }
        log::info!("Rendered {} packets", stream.packet_count());
        stream.finish()
    }

    /// Render and write to `path`, creating parent directories
    ///
    /// Paths ending in `.gz` are gzip-compressed. Returns the number of bytes
    /// of uncompressed document.
    pub fn write_to_path(self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.render()?;
        write_atomically(path.as_ref(), &bytes)?;
        Ok(bytes.len())
    }
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = temporary_sibling(path);
    let result = write_file(&temp, bytes, is_gzip(path)).and_then(|_| {
        fs::rename(&temp, path)?;
        Ok(())
    });
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result?;

    log::debug!("Wrote {:?}", path);
    Ok(())
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

fn write_file(path: &Path, bytes: &[u8], gzip: bool) -> std::io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(bytes)?;
        encoder.finish()?.flush()
    } else {
        let mut file = file;
        file.write_all(bytes)?;
        file.flush()
    }
}
