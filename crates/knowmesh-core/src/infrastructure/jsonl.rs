//! JSONL export/import of knowledge entities
//!
//! One entity per line, in the order given. Blank lines are skipped on
//! import so hand-edited files stay loadable.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::Result;
use crate::domain::knowledge::KnowledgeEntity;
use crate::error::Error;

/// Write entities as JSON lines; returns the number written
pub fn write_entities_jsonl<'a, W, I>(writer: &mut W, entities: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a KnowledgeEntity>,
{
    let mut count = 0;
    for entity in entities {
        serde_json::to_writer(&mut *writer, entity)
            .map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))?;
        writeln!(writer).map_err(Error::Io)?;
        count += 1;
    }
    Ok(count)
}

/// Read entities from JSON lines
///
/// Fails on the first malformed line, naming its 1-based line number.
pub fn read_entities_jsonl<R: BufRead>(reader: R) -> Result<Vec<KnowledgeEntity>> {
    let mut entities = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let entity: KnowledgeEntity = serde_json::from_str(&line)
            .map_err(|e| Error::Parse(format!("Invalid JSON on line {}: {}", index + 1, e)))?;
        entities.push(entity);
    }
    Ok(entities)
}

/// Export entities to a JSONL file, replacing it
pub fn export_entities_jsonl(path: &Path, entities: &[KnowledgeEntity]) -> Result<usize> {
    let file = File::create(path).map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);

    let count = write_entities_jsonl(&mut writer, entities)?;
    writer.flush().map_err(Error::Io)?;

    info!(path = %path.display(), count, "Exported knowledge entities");
    Ok(count)
}

/// Import entities from a JSONL file
pub fn import_entities_jsonl(path: &Path) -> Result<Vec<KnowledgeEntity>> {
    let file = File::open(path).map_err(Error::Io)?;
    let entities = read_entities_jsonl(BufReader::new(file))?;

    info!(path = %path.display(), count = entities.len(), "Imported knowledge entities");
    Ok(entities)
}
