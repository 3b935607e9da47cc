//! Stop names from a `stop_id,stop_name` CSV file.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::StopId;

use super::error::GraphError;
use super::transit_graph::{GraphBuilder, StopIdx};

#[derive(Debug, Deserialize)]
struct NameRecord {
    stop_id: String,
    stop_name: String,
}

/// Stop id to display name.
#[derive(Debug, Clone, Default)]
pub struct StopNames(HashMap<StopId, String>);

impl StopNames {
    /// Read a CSV with a `stop_id,stop_name` header. Malformed rows are
    /// skipped with a warning; extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        // Fail early on an unreadable header rather than skipping every row.
        rdr.headers()?;

        let mut names = HashMap::new();
        for (line, result) in rdr.deserialize::<NameRecord>().enumerate() {
            match result {
                Ok(record) => {
                    let name = record.stop_name.trim();
                    if !name.is_empty() {
                        names.insert(StopId::new(record.stop_id.trim()), name.to_string());
                    }
                }
                Err(e) => warn!(row = line + 1, "skipping stop name row: {e}"),
            }
        }
        Ok(Self(names))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let names = Self::from_reader(std::fs::File::open(path)?)?;
        info!(path = %path.display(), names = names.len(), "stop names read");
        Ok(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &StopId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Name every stop: from the table when listed, otherwise keep an
    /// existing name or fall back to the placeholder. Returns how many stops
    /// took a name from the table.
    pub fn apply(&self, builder: &mut GraphBuilder) -> usize {
        let mut named = 0;
        for i in 0..builder.stop_count() {
            let stop = builder.stop_mut(StopIdx(i as u32));
            if let Some(name) = self.get(&stop.id) {
                stop.name = Some(name.to_string());
                named += 1;
            } else if stop.name.is_none() {
                stop.name = Some(stop.display_name());
            }
        }
        named
    }
}
