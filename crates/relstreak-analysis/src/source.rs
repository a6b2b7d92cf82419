//! Frame files
//!
//! A frame file is a JSON object mapping object ids to per-object records.
//! Each record may carry a `semantic_relations` list of triplets; other fields
//! are ignored and a missing list is an empty frame:
//!
//! ```json
//! {
//!   "obj_0001": { "semantic_relations": [["person", "holding", "cup"]] },
//!   "obj_0002": { "semantic_relations": [] },
//!   "obj_0003": { "bbox": [0, 0, 10, 10] }
//! }
//! ```
//!
//! The frame order used for streak tracking is the order in which the object
//! ids first appear in the document. A repeated id keeps its first position
//! and takes the record of its last occurrence.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};

use crate::{
    aggregate::{BoundaryMode, RelationAggregate},
    triplet::Triplet,
};

/// The triplets attached to one object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub object_id: String,
    pub triplets: Vec<Triplet>,
}

impl AsRef<[Triplet]> for Frame {
    fn as_ref(&self) -> &[Triplet] {
        &self.triplets
    }
}

#[derive(Debug, Deserialize)]
struct ObjectRecord {
    #[serde(default)]
    semantic_relations: Vec<Triplet>,
}

/// The frames of one file, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadFramesError {
    #[display("failed to open frame file: {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to parse frame file: {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl FrameSequence {
    /// Reads and decodes a frame file.
    pub fn load<P>(path: P) -> Result<Self, LoadFramesError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadFramesError::Open {
            path: path.to_owned(),
            source,
        })?;
        let frames = Self::from_reader(BufReader::new(file)).map_err(|source| {
            LoadFramesError::Parse {
                path: path.to_owned(),
                source,
            }
        })?;
        tracing::debug!(
            path = %path.display(),
            frames = frames.len(),
            "loaded frame file"
        );
        Ok(frames)
    }

    pub fn from_reader<R>(reader: R) -> Result<Self, serde_json::Error>
    where
        R: Read,
    {
        serde_json::from_reader(reader)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Runs the streak aggregation over this sequence.
    #[must_use]
    pub fn aggregate(&self, mode: BoundaryMode) -> RelationAggregate {
        RelationAggregate::from_frames(&self.frames, mode)
    }
}

impl<'de> Deserialize<'de> for FrameSequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FrameMapVisitor;

        impl<'de> Visitor<'de> for FrameMapVisitor {
            type Value = FrameSequence;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map from object ids to object records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let capacity = map.size_hint().unwrap_or(0);
                let mut frames: Vec<Frame> = Vec::with_capacity(capacity);
                let mut positions: HashMap<String, usize> = HashMap::with_capacity(capacity);
                while let Some((object_id, record)) = map.next_entry::<String, ObjectRecord>()? {
                    let triplets = record.semantic_relations;
                    match positions.entry(object_id) {
                        Entry::Occupied(entry) => frames[*entry.get()].triplets = triplets,
                        Entry::Vacant(entry) => {
                            frames.push(Frame {
                                object_id: entry.key().clone(),
                                triplets,
                            });
                            entry.insert(frames.len() - 1);
                        }
                    }
                }
                Ok(FrameSequence { frames })
            }
        }

        deserializer.deserialize_map(FrameMapVisitor)
    }
}
