//! # World file description
//!
//! World files are JSON documents. Only the `airspace` and `walls` keys are used, any other keys
//! (markers, road signs, ...) are ignored:
//!
//! ```json
//! {
//!     "airspace": { "min": [-1.0, -1.0, 0.0], "max": [4.0, 3.0, 2.0] },
//!     "walls": [
//!         { "plane": { "start": [1.0, 0.0, 0.0], "stop": [1.0, 2.0, 2.0] } }
//!     ]
//! }
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use super::MapError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw contents of a world file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapFile {
    /// Bounds of the flight volume. Required, but kept optional here so that a missing airspace
    /// is reported as a malformed map rather than a parse error.
    #[serde(default)]
    pub airspace: Option<AirspaceDesc>,

    /// Walls in the world, if any.
    #[serde(default)]
    pub walls: Option<Vec<WallDesc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AirspaceDesc {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WallDesc {
    pub plane: PlaneDesc,
}

/// Two opposite corners of a wall. The corners may be given in any order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaneDesc {
    pub start: [f64; 3],
    pub stop: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapFile {
    /// Load a world file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MapError::FileLoad(path.as_ref().to_path_buf(), e))?;

        Self::from_json(&json)
    }

    /// Parse a world file from a JSON string.
    ///
    /// Syntax errors are reported as [`MapError::Parse`], while valid JSON with the wrong shape
    /// (for example a 2-element airspace corner) is reported as [`MapError::MalformedMap`].
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => MapError::MalformedMap(e.to_string()),
            _ => MapError::Parse(e),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_world_file() {
        let map = MapFile::from_json(
            r#"{
                "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
                "walls": [{"plane": {"start": [2.0, 0.0, 0.0], "stop": [3.0, 5.0, 2.0]}}],
                "markers": [{"pose": {"position": [1.0, 1.0, 0.5]}, "id": 1}]
            }"#,
        )
        .unwrap();

        let airspace = map.airspace.unwrap();
        assert_eq!(airspace.min, [0.0, 0.0, 0.0]);
        assert_eq!(airspace.max, [5.0, 5.0, 2.0]);

        let walls = map.walls.unwrap();
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].plane.stop, [3.0, 5.0, 2.0]);
    }

    #[test]
    fn test_optional_keys() {
        let map = MapFile::from_json(r#"{"roadsigns": []}"#).unwrap();
        assert!(map.airspace.is_none());
        assert!(map.walls.is_none());
    }

    #[test]
    fn test_bad_world_files() {
        assert!(matches!(
            MapFile::from_json(r#"{"airspace": {"min": [0.0, 0.0], "max": [1.0, 1.0, 1.0]}}"#),
            Err(MapError::MalformedMap(_))
        ));
        assert!(matches!(
            MapFile::from_json(r#"{"airspace": "#),
            Err(MapError::Parse(_))
        ));
        assert!(matches!(
            MapFile::load("/does/not/exist.world.json"),
            Err(MapError::FileLoad(_, _))
        ));
    }
}
