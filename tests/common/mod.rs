#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use parquet_retype::{
    Converter, build,
    typespec::{SourceTypeInfo, TypeSpec},
};
use tempfile::{TempDir, tempdir};

/// Builds a converter from two textual type specifications.
pub fn converter(source: &str, target: &str) -> Converter {
    try_converter(source, target).expect("conversion should be allowed")
}

pub fn try_converter(source: &str, target: &str) -> Result<Converter, parquet_retype::ConversionError> {
    let source: SourceTypeInfo = source.parse().expect("valid source spec");
    let target: TypeSpec = target.parse().expect("valid target spec");
    build(&source, &target)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub const ORDERS_SCHEMA: &str = r#"columns:
  - path: order.id
    type: INT32:NONE
  - path: order.amount
    type: INT32:DECIMAL(9,2)
  - path: order.placed_at
    type: INT96:NONE
  - path: order.note
    type: BYTE_ARRAY:NONE
"#;
