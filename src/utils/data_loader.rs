//! Data loading utilities

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// A parsed, validated table of named columns.
///
/// Always holds at least one column and one row, and no cell is missing.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wrap a frame, checking the structural invariants
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        if frame.width() == 0 {
            return Err(PipelineError::UnreadableInput(
                "input has no columns".to_string(),
            ));
        }
        if frame.height() == 0 {
            return Err(PipelineError::UnreadableInput(
                "input has a header but no data rows".to_string(),
            ));
        }
        for column in frame.get_columns() {
            let nulls = column.null_count();
            if nulls > 0 {
                return Err(PipelineError::UnreadableInput(format!(
                    "column '{}' has {} missing or malformed cells",
                    column.name(),
                    nulls
                )));
            }
        }
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn n_columns(&self) -> usize {
        self.frame.width()
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|col| col.as_str() == name)
    }

    /// Check that `target` names a column exactly (case-sensitive).
    pub fn validate_target(&self, target: &str) -> Result<()> {
        if self.has_column(target) {
            Ok(())
        } else {
            Err(PipelineError::TargetNotFound {
                target: target.to_string(),
                available: self.column_names(),
            })
        }
    }
}

/// Open a file that must carry a `.csv` extension
pub fn open_csv(path: &Path) -> Result<File> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(PipelineError::UnreadableInput(format!(
            "expected a .csv file, got '{}'",
            path.display()
        )));
    }

    File::open(path).map_err(|e| {
        PipelineError::UnreadableInput(format!("cannot open '{}': {}", path.display(), e))
    })
}

/// Loads delimited text with a header row into a [`Dataset`]
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    /// Field separator
    delimiter: u8,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a comma-separated loader
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a readable stream.
    ///
    /// Nothing is returned unless the whole input parses: invalid UTF-8,
    /// ragged rows and empty cells all fail with
    /// [`PipelineError::UnreadableInput`].
    pub fn load<R: Read>(&self, mut reader: R) -> Result<Dataset> {
        let start = Instant::now();

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| PipelineError::UnreadableInput(e.to_string()))?;

        std::str::from_utf8(&bytes).map_err(|e| {
            PipelineError::UnreadableInput(format!("input is not valid UTF-8: {}", e))
        })?;

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(PipelineError::UnreadableInput("input is empty".to_string()));
        }

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| PipelineError::UnreadableInput(e.to_string()))?;

        let dataset = Dataset::from_frame(frame)?;

        debug!(
            rows = dataset.n_rows(),
            columns = dataset.n_columns(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );

        Ok(dataset)
    }

    /// Open and parse a `.csv` file
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        self.load(open_csv(path.as_ref())?)
    }

    /// List the header columns of a file so a caller can pick the target
    pub fn column_names(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        Ok(self.load_path(path)?.column_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(text: &str) -> Result<Dataset> {
        DatasetLoader::new().load(text.as_bytes())
    }

    #[test]
    fn test_load_simple() {
        let ds = load_str("a,b,c\n1,2,3\n4,5,6\n7,8,9\n").unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_columns(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_mixed_types() {
        let ds = load_str("age,city,label\n30,Paris,yes\n41,Rome,no\n").unwrap();
        let city = ds.frame().column("city").unwrap();
        assert_eq!(city.dtype(), &DataType::String);
    }

    #[test]
    fn test_extra_field_is_unreadable() {
        let err = load_str("a,b\n1,2\n3,4,5\n").unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableInput(_)));
    }

    #[test]
    fn test_missing_cell_is_unreadable() {
        let err = load_str("a,b\n1,2\n3,\n").unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableInput(_)));
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,2\n";
        let err = DatasetLoader::new().load(bytes).unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableInput(_)));
    }

    #[test]
    fn test_empty_and_header_only_are_unreadable() {
        assert!(matches!(load_str(""), Err(PipelineError::UnreadableInput(_))));
        assert!(matches!(load_str("a,b\n"), Err(PipelineError::UnreadableInput(_))));
    }

    #[test]
    fn test_custom_delimiter() {
        let ds = DatasetLoader::new()
            .with_delimiter(b';')
            .load("x;y\n1;2\n".as_bytes())
            .unwrap();
        assert_eq!(ds.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_validate_target_is_case_sensitive() {
        let ds = load_str("Feature,Label\n1,0\n2,1\n").unwrap();
        assert!(ds.validate_target("Label").is_ok());

        match ds.validate_target("label") {
            Err(PipelineError::TargetNotFound { target, available }) => {
                assert_eq!(target, "label");
                assert_eq!(available, vec!["Feature", "Label"]);
            }
            other => panic!("expected TargetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_path_requires_csv_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,2").unwrap();

        let err = DatasetLoader::new().load_path(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableInput(_)));
    }

    #[test]
    fn test_column_names_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "sepal,petal,species").unwrap();
        writeln!(file, "5.1,1.4,setosa").unwrap();

        let names = DatasetLoader::new().column_names(file.path()).unwrap();
        assert_eq!(names, vec!["sepal", "petal", "species"]);
    }
}
