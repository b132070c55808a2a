//! Data-directory layout for the CLI.

use std::path::PathBuf;

/// Where the CLI keeps its database, index artifact, and source documents.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub db: PathBuf,
    pub index: PathBuf,
    pub docs: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &str) -> Self {
        let root = PathBuf::from(data_dir);
        DataPaths {
            db: root.join("triage.db"),
            index: root.join("index.json"),
            docs: root.join("docs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_data_dir() {
        let paths = DataPaths::new("data");
        assert_eq!(paths.db, PathBuf::from("data/triage.db"));
        assert_eq!(paths.index, PathBuf::from("data/index.json"));
        assert_eq!(paths.docs, PathBuf::from("data/docs"));
    }
}
