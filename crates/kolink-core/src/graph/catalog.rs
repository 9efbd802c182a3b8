//! Exported-symbol catalog of the callee tree.

use std::collections::{BTreeSet, HashMap};

/// Three indexes over the callee tree's exported symbols.
///
/// - `file_functions`: file name → exported function names declared there
/// - `func_file`: function name → declaring file name
/// - `type_file`: type name → declaring file name
///
/// A name declared in several files keeps the file recorded last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    file_functions: HashMap<String, BTreeSet<String>>,
    func_file: HashMap<String, String>,
    type_file: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, file: &str, name: &str) {
        self.file_functions
            .entry(file.to_string())
            .or_default()
            .insert(name.to_string());
        self.func_file.insert(name.to_string(), file.to_string());
    }

    pub fn add_type(&mut self, file: &str, name: &str) {
        self.type_file.insert(name.to_string(), file.to_string());
    }

    /// File declaring function `name`.
    pub fn function_file(&self, name: &str) -> Option<&str> {
        self.func_file.get(name).map(|s| s.as_str())
    }

    /// File declaring type `name`.
    pub fn type_file(&self, name: &str) -> Option<&str> {
        self.type_file.get(name).map(|s| s.as_str())
    }

    /// Exported functions declared in `file`. `None` when the file declares none.
    pub fn functions_in_file(&self, file: &str) -> Option<&BTreeSet<String>> {
        self.file_functions.get(file)
    }

    /// Whether `file` declares a function called `name`.
    pub fn declares(&self, file: &str, name: &str) -> bool {
        self.file_functions
            .get(file)
            .is_some_and(|names| names.contains(name))
    }

    pub fn file_count(&self) -> usize {
        self.file_functions.len()
    }

    pub fn function_count(&self) -> usize {
        self.func_file.len()
    }

    pub fn type_count(&self) -> usize {
        self.type_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.func_file.is_empty() && self.type_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_lookup() {
        let mut catalog = Catalog::new();
        catalog.add_function("helper.go", "Run");
        catalog.add_function("helper.go", "Stop");
        assert_eq!(catalog.function_file("Run"), Some("helper.go"));
        assert!(catalog.declares("helper.go", "Stop"));
        assert!(!catalog.declares("other.go", "Stop"));
        assert_eq!(catalog.functions_in_file("helper.go").unwrap().len(), 2);
        assert!(catalog.functions_in_file("other.go").is_none());
    }

    #[test]
    fn last_writer_wins() {
        let mut catalog = Catalog::new();
        catalog.add_function("a.go", "Run");
        catalog.add_function("b.go", "Run");
        catalog.add_type("a.go", "Worker");
        catalog.add_type("b.go", "Worker");
        assert_eq!(catalog.function_file("Run"), Some("b.go"));
        assert_eq!(catalog.type_file("Worker"), Some("b.go"));
        // The per-file index still remembers both declarations.
        assert!(catalog.declares("a.go", "Run"));
        assert_eq!(catalog.function_count(), 1);
        assert_eq!(catalog.file_count(), 2);
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.type_count(), 0);
    }
}
