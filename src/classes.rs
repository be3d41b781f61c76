//! Class lists and the old→new index mapping derived from them.
//!
//! A class list is an ordered list of names where the position of a name is
//! its numeric class index. Plain text lists hold one name per line; a path
//! ending in `.yaml`/`.yml` is read as an Ultralytics `data.yaml`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::Deserialize;

use crate::error::RelabelError;

/// Largest class index accepted as a `names:` mapping key.
pub const MAX_YAML_CLASS_INDEX: usize = 100_000;

/// An ordered list of class names; index = position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList {
    names: Vec<String>,
}

impl ClassList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// The list as written to `classes_mapped.txt`: one name per line,
    /// trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = self.names.join("\n");
        text.push('\n');
        text
    }
}

/// Read a class list from disk.
///
/// Text lists keep every non-empty line with only the line terminator
/// removed. YAML lists take their names from the `names:` key.
pub fn read_class_list(path: &Path) -> Result<ClassList, RelabelError> {
    let data = fs::read_to_string(path).map_err(|source| RelabelError::ClassListRead {
        path: path.to_path_buf(),
        source,
    })?;

    if is_yaml_path(path) {
        parse_data_yaml_names(&data).map_err(|source| RelabelError::ClassListYamlParse {
            path: path.to_path_buf(),
            source,
        })
    } else {
        Ok(parse_class_text(&data))
    }
}

/// Parse a newline-delimited class list. `\n`, `\r\n` and a lone `\r` all
/// end a line.
pub fn parse_class_text(data: &str) -> ClassList {
    ClassList::new(data.split(['\r', '\n']).filter(|line| !line.is_empty()))
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn parse_data_yaml_names(data: &str) -> Result<ClassList, serde_yaml::Error> {
    let parsed: DataYaml = serde_yaml::from_str(data)?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(&max_index) = mapping.keys().max() else {
                return Ok(ClassList::default());
            };
            if max_index > MAX_YAML_CLASS_INDEX {
                return Err(serde_yaml::Error::custom(format!(
                    "class index {} exceeds the maximum of {}",
                    max_index, MAX_YAML_CLASS_INDEX
                )));
            }
            let mut names = vec![String::new(); max_index + 1];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{}", index);
                }
            }
            names
        }
    };

    Ok(ClassList { names })
}

/// Index translation from an old class list to a new one, matched by name.
#[derive(Clone, Debug)]
pub struct ClassMapping {
    old_to_new: Vec<Option<usize>>,
    unmapped: Vec<String>,
    duplicate_new: Vec<String>,
}

impl ClassMapping {
    /// Build the mapping. When `new` repeats a name, its last position wins.
    pub fn new(old: &ClassList, new: &ClassList) -> Self {
        let mut name_to_new: HashMap<&str, usize> = HashMap::with_capacity(new.len());
        let mut seen = HashSet::new();
        let mut duplicate_new = Vec::new();
        for (index, name) in new.names.iter().enumerate() {
            if !seen.insert(name.as_str()) && !duplicate_new.contains(name) {
                duplicate_new.push(name.clone());
            }
            name_to_new.insert(name.as_str(), index);
        }

        let old_to_new: Vec<Option<usize>> = old
            .names
            .iter()
            .map(|name| name_to_new.get(name.as_str()).copied())
            .collect();

        let mut unmapped = Vec::new();
        for (name, target) in old.names.iter().zip(&old_to_new) {
            if target.is_none() && !unmapped.contains(name) {
                unmapped.push(name.clone());
            }
        }

        Self {
            old_to_new,
            unmapped,
            duplicate_new,
        }
    }

    /// New index for an old class index, if the old index names a class that
    /// also exists in the new list.
    pub fn resolve(&self, old_index: usize) -> Option<usize> {
        self.old_to_new.get(old_index).copied().flatten()
    }

    /// Old class names with no counterpart in the new list.
    pub fn unmapped_names(&self) -> &[String] {
        &self.unmapped
    }

    /// Names that appear more than once in the new list.
    pub fn duplicate_new_names(&self) -> &[String] {
        &self.duplicate_new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_list_drops_empty_lines_only() {
        let list = parse_class_text("cat\n\ndog\r\n  \nbird");
        assert_eq!(list.names(), ["cat", "dog", "  ", "bird"]);
    }

    #[test]
    fn text_list_splits_on_lone_carriage_returns() {
        let list = parse_class_text("cat\rdog\r\rbird\r");
        assert_eq!(list.names(), ["cat", "dog", "bird"]);
    }

    #[test]
    fn text_list_keeps_internal_and_trailing_spaces() {
        let list = parse_class_text("traffic light \n");
        assert_eq!(list.names(), ["traffic light "]);
    }

    #[test]
    fn yaml_sequence_and_mapping_are_supported() {
        let seq = parse_data_yaml_names("names:\n  - person\n  - car\n").expect("parse seq");
        assert_eq!(seq.names(), ["person", "car"]);

        let map = parse_data_yaml_names("names:\n  0: person\n  2: car\n").expect("parse map");
        assert_eq!(map.names(), ["person", "class_1", "car"]);
    }

    #[test]
    fn yaml_mapping_with_huge_index_is_rejected() {
        let err = parse_data_yaml_names("names:\n  18446744073709551615: person\n").unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));

        let at_cap = format!("names:\n  {}: person\n", MAX_YAML_CLASS_INDEX);
        let list = parse_data_yaml_names(&at_cap).expect("index at the cap");
        assert_eq!(list.len(), MAX_YAML_CLASS_INDEX + 1);
    }

    #[test]
    fn read_class_list_surfaces_oversized_yaml_as_parse_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let yaml = temp.path().join("data.yaml");
        fs::write(&yaml, "names:\n  4000000000: person\n").expect("write yaml");
        let err = read_class_list(&yaml).unwrap_err();
        assert!(matches!(err, RelabelError::ClassListYamlParse { .. }));
    }

    #[test]
    fn read_class_list_reports_missing_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = read_class_list(&temp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, RelabelError::ClassListRead { .. }));
    }

    #[test]
    fn read_class_list_dispatches_on_extension() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let yaml = temp.path().join("data.YAML");
        fs::write(&yaml, "names: [a, b]\n").expect("write yaml");
        let txt = temp.path().join("classes.txt");
        fs::write(&txt, "names: [a, b]\n").expect("write txt");

        assert_eq!(read_class_list(&yaml).expect("read yaml").names(), ["a", "b"]);
        assert_eq!(
            read_class_list(&txt).expect("read txt").names(),
            ["names: [a, b]"]
        );
    }

    #[test]
    fn mapping_matches_by_name() {
        let old = ClassList::new(["cat", "dog", "bird"]);
        let new = ClassList::new(["dog", "bird", "cat"]);
        let mapping = ClassMapping::new(&old, &new);

        assert_eq!(mapping.resolve(0), Some(2));
        assert_eq!(mapping.resolve(1), Some(0));
        assert_eq!(mapping.resolve(2), Some(1));
        assert_eq!(mapping.resolve(3), None);
        assert!(mapping.unmapped_names().is_empty());
    }

    #[test]
    fn mapping_reports_unmapped_and_last_duplicate_wins() {
        let old = ClassList::new(["cat", "dog", "bird"]);
        let new = ClassList::new(["dog", "cat", "dog"]);
        let mapping = ClassMapping::new(&old, &new);

        assert_eq!(mapping.resolve(1), Some(2));
        assert_eq!(mapping.resolve(2), None);
        assert_eq!(mapping.unmapped_names(), ["bird"]);
        assert_eq!(mapping.duplicate_new_names(), ["dog"]);
    }

    #[test]
    fn to_text_always_ends_with_newline() {
        assert_eq!(ClassList::new(["a", "b"]).to_text(), "a\nb\n");
        assert_eq!(ClassList::default().to_text(), "\n");
    }
}
