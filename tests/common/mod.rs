#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Paths of a remap fixture laid out under a temp root.
pub struct RemapFixture {
    pub labels_dir: PathBuf,
    pub old_classes: PathBuf,
    pub new_classes: PathBuf,
    pub output_dir: PathBuf,
}

pub fn write_lines(path: &Path, lines: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).expect("write lines");
}

/// `labels/` with one `a.txt`, plus old/new class lists.
pub fn pets_fixture(root: &Path, label_line: &str, new_classes: &[&str]) -> RemapFixture {
    let labels_dir = root.join("labels");
    fs::create_dir_all(&labels_dir).expect("create labels dir");
    write_lines(&labels_dir.join("a.txt"), &[label_line]);

    let old_classes = root.join("old_classes.txt");
    let new_classes_path = root.join("new_classes.txt");
    write_lines(&old_classes, &["cat", "dog", "bird"]);
    write_lines(&new_classes_path, new_classes);

    RemapFixture {
        labels_dir,
        old_classes,
        new_classes: new_classes_path,
        output_dir: root.join("out"),
    }
}

pub fn touch_files(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).expect("create dir");
    for name in names {
        fs::write(dir.join(name), name.as_bytes()).expect("write file");
    }
}

pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
