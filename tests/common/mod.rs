use std::collections::HashMap;
use std::path::{Path, PathBuf};

use covview::report::Filesystem;

/// In-memory filesystem shared by the integration suites.
pub struct FakeFs {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn insert(&mut self, path: &str, bytes: &[u8]) {
        self.files.insert(PathBuf::from(path), bytes.to_vec());
    }
}

impl Filesystem for FakeFs {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Render a minimal Cobertura report with one class.
pub fn report_xml(source: &str, filename: &str, lines: &[(u32, u64)]) -> String {
    let mut rendered = String::new();
    for (number, hits) in lines {
        rendered.push_str(&format!("<line number=\"{number}\" hits=\"{hits}\"/>"));
    }
    format!(
        "<coverage><sources><source>{source}</source></sources>\
         <packages><package name=\"app\"><classes>\
         <class name=\"c\" filename=\"{filename}\"><lines>{rendered}</lines></class>\
         </classes></package></packages></coverage>"
    )
}
