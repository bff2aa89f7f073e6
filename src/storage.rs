//! File access for documents and sprite assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::formats::{parse_document, validate_document, ParseError, SkeleDocument, ValidationIssue};

/// File extensions [`AssetRoot::scan`] treats as sprites.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
	/// The listed directory's path joined with the entry name.
	pub path: PathBuf,
	pub is_dir: bool,
}

/// Where documents and assets live.
pub trait Storage {
	fn read_to_string(&self, path: &Path) -> io::Result<String>;
	fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
	fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// [`Storage`] on the local file system. Relative paths are resolved against `base`.
#[derive(Debug, Clone)]
pub struct FsStorage {
	base: PathBuf,
}

impl FsStorage {
	pub fn new(base: impl Into<PathBuf>) -> Self {
		Self { base: base.into() }
	}

	fn resolve(&self, path: &Path) -> PathBuf {
		self.base.join(path)
	}
}

impl Storage for FsStorage {
	fn read_to_string(&self, path: &Path) -> io::Result<String> {
		fs::read_to_string(self.resolve(path))
	}

	fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
		let full = self.resolve(path);
		if let Some(dir) = full.parent() {
			fs::create_dir_all(dir)?;
		}
		fs::write(full, contents)
	}

	fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
		let mut entries = Vec::new();
		for entry in fs::read_dir(self.resolve(path))? {
			let entry = entry?;
			entries.push(DirEntry {
				path: path.join(entry.file_name()),
				is_dir: entry.file_type()?.is_dir(),
			});
		}
		Ok(entries)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error(transparent)]
	Io(#[from] io::Error),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error("Document failed validation with {} issue(s)", .0.len())]
	Invalid(Vec<ValidationIssue>),
}

pub fn load_document(storage: &impl Storage, path: &Path) -> Result<SkeleDocument, StorageError> {
	let text = storage.read_to_string(path)?;
	let doc = parse_document(&text)?;
	tracing::debug!("Loaded document {}", path.display());
	Ok(doc)
}

/// Writes `doc` unless it fails validation, in which case storage is left untouched.
pub fn save_document(storage: &impl Storage, path: &Path, doc: &SkeleDocument) -> Result<(), StorageError> {
	let val = doc.to_json();
	if let Err(issues) = validate_document(&val) {
		for issue in &issues {
			tracing::warn!("Not saving {}: {issue}", path.display());
		}
		return Err(StorageError::Invalid(issues));
	}

	storage.write(path, &json::stringify_pretty(val, 2))?;
	tracing::debug!("Saved document {}", path.display());
	Ok(())
}

/// A directory of sprites addressed by URIs like `sprite:arm/upper`.
#[derive(Debug, Clone)]
pub struct AssetRoot {
	pub scheme: String,
	pub dir: PathBuf,
}

impl AssetRoot {
	pub fn new(scheme: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
		Self {
			scheme: scheme.into(),
			dir: dir.into(),
		}
	}

	/// URI of the file at `path`, relative to this root and without extension.
	///
	/// `None` if `path` is not below the root.
	pub fn uri_for(&self, path: &Path) -> Option<String> {
		let rel = path.strip_prefix(&self.dir).ok()?.with_extension("");
		let parts = rel
			.components()
			.map(|part| part.as_os_str().to_string_lossy())
			.collect::<Vec<_>>();
		if parts.is_empty() {
			return None;
		}
		Some(format!("{}:{}", self.scheme, parts.join("/")))
	}

	/// Sorted URIs of every image below the root.
	///
	/// Directories that cannot be listed are logged and skipped.
	pub fn scan(&self, storage: &impl Storage) -> Vec<String> {
		let mut uris = Vec::new();
		let mut pending = vec![self.dir.clone()];

		while let Some(dir) = pending.pop() {
			let entries = match storage.list_dir(&dir) {
				Ok(entries) => entries,
				Err(err) => {
					tracing::error!("Could not list assets in {}: {err}", dir.display());
					continue;
				}
			};

			for entry in entries {
				if entry.is_dir {
					pending.push(entry.path);
				} else if is_image(&entry.path) {
					uris.extend(self.uri_for(&entry.path));
				}
			}
		}

		uris.sort();
		uris
	}
}

fn is_image(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::BTreeMap;

	use crate::formats::SkeleData;

	use super::*;

	/// Files by path; directories are implied by their contents.
	#[derive(Default)]
	struct MemStorage {
		files: RefCell<BTreeMap<PathBuf, String>>,
		writes: RefCell<usize>,
		broken: Vec<PathBuf>,
	}

	impl MemStorage {
		fn with_files(paths: &[&str]) -> Self {
			let storage = Self::default();
			for path in paths {
				storage.files.borrow_mut().insert(PathBuf::from(path), String::new());
			}
			storage
		}
	}

	impl Storage for MemStorage {
		fn read_to_string(&self, path: &Path) -> io::Result<String> {
			self.files
				.borrow()
				.get(path)
				.cloned()
				.ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
		}

		fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
			*self.writes.borrow_mut() += 1;
			self.files.borrow_mut().insert(path.to_owned(), contents.to_owned());
			Ok(())
		}

		fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
			if self.broken.iter().any(|broken| broken == path) {
				return Err(io::Error::from(io::ErrorKind::PermissionDenied));
			}

			let mut entries = Vec::<DirEntry>::new();
			for file in self.files.borrow().keys() {
				let Ok(rel) = file.strip_prefix(path) else {
					continue;
				};
				let mut parts = rel.components();
				let Some(first) = parts.next() else {
					continue;
				};
				let entry = DirEntry {
					path: path.join(first),
					is_dir: parts.next().is_some(),
				};
				if !entries.contains(&entry) {
					entries.push(entry);
				}
			}

			if entries.is_empty() {
				return Err(io::Error::from(io::ErrorKind::NotFound));
			}
			Ok(entries)
		}
	}

	#[test]
	fn test_save_and_load() {
		let storage = MemStorage::default();
		let path = Path::new("rigs/arm.json");
		let doc = SkeleDocument::new(SkeleData {
			children: vec![SkeleData {
				id: Some("leaf".to_owned()),
				mag: 0.3,
				..Default::default()
			}],
			..Default::default()
		})
		.with_name("arm");

		save_document(&storage, path, &doc).unwrap();
		assert_eq!(*storage.writes.borrow(), 1);
		assert_eq!(load_document(&storage, path).unwrap(), doc);
	}

	#[test]
	fn test_save_normalizes_root_pose() {
		let storage = MemStorage::default();
		let path = Path::new("posed.json");
		storage
			.write(path, r#"{ "skele": { "angle": 45, "mag": 2, "children": [{ "angle": 10, "mag": 3 }] } }"#)
			.unwrap();

		let doc = load_document(&storage, path).unwrap();
		assert_eq!((doc.skele.angle, doc.skele.mag), (45., 2.));
		save_document(&storage, path, &doc).unwrap();

		let saved = json::parse(&storage.read_to_string(path).unwrap()).unwrap();
		assert_eq!(saved["skele"]["angle"], 0);
		assert_eq!(saved["skele"]["mag"], 1);
		assert_eq!(saved["skele"]["children"][0]["angle"], 10);
		assert_eq!(saved["skele"]["children"][0]["mag"], 3);
	}

	#[test]
	fn test_invalid_document_is_not_written() {
		let storage = MemStorage::default();
		let doc = SkeleDocument::new(SkeleData {
			children: vec![SkeleData {
				mag: f32::NAN,
				..Default::default()
			}],
			..Default::default()
		});

		let issues = match save_document(&storage, Path::new("bad.json"), &doc) {
			Err(StorageError::Invalid(issues)) => issues,
			other => panic!("expected validation failure, got {other:?}"),
		};
		assert_eq!(issues[0].path, "skele.children[0].mag");
		assert_eq!(*storage.writes.borrow(), 0);
		assert!(storage.files.borrow().is_empty());
	}

	#[test]
	fn test_load_errors() {
		let storage = MemStorage::default();
		assert!(matches!(
			load_document(&storage, Path::new("missing.json")),
			Err(StorageError::Io(_))
		));

		storage.write(Path::new("list.json"), "[]").unwrap();
		assert!(matches!(
			load_document(&storage, Path::new("list.json")),
			Err(StorageError::Parse(ParseError::NotAnObject))
		));
	}

	#[test]
	fn test_uri_for() {
		let assets = AssetRoot::new("sprite", "assets/sprites");
		assert_eq!(
			assets.uri_for(Path::new("assets/sprites/arm/upper.png")).as_deref(),
			Some("sprite:arm/upper")
		);
		assert_eq!(
			assets.uri_for(Path::new("assets/sprites/head.webp")).as_deref(),
			Some("sprite:head")
		);
		assert_eq!(assets.uri_for(Path::new("elsewhere/head.png")), None);
		assert_eq!(assets.uri_for(Path::new("assets/sprites")), None);
	}

	#[test]
	fn test_scan() {
		let storage = MemStorage::with_files(&[
			"gfx/body.png",
			"gfx/arm/upper.PNG",
			"gfx/arm/lower.jpeg",
			"gfx/arm/notes.txt",
			"gfx/fx/spark.gif",
			"other/face.png",
		]);
		let assets = AssetRoot::new("gfx", "gfx");
		assert_eq!(
			assets.scan(&storage),
			["gfx:arm/lower", "gfx:arm/upper", "gfx:body", "gfx:fx/spark"]
		);
	}

	#[test]
	fn test_scan_degrades() {
		let mut storage = MemStorage::with_files(&["gfx/body.png", "gfx/arm/upper.png"]);
		storage.broken.push(PathBuf::from("gfx/arm"));
		assert_eq!(AssetRoot::new("gfx", "gfx").scan(&storage), ["gfx:body"]);

		assert!(AssetRoot::new("gfx", "missing").scan(&storage).is_empty());
	}
}
