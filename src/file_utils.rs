use anyhow::{Result, Context};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Leading bytes of a zip archive (every `.docx` is one)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Leading bytes of an OLE compound file (legacy `.doc`)
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Prefix Word gives to its lock files next to an open document
const LOCK_FILE_PREFIX: &str = "~$";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a translated document
    // @params: input_file, output_dir, suffix
    // @returns: `<output_dir>/<stem>-<suffix>.docx`
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('-');
        output_filename.push_str(suffix);
        output_filename.push_str(".docx");

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory, skipping Office lock files
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || entry.file_name().to_string_lossy().starts_with(LOCK_FILE_PREFIX) {
                continue;
            }
            if let Some(ext) = path.extension() {
                if ext.to_string_lossy().eq_ignore_ascii_case(extension) {
                    result.push(path.to_path_buf());
                }
            }
        }

        Ok(result)
    }

    /// Detect whether a file is a Word document this tool can read
    ///
    /// The extension decides the candidate type and the leading bytes confirm it.
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let mut magic = [0u8; 4];
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let read = file.read(&mut magic)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let is_zip = read == magic.len() && magic == ZIP_MAGIC;
        let is_ole = read == magic.len() && magic == OLE_MAGIC;

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(match ext.as_str() {
            "docx" | "docm" | "dotx" | "dotm" if is_zip => FileType::Docx,
            "doc" | "dot" if is_ole => FileType::LegacyWord,
            _ => FileType::Unknown,
        })
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Office Open XML word processing package
    Docx,
    /// Binary Word 97-2003 document, not supported
    LegacyWord,
    /// Unknown file type
    Unknown,
}
