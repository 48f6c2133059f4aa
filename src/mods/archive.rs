//! Archive extraction utilities (zip, 7z, rar)

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZip,
    Rar,
    Unknown,
}

impl ArchiveFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "zip" => Self::Zip,
            "7z" => Self::SevenZip,
            "rar" => Self::Rar,
            _ => Self::Unknown,
        }
    }

    /// Detect format from the leading magic bytes
    pub fn sniff(header: &[u8]) -> Self {
        if header.starts_with(&[0x50, 0x4B]) {
            Self::Zip
        } else if header.starts_with(&[0x37, 0x7A, 0xBC, 0xAF]) {
            Self::SevenZip
        } else if header.starts_with(&[0x52, 0x61, 0x72, 0x21]) {
            Self::Rar
        } else {
            Self::Unknown
        }
    }
}

/// Extract an archive to the destination directory
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let format = match ArchiveFormat::from_path(archive) {
        ArchiveFormat::Unknown => {
            let mut header = [0u8; 4];
            let mut file = fs::File::open(archive)
                .with_context(|| format!("Failed to open {}", archive.display()))?;
            let read = file.read(&mut header).context("Failed to read archive header")?;
            ArchiveFormat::sniff(&header[..read])
        }
        known => known,
    };

    tracing::info!("Extracting {} ({:?})", archive.display(), format);
    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest),
        ArchiveFormat::SevenZip => extract_7z(archive, dest),
        ArchiveFormat::Rar => extract_rar(archive, dest),
        ArchiveFormat::Unknown => bail!("Unknown archive format: {}", archive.display()),
    }
}

/// Extract a ZIP archive
fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive).context("Failed to open archive")?;
    let mut zip = zip::ZipArchive::new(file).context("Failed to read ZIP archive")?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = sanitize_path(entry.name());
        if relative.is_empty() {
            continue;
        }
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)
                .with_context(|| format!("Failed to create {}", outpath.display()))?;
            std::io::copy(&mut entry, &mut outfile)?;

            // Set permissions on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
                }
            }
        }
    }

    Ok(())
}

/// Extract a 7z archive
fn extract_7z(archive: &Path, dest: &Path) -> Result<()> {
    sevenz_rust::decompress_file(archive, dest).context("Failed to extract 7z archive")
}

/// Extract a RAR archive through the system `unrar`
fn extract_rar(archive: &Path, dest: &Path) -> Result<()> {
    let output = std::process::Command::new("unrar")
        .args(["x", "-o+", "-y"])
        .arg(archive)
        .arg(dest)
        .output();

    match output {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("unrar failed: {}", stderr)
        }
        Err(_) => bail!(
            "RAR extraction requires 'unrar' to be installed.\n\
             Install it with: sudo apt install unrar (Debian/Ubuntu)\n\
                              sudo pacman -S unrar (Arch)"
        ),
    }
}

/// Sanitize path to prevent directory traversal
fn sanitize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(ArchiveFormat::from_path(Path::new("mod.zip")), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::from_path(Path::new("mod.7z")), ArchiveFormat::SevenZip);
        assert_eq!(ArchiveFormat::from_path(Path::new("mod.rar")), ArchiveFormat::Rar);
        assert_eq!(ArchiveFormat::from_path(Path::new("mod.ZIP")), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::sniff(b"Rar!"), ArchiveFormat::Rar);
        assert_eq!(ArchiveFormat::sniff(b"PK"), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::sniff(b""), ArchiveFormat::Unknown);
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("foo/bar/baz.pak"), "foo/bar/baz.pak");
        assert_eq!(sanitize_path("foo\\bar\\baz.pak"), "foo/bar/baz.pak");
        assert_eq!(sanitize_path("../../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_path("./foo/./bar"), "foo/bar");
    }

    #[test]
    fn test_extract_zip_by_magic() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("download.bin");
        {
            let file = fs::File::create(&archive).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("Cool Mod/mod.txt", options).unwrap();
            zip.write_all(b"{}").unwrap();
            zip.start_file("../escape.txt", options).unwrap();
            zip.write_all(b"x").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract_archive(&archive, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("Cool Mod/mod.txt")).unwrap(), "{}");
        assert!(dest.join("escape.txt").is_file());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("notes.txt");
        fs::write(&archive, "hello").unwrap();
        assert!(extract_archive(&archive, &dir.path().join("out")).is_err());
    }
}
