//! Virtual file locators (`/vsizip/...`, `/vsitar/...`).
//!
//! A locator names a member inside a container without extracting it:
//! `/vsizip/<archive path>/<member>`. Reading goes straight from the
//! archive stream into memory.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::archive::{open_tar_stream, ContainerKind};
use crate::error::{RasterIoError, RasterIoResult};

/// Build the locator for `member` inside `archive`.
pub fn locator(kind: ContainerKind, archive: &Path, member: &str) -> String {
    format!("/vsi{}/{}/{}", kind.prefix(), archive.display(), member)
}

/// A parsed virtual file locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    pub kind: ContainerKind,
    pub archive: PathBuf,
    pub member: String,
}

impl VirtualPath {
    /// Parse a locator. Returns `None` for plain paths.
    ///
    /// The archive path is the longest `/`-delimited prefix that is an
    /// existing regular file, so member names may contain directories.
    pub fn parse(path: &str) -> Option<RasterIoResult<Self>> {
        let (kind, rest) = if let Some(rest) = path.strip_prefix("/vsizip/") {
            (ContainerKind::Zip, rest)
        } else if let Some(rest) = path.strip_prefix("/vsitar/") {
            (ContainerKind::Tar, rest)
        } else {
            return None;
        };

        let split = rest
            .match_indices('/')
            .map(|(i, _)| i)
            .rev()
            .find(|&i| i > 0 && Path::new(&rest[..i]).is_file());

        Some(match split {
            Some(i) if i + 1 < rest.len() => Ok(Self {
                kind,
                archive: PathBuf::from(&rest[..i]),
                member: rest[i + 1..].to_string(),
            }),
            _ => Err(RasterIoError::InvalidLocator(format!(
                "no existing archive in '{}'",
                path
            ))),
        })
    }

    /// Read the member into memory.
    pub fn read(&self) -> RasterIoResult<Vec<u8>> {
        match self.kind {
            ContainerKind::Zip => {
                let file = fs::File::open(&self.archive)?;
                let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))?;
                let mut member = archive.by_name(&self.member)?;
                let mut buf = Vec::new();
                member.read_to_end(&mut buf)?;
                Ok(buf)
            }
            ContainerKind::Tar => {
                let mut archive = tar::Archive::new(open_tar_stream(&self.archive)?);
                for entry in archive.entries()? {
                    let mut entry = entry?;
                    if entry.path()?.to_string_lossy() == self.member.as_str() {
                        let mut buf = Vec::new();
                        entry.read_to_end(&mut buf)?;
                        return Ok(buf);
                    }
                }
                Err(RasterIoError::Archive(format!(
                    "member '{}' not found in {}",
                    self.member,
                    self.archive.display()
                )))
            }
        }
    }

    pub fn to_locator(&self) -> String {
        locator(self.kind, &self.archive, &self.member)
    }
}

/// Read a plain file or an archive member.
pub fn read_source(path: &str) -> RasterIoResult<Vec<u8>> {
    match VirtualPath::parse(path) {
        Some(vpath) => vpath?.read(),
        None => Ok(fs::read(path)?),
    }
}

/// Last path component of a plain path or locator.
pub fn file_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}
