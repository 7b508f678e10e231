//! Archive Prober: enumerate raster candidates inside zip and tar containers.
//!
//! Each container detector opens the file itself, lists its regular members
//! and closes it again before returning. A file may satisfy more than one
//! detector; every detector that succeeds contributes its members under its
//! own `/vsi<prefix>/` locator. Failures are never surfaced to the caller,
//! they only mean "not this kind of container".

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{RasterIoError, RasterIoResult};
use crate::vsi;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Kind of container a locator points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Zip,
    Tar,
}

impl ContainerKind {
    /// Prefix used in `/vsi<prefix>/` locators.
    pub fn prefix(&self) -> &'static str {
        match self {
            ContainerKind::Zip => "zip",
            ContainerKind::Tar => "tar",
        }
    }
}

type Detector = fn(&Path) -> RasterIoResult<Vec<String>>;

/// Detectors tried in order.
const DETECTORS: &[(ContainerKind, Detector)] = &[
    (ContainerKind::Zip, zip_members),
    (ContainerKind::Tar, tar_members),
];

/// List virtual locators of the members of `path` matching `pattern`.
///
/// `pattern = None` selects everything. Otherwise a member is selected when
/// it matches `pattern` as a shell glob or contains it as a substring.
/// Directories and AppleDouble files (`._*`) are never listed. A file that
/// is not a recognised container yields an empty list.
pub fn list_members(path: &Path, pattern: Option<&str>) -> Vec<String> {
    let filter = MemberFilter::new(pattern);
    container_members(path)
        .into_iter()
        .filter(|(_, member)| filter.matches(member))
        .map(|(kind, member)| vsi::locator(kind, path, &member))
        .collect()
}

/// Raw member names per container kind, before pattern filtering.
pub fn container_members(path: &Path) -> Vec<(ContainerKind, String)> {
    let mut members = Vec::new();
    for (kind, detect) in DETECTORS {
        match detect(path) {
            Ok(names) => {
                debug!(
                    path = %path.display(),
                    kind = kind.prefix(),
                    count = names.len(),
                    "Container detected"
                );
                members.extend(
                    names
                        .into_iter()
                        .filter(|name| !is_apple_double(name))
                        .map(|name| (*kind, name)),
                );
            }
            Err(e) => {
                debug!(path = %path.display(), kind = kind.prefix(), error = %e, "Not a container of this kind");
            }
        }
    }
    members
}

/// `._name` files are macOS resource forks, never raster data.
fn is_apple_double(member: &str) -> bool {
    member
        .rsplit('/')
        .next()
        .map(|name| name.starts_with("._"))
        .unwrap_or(false)
}

// ============================================================================
// Member selection
// ============================================================================

/// Glob-or-substring member filter.
#[derive(Debug, Clone)]
pub struct MemberFilter {
    raw: Option<String>,
    glob: Option<glob::Pattern>,
}

impl MemberFilter {
    pub fn new(pattern: Option<&str>) -> Self {
        let glob = pattern.and_then(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                debug!(pattern = p, error = %e, "Invalid glob, using substring match only");
                None
            }
        });
        Self {
            raw: pattern.map(str::to_string),
            glob,
        }
    }

    pub fn matches(&self, member: &str) -> bool {
        let Some(raw) = &self.raw else {
            return true;
        };
        self.glob.as_ref().map(|g| g.matches(member)).unwrap_or(false) || member.contains(raw.as_str())
    }
}

// ============================================================================
// Detectors
// ============================================================================

fn zip_members(path: &Path) -> RasterIoResult<Vec<String>> {
    let file = File::open(path)?;
    let archive = zip::ZipArchive::new(BufReader::new(file))?;
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_string)
        .collect();
    // file_names() iterates a hash map
    names.sort();
    Ok(names)
}

fn tar_members(path: &Path) -> RasterIoResult<Vec<String>> {
    let mut archive = tar::Archive::new(open_tar_stream(path)?);
    let mut names = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| RasterIoError::Archive(format!("tar: {}", e)))?
    {
        let entry = entry.map_err(|e| RasterIoError::Archive(format!("tar: {}", e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .map_err(|e| RasterIoError::Archive(format!("tar: {}", e)))?
            .to_string_lossy()
            .into_owned();
        names.push(name);
    }
    Ok(names)
}

/// Open a tar stream, transparently gunzipping `.tar.gz`/`.tgz`.
pub(crate) fn open_tar_stream(path: &Path) -> RasterIoResult<Box<dyn Read>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    let file = File::open(path)?;
    if n == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apple_double_basename() {
        assert!(is_apple_double("._foo.tif"));
        assert!(is_apple_double("dir/._foo.tif"));
        assert!(!is_apple_double("foo._tif"));
        assert!(!is_apple_double("dir._x/foo.tif"));
    }

    #[test]
    fn test_filter_glob_or_substring() {
        let filter = MemberFilter::new(Some("*.tif"));
        assert!(filter.matches("a/b/c.tif"));
        assert!(!filter.matches("c.txt"));

        let filter = MemberFilter::new(Some("band2"));
        assert!(filter.matches("scene_band2_x.tif"));
        assert!(!filter.matches("scene_band1.tif"));
    }

    #[test]
    fn test_filter_invalid_glob_falls_back_to_substring() {
        let filter = MemberFilter::new(Some("[abc"));
        assert!(filter.matches("x[abc.tif"));
        assert!(!filter.matches("a.tif"));
    }

    #[test]
    fn test_filter_none_matches_all() {
        assert!(MemberFilter::new(None).matches("anything"));
    }
}
