//! On-disk artifact store
//!
//! One file per relaxation, `relaxation<fingerprint>.json`: a JSON header
//! line followed by the JSON payload. Unsolved artifacts are keyed by the
//! short fingerprint, solved ones by the full fingerprint.

use crate::error::{SdpError, SdpResult};
use crate::fingerprint::Fingerprints;
use crate::relaxation::{Relaxation, SolveStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version of the file layout; files with another version are ignored
pub const FORMAT_VERSION: u32 = 1;

const FILE_PREFIX: &str = "relaxation";
const FILE_SUFFIX: &str = ".json";

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// First line of every artifact file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format: u32,
    pub model: String,
    pub fingerprint: String,
    pub status: SolveStatus,
    pub saved_at: DateTime<Utc>,
    /// SHA-256 of the payload, hex encoded
    pub checksum: String,
}

/// Which fingerprint a load hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Full,
    Short,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// A relaxation read back from disk
#[derive(Debug)]
pub struct Loaded {
    pub relaxation: Relaxation,
    pub source: LoadSource,
    pub path: PathBuf,
}

/// Header of a stored file, for listings
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub path: PathBuf,
    pub header: ArtifactHeader,
    pub size_bytes: u64,
}

/// Why a lookup produced nothing
#[derive(Debug)]
enum Miss {
    Absent,
    Unreadable(io::Error),
    Truncated,
    Corrupt(String),
    Foreign(String),
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "no file"),
            Self::Unreadable(e) => write!(f, "unreadable: {}", e),
            Self::Truncated => write!(f, "truncated"),
            Self::Corrupt(reason) => write!(f, "corrupt: {}", reason),
            Self::Foreign(reason) => write!(f, "not usable here: {}", reason),
        }
    }
}

/// Directory of persisted relaxations
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact of `model` keyed by `fingerprint`
    pub fn artifact_path(&self, model: &str, fingerprint: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}{}{}", FILE_PREFIX, model, fingerprint, FILE_SUFFIX))
    }

    fn is_artifact(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
    }

    /// Persist `relaxation` under the fingerprint matching its status
    pub fn save(
        &self,
        model: &str,
        fingerprints: &Fingerprints,
        relaxation: &Relaxation,
    ) -> SdpResult<PathBuf> {
        let fingerprint = match relaxation.status() {
            SolveStatus::Solved => &fingerprints.full,
            SolveStatus::Unsolved => &fingerprints.short,
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| SdpError::io(format!("creating {}", self.dir.display()), e))?;

        let payload = serde_json::to_vec(relaxation)?;
        let header = ArtifactHeader {
            format: FORMAT_VERSION,
            model: model.to_string(),
            fingerprint: fingerprint.clone(),
            status: relaxation.status(),
            saved_at: Utc::now(),
            checksum: hex::encode(Sha256::digest(&payload)),
        };

        let mut contents = serde_json::to_vec(&header)?;
        contents.push(b'\n');
        contents.extend_from_slice(&payload);

        let path = self.artifact_path(model, fingerprint);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &contents)
            .map_err(|e| SdpError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| SdpError::io(format!("renaming to {}", path.display()), e))?;

        info!(
            "Saved {} relaxation to {} ({})",
            header.status,
            path.display(),
            format_bytes(contents.len() as u64)
        );
        Ok(path)
    }

    /// Find a stored relaxation, full fingerprint first
    ///
    /// Every failure is a miss: the caller falls back to recycling or
    /// rebuilding.
    pub fn load(&self, model: &str, fingerprints: &Fingerprints) -> Option<Loaded> {
        let mut candidates = vec![(&fingerprints.full, LoadSource::Full)];
        if fingerprints.short != fingerprints.full {
            candidates.push((&fingerprints.short, LoadSource::Short));
        }

        for (fingerprint, source) in candidates {
            let path = self.artifact_path(model, fingerprint);
            match Self::read(&path, model, fingerprint) {
                Ok(relaxation) => {
                    info!(
                        "Loaded {} relaxation from {} ({} fingerprint)",
                        relaxation.status(),
                        path.display(),
                        source
                    );
                    return Some(Loaded {
                        relaxation,
                        source,
                        path,
                    });
                }
                Err(Miss::Absent) => debug!("No artifact at {}", path.display()),
                Err(miss) => warn!("Ignoring artifact {}: {}", path.display(), miss),
            }
        }
        None
    }

    fn read(path: &Path, model: &str, fingerprint: &str) -> Result<Relaxation, Miss> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Miss::Absent,
            _ => Miss::Unreadable(e),
        })?;

        let split = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(Miss::Truncated)?;
        let (head, payload) = (&bytes[..split], &bytes[split + 1..]);

        let header: ArtifactHeader =
            serde_json::from_slice(head).map_err(|e| Miss::Corrupt(format!("header: {}", e)))?;
        if header.format != FORMAT_VERSION {
            return Err(Miss::Foreign(format!("format version {}", header.format)));
        }
        if header.model != model {
            return Err(Miss::Foreign(format!("written for model {}", header.model)));
        }
        if header.fingerprint != fingerprint {
            return Err(Miss::Foreign(format!("fingerprint {}", header.fingerprint)));
        }
        if payload.is_empty() {
            return Err(Miss::Truncated);
        }
        if hex::encode(Sha256::digest(payload)) != header.checksum {
            return Err(Miss::Corrupt("checksum mismatch".to_string()));
        }

        serde_json::from_slice(payload).map_err(|e| Miss::Corrupt(format!("payload: {}", e)))
    }

    fn read_header(path: &Path) -> SdpResult<ArtifactHeader> {
        let file =
            fs::File::open(path).map_err(|e| SdpError::io(format!("opening {}", path.display()), e))?;
        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .map_err(|e| SdpError::io(format!("reading {}", path.display()), e))?;
        Ok(serde_json::from_str(line.trim_end())?)
    }

    fn artifact_files(&self) -> SdpResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SdpError::io(format!("reading {}", self.dir.display()), e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| SdpError::io(format!("reading {}", self.dir.display()), e))?;
            let path = entry.path();
            if path.is_file() && Self::is_artifact(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Headers of all stored artifacts, newest first. Unreadable files are skipped.
    pub fn list(&self) -> SdpResult<Vec<StoredEntry>> {
        let mut entries = Vec::new();
        for path in self.artifact_files()? {
            match Self::read_header(&path) {
                Ok(header) => {
                    let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                    entries.push(StoredEntry {
                        path,
                        header,
                        size_bytes,
                    });
                }
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }
        entries.sort_by(|a, b| b.header.saved_at.cmp(&a.header.saved_at));
        Ok(entries)
    }

    /// Remove every artifact file. Returns the number removed.
    pub fn clear(&self) -> SdpResult<usize> {
        let files = self.artifact_files()?;
        for path in &files {
            fs::remove_file(path)
                .map_err(|e| SdpError::io(format!("removing {}", path.display()), e))?;
        }
        info!("Removed {} artifacts from {}", files.len(), self.dir.display());
        Ok(files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{bosonic_substitutions, Polynomial};
    use crate::relaxation::{ConstraintSet, MomentBlock, RelaxationLevel, Solution};
    use tempfile::TempDir;

    fn fingerprints() -> Fingerprints {
        Fingerprints {
            short: "_lat=2x1_level=1".to_string(),
            full: "_lat=2x1_mu=0_t=1_U=1_level=1".to_string(),
        }
    }

    fn relaxation() -> Relaxation {
        let subs = bosonic_substitutions(2);
        let block = MomentBlock::generate(
            vec![crate::algebra::Monomial::identity()],
            &subs,
        );
        let constraints = ConstraintSet {
            moment_inequalities: vec![Polynomial::constant(1.0) - Polynomial::total_number(0..2)],
            ..Default::default()
        };
        Relaxation::new(2, RelaxationLevel::Level(1), subs, vec![block], constraints)
    }

    fn solved() -> Relaxation {
        let mut relaxation = relaxation();
        relaxation.record_solution(Solution {
            primal: -2.0,
            dual: -2.0,
            x_mat: vec![vec![vec![1.0]]],
            y_mat: vec![vec![vec![0.0]]],
            moments: vec![],
        });
        relaxation
    }

    #[test]
    fn unsolved_round_trip_under_short() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("out"));
        let original = relaxation();

        let path = store.save("bose-hubbard", &fingerprints(), &original).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "relaxation-bose-hubbard_lat=2x1_level=1.json"
        );

        let loaded = store.load("bose-hubbard", &fingerprints()).unwrap();
        assert_eq!(loaded.source, LoadSource::Short);
        assert_eq!(loaded.relaxation.status(), SolveStatus::Unsolved);
        assert_eq!(
            loaded.relaxation.constraints().shape(),
            original.constraints().shape()
        );
        assert_eq!(loaded.relaxation, original);
    }

    #[test]
    fn full_checked_before_short() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.save("bose-hubbard", &fingerprints(), &relaxation()).unwrap();
        store.save("bose-hubbard", &fingerprints(), &solved()).unwrap();

        let loaded = store.load("bose-hubbard", &fingerprints()).unwrap();
        assert_eq!(loaded.source, LoadSource::Full);
        assert!(loaded.relaxation.is_solved());
        assert_eq!(loaded.relaxation.solution().unwrap().primal, -2.0);
    }

    #[test]
    fn missing_directory_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("never-created"));
        assert!(store.load("bose-hubbard", &fingerprints()).is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn truncated_file_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let path = store.save("bose-hubbard", &fingerprints(), &relaxation()).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(store.load("bose-hubbard", &fingerprints()).is_none());

        fs::write(&path, b"{\"format\":1").unwrap();
        assert!(store.load("bose-hubbard", &fingerprints()).is_none());
    }

    #[test]
    fn other_model_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.save("fermi-hubbard", &fingerprints(), &relaxation()).unwrap();
        assert!(store.load("bose-hubbard", &fingerprints()).is_none());

        // a file moved under another model's name fails the header check
        fs::rename(
            store.artifact_path("fermi-hubbard", &fingerprints().short),
            store.artifact_path("bose-hubbard", &fingerprints().short),
        )
        .unwrap();
        assert!(store.load("bose-hubbard", &fingerprints()).is_none());
    }

    #[test]
    fn models_on_same_lattice_keep_separate_files() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let bose = store.save("bose-hubbard", &fingerprints(), &relaxation()).unwrap();
        let fermi = store.save("fermi-hubbard", &fingerprints(), &relaxation()).unwrap();
        assert_ne!(bose, fermi);

        assert!(store.load("bose-hubbard", &fingerprints()).is_some());
        assert!(store.load("fermi-hubbard", &fingerprints()).is_some());
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn list_and_clear() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.save("bose-hubbard", &fingerprints(), &relaxation()).unwrap();
        store.save("bose-hubbard", &fingerprints(), &solved()).unwrap();
        fs::write(tmp.path().join("notes.txt"), "keep me").unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.header.status == SolveStatus::Solved));

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
        assert!(tmp.path().join("notes.txt").exists());
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024 * 3), "3.0 MB");
    }
}
