//! Two-phase artifact emission.
//!
//! Build systems decide what to recompile from modification times, so an
//! artifact whose text did not change must keep its timestamp.
//!
//! - **Phase 1** ([`commit_provisional`]) writes each module's text to
//!   `<OutputDir>/<Module>.Mvvm.gen.keep`. A provisional file whose content is
//!   already identical is not touched.
//! - **Phase 2** ([`ProvisionalBatch::promote`]) copies every provisional file
//!   to its `.cpp` path and gives the copy the provisional file's
//!   modification time. A final file with identical content and the same
//!   modification time is skipped.
//!
//! A [`ProvisionalBatch`] is only produced once every module committed, so
//! phase 2 cannot start before phase 1 finished for all modules.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use mvvmgen_core::EmitError;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::passes::ModuleArtifact;

/// Extension of phase 1 output.
pub const PROVISIONAL_EXTENSION: &str = "keep";

/// Extension of phase 2 output.
pub const FINAL_EXTENSION: &str = "cpp";

const ARTIFACT_STEM_SUFFIX: &str = ".Mvvm.gen";

/// `<output_dir>/<module>.Mvvm.gen.keep`
pub fn provisional_path(output_dir: &Path, module: &str) -> PathBuf {
    output_dir.join(format!(
        "{module}{ARTIFACT_STEM_SUFFIX}.{PROVISIONAL_EXTENSION}"
    ))
}

/// The final path of a provisional artifact (`.keep` replaced by `.cpp`).
pub fn final_path(provisional: &Path) -> Result<PathBuf, EmitError> {
    match provisional.extension() {
        Some(ext) if ext == PROVISIONAL_EXTENSION => {
            Ok(provisional.with_extension(FINAL_EXTENSION))
        }
        _ => Err(EmitError::NotProvisional(provisional.to_path_buf())),
    }
}

/// What emission did with one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// A provisional artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalCommit {
    pub module: String,
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// A final artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalArtifact {
    pub module: String,
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// Proof that phase 1 completed for every module.
#[derive(Debug)]
#[must_use = "phase 2 only runs through ProvisionalBatch::promote"]
pub struct ProvisionalBatch {
    commits: Vec<ProvisionalCommit>,
}

/// Phase 1: write every artifact to its provisional path.
///
/// Any I/O failure aborts the pass.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn commit_provisional(artifacts: &[ModuleArtifact]) -> Result<ProvisionalBatch, EmitError> {
    let commits = artifacts
        .par_iter()
        .map(commit_one)
        .collect::<Result<Vec<_>, _>>()?;

    let written = commits
        .iter()
        .filter(|c| c.status == WriteStatus::Written)
        .count();
    info!(modules = commits.len(), written, "provisional artifacts committed");

    Ok(ProvisionalBatch { commits })
}

fn commit_one(artifact: &ModuleArtifact) -> Result<ProvisionalCommit, EmitError> {
    let path = &artifact.provisional_path;
    let status = if has_content(path, artifact.content.as_bytes())? {
        WriteStatus::Unchanged
    } else {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| EmitError::io("create directory", dir, e))?;
        }
        fs::write(path, &artifact.content).map_err(|e| EmitError::io("write", path, e))?;
        WriteStatus::Written
    };
    debug!(module = %artifact.module, path = %path.display(), ?status, "provisional artifact");

    Ok(ProvisionalCommit {
        module: artifact.module.clone(),
        path: path.clone(),
        status,
    })
}

impl ProvisionalBatch {
    pub fn commits(&self) -> &[ProvisionalCommit] {
        &self.commits
    }

    /// Phase 2: copy provisional files to their final paths, preserving the
    /// provisional modification time.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn promote(self) -> Result<Vec<FinalArtifact>, EmitError> {
        let finals = self
            .commits
            .par_iter()
            .map(promote_one)
            .collect::<Result<Vec<_>, _>>()?;

        let written = finals
            .iter()
            .filter(|f| f.status == WriteStatus::Written)
            .count();
        info!(modules = finals.len(), written, "final artifacts promoted");
        Ok(finals)
    }
}

fn promote_one(commit: &ProvisionalCommit) -> Result<FinalArtifact, EmitError> {
    let source = &commit.path;
    let target = final_path(source)?;
    let modified = modified_time(source)?;

    let up_to_date = target.exists() && {
        let provisional = fs::read(source).map_err(|e| EmitError::io("read", source, e))?;
        has_content(&target, &provisional)? && modified_time(&target)? == modified
    };

    let status = if up_to_date {
        WriteStatus::Unchanged
    } else {
        fs::copy(source, &target).map_err(|e| EmitError::io("copy", &target, e))?;
        File::options()
            .write(true)
            .open(&target)
            .and_then(|file| file.set_modified(modified))
            .map_err(|e| EmitError::io("set modification time of", &target, e))?;
        WriteStatus::Written
    };
    debug!(module = %commit.module, path = %target.display(), ?status, "final artifact");

    Ok(FinalArtifact {
        module: commit.module.clone(),
        path: target,
        status,
    })
}

/// Whether `path` exists with exactly `content`.
fn has_content(path: &Path, content: &[u8]) -> Result<bool, EmitError> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(EmitError::io("read", path, e)),
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, EmitError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| EmitError::io("stat", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvvmgen_registry::RegistrationTable;
    use std::time::Duration;

    fn artifact(dir: &Path, module: &str, content: &str) -> ModuleArtifact {
        ModuleArtifact {
            module: module.to_string(),
            provisional_path: provisional_path(dir, module),
            content: content.to_string(),
            table: RegistrationTable::new(module),
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn old_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000)
    }

    #[test]
    fn paths() {
        let keep = provisional_path(Path::new("/out"), "Game");
        assert_eq!(keep, Path::new("/out/Game.Mvvm.gen.keep"));
        assert_eq!(final_path(&keep).unwrap(), Path::new("/out/Game.Mvvm.gen.cpp"));
        assert!(matches!(
            final_path(Path::new("/out/Game.cpp")),
            Err(EmitError::NotProvisional(_))
        ));
    }

    #[test]
    fn two_phases_write_both_files_with_same_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Intermediate");
        let artifacts = [artifact(&out, "Game", "one\n")];

        let batch = commit_provisional(&artifacts).unwrap();
        assert_eq!(batch.commits()[0].status, WriteStatus::Written);
        let finals = batch.promote().unwrap();

        let cpp = out.join("Game.Mvvm.gen.cpp");
        assert_eq!(finals[0].path, cpp);
        assert_eq!(fs::read_to_string(&cpp).unwrap(), "one\n");
        assert_eq!(
            modified_time(&cpp).unwrap(),
            modified_time(&artifacts[0].provisional_path).unwrap()
        );
    }

    #[test]
    fn unchanged_rerun_preserves_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = [artifact(dir.path(), "Game", "same\n")];
        commit_provisional(&artifacts).unwrap().promote().unwrap();

        let keep = &artifacts[0].provisional_path;
        set_mtime(keep, old_time());
        commit_provisional(&artifacts).unwrap().promote().unwrap();
        let cpp = final_path(keep).unwrap();
        assert_eq!(modified_time(&cpp).unwrap(), old_time());

        let batch = commit_provisional(&artifacts).unwrap();
        assert_eq!(batch.commits()[0].status, WriteStatus::Unchanged);
        let finals = batch.promote().unwrap();
        assert_eq!(finals[0].status, WriteStatus::Unchanged);
        assert_eq!(modified_time(keep).unwrap(), old_time());
        assert_eq!(modified_time(&cpp).unwrap(), old_time());
    }

    #[test]
    fn changed_content_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        commit_provisional(&[artifact(dir.path(), "Game", "old\n")])
            .unwrap()
            .promote()
            .unwrap();

        let batch = commit_provisional(&[artifact(dir.path(), "Game", "new\n")]).unwrap();
        assert_eq!(batch.commits()[0].status, WriteStatus::Written);
        let finals = batch.promote().unwrap();
        assert_eq!(finals[0].status, WriteStatus::Written);
        assert_eq!(fs::read_to_string(&finals[0].path).unwrap(), "new\n");
    }

    #[test]
    fn stale_final_timestamp_is_restamped() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = [artifact(dir.path(), "Game", "text\n")];
        commit_provisional(&artifacts).unwrap().promote().unwrap();

        let cpp = dir.path().join("Game.Mvvm.gen.cpp");
        set_mtime(&cpp, old_time());
        let finals = commit_provisional(&artifacts).unwrap().promote().unwrap();
        assert_eq!(finals[0].status, WriteStatus::Written);
        assert_eq!(
            modified_time(&cpp).unwrap(),
            modified_time(&artifacts[0].provisional_path).unwrap()
        );
    }

    #[test]
    fn unwritable_output_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let artifacts = [artifact(&blocker.join("out"), "Game", "x\n")];
        assert!(matches!(
            commit_provisional(&artifacts),
            Err(EmitError::Io { .. })
        ));
    }
}
