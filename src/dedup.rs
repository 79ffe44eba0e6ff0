// Exact-duplicate frame removal
//
// First occurrence of a fingerprint wins; later frames with the same
// fingerprint are deleted from disk. Comparison is byte equality via the
// file's BLAKE3 digest, not visual similarity.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::document::collect_images;
use crate::error::Result;
use crate::extract::FrameArtifact;
use crate::hash::{fingerprint_file, Fingerprint};
use crate::paths::parse_frame_timestamp;
use crate::timegrid::SampleTimestamp;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeduplicationResult {
    /// Input order preserved.
    pub survivors: Vec<FrameArtifact>,
    pub removed_count: usize,
}

/// Load a folder of previously captured frames in capture order.
///
/// The sample time comes from the filename; files without one use their position.
pub fn collect_frames(dir: &Path) -> Result<Vec<FrameArtifact>> {
    let frames = collect_images(dir)?
        .into_iter()
        .enumerate()
        .map(|(i, path)| {
            let timestamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_frame_timestamp)
                .unwrap_or_else(|| SampleTimestamp::from_secs(i as u64));
            FrameArtifact::new(timestamp, path)
        })
        .collect();

    Ok(frames)
}

/// Deduplicate frames by their file contents.
pub fn deduplicate(artifacts: Vec<FrameArtifact>) -> DeduplicationResult {
    deduplicate_with(artifacts, fingerprint_file)
}

/// Deduplicate with a caller-supplied fingerprint function.
///
/// Artifacts that already carry a fingerprint are not rehashed. A frame whose
/// fingerprint cannot be computed is kept. A duplicate whose file cannot be
/// deleted is kept as well, so `survivors.len() + removed_count` always equals
/// the input length.
pub fn deduplicate_with<F>(artifacts: Vec<FrameArtifact>, mut fingerprint: F) -> DeduplicationResult
where
    F: FnMut(&Path) -> Result<Fingerprint>,
{
    if artifacts.len() < 2 {
        return DeduplicationResult {
            survivors: artifacts,
            removed_count: 0,
        };
    }

    let mut first_seen: HashMap<Fingerprint, usize> = HashMap::with_capacity(artifacts.len());
    let mut survivors: Vec<FrameArtifact> = Vec::with_capacity(artifacts.len());
    let mut removed_count = 0;

    for mut artifact in artifacts {
        let fp = match artifact.fingerprint {
            Some(fp) => fp,
            None => match fingerprint(&artifact.path) {
                Ok(fp) => fp,
                Err(e) => {
                    log::warn!("Keeping {} unhashed: {}", artifact.path.display(), e);
                    survivors.push(artifact);
                    continue;
                }
            },
        };
        artifact.fingerprint = Some(fp);

        match first_seen.get(&fp) {
            Some(&idx) => {
                match std::fs::remove_file(&artifact.path) {
                    Ok(()) => {
                        log::debug!(
                            "Removed {} (same content as {})",
                            artifact.path.display(),
                            survivors[idx].path.display()
                        );
                        removed_count += 1;
                    }
                    Err(e) => {
                        log::warn!("Could not remove duplicate {}: {}", artifact.path.display(), e);
                        survivors.push(artifact);
                    }
                }
            }
            None => {
                first_seen.insert(fp, survivors.len());
                survivors.push(artifact);
            }
        }
    }

    DeduplicationResult {
        survivors,
        removed_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    use crate::error::ShotDeckError;

    /// Write frames with the given contents at 0, 4, 8, ... seconds.
    fn frames(dir: &TempDir, contents: &[&str]) -> Vec<FrameArtifact> {
        contents
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let secs = i as u64 * 4;
                let path = dir.path().join(format!("clip_{:04}s.png", secs));
                std::fs::write(&path, body).unwrap();
                FrameArtifact::new(SampleTimestamp::from_secs(secs), path)
            })
            .collect()
    }

    fn secs(artifacts: &[FrameArtifact]) -> Vec<u64> {
        artifacts.iter().map(|a| a.timestamp.secs()).collect()
    }

    #[test]
    fn test_later_duplicate_removed() {
        let dir = TempDir::new().unwrap();
        let input = frames(&dir, &["a", "b", "a"]);
        let removed_path = input[2].path.clone();

        let result = deduplicate(input);

        assert_eq!(result.removed_count, 1);
        assert_eq!(secs(&result.survivors), vec![0, 4]);
        assert!(!removed_path.exists());
        assert!(result.survivors.iter().all(|a| a.path.exists()));
    }

    #[test]
    fn test_adjacent_duplicates_keep_first() {
        let dir = TempDir::new().unwrap();
        let input = frames(&dir, &["same", "same", "same", "other", "same"]);

        let result = deduplicate(input);

        assert_eq!(result.removed_count, 3);
        assert_eq!(secs(&result.survivors), vec![0, 12]);
    }

    #[test]
    fn test_all_unique() {
        let dir = TempDir::new().unwrap();
        let result = deduplicate(frames(&dir, &["a", "b", "c"]));
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.survivors.len(), 3);
        assert!(result.survivors.iter().all(|a| a.fingerprint.is_some()));
    }

    #[test]
    fn test_short_input_skips_hashing() {
        let dir = TempDir::new().unwrap();
        let calls = Cell::new(0);
        let counting = |p: &Path| {
            calls.set(calls.get() + 1);
            fingerprint_file(p)
        };

        let result = deduplicate_with(frames(&dir, &["only"]), counting);
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.survivors.len(), 1);
        assert_eq!(calls.get(), 0);

        let empty = deduplicate(Vec::new());
        assert!(empty.survivors.is_empty());
        assert_eq!(empty.removed_count, 0);
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        let first = deduplicate(frames(&dir, &["a", "a", "b", "c", "b"]));
        assert_eq!(first.removed_count, 2);

        let second = deduplicate(first.survivors.clone());
        assert_eq!(second.removed_count, 0);
        assert_eq!(second.survivors, first.survivors);
    }

    #[test]
    fn test_counts_and_order_hold() {
        let dir = TempDir::new().unwrap();
        let patterns: [&[&str]; 4] = [
            &["x", "y", "x", "y", "z"],
            &["q", "q"],
            &["1", "2", "3", "4"],
            &["m", "n", "m", "m", "n", "o", "o"],
        ];

        for (n, pattern) in patterns.iter().enumerate() {
            let sub = TempDir::new_in(dir.path()).unwrap();
            let input = frames(&sub, pattern);
            let input_secs = secs(&input);
            let len = input.len();

            let result = deduplicate(input);
            assert_eq!(result.survivors.len() + result.removed_count, len, "pattern {}", n);

            // Survivors are an ordered subsequence of the input
            let mut rest = input_secs.iter();
            for s in secs(&result.survivors) {
                assert!(rest.any(|x| *x == s), "pattern {} lost order", n);
            }
        }
    }

    #[test]
    fn test_unreadable_frame_is_kept() {
        let dir = TempDir::new().unwrap();
        let mut input = frames(&dir, &["a", "a", "b"]);
        // Points at nothing, so hashing fails
        input[1].path = dir.path().join("vanished.png");

        let result = deduplicate(input);

        assert_eq!(result.removed_count, 0);
        assert_eq!(result.survivors.len(), 3);
        assert!(result.survivors[1].fingerprint.is_none());
    }

    #[test]
    fn test_injected_fingerprint_failure_continues() {
        let dir = TempDir::new().unwrap();
        let input = frames(&dir, &["a", "b", "a", "a"]);
        let flaky = input[2].path.clone();

        let result = deduplicate_with(input, |p: &Path| {
            if p == flaky {
                Err(ShotDeckError::Hash("read failed".into()))
            } else {
                fingerprint_file(p)
            }
        });

        assert_eq!(result.removed_count, 1);
        assert_eq!(secs(&result.survivors), vec![0, 4, 8]);
        assert!(flaky.exists());
    }

    #[test]
    fn test_cached_fingerprint_reused() {
        let dir = TempDir::new().unwrap();
        let mut input = frames(&dir, &["a", "b"]);
        input[1].fingerprint = Some(crate::hash::fingerprint_bytes(b"a"));

        let calls = Cell::new(0);

        let result = deduplicate_with(input, |p: &Path| {
            calls.set(calls.get() + 1);
            fingerprint_file(p)
        });

        // Cached digest says the second frame equals the first
        assert_eq!(calls.get(), 1);
        assert_eq!(result.removed_count, 1);
        assert_eq!(secs(&result.survivors), vec![0]);
    }

    #[test]
    fn test_folder_past_four_digit_labels_keeps_earliest() {
        let dir = TempDir::new().unwrap();
        let early = dir.path().join("v_9995s.png");
        let late = dir.path().join("v_10000s.png");
        std::fs::write(&early, b"same").unwrap();
        std::fs::write(&late, b"same").unwrap();

        let frames = collect_frames(dir.path()).unwrap();
        assert_eq!(secs(&frames), vec![9995, 10000]);

        let result = deduplicate(frames);

        assert_eq!(result.removed_count, 1);
        assert_eq!(secs(&result.survivors), vec![9995]);
        assert!(early.exists());
        assert!(!late.exists());
    }

    #[test]
    fn test_collect_frames_without_timestamps_uses_position() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"1").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"2").unwrap();

        let frames = collect_frames(dir.path()).unwrap();
        assert_eq!(secs(&frames), vec![0, 1]);
    }

    #[test]
    fn test_failed_delete_keeps_artifact() {
        let dir = TempDir::new().unwrap();
        let mut input = frames(&dir, &["a", "b"]);
        // A directory cannot be removed with remove_file
        let stuck = dir.path().join("stuck_0004s.png");
        std::fs::create_dir(&stuck).unwrap();
        input[1].path = stuck.clone();
        input[1].fingerprint = Some(crate::hash::fingerprint_bytes(b"a"));

        let result = deduplicate(input);

        assert_eq!(result.removed_count, 0);
        assert_eq!(result.survivors.len(), 2);
        assert!(stuck.exists());
    }
}
