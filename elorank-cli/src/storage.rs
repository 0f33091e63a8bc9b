/// On-disk session state.
///
/// A state directory holds one `ratings_<count>.json` per finished session,
/// where `<count>` is the cumulative number of comparisons, plus a single
/// `expected_score_matrix.json` that is overwritten each time.
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use elorank_core::{ExpectedScoreMatrix, Item, RankChange, RankDelta, RatingStore};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const MATRIX_FILE: &str = "expected_score_matrix.json";
const SNAPSHOT_PREFIX: &str = "ratings_";
const SNAPSHOT_SUFFIX: &str = ".json";

/// One item as persisted, with its standing at the end of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub name: String,
    pub rating: f64,
    pub comparisons: usize,
    pub rank: usize,
    pub rank_change: RankChange,
    pub elo_change: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Items are stored in positional order so that matrix rows line up on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub comparisons: usize,
    pub items: Vec<SnapshotItem>,
}

impl Snapshot {
    /// Capture the store at the end of a session.
    pub fn from_store(store: &RatingStore, deltas: &[RankDelta], comparisons: usize) -> Self {
        let by_name: HashMap<&str, &RankDelta> = deltas.iter().map(|d| (d.name.as_str(), d)).collect();
        let items = store
            .items()
            .iter()
            .map(|item| {
                let delta = by_name.get(item.name.as_str());
                SnapshotItem {
                    name: item.name.clone(),
                    rating: item.rating,
                    comparisons: item.comparisons,
                    rank: delta.map_or(0, |d| d.rank),
                    rank_change: delta.map_or(RankChange::Unchanged, |d| d.rank_change),
                    elo_change: delta.map_or(0.0, |d| d.elo_change),
                    extra: item.extra.clone(),
                }
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            comparisons,
            items,
        }
    }

    /// Items ready to seed a new `RatingStore`, in stored order.
    pub fn to_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .map(|s| {
                let mut item = Item::with_comparisons(s.name.clone(), s.rating, s.comparisons);
                item.extra = s.extra.clone();
                item
            })
            .collect()
    }

    /// Items sorted by rank, for display.
    pub fn ranked(&self) -> Vec<&SnapshotItem> {
        let mut ranked: Vec<&SnapshotItem> = self.items.iter().collect();
        ranked.sort_by_key(|s| s.rank);
        ranked
    }
}

/// Matrix plus the item order its rows were written in and the comparison
/// count of the snapshot saved alongside it.
#[derive(Debug, Serialize, Deserialize)]
struct MatrixFile {
    comparisons: usize,
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

pub fn snapshot_file_name(comparisons: usize) -> String {
    format!("{SNAPSHOT_PREFIX}{comparisons}{SNAPSHOT_SUFFIX}")
}

fn parse_snapshot_count(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_SUFFIX)?
        .parse()
        .ok()
}

/// Path of the snapshot with the highest comparison count, if any.
pub fn find_latest_snapshot(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list state directory {}", dir.display()))?;

    let mut latest: Option<(usize, PathBuf)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list state directory {}", dir.display()))?;
        let file_name = entry.file_name();
        let Some(count) = file_name.to_str().and_then(parse_snapshot_count) else {
            continue;
        };
        if latest.as_ref().map_or(true, |(best, _)| count > *best) {
            latest = Some((count, entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot at {}", path.display()))?;

    let snapshot: Snapshot = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse snapshot at {}", path.display()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        anyhow::bail!("Unsupported snapshot version: {}", snapshot.version);
    }

    Ok(snapshot)
}

/// Load the persisted matrix for `names` after `comparisons` judgments, if one exists.
///
/// A matrix written for a different item list, or alongside a different
/// snapshot, is an error rather than something to rebuild quietly.
pub fn load_matrix(dir: &Path, names: &[String], comparisons: usize) -> Result<Option<ExpectedScoreMatrix>> {
    let path = dir.join(MATRIX_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(&path)
        .with_context(|| format!("Failed to open matrix at {}", path.display()))?;
    let stored: MatrixFile = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse matrix at {}", path.display()))?;

    if stored.names != names {
        anyhow::bail!(
            "Matrix at {} was saved for a different item list ({} items, expected {})",
            path.display(),
            stored.names.len(),
            names.len()
        );
    }

    if stored.comparisons != comparisons {
        anyhow::bail!(
            "Matrix at {} was saved after {} comparisons but the snapshot has {}",
            path.display(),
            stored.comparisons,
            comparisons
        );
    }

    let matrix = ExpectedScoreMatrix::from_rows(stored.rows, names.len())
        .with_context(|| format!("Invalid matrix at {}", path.display()))?;
    Ok(Some(matrix))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Write the matrix, then the snapshot. Returns the snapshot path.
///
/// A snapshot only appears once its matrix is on disk, so a failed save
/// leaves the previous snapshot as the latest one.
pub fn save_session(dir: &Path, store: &RatingStore, snapshot: &Snapshot) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create state directory at {}", dir.display()))?;

    let matrix = MatrixFile {
        comparisons: snapshot.comparisons,
        names: store.items().iter().map(|i| i.name.clone()).collect(),
        rows: store.matrix().to_rows(),
    };
    write_json_atomic(&dir.join(MATRIX_FILE), &matrix)?;

    let snapshot_path = dir.join(snapshot_file_name(snapshot.comparisons));
    write_json_atomic(&snapshot_path, snapshot)?;

    Ok(snapshot_path)
}
