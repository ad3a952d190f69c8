use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::db;
use crate::models::StudentRecord;
use crate::sample;

/// Name of the single slot that holds the serialized collection.
pub const STUDENTS_SLOT: &str = "students";

/// Key-value backend holding one JSON blob per named slot.
pub enum Repository {
    File { dir: PathBuf },
    Postgres(PgPool),
}

impl Repository {
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Repository::File { dir: dir.into() }
    }

    fn slot_path(dir: &std::path::Path, slot: &str) -> PathBuf {
        dir.join(format!("{slot}.json"))
    }

    pub fn describe(&self) -> String {
        match self {
            Repository::File { dir } => format!("file store at {}", dir.display()),
            Repository::Postgres(_) => "postgres store".to_string(),
        }
    }

    pub async fn read(&self, slot: &str) -> anyhow::Result<Option<String>> {
        match self {
            Repository::File { dir } => {
                let path = Self::slot_path(dir, slot);
                match tokio::fs::read_to_string(&path).await {
                    Ok(contents) => Ok(Some(contents)),
                    Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                    Err(err) => {
                        Err(err).with_context(|| format!("failed to read {}", path.display()))
                    }
                }
            }
            Repository::Postgres(pool) => db::read_slot(pool, slot).await,
        }
    }

    pub async fn write(&self, slot: &str, payload: &str) -> anyhow::Result<()> {
        match self {
            Repository::File { dir } => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                let path = Self::slot_path(dir, slot);
                let staging = path.with_extension("json.tmp");
                tokio::fs::write(&staging, payload)
                    .await
                    .with_context(|| format!("failed to write {}", staging.display()))?;
                tokio::fs::rename(&staging, &path)
                    .await
                    .with_context(|| format!("failed to replace {}", path.display()))?;
                Ok(())
            }
            Repository::Postgres(pool) => db::write_slot(pool, slot, payload).await,
        }
    }
}

/// The in-memory collection plus the repository it is loaded from and saved to.
/// Nothing is persisted until [`StudentStore::save`] is called.
pub struct StudentStore {
    repository: Repository,
    students: Vec<StudentRecord>,
    from_sample: bool,
}

impl StudentStore {
    pub async fn load(repository: Repository) -> anyhow::Result<Self> {
        let payload = repository.read(STUDENTS_SLOT).await?;
        let (students, from_sample) = match decode(payload.as_deref()) {
            Some(students) => (students, false),
            None => (sample::generate(&mut rand::thread_rng()), true),
        };
        info!(
            students = students.len(),
            source = %repository.describe(),
            from_sample,
            "student collection loaded"
        );
        Ok(Self {
            repository,
            students,
            from_sample,
        })
    }

    /// True when nothing usable was stored and the collection is a fresh,
    /// not yet saved sample.
    pub fn fell_back_to_sample(&self) -> bool {
        self.from_sample
    }

    pub async fn save(&mut self) -> anyhow::Result<()> {
        let payload =
            serde_json::to_string(&self.students).context("failed to encode student collection")?;
        self.repository.write(STUDENTS_SLOT, &payload).await?;
        self.from_sample = false;
        debug!(students = self.students.len(), "student collection saved");
        Ok(())
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    /// Looks a student up by ordinal id, falling back to roll number.
    pub fn find(&self, key: &str) -> Option<&StudentRecord> {
        let key = key.trim();
        self.students
            .iter()
            .find(|student| student.id == key)
            .or_else(|| {
                self.students
                    .iter()
                    .find(|student| student.student_id.eq_ignore_ascii_case(key))
            })
    }

    pub fn replace_all(&mut self, students: Vec<StudentRecord>) {
        self.students = students;
    }

    pub fn reset_to_sample<R: Rng>(&mut self, rng: &mut R) {
        self.students = sample::generate(rng);
    }
}

/// Parses a persisted blob. `None` when the blob is missing or unreadable, in
/// which case the caller substitutes sample data.
pub fn decode(payload: Option<&str>) -> Option<Vec<StudentRecord>> {
    match payload {
        Some(contents) => match serde_json::from_str::<Vec<StudentRecord>>(contents) {
            Ok(students) => Some(students),
            Err(err) => {
                warn!(error = %err, "stored student collection is unreadable, using sample data");
                None
            }
        },
        None => {
            debug!("no stored student collection, using sample data");
            None
        }
    }
}
