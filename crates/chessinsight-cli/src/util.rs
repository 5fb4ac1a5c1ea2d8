use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chessinsight_analysis::{
    config::AnalysisConfig,
    extract::{self, ExtractionReport},
    record::RawArchive,
    store::RowStore,
};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a game archive, either a bare list of games or a `{"games": [...]}` object
pub fn read_archive_file<P>(path: P) -> anyhow::Result<RawArchive>
where
    P: AsRef<Path>,
{
    read_json_file::<RawArchive, _>("game archive", path)
}

/// Read a previously written row table
pub fn read_rows_file<P>(path: P) -> anyhow::Result<RowStore>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let store = RowStore::load(path)
        .with_context(|| format!("Failed to load row table: {}", path.display()))?;
    tracing::info!(rows = store.len(), path = %path.display(), "loaded row table");
    Ok(store)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A `.csv` row table
    RowTable,
    /// Anything else, read as a JSON game archive
    Archive,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        let is_table = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_table {
            InputKind::RowTable
        } else {
            InputKind::Archive
        }
    }

    /// Whether the configured time-class filter has no effect on this input.
    ///
    /// Row tables carry no time class, so the filter only applies while
    /// extracting from an archive.
    pub fn ignores_time_class(self, config: &AnalysisConfig) -> bool {
        self == InputKind::RowTable && config.time_class.is_some()
    }
}

/// Load rows from a `.csv` row table, or extract them from any other (JSON) archive
///
/// The extraction counts are returned only when rows were extracted.
pub fn load_rows<P>(
    path: P,
    config: &AnalysisConfig,
) -> anyhow::Result<(RowStore, Option<ExtractionReport>)>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let kind = InputKind::of(path);
    if kind.ignores_time_class(config) {
        tracing::warn!(
            time_class = config.time_class.as_deref().unwrap_or_default(),
            path = %path.display(),
            "time class filter is ignored for row tables; filter while normalizing instead"
        );
    }

    match kind {
        InputKind::RowTable => Ok((read_rows_file(path)?, None)),
        InputKind::Archive => {
            let archive = read_archive_file(path)?;
            let (store, report) = extract::extract_archive(&archive, config);
            Ok((store, Some(report)))
        }
    }
}
