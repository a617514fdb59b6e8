//! Directory-wide batch conversion.
//!
//! Every file is converted by its own job with its own mesh buffer; a
//! failing file is recorded and never stops its siblings.

use crate::error::{ConvertError, Result};
use crate::export::MeshFormat;
use crate::mesher::ConverterConfig;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Default input file pattern.
pub const DEFAULT_PATTERN: &str = "*.dxf";

/// Batch conversion settings.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub pattern: String,
    /// Search subdirectories too.
    pub recursive: bool,
    /// Write outputs here instead of next to each input.
    pub output_dir: Option<PathBuf>,
    pub format: MeshFormat,
    /// Leave inputs alone whose output already exists.
    pub skip_existing: bool,
    /// Worker threads; `None` uses [`default_workers`].
    pub workers: Option<usize>,
    pub config: ConverterConfig,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            recursive: true,
            output_dir: None,
            format: MeshFormat::Stl,
            skip_existing: false,
            workers: None,
            config: ConverterConfig::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    fn output_path_for(&self, input: &Path) -> PathBuf {
        output_path_for(input, self.output_dir.as_deref(), self.format)
    }
}

/// Outcome of one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub success: bool,
    pub error: Option<String>,
    pub elapsed_secs: f64,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Inputs found, including skipped ones.
    pub total: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
    pub results: Vec<FileResult>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|result| !result.success)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// CPU count minus one, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Find input files under `dir` matching `pattern`, sorted by path.
pub fn find_inputs(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::InputNotFound(dir.to_path_buf()));
    }

    let search = if recursive {
        dir.join("**").join(pattern)
    } else {
        dir.join(pattern)
    };
    let search = search.to_string_lossy();

    let entries = glob::glob(&search)
        .map_err(|e| ConvertError::Config(format!("Invalid pattern {}: {}", pattern, e)))?;

    let mut inputs = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => inputs.push(path),
            Ok(_) => {}
            Err(e) => warn!("Cannot read {}: {}", e.path().display(), e.error()),
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Where the mesh of `input` goes: next to it, or into `output_dir`.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>, format: MeshFormat) -> PathBuf {
    let output = input.with_extension(format.extension());
    match (output_dir, output.file_name()) {
        (Some(dir), Some(file_name)) => dir.join(file_name),
        _ => output,
    }
}

/// Whether `input` already has an output.
pub fn should_skip(input: &Path, output_dir: Option<&Path>, format: MeshFormat) -> bool {
    output_path_for(input, output_dir, format).exists()
}

/// Convert every matching file under the input directory.
pub fn batch_convert(options: &BatchOptions) -> Result<BatchReport> {
    let start = Instant::now();
    let mut inputs = find_inputs(&options.input_dir, &options.pattern, options.recursive)?;
    let total = inputs.len();
    info!("Found {} files matching {}", total, options.pattern);

    if options.skip_existing {
        inputs.retain(|input| !should_skip(input, options.output_dir.as_deref(), options.format));
        let skipped = total - inputs.len();
        if skipped > 0 {
            info!("Skipping {} files that already have outputs", skipped);
        }
    }

    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let workers = options.workers.unwrap_or_else(default_workers);
    if workers == 0 {
        return Err(ConvertError::Config("workers must be at least 1".to_string()));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ConvertError::Config(format!("Failed to build worker pool: {}", e)))?;
    info!("Using {} parallel workers", workers);

    let done = AtomicUsize::new(0);
    let pending = inputs.len();
    let results: Vec<FileResult> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let result = convert_one(input, options);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                let status = if result.success { "OK" } else { "FAIL" };
                info!("[{}/{}] {} {}", finished, pending, status, input.display());
                result
            })
            .collect()
    });

    let succeeded = results.iter().filter(|r| r.success).count();
    let report = BatchReport {
        total,
        skipped: total - pending,
        succeeded,
        failed: results.len() - succeeded,
        elapsed_secs: start.elapsed().as_secs_f64(),
        results,
    };

    info!(
        "Batch finished: {} succeeded, {} failed, {} skipped in {:.1}s",
        report.succeeded, report.failed, report.skipped, report.elapsed_secs
    );
    for failure in report.failures() {
        warn!(
            "Failed {}: {}",
            failure.input.display(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(report)
}

fn convert_one(input: &Path, options: &BatchOptions) -> FileResult {
    let start = Instant::now();
    let output = options.output_path_for(input);
    let outcome = crate::convert_file(input, Some(&output), &options.config);
    let elapsed_secs = start.elapsed().as_secs_f64();

    match outcome {
        Ok(output) => FileResult {
            input: input.to_path_buf(),
            output: Some(output),
            success: true,
            error: None,
            elapsed_secs,
        },
        Err(e) => FileResult {
            input: input.to_path_buf(),
            output: None,
            success: false,
            error: Some(e.to_string()),
            elapsed_secs,
        },
    }
}
