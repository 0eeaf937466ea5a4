//! Per-document orchestration and the sequential batch runner.
//!
//! One document flows identify -> extract -> normalize -> estimate ->
//! aggregate -> append, fully finished before the next begins. Every
//! failure is local: the document is skipped with a typed reason and the
//! batch continues.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{aggregate, estimate_screens};
use crate::document::Document;
use crate::extract::{self, ExtractorKind, VendorRules};
use crate::identify::identify_cinema;
use crate::normalize::normalize_rows;
use crate::reference::ReferenceTables;
use crate::rows::NormalizedTicketRow;
use crate::workbook;

/// Sheet receiving every normalized row before aggregation.
pub const RAW_SHEET: &str = "Raw Data";

/// Why a document produced no output. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("document unreadable: {0}")]
    Unreadable(String),
    #[error("no cinema match in header")]
    NoCinemaMatch,
    #[error("no extractor for exhibitor {0:?}")]
    NoExtractor(String),
    #[error("extractor produced no rows")]
    EmptyExtraction,
    #[error("extractor failed: {0}")]
    ExtractorFailed(#[source] anyhow::Error),
}

impl SkipReason {
    /// Stable label used in logs and batch stats.
    pub fn category(&self) -> &'static str {
        match self {
            SkipReason::Unreadable(_) => "unreadable",
            SkipReason::NoCinemaMatch => "no_cinema_match",
            SkipReason::NoExtractor(_) => "no_extractor",
            SkipReason::EmptyExtraction => "empty_extraction",
            SkipReason::ExtractorFailed(_) => "extractor_failed",
        }
    }
}

/// Outcome of one document.
#[derive(Debug)]
pub enum DocumentOutcome {
    Processed { rows: usize },
    Skipped(SkipReason),
}

/// Counters reported at the end of a batch.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub processed: usize,
    pub rows: usize,
    pub unreadable: usize,
    pub no_cinema_match: usize,
    pub no_extractor: usize,
    pub empty_extraction: usize,
    pub extractor_failed: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Processed { rows } => {
                self.processed += 1;
                self.rows += rows;
            }
            DocumentOutcome::Skipped(reason) => match reason {
                SkipReason::Unreadable(_) => self.unreadable += 1,
                SkipReason::NoCinemaMatch => self.no_cinema_match += 1,
                SkipReason::NoExtractor(_) => self.no_extractor += 1,
                SkipReason::EmptyExtraction => self.empty_extraction += 1,
                SkipReason::ExtractorFailed(_) => self.extractor_failed += 1,
            },
        }
    }

    pub fn skipped(&self) -> usize {
        self.unreadable
            + self.no_cinema_match
            + self.no_extractor
            + self.empty_extraction
            + self.extractor_failed
    }
}

/// Classify and normalize one document without touching the workbook.
/// This is the whole read side of the pipeline; `process_document` adds
/// the write side.
pub fn extract_document(
    path: &Path,
    tables: &ReferenceTables,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<NormalizedTicketRow>, SkipReason> {
    let doc = Document::load(path)?;

    let matched = identify_cinema(&doc, &tables.cinema_mapping).ok_or(SkipReason::NoCinemaMatch)?;
    let exhibitor = matched.entry.exhibitor.clone();
    let kind = ExtractorKind::for_exhibitor(&exhibitor)
        .ok_or_else(|| SkipReason::NoExtractor(exhibitor.clone()))?;

    let raw = extract::run(kind, &doc, &exhibitor, rules, extracted_at)
        .map_err(SkipReason::ExtractorFailed)?;
    if raw.is_empty() {
        return Err(SkipReason::EmptyExtraction);
    }
    info!(
        file = %doc.file_name(),
        extractor = kind.name(),
        rows = raw.len(),
        "extracted"
    );

    let mut rows = normalize_rows(raw, matched.entry, tables);
    estimate_screens(&mut rows);
    Ok(rows)
}

/// Run one document end to end, appending its raw rows and its four
/// aggregate tables to the destination workbook.
pub fn process_document(
    path: &Path,
    workbook_path: &Path,
    tables: &ReferenceTables,
    rules: &VendorRules,
    extracted_at: &str,
) -> DocumentOutcome {
    let rows = match extract_document(path, tables, rules, extracted_at) {
        Ok(rows) => rows,
        Err(reason) => return DocumentOutcome::Skipped(reason),
    };

    let raw_cells: Vec<Vec<String>> = rows.iter().map(|r| r.raw_sheet_cells()).collect();
    if let Err(e) = workbook::append_rows(workbook_path, RAW_SHEET, &raw_cells) {
        return DocumentOutcome::Skipped(SkipReason::ExtractorFailed(e));
    }

    let tables_out = aggregate(&rows);
    for (bucket, agg_rows) in tables_out.buckets() {
        let cells: Vec<Vec<String>> = agg_rows.iter().map(|r| r.sheet_cells()).collect();
        if let Err(e) = workbook::append_rows(workbook_path, bucket.sheet_name(), &cells) {
            return DocumentOutcome::Skipped(SkipReason::ExtractorFailed(e));
        }
    }

    DocumentOutcome::Processed { rows: rows.len() }
}

/// Sequential batch run over many documents against one workbook. The
/// workbook is reopened and re-saved per sheet write; nothing is held in
/// memory across documents.
pub fn run_batch(documents: &[PathBuf], workbook_path: &Path) -> Result<BatchStats> {
    let tables = ReferenceTables::load(workbook_path)?;
    let rules = VendorRules::default();
    let extracted_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut stats = BatchStats::default();
    for path in documents {
        bar.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let outcome = process_document(path, workbook_path, &tables, &rules, &extracted_at);
        if let DocumentOutcome::Skipped(reason) = &outcome {
            warn!(file = %path.display(), category = reason.category(), %reason, "skipped");
        }
        stats.record(&outcome);
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        processed = stats.processed,
        rows = stats.rows,
        skipped = stats.skipped(),
        "batch finished"
    );
    Ok(stats)
}
