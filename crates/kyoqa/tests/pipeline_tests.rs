//! Per-document pipeline behavior against generated PDFs.

mod common;

use common::*;
use kyoqa::pipeline::{NoopProgress, Phase, ProgressEvent};
use kyoqa::worker::DocumentJob;
use kyoqa::{PatternSet, ProcessingStatus, ResultCache};

const BULLETIN: &str =
    "Service bulletin for the TASKalfa 8000i main unit. Replace the fuser after 300k pages.";
const GENERAL: &str =
    "General maintenance advice for all office devices. Nothing model specific in here.";

#[test]
fn test_embedded_text_model_is_harvested() {
    let harness = TestHarness::new();
    let pdf = harness.input("bulletin.pdf");
    text_pdf(&pdf, &[BULLETIN]);

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.models, "TASKalfa 8000i");
    assert!(!result.ocr_used);
    assert!(result.failure_reason.is_empty());
}

#[test]
fn test_encrypted_pdf_is_protected_without_extraction() {
    let harness = TestHarness::new();
    let pdf = harness.input("locked.pdf");
    encrypted_pdf(&pdf);

    let result = harness
        .pipeline()
        .process(&DocumentJob::new(pdf.clone()), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::Protected);
    assert_eq!(harness.text_calls(), 0);
    assert!(!result.failure_reason.is_empty());

    let cached = harness.cache().get(&ResultCache::fingerprint(&pdf)).unwrap();
    assert_eq!(cached.status, ProcessingStatus::Protected);
    assert!(cached.author.is_empty());
    assert!(cached.tracking_numbers.is_empty());
}

#[test]
fn test_no_text_and_no_ocr_is_ocr_failed() {
    let harness = TestHarness::new();
    let pdf = harness.input("scan.pdf");
    blank_pdf(&pdf);

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::OcrFailed);
    assert!(result.failure_reason.contains("not available"));
}

#[test]
fn test_ocr_fallback_reads_scanned_page() {
    let harness = TestHarness::with_ocr_text("Scanned notice for ECOSYS M2040dn units, SB-4471");
    let pdf = harness.input("scan.pdf");
    blank_pdf(&pdf);
    let progress = RecordingProgress::default();

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &progress);

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.models, "ECOSYS M2040dn");
    assert_eq!(result.tracking_numbers, "SB-4471");
    assert!(result.ocr_used);

    let events = progress.events();
    assert!(events.contains(&ProgressEvent::OcrUsed));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Status { phase: Phase::Ocr, .. })));
}

#[test]
fn test_ocr_with_too_little_text_is_no_text_found() {
    let harness = TestHarness::with_ocr_text("~ ~");
    let pdf = harness.input("scan.pdf");
    blank_pdf(&pdf);

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::NoTextFound);
    assert!(result.ocr_used);
}

#[test]
fn test_no_models_needs_review_with_side_file() {
    let harness = TestHarness::new();
    let pdf = harness.input("general.pdf");
    text_pdf(&pdf, &[GENERAL]);
    let progress = RecordingProgress::default();

    let result = harness.pipeline().process(&DocumentJob::new(pdf.clone()), &progress);

    assert_eq!(result.status, ProcessingStatus::NeedsReview);
    assert_eq!(result.models, kyoqa::NOT_FOUND);
    let review = result.review_info.clone().unwrap();
    assert!(review.extracted_text_path.is_absolute());
    assert!(review.source_pdf_path.ends_with("general.pdf"));
    let saved = std::fs::read_to_string(&review.extracted_text_path).unwrap();
    assert!(saved.contains("General maintenance advice"));
    assert!(progress
        .events()
        .contains(&ProgressEvent::ReviewItem(review)));
}

#[test]
fn test_second_run_is_an_identical_cache_hit() {
    let harness = TestHarness::new();
    let pdf = harness.input("bulletin.pdf");
    text_pdf(&pdf, &[BULLETIN]);
    let pipeline = harness.pipeline();
    let entry = harness.cache().entry_path(&ResultCache::fingerprint(&pdf));

    let first = pipeline.process(&DocumentJob::new(pdf.clone()), &NoopProgress);
    let bytes_after_first = std::fs::read(&entry).unwrap();
    let second = pipeline.process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(first, second);
    assert_eq!(harness.text_calls(), 1);
    assert_eq!(std::fs::read(&entry).unwrap(), bytes_after_first);
}

#[test]
fn test_ignore_cache_bypasses_stale_entry() {
    let harness = TestHarness::new();
    let pdf = harness.input("bulletin.pdf");
    text_pdf(&pdf, &[BULLETIN]);
    let stale = kyoqa::DocumentResult::failure(
        "bulletin.pdf",
        ProcessingStatus::Corrupted,
        "stale entry",
        false,
    );
    harness
        .cache()
        .put(&ResultCache::fingerprint(&pdf), &stale)
        .unwrap();
    let pipeline = harness.pipeline();

    let cached = pipeline.process(&DocumentJob::new(pdf.clone()), &NoopProgress);
    let fresh = pipeline.process(&DocumentJob::new(pdf).ignoring_cache(true), &NoopProgress);

    assert_eq!(cached.status, ProcessingStatus::Corrupted);
    assert_eq!(fresh.status, ProcessingStatus::Success);
}

#[test]
fn test_excluded_matches_never_reported() {
    let harness = TestHarness::new();
    let mut patterns = PatternSet::seed();
    patterns.model_patterns.push(r"\bTK-\d+\b".to_string());
    harness.pattern_store().save(&patterns).unwrap();

    let pdf = harness.input("advisory.pdf");
    text_pdf(
        &pdf,
        &["Toner TK-5240 advisory for the ECOSYS M5526cdw, see QA-CVE-2024-0001 and QA-7781."],
    );

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.models, "ECOSYS M5526cdw");
    assert!(!result.models.contains("TK-"));
    assert_eq!(result.tracking_numbers, "QA-7781");
}

#[test]
fn test_pattern_edits_apply_to_next_document() {
    let harness = TestHarness::new();
    let pipeline = harness.pipeline();
    let first = harness.input("first.pdf");
    let second = harness.input("second.pdf");
    let text = "Firmware advisory for the LS-4200 desk printer series, all regions affected.";
    text_pdf(&first, &[text]);
    text_pdf(&second, &[text]);

    let before = pipeline.process(&DocumentJob::new(first), &NoopProgress);

    let store = harness.pattern_store();
    let mut patterns = store.load();
    patterns.model_patterns.push(r"\bLS-\d+\b".to_string());
    store.save(&patterns).unwrap();
    let after = pipeline.process(&DocumentJob::new(second), &NoopProgress);

    assert_eq!(before.status, ProcessingStatus::NeedsReview);
    assert_eq!(after.status, ProcessingStatus::Success);
    assert_eq!(after.models, "LS-4200");
}

#[test]
fn test_garbage_file_is_corrupted() {
    let harness = TestHarness::new();
    let pdf = harness.input("broken.pdf");
    std::fs::write(&pdf, b"this was never a pdf").unwrap();

    let result = harness.pipeline().process(&DocumentJob::new(pdf), &NoopProgress);

    assert_eq!(result.status, ProcessingStatus::Corrupted);
    assert_eq!(harness.text_calls(), 0);
}
