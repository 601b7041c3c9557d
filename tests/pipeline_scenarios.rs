//! Integration tests: full engine runs over real encoded images
//!
//! Fixtures are generated with the `image` crate into a temp directory so
//! every container path (PNG, JPEG, BMP, mislabeled, corrupt) goes through
//! real sniffing, decoding, and fusion.

use image::{GrayImage, ImageFormat as Encoding, Luma};
use pixtrace::fusion::ProbabilitySource;
use pixtrace::policy::FusionMode;
use pixtrace::{
    decide, render_report, write_report, ForensicEngine, ForensicPolicy, ImageFormat, Label, ReportFormat,
    Signal, SignalSet,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ─── Fixtures ──────────────────────────────────────────────────────

/// Gradient plus deterministic grain, so every producer has something to measure
fn grainy(width: u32, height: u32) -> GrayImage {
    let mut state: u32 = 0xC0FF_EE11;
    GrayImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let grain = ((state >> 24) % 21) as i32 - 10;
        let base = ((x + y) * 255 / (width + height)) as i32;
        Luma([(base + grain).clamp(0, 255) as u8])
    })
}

fn write(dir: &TempDir, name: &str, img: &GrayImage, encoding: Encoding) -> PathBuf {
    let path = dir.path().join(name);
    img.save_with_format(&path, encoding).unwrap();
    path
}

/// Little-endian TIFF block holding one SHORT entry per tag in IFD0
fn tiff_with_tags(tags: &[u16]) -> Vec<u8> {
    let mut t = b"II*\x00".to_vec();
    t.extend_from_slice(&8u32.to_le_bytes());
    t.extend_from_slice(&(tags.len() as u16).to_le_bytes());
    for &tag in tags {
        t.extend_from_slice(&tag.to_le_bytes());
        t.extend_from_slice(&3u16.to_le_bytes());
        t.extend_from_slice(&1u32.to_le_bytes());
        t.extend_from_slice(&[0; 4]);
    }
    t.extend_from_slice(&0u32.to_le_bytes());
    t
}

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut s = vec![0xFF, marker];
    s.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    s.extend_from_slice(payload);
    s
}

/// Camera-style JPEG: full EXIF tag set in APP1, and comment padding that
/// puts the file at `kb_per_pixel`
fn camera_jpeg(img: &GrayImage, kb_per_pixel: f64) -> Vec<u8> {
    let mut encoded = std::io::Cursor::new(Vec::new());
    img.write_to(&mut encoded, Encoding::Jpeg).unwrap();
    let encoded = encoded.into_inner();

    // Make, Model, DateTime, DateTimeOriginal, ExifImageWidth, ExifImageHeight
    let mut exif = b"Exif\0\0".to_vec();
    exif.extend(tiff_with_tags(&[0x010F, 0x0110, 0x0132, 0x9003, 0xA002, 0xA003]));

    let mut out = encoded[..2].to_vec();
    out.extend(segment(0xE1, &exif));

    let target = (kb_per_pixel * 1024.0 * (img.width() * img.height()) as f64) as usize;
    let mut missing = target.saturating_sub(out.len() + encoded.len() - 2);
    while missing > 4 {
        let chunk = (missing - 4).min(60_000);
        out.extend(segment(0xFE, &vec![b' '; chunk]));
        missing -= chunk + 4;
    }
    out.extend_from_slice(&encoded[2..]);
    out
}

fn score_of(report: &pixtrace::AnalysisReport, name: &str) -> Option<f64> {
    report.signals.get(name).unwrap().score
}

fn analyze(path: &Path) -> pixtrace::AnalysisReport {
    ForensicEngine::default().analyze(path).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Section 1: Container paths
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_png_skips_exif_and_jpeg() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "render.png", &grainy(160, 128), Encoding::Png);
    let report = analyze(&path);

    assert_eq!(report.format.detected_format, ImageFormat::Png);
    assert_eq!(score_of(&report, "format"), Some(0.0));
    assert_eq!(score_of(&report, "exif"), None);
    assert_eq!(score_of(&report, "jpeg"), None);
    assert!(score_of(&report, "frequency").is_some());
    assert!(score_of(&report, "noise").is_some());
    assert!(score_of(&report, "noise_consistency").is_some());
    assert_ne!(report.verdict.label, Label::Unknown);
    assert!(report.verdict.explanation.contains("not applicable: exif, jpeg"));
    assert_eq!(report.sha256.len(), 64);
}

#[test]
fn test_jpeg_without_exif() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shot.jpg", &grainy(200, 150), Encoding::Jpeg);
    let report = analyze(&path);

    assert_eq!(report.format.detected_format, ImageFormat::Jpeg);
    assert_eq!(score_of(&report, "format"), Some(0.0));

    let exif = report.signals.get("exif").unwrap();
    assert_eq!((exif.score, exif.confidence), (Some(0.0), 0.7));
    assert_eq!(exif.reason, "No EXIF metadata found");

    let jpeg = report.signals.get("jpeg").unwrap();
    assert!(jpeg.score.is_some(), "jpeg reason: {}", jpeg.reason);
    assert_eq!(report.features.0[0], 0.0);
}

#[test]
fn test_camera_jpeg_is_not_more_suspicious_than_bare_pixels() {
    let dir = TempDir::new().unwrap();
    let bytes = camera_jpeg(&grainy(128, 128), 0.006);
    let jpeg_path = dir.path().join("DSC_0001.jpg");
    std::fs::write(&jpeg_path, &bytes).unwrap();

    // Same decoded pixels, stripped of every camera trace
    let pixels = image::load_from_memory(&bytes).unwrap().to_luma8();
    let png_path = write(&dir, "DSC_0001.png", &pixels, Encoding::Png);

    let shot = analyze(&jpeg_path);
    let bare = analyze(&png_path);

    assert_eq!(score_of(&shot, "exif"), Some(1.0), "exif: {}", shot.signals.get("exif").unwrap().reason);
    assert_eq!(score_of(&shot, "jpeg"), Some(1.0), "jpeg: {}", shot.signals.get("jpeg").unwrap().reason);
    for name in ["frequency", "noise", "noise_consistency"] {
        assert_eq!(shot.signals.get(name), bare.signals.get(name), "{} differs", name);
    }

    assert!(
        shot.verdict.ai_probability <= bare.verdict.ai_probability,
        "camera JPEG {} vs bare PNG {}",
        shot.verdict.ai_probability,
        bare.verdict.ai_probability
    );
    if shot.verdict.label != Label::Real {
        assert!(!shot.verdict.explanation.contains("exif:"), "{}", shot.verdict.explanation);
        assert!(!shot.verdict.explanation.contains("jpeg:"), "{}", shot.verdict.explanation);
    }
    // Orientation is internal to fusion; reported scores stay raw
    assert_eq!(shot.features.0[0], 1.0);
    assert_eq!(shot.features.0[1], 1.0);
}

#[test]
fn test_camera_jpeg_in_static_mode_reads_as_real() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DSC_0002.jpg");
    std::fs::write(&path, camera_jpeg(&grainy(128, 128), 0.006)).unwrap();

    let mut policy = ForensicPolicy::default();
    policy.fusion.mode = FusionMode::StaticWeighted;
    let report = ForensicEngine::new(policy).analyze(&path).unwrap();

    // exif + jpeg alone already carry half the weight at full authenticity
    assert!(report.verdict.fused_score.unwrap() >= 0.5, "{:?}", report.verdict);
    assert!(report.verdict.ai_probability <= 0.5);
}

#[test]
fn test_mislabeled_png_flags_extension_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "camera.jpg", &grainy(96, 96), Encoding::Png);
    let report = analyze(&path);

    let format = report.signals.get("format").unwrap();
    assert_eq!((format.score, format.confidence), (Some(0.4), 0.8));
    assert_eq!(format.reason, "File extension does not match actual image format");
    // Capabilities follow the sniffed container, not the extension
    assert_eq!(score_of(&report, "jpeg"), None);
}

#[test]
fn test_bmp_is_uncommon_for_capture() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "scan.bmp", &grainy(80, 80), Encoding::Bmp);
    let report = analyze(&path);

    let format = report.signals.get("format").unwrap();
    assert_eq!(format.score, Some(0.3));
    assert_eq!(format.reason, "Uncommon image format for camera capture (bmp)");
}

#[test]
fn test_corrupt_file_degrades_without_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not an image").unwrap();
    let report = analyze(&path);

    assert_eq!(report.format.detected_format, ImageFormat::Unknown);
    assert_eq!(score_of(&report, "format"), Some(0.35));
    for name in ["frequency", "noise", "noise_consistency"] {
        let s = report.signals.get(name).unwrap();
        assert_eq!((s.score, s.confidence), (None, 0.0), "{} must degrade", name);
    }
    // Only the format signal carries weight: 0.35 → REAL band
    assert_eq!(report.verdict.label, Label::Real);
    assert_eq!(report.verdict.ai_probability, 0.35);
}

#[test]
fn test_image_smaller_than_one_patch() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "thumb.png", &grainy(48, 48), Encoding::Png);
    let report = analyze(&path);

    let s = report.signals.get("noise_consistency").unwrap();
    assert_eq!(s.score, None);
    assert_eq!(s.confidence, 0.0);
    assert!(score_of(&report, "noise").is_some());
}

#[test]
fn test_missing_file_is_the_only_error() {
    let dir = TempDir::new().unwrap();
    assert!(ForensicEngine::default().analyze(&dir.path().join("nope.png")).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Section 2: Batch, policy, model
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_directory_batch_reports_every_image() {
    let dir = TempDir::new().unwrap();
    write(&dir, "b.png", &grainy(64, 64), Encoding::Png);
    write(&dir, "a.jpg", &grainy(64, 64), Encoding::Jpeg);
    std::fs::write(dir.path().join("c.png"), b"junk").unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();

    let results = ForensicEngine::default().analyze_directory(dir.path()).unwrap();
    let names: Vec<_> = results
        .iter()
        .map(|(p, _)| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, ["a.jpg", "b.png", "c.png"]);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
}

#[test]
fn test_policy_file_selects_static_mode() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".pixtrace.toml"),
        "[fusion]\nmode = \"static_weighted\"\n\n[patches]\npatch_size = 32\nstride = 16\n",
    )
    .unwrap();
    let policy = ForensicPolicy::from_dir_or_default(dir.path());
    assert_eq!(policy.fusion.mode, FusionMode::StaticWeighted);

    let path = write(&dir, "small.png", &grainy(48, 48), Encoding::Png);
    let report = ForensicEngine::new(policy).analyze(&path).unwrap();
    assert_eq!(report.verdict.mode, FusionMode::StaticWeighted);
    // 32px patches fit where 64px ones did not
    assert!(score_of(&report, "noise_consistency").is_some());
}

#[test]
fn test_invalid_policy_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("pixtrace.toml"),
        "[fusion.static_weighted.weights]\nexif = 0.9\n",
    )
    .unwrap();
    assert!(ForensicPolicy::from_file(&dir.path().join("pixtrace.toml")).is_err());
    assert_eq!(ForensicPolicy::from_dir_or_default(dir.path()), ForensicPolicy::default());
}

#[test]
fn test_enabled_model_overrides_probability() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shot.jpg", &grainy(128, 128), Encoding::Jpeg);

    let mut policy = ForensicPolicy::default();
    policy.model.enabled = true;
    let modeled = ForensicEngine::new(policy).analyze(&path).unwrap();
    let native = analyze(&path);

    assert_eq!(modeled.verdict.probability_source, ProbabilitySource::Model);
    assert_eq!(Some(modeled.verdict.ai_probability), modeled.model_probability);
    assert_eq!(modeled.verdict.label, native.verdict.label);
    assert_eq!(modeled.verdict.explanation, native.verdict.explanation);
    assert_eq!(native.model_probability, None);
}

#[test]
fn test_repeated_analysis_is_identical() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shot.jpg", &grainy(140, 100), Encoding::Jpeg);
    let engine = ForensicEngine::default();
    let (a, b) = (engine.analyze(&path).unwrap(), engine.analyze(&path).unwrap());
    assert_eq!(
        serde_json::to_string(&a.signals).unwrap(),
        serde_json::to_string(&b.signals).unwrap()
    );
    assert_eq!(a.verdict, b.verdict);
    assert_eq!(a.features, b.features);
}

// ═══════════════════════════════════════════════════════════════════
// Section 3: Fusion through the public API
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_public_decide_on_mixed_evidence() {
    let signals = SignalSet::new()
        .with("exif", Signal::scored(1.0, 0.9, "Rich and consistent EXIF metadata"))
        .with("jpeg", Signal::scored(0.3, 0.6, "JPEG compression highly atypical"))
        .with("frequency", Signal::not_applicable("Frequency analysis failed: decode"))
        .with("noise", Signal::scored(0.6, 0.7, "Unnatural noise pattern"));
    let v = decide(&signals);
    assert_eq!(v.label, Label::AiEdited);
    assert_eq!(v.ai_probability, 0.682);
}

#[test]
fn test_public_decide_without_evidence() {
    let signals: SignalSet = ["exif", "jpeg", "frequency", "noise"]
        .into_iter()
        .map(|n| (n, Signal::not_applicable("n/a")))
        .collect();
    let v = decide(&signals);
    assert_eq!(v.label, Label::Unknown);
    assert_eq!(v.confidence, 0.0);
}

// ═══════════════════════════════════════════════════════════════════
// Section 4: Detector injection and reports
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_custom_signature_table_changes_sniffing() {
    use pixtrace::ingest::detector::DEFAULT_SIGNATURES;

    let dir = TempDir::new().unwrap();
    let path = write(&dir, "render.png", &grainy(64, 64), Encoding::Png);
    let jpeg_only: Vec<_> = DEFAULT_SIGNATURES
        .iter()
        .copied()
        .filter(|s| s.format == ImageFormat::Jpeg)
        .collect();

    let report = ForensicEngine::default()
        .with_detector(pixtrace::FormatDetector::new(jpeg_only))
        .analyze(&path)
        .unwrap();
    assert_eq!(report.format.detected_format, ImageFormat::Unknown);
    assert_eq!(score_of(&report, "format"), Some(0.35));
}

#[test]
fn test_written_json_report_round_trips_fields() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shot.jpg", &grainy(96, 96), Encoding::Jpeg);
    let report = analyze(&path);

    let out = dir.path().join("report.json");
    write_report(&report, ReportFormat::Json, &out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

    assert_eq!(value["sha256"], report.sha256);
    assert_eq!(value["verdict"]["label"], report.verdict.label.to_string());
    assert!(value["signals"]["exif"]["score"].is_number());
    assert_eq!(value["features"].as_array().unwrap().len(), 4);
}

#[test]
fn test_text_report_marks_absent_scores() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "render.png", &grainy(96, 96), Encoding::Png);
    let text = render_report(&analyze(&path), ReportFormat::Text).unwrap();

    assert!(text.contains("IMAGE AUTHENTICITY REPORT"));
    assert!(text.lines().any(|l| l.contains("EXIF") && l.contains("score=n/a")));
    assert!(text.contains("Final Decision:"));
}
