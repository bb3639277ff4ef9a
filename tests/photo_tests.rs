//! Photo Loader Tests
//!
//! Tests for:
//! - Local files read and decoded in the background
//! - Missing files reported as I/O errors
//! - Results finishing after the owner is gone never drained

#![cfg(not(target_arch = "wasm32"))]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fete::assets::{PhotoLoader, PhotoResult};
use fete::errors::FeteError;

fn temp_png(name: &str, width: u32, height: u32) -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("fete-{name}-{}.png", std::process::id()));
    image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255])).save(&path)?;
    Ok(path)
}

fn path_str(path: &std::path::Path) -> anyhow::Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 temp path {}", path.display()))
}

/// Polls the loader until `count` results arrived or five seconds passed.
fn wait_for(loader: &mut PhotoLoader, count: usize) -> Vec<PhotoResult> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut results = Vec::new();
    while results.len() < count && Instant::now() < deadline {
        results.extend(loader.drain());
        std::thread::sleep(Duration::from_millis(5));
    }
    results
}

#[test]
fn local_file_is_read_and_decoded() -> anyhow::Result<()> {
    let path = temp_png("decoded", 3, 2)?;
    let mut loader = PhotoLoader::new(Arc::new(AtomicBool::new(true)));
    loader.request(4, path_str(&path)?);
    assert_eq!(loader.pending(), 1);

    let results = wait_for(&mut loader, 1);
    std::fs::remove_file(&path).ok();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.index, 4);
    let image = result.image.as_ref().unwrap();
    assert_eq!((image.width, image.height), (3, 2));
    assert_eq!(loader.pending(), 0);
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let mut loader = PhotoLoader::new(Arc::new(AtomicBool::new(true)));
    loader.request(0, "does/not/exist/at-all.png");

    let results = wait_for(&mut loader, 1);
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].image, Err(FeteError::IoError(_))));
}

#[test]
fn several_requests_all_complete() -> anyhow::Result<()> {
    let paths = (0..4)
        .map(|i| temp_png(&format!("batch{i}"), 2, 2))
        .collect::<anyhow::Result<Vec<PathBuf>>>()?;
    let mut loader = PhotoLoader::new(Arc::new(AtomicBool::new(true)));
    for (i, path) in paths.iter().enumerate() {
        loader.request(i, path_str(path)?);
    }

    let mut results = wait_for(&mut loader, paths.len());
    for path in &paths {
        std::fs::remove_file(path).ok();
    }

    results.sort_by_key(|r| r.index);
    let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert!(results.iter().all(|r| r.image.is_ok()));
    Ok(())
}

#[test]
fn results_after_the_owner_is_gone_are_dropped() -> anyhow::Result<()> {
    let path = temp_png("stale", 2, 2)?;
    let alive = Arc::new(AtomicBool::new(true));
    let mut loader = PhotoLoader::new(Arc::clone(&alive));
    loader.request(0, path_str(&path)?);
    alive.store(false, Ordering::Release);

    std::thread::sleep(Duration::from_millis(200));
    assert!(loader.drain().is_empty());
    std::fs::remove_file(&path).ok();
    Ok(())
}
