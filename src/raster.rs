//! # Page Rasterization
//!
//! Source PDF → one bitmap per page, in page order. The default backend
//! runs poppler's `pdftoppm` into a scratch directory that is removed when
//! the call returns, whether it succeeded or not.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::GridError;

/// Renders every page of a document to a raster image.
///
/// Implementations must return pages in ascending page-number order, the
/// same order a [`crate::extract::TextExtractor`] enumerates them in.
pub trait Rasterizer {
    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>, GridError>;
}

/// Rasterizer backed by the `pdftoppm` command-line tool.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            program: program.into(),
            dpi,
        }
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>, GridError> {
        let scratch = tempfile::tempdir().map_err(|e| {
            GridError::Rasterize(format!("cannot create scratch directory: {}", e))
        })?;
        let prefix = scratch.path().join("page");

        info!(dpi = self.dpi, input = %path.display(), "rasterizing pages");
        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    GridError::RasterizerMissing(self.program.display().to_string())
                } else {
                    GridError::Rasterize(format!(
                        "failed to run '{}': {}",
                        self.program.display(),
                        e
                    ))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GridError::Rasterize(format!(
                "'{}' exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let mut pages = Vec::new();
        let entries = std::fs::read_dir(scratch.path())
            .map_err(|e| GridError::Rasterize(format!("cannot list rendered pages: {}", e)))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| GridError::Rasterize(format!("cannot list rendered pages: {}", e)))?;
            let entry_path = entry.path();
            let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(page_number) = parse_page_number(name) {
                pages.push((page_number, entry_path));
            }
        }
        pages.sort_by_key(|(page_number, _)| *page_number);

        let mut images = Vec::with_capacity(pages.len());
        for (page_number, page_path) in pages {
            let image = image::open(&page_path)?;
            debug!(
                page = page_number,
                width = image.width(),
                height = image.height(),
                "loaded page raster"
            );
            images.push(image);
        }
        // `scratch` drops here and removes the rendered files.
        Ok(images)
    }
}

/// Page number from a `pdftoppm` output name such as `page-007.png`.
fn parse_page_number(filename: &str) -> Option<u32> {
    let stem = filename.strip_suffix(".png")?;
    let (_, digits) = stem.rsplit_once('-')?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number("page-1.png"), Some(1));
        assert_eq!(parse_page_number("page-007.png"), Some(7));
        assert_eq!(parse_page_number("page-12.ppm"), None);
        assert_eq!(parse_page_number("notes.png"), None);
    }

    #[test]
    fn test_page_numbers_sort_numerically() {
        let mut names = vec!["page-10.png", "page-9.png", "page-1.png"];
        names.sort_by_key(|n| parse_page_number(n));
        assert_eq!(names, vec!["page-1.png", "page-9.png", "page-10.png"]);
    }

    /// Write an executable shell script standing in for `pdftoppm`.
    #[cfg(unix)]
    fn stub_program(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let program = dir.join("pdftoppm-stub");
        std::fs::write(&program, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        program
    }

    #[cfg(unix)]
    #[test]
    fn test_pages_load_in_numeric_order_and_scratch_is_removed() {
        let fixtures = tempfile::tempdir().unwrap();
        // Page n is n pixels wide so the load order is observable.
        for n in [1u32, 2, 10] {
            image::RgbImage::new(n, 1)
                .save(fixtures.path().join(format!("p{}.png", n)))
                .unwrap();
        }
        let dir = fixtures.path().display();
        // Arguments: -png -r <dpi> <input> <prefix>
        let body = format!(
            "for n in 10 2 1; do cp \"{dir}/p$n.png\" \"$5-$n.png\"; done\n\
             echo \"$3\" > \"{dir}/dpi.txt\"\n\
             echo \"$5\" > \"{dir}/prefix.txt\"",
            dir = dir
        );
        let program = stub_program(fixtures.path(), &body);

        let images = PdftoppmRasterizer::new(&program, 96)
            .rasterize(Path::new("input.pdf"))
            .unwrap();
        let widths: Vec<u32> = images.iter().map(|i| i.width()).collect();
        assert_eq!(widths, vec![1, 2, 10]);

        let dpi = std::fs::read_to_string(fixtures.path().join("dpi.txt")).unwrap();
        assert_eq!(dpi.trim(), "96");
        let prefix = std::fs::read_to_string(fixtures.path().join("prefix.txt")).unwrap();
        let scratch = Path::new(prefix.trim()).parent().unwrap().to_path_buf();
        assert!(!scratch.exists(), "scratch directory {} left behind", scratch.display());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_program_reports_stderr() {
        let fixtures = tempfile::tempdir().unwrap();
        let program = stub_program(fixtures.path(), "echo 'Syntax Error: broken xref' >&2\nexit 3");

        let err = PdftoppmRasterizer::new(&program, 72)
            .rasterize(Path::new("input.pdf"))
            .unwrap_err();
        match err {
            GridError::Rasterize(message) => assert!(message.contains("broken xref"), "{}", message),
            other => panic!("expected Rasterize, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_reported() {
        let rasterizer = PdftoppmRasterizer::new("pagegrid-no-such-rasterizer", 72);
        let err = rasterizer.rasterize(Path::new("whatever.pdf")).unwrap_err();
        assert!(matches!(err, GridError::RasterizerMissing(_)));
    }
}
