// src/packaging.rs
//
// Copies the static-host routing fallbacks into the build output so
// deep links resolve to the app. Best effort: missing files are skipped,
// failures are logged and the run carries on.

use std::fs;
use std::path::Path;

pub const STATIC_FALLBACK_FILES: [&str; 5] = [
    "_redirects",
    "vercel.json",
    "netlify.toml",
    "render.yaml",
    "404.html",
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

pub fn copy_static_files(public_dir: &Path, build_dir: &Path) -> CopyReport {
    let mut report = CopyReport::default();

    if let Err(e) = fs::create_dir_all(build_dir) {
        log::warn!("could not create {}: {e}", build_dir.display());
    }

    for name in STATIC_FALLBACK_FILES {
        let src = public_dir.join(name);
        if !src.is_file() {
            log::info!("skip {name}: not present in {}", public_dir.display());
            report.skipped.push(name.to_string());
            continue;
        }

        let dest = build_dir.join(name);
        match fs::copy(&src, &dest) {
            Ok(_) => {
                log::info!("copied {name} -> {}", dest.display());
                report.copied.push(name.to_string());
            }
            Err(e) => {
                log::warn!("failed to copy {name}: {e}");
                report.failed.push((name.to_string(), e.to_string()));
            }
        }
    }

    report
}
