//! Directory scanner: finds `.app` bundles under the configured roots and reads
//! their metadata. Scanning never fails as a whole; bad entries are skipped or
//! come back with partial metadata.

use anyhow::{Context, Result, bail};
use plist::{Dictionary, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::types::{APP_SUFFIX, AppDescriptor, AppIcon, name_from_bundle_path};

/// Anything that can produce a fresh application list.
pub trait AppSource: Send + Sync + 'static {
    fn scan(&self) -> Vec<AppDescriptor>;
}

/// Metadata read from `Contents/Info.plist`.
#[derive(Debug, Default)]
pub struct BundleInfo {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
    pub version: Option<String>,
    pub icon_file: Option<String>,
}

pub struct Scanner {
    roots: Vec<PathBuf>,
    load_icons: bool,
}

impl Scanner {
    pub fn new(roots: Vec<PathBuf>, load_icons: bool) -> Self {
        Self { roots, load_icons }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.scan_roots.clone(), cfg.load_icons)
    }
}

impl AppSource for Scanner {
    fn scan(&self) -> Vec<AppDescriptor> {
        let mut res = Vec::new();
        for root in &self.roots {
            let mut found = scan_apps_in_dir(root, self.load_icons);
            log::debug!("Found {} bundles in {:?}", found.len(), root);
            res.append(&mut found);
        }
        sort_by_name(&mut res);
        log::info!("Scan finished: {} applications", res.len());
        res
    }
}

/// Primary collation key: canonical decomposition with combining marks
/// removed, then lowercased. "Émile" and "emile" share a key.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive, accent-folding ascending order. Names equal under folding
/// fall back to lowercase (accents), then to the raw name, so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

pub fn sort_by_name(apps: &mut [AppDescriptor]) {
    apps.sort_by(|a, b| compare_names(&a.name, &b.name));
}

/// Scan the immediate children of `dir` for `.app` bundles.
/// A missing or unreadable directory yields no entries.
pub fn scan_apps_in_dir(dir: &Path, load_icons: bool) -> Vec<AppDescriptor> {
    let mut res = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("Skipping unreadable entry under {:?}: {}", dir, e);
                continue;
            }
        };
        let is_bundle_name = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.ends_with(APP_SUFFIX));
        if !is_bundle_name {
            continue;
        }
        if let Some(app) = read_bundle(entry.path(), load_icons) {
            res.push(app);
        }
    }
    res
}

/// Open `path` as an application bundle. Returns None when it is not a bundle directory.
pub fn read_bundle(path: &Path, load_icons: bool) -> Option<AppDescriptor> {
    if !path.is_dir() {
        log::debug!("Not a bundle directory: {:?}", path);
        return None;
    }

    let info = match read_info_from_app(path) {
        Ok(info) => info,
        Err(e) => {
            log::debug!("Partial metadata for {:?}: {:#}", path, e);
            BundleInfo::default()
        }
    };

    let icon = if load_icons {
        info.icon_file
            .as_deref()
            .and_then(|f| load_icon(path, f))
            .map(Arc::new)
    } else {
        None
    };

    let name = info.name.unwrap_or_else(|| name_from_bundle_path(path));

    Some(AppDescriptor::new(
        name,
        info.bundle_id.unwrap_or_default(),
        path,
        icon,
        info.version,
    ))
}

/// Read name, identifier, version and icon file from Contents/Info.plist.
pub fn read_info_from_app(path: &Path) -> Result<BundleInfo> {
    let info = path.join("Contents").join("Info.plist");
    if !info.exists() {
        return Ok(BundleInfo::default());
    }
    let v = Value::from_file(&info).with_context(|| format!("Read plist {:?}", info))?;
    let dict = v
        .as_dictionary()
        .with_context(|| format!("Plist root is not a dictionary: {:?}", info))?;
    Ok(BundleInfo {
        name: string_key(dict, "CFBundleName").or_else(|| string_key(dict, "CFBundleDisplayName")),
        bundle_id: string_key(dict, "CFBundleIdentifier"),
        version: string_key(dict, "CFBundleShortVersionString"),
        icon_file: string_key(dict, "CFBundleIconFile"),
    })
}

/// String value of `key`; blank values count as absent.
fn string_key(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key)
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

fn load_icon(bundle: &Path, icon_file: &str) -> Option<AppIcon> {
    let resources = bundle.join("Contents").join("Resources");
    let path = locate_icon_resource(&resources, icon_file)?;
    match decode_icon(&path) {
        Ok(icon) => Some(icon),
        Err(e) => {
            log::debug!("No icon for {:?}: {:#}", bundle, e);
            None
        }
    }
}

/// Resolve `CFBundleIconFile` inside Resources, trying `.icns` when no extension is given.
pub fn locate_icon_resource(resources: &Path, icon_file: &str) -> Option<PathBuf> {
    let direct = resources.join(icon_file);
    if direct.is_file() {
        return Some(direct);
    }
    if Path::new(icon_file).extension().is_none() {
        let with_ext = resources.join(format!("{}.icns", icon_file));
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    None
}

fn decode_icon(path: &Path) -> Result<AppIcon> {
    let is_icns = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("icns"));
    let png = if is_icns {
        icns_to_png(path)?
    } else {
        path.to_path_buf()
    };
    let img = image::open(&png)
        .with_context(|| format!("Decode {:?}", png))?
        .to_rgba8();
    Ok(AppIcon {
        width: img.width(),
        height: img.height(),
        rgba: img.into_raw(),
    })
}

/// Convert an `.icns` file into a cached 64x64 PNG using `sips`.
#[cfg(target_os = "macos")]
fn icns_to_png(icns: &Path) -> Result<PathBuf> {
    let out = icon_cache_dir().join(format!("{}.png", stable_hash(&icns.to_string_lossy())));
    if out.exists() {
        return Ok(out);
    }
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Create dir {:?}", parent))?;
    }
    let status = std::process::Command::new("sips")
        .arg("-s")
        .arg("format")
        .arg("png")
        .arg(icns)
        .arg("--resampleHeightWidth")
        .arg("64")
        .arg("64")
        .arg("--out")
        .arg(&out)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .context("Failed to run sips")?;
    if !status.success() {
        bail!("sips exited with {}", status);
    }
    Ok(out)
}

#[cfg(not(target_os = "macos"))]
fn icns_to_png(icns: &Path) -> Result<PathBuf> {
    bail!("Cannot convert {:?}: icns decoding needs macOS sips", icns)
}

#[cfg(target_os = "macos")]
fn icon_cache_dir() -> PathBuf {
    std::env::temp_dir().join("AppMultiOpener").join("icons")
}

#[cfg(target_os = "macos")]
fn stable_hash(input: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_bundle(root: &Path, file_name: &str, keys: &[(&str, &str)]) -> PathBuf {
        let bundle = root.join(file_name);
        let contents = bundle.join("Contents");
        fs::create_dir_all(contents.join("MacOS")).unwrap();
        if !keys.is_empty() {
            let mut dict = Dictionary::new();
            for (k, v) in keys {
                dict.insert(k.to_string(), Value::String(v.to_string()));
            }
            Value::Dictionary(dict)
                .to_file_xml(contents.join("Info.plist"))
                .unwrap();
        }
        bundle
    }

    fn names(apps: &[AppDescriptor]) -> Vec<&str> {
        apps.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn scan_sorts_case_insensitively() {
        let dir = tempdir().unwrap();
        write_bundle(dir.path(), "z.app", &[("CFBundleName", "zed")]);
        write_bundle(dir.path(), "a.app", &[("CFBundleName", "Albert")]);
        write_bundle(dir.path(), "b.app", &[("CFBundleName", "bravo")]);

        let apps = Scanner::new(vec![dir.path().to_path_buf()], false).scan();
        assert_eq!(names(&apps), vec!["Albert", "bravo", "zed"]);
    }

    #[test]
    fn name_prefers_bundle_name_then_display_name_then_file_name() {
        let dir = tempdir().unwrap();
        write_bundle(
            dir.path(),
            "One.app",
            &[("CFBundleName", "First"), ("CFBundleDisplayName", "Ignored")],
        );
        write_bundle(dir.path(), "Two.app", &[("CFBundleDisplayName", "Second")]);
        write_bundle(dir.path(), "Third.app", &[("CFBundleIdentifier", "com.example.third")]);
        write_bundle(dir.path(), "Fourth.app", &[]);
        write_bundle(
            dir.path(),
            "Fifth.app",
            &[("CFBundleName", "  "), ("CFBundleDisplayName", "Pretty")],
        );
        write_bundle(dir.path(), "Sixth.app", &[("CFBundleName", " \t")]);

        let apps = Scanner::new(vec![dir.path().to_path_buf()], false).scan();
        assert_eq!(
            names(&apps),
            vec!["First", "Fourth", "Pretty", "Second", "Sixth", "Third"]
        );
        assert!(apps.iter().all(|a| !a.name.is_empty()));
    }

    #[test]
    fn metadata_fields_are_read_from_info_plist() {
        let dir = tempdir().unwrap();
        write_bundle(
            dir.path(),
            "Notes.app",
            &[
                ("CFBundleName", "Notes"),
                ("CFBundleIdentifier", "com.apple.Notes"),
                ("CFBundleShortVersionString", "4.11"),
            ],
        );

        let apps = Scanner::new(vec![dir.path().to_path_buf()], false).scan();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].bundle_id, "com.apple.Notes");
        assert_eq!(apps[0].version.as_deref(), Some("4.11"));
        assert_eq!(apps[0].path, dir.path().join("Notes.app"));
        assert!(apps[0].icon.is_none());
    }

    #[test]
    fn missing_metadata_degrades_to_partial_descriptor() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("Broken.app");
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        fs::write(bundle.join("Contents").join("Info.plist"), "garbage").unwrap();

        let apps = Scanner::new(vec![dir.path().to_path_buf()], true).scan();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "Broken");
        assert_eq!(apps[0].bundle_id, "");
        assert!(apps[0].version.is_none());
    }

    #[test]
    fn non_bundles_and_unreadable_roots_are_skipped() {
        let dir = tempdir().unwrap();
        write_bundle(dir.path(), "Real.app", &[]);
        fs::write(dir.path().join("Fake.app"), "not a directory").unwrap();
        fs::create_dir_all(dir.path().join("Folder")).unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        let scanner = Scanner::new(
            vec![dir.path().join("does-not-exist"), dir.path().to_path_buf()],
            false,
        );
        let apps = scanner.scan();
        assert_eq!(names(&apps), vec!["Real"]);
    }

    #[test]
    fn nested_bundles_are_not_descended_into() {
        let dir = tempdir().unwrap();
        let outer = write_bundle(dir.path(), "Outer.app", &[]);
        write_bundle(&outer.join("Contents"), "Helper.app", &[]);

        let apps = Scanner::new(vec![dir.path().to_path_buf()], false).scan();
        assert_eq!(names(&apps), vec!["Outer"]);
    }

    #[test]
    fn png_icon_is_decoded() {
        let dir = tempdir().unwrap();
        let bundle = write_bundle(
            dir.path(),
            "Painter.app",
            &[("CFBundleName", "Painter"), ("CFBundleIconFile", "icon.png")],
        );
        let resources = bundle.join("Contents").join("Resources");
        fs::create_dir_all(&resources).unwrap();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(resources.join("icon.png"))
            .unwrap();

        let apps = Scanner::new(vec![dir.path().to_path_buf()], true).scan();
        let icon = apps[0].icon.as_ref().expect("icon decoded");
        assert_eq!((icon.width, icon.height), (4, 2));
        assert_eq!(icon.rgba.len(), 4 * 2 * 4);
    }

    #[test]
    fn undecodable_icon_yields_none() {
        let dir = tempdir().unwrap();
        let bundle = write_bundle(
            dir.path(),
            "Odd.app",
            &[("CFBundleIconFile", "icon.png")],
        );
        let resources = bundle.join("Contents").join("Resources");
        fs::create_dir_all(&resources).unwrap();
        fs::write(resources.join("icon.png"), b"not a png").unwrap();

        let apps = Scanner::new(vec![dir.path().to_path_buf()], true).scan();
        assert_eq!(apps.len(), 1);
        assert!(apps[0].icon.is_none());
    }

    #[test]
    fn icon_resource_lookup_appends_icns() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("AppIcon.icns"), b"x").unwrap();

        assert_eq!(
            locate_icon_resource(dir.path(), "AppIcon"),
            Some(dir.path().join("AppIcon.icns"))
        );
        assert_eq!(locate_icon_resource(dir.path(), "Missing"), None);
        assert_eq!(locate_icon_resource(dir.path(), "AppIcon.png"), None);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let dir = tempdir().unwrap();
        write_bundle(dir.path(), "z.app", &[("CFBundleName", "Zed")]);
        write_bundle(dir.path(), "e.app", &[("CFBundleName", "Émile")]);
        write_bundle(dir.path(), "a.app", &[("CFBundleName", "apple")]);
        write_bundle(dir.path(), "f.app", &[("CFBundleName", "facetime")]);
        write_bundle(dir.path(), "d.app", &[("CFBundleName", "Dictionary")]);

        let apps = Scanner::new(vec![dir.path().to_path_buf()], false).scan();
        assert_eq!(
            names(&apps),
            vec!["apple", "Dictionary", "Émile", "facetime", "Zed"]
        );
    }

    #[test]
    fn accents_break_ties_before_case() {
        assert_eq!(compare_names("emile", "Émile"), Ordering::Less);
        assert_eq!(compare_names("Émile", "émile"), Ordering::Less);
        assert_eq!(compare_names("Éclair", "Emile"), Ordering::Less);
    }

    #[test]
    fn compare_names_is_total() {
        assert_eq!(compare_names("abc", "ABC"), Ordering::Greater);
        assert_eq!(compare_names("Albert", "bravo"), Ordering::Less);
        assert_eq!(compare_names("x", "x"), Ordering::Equal);
    }
}
