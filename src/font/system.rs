use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use super::{FontInfo, FontStyle};

lazy_static::lazy_static! {
    static ref SYSTEM_FONTS: Mutex<Option<Vec<FontInfo>>> = Mutex::new(None);
}

// Fonts sit a few levels deep under /usr/share/fonts on most distributions.
const MAX_DIR_DEPTH: usize = 4;

fn system_font_dirs() -> Vec<PathBuf> {
    let mut font_dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        let windir = std::env::var("WINDIR").unwrap_or_else(|_| "C:\\Windows".to_string());
        font_dirs.push(PathBuf::from(format!("{}/Fonts", windir)));
    }
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home".to_string());
        font_dirs.push(PathBuf::from(format!("{}/.fonts", home)));
        font_dirs.push(PathBuf::from(format!("{}/.local/share/fonts", home)));
        font_dirs.push(PathBuf::from("/usr/share/fonts"));
        font_dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }
    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/Users".to_string());
        font_dirs.push(PathBuf::from(format!("{}/Library/Fonts", home)));
        font_dirs.push(PathBuf::from("/Library/Fonts"));
        font_dirs.push(PathBuf::from("/System/Library/Fonts"));
    }

    font_dirs
}

fn collect_fonts(dir: &Path, depth: usize, fonts: &mut Vec<FontInfo>) {
    let Ok(entries) = dir.read_dir() else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let path = entry.path();
        if file_type.is_dir() {
            if depth < MAX_DIR_DEPTH {
                collect_fonts(&path, depth + 1, fonts);
            }
            continue;
        }

        if file_type.is_file() && is_font_file(&path) {
            if let Some(font_info) = get_font_info(&path) {
                fonts.push(font_info);
            }
        }
    }
}

pub(crate) fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ext == "ttf" || ext == "otf"
        })
        .unwrap_or(false)
}

/// Scans the platform font directories once and caches the result.
pub fn search_system_font() -> Vec<FontInfo> {
    let mut cache = match SYSTEM_FONTS.lock() {
        Ok(cache) => cache,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(fonts) = cache.as_ref() {
        return fonts.clone();
    }

    crate::dbg_log!("Searching system fonts...");

    let mut fonts = Vec::new();
    for font_dir in system_font_dirs() {
        collect_fonts(&font_dir, 0, &mut fonts);
    }

    if fonts.is_empty() {
        crate::dbg_log!("No system fonts found.");
    } else {
        crate::dbg_log!("Found {} system fonts.", fonts.len());
    }

    *cache = Some(fonts.clone());
    fonts
}

/// Reads the family name and style of the font file at `path`.
pub fn get_font_info(path: &Path) -> Option<FontInfo> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            crate::dbg_log!("Failed to read font file at path: {}, {}", path.display(), e);
            return None;
        }
    };

    let face = match ttf_parser::Face::parse(&data, 0) {
        Ok(face) => face,
        Err(e) => {
            crate::dbg_log!("Failed to parse font file at path: {}, {}", path.display(), e);
            return None;
        }
    };

    let font_family_name = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
        .find_map(|name| name.to_string())
        .or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.to_string())
        })?;

    let mut style = FontStyle::empty();
    if face.is_bold() {
        style |= FontStyle::BOLD;
    }
    if face.is_italic() {
        style |= FontStyle::ITALIC;
    }

    Some(FontInfo {
        name: font_family_name,
        path: path.to_path_buf(),
        style,
    })
}

/// Picks the best match for `requested` among `fonts`.
///
/// `requested` may be a family name ("Arial") or a file name ("arial.ttf"); the
/// comparison ignores case and the extension. Regular faces win over bold or
/// italic ones of the same family.
pub fn find_font<'a>(fonts: &'a [FontInfo], requested: &str) -> Option<&'a FontInfo> {
    let requested_path = Path::new(requested);
    let wanted = requested_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(requested);

    let matches = |info: &&FontInfo| {
        info.name.eq_ignore_ascii_case(wanted)
            || info
                .path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(wanted))
    };

    fonts
        .iter()
        .filter(matches)
        .min_by_key(|info| info.style.bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, path: &str, style: FontStyle) -> FontInfo {
        FontInfo {
            name: name.to_string(),
            path: PathBuf::from(path),
            style,
        }
    }

    #[test]
    fn font_files_by_extension() {
        assert!(is_font_file(Path::new("/fonts/Arial.TTF")));
        assert!(is_font_file(Path::new("x.otf")));
        assert!(!is_font_file(Path::new("x.woff2")));
        assert!(!is_font_file(Path::new("ttf")));
    }

    #[test]
    fn matches_file_name_against_family() {
        let fonts = vec![
            info("Arial", "/f/arialbd.ttf", FontStyle::BOLD),
            info("Arial", "/f/arial.ttf", FontStyle::empty()),
            info("DejaVu Sans", "/f/DejaVuSans.ttf", FontStyle::empty()),
        ];

        let found = find_font(&fonts, "arial.ttf").map(|f| f.path.clone());
        assert_eq!(found, Some(PathBuf::from("/f/arial.ttf")));

        let by_stem = find_font(&fonts, "dejavusans").map(|f| f.name.clone());
        assert_eq!(by_stem.as_deref(), Some("DejaVu Sans"));

        assert!(find_font(&fonts, "Comic Sans").is_none());
    }

    #[test]
    fn unreadable_font_has_no_info() {
        assert!(get_font_info(Path::new("/nonexistent/never.ttf")).is_none());
    }
}
