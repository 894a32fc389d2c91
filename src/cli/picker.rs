//! Interactive workbook picker.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `dcdash` and choose a workbook" UX when the
//!   default `Actual vs Plan.xlsx` is not in the working directory
//!
//! The picker searches for spreadsheet files under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding workbooks.
const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Extensions the sheet reader understands.
pub const WORKBOOK_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xls", "xlsb", "ods", "csv"];

/// Prompt the user to select a workbook from the current directory tree.
///
/// Behavior:
/// - list discovered workbooks
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_workbook() -> Result<PathBuf, AppError> {
    let files = discover_workbooks();
    if files.is_empty() {
        return Err(AppError::schema(
            "No workbook found. Provide one with `dcdash -f <file.xlsx>`.",
        ));
    }

    println!("Found {} workbook(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::runtime(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::runtime(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::schema(
                "No input received. Provide a workbook with `dcdash -f <file.xlsx>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::schema("Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_workbook_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_workbook_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => {
                println!("{err}");
                continue;
            }
        }
    }
}

/// Validate the provided path points to a readable spreadsheet file.
pub fn validate_workbook_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::schema(format!("Workbook not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::schema(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_workbook_extension(path) {
        return Err(AppError::schema(format!(
            "Expected one of .{} (got: {}).",
            WORKBOOK_EXTENSIONS.join(", ."),
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover workbooks under the current directory (deterministic order).
pub fn discover_workbooks() -> Vec<PathBuf> {
    find_workbooks(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_workbooks(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_workbooks_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_workbooks_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_workbooks_inner(&path, depth + 1, max_depth, out);
            }
            continue;
        }

        if file_type.is_file() && has_workbook_extension(&path) && !is_lock_file(&path) {
            out.push(path);
        }
    }
}

fn has_workbook_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        == Some(true)
}

/// Office writes `~$name.xlsx` next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_workbooks_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        for name in ["b.xlsx", "data/a.CSV", "notes.txt", "~$b.xlsx", "target/skip.xlsx"] {
            fs::write(root.join(name), "").unwrap();
        }

        let found: Vec<String> = find_workbooks(root, 2)
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(found, vec!["b.xlsx", "data/a.CSV"]);
    }

    #[test]
    fn validation_checks_existence_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "").unwrap();

        assert!(validate_workbook_path(&dir.path().join("none.xlsx")).is_err());
        assert!(validate_workbook_path(dir.path()).is_err());
        let err = validate_workbook_path(&txt).unwrap_err();
        assert!(err.to_string().starts_with("Expected one of .xlsx, .xlsm"));
    }
}
