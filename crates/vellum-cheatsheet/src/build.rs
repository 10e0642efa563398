//! Cheat sheet build sequence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::runner::{ProcessRunner, QuartoRunner, ToolRunner};
use crate::{CheatsheetError, CheatsheetOptions};

/// Quarto extension providing the cheat sheet format.
pub const QUARTO_EXTENSION: &str = "ansys/pyansys-quarto-cheatsheet";
/// Pinned extension version.
pub const QUARTO_EXTENSION_VERSION: &str = "v1";
/// Static directory name inside the output directory.
const STATIC_DIR: &str = "_static";
/// Images the extension leaves next to the source file.
const SUPPLEMENTARY_FILES: &[&str] = &["_static/slash.png", "_static/bground.png", "_static/ansys.png"];

/// Built cheat sheet files, relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheatsheetOutput {
    pub pdf: String,
    pub thumbnail: String,
}

/// Build the cheat sheet with `quarto` and `pdftoppm`.
///
/// Returns `Ok(None)` when no cheat sheet file is configured.
///
/// # Errors
///
/// Returns `CheatsheetError` if a command fails or the PDF is not produced.
pub fn build_cheatsheet(
    options: &CheatsheetOptions,
    source_dir: &Path,
    outdir: &Path,
) -> Result<Option<CheatsheetOutput>, CheatsheetError> {
    build_cheatsheet_with(&ProcessRunner, options, source_dir, outdir)
}

/// [`build_cheatsheet`] with a custom tool runner.
///
/// # Errors
///
/// Returns `CheatsheetError` if a command fails or the PDF is not produced.
pub fn build_cheatsheet_with<R: ToolRunner + ?Sized>(
    runner: &R,
    options: &CheatsheetOptions,
    source_dir: &Path,
    outdir: &Path,
) -> Result<Option<CheatsheetOutput>, CheatsheetError> {
    let Some(file) = options.file.as_deref().filter(|f| !f.is_empty()) else {
        tracing::debug!("No cheat sheet configured");
        return Ok(None);
    };
    let source = source_dir.join(file);
    let workdir = source.parent().unwrap_or(source_dir).to_path_buf();
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let static_dir = outdir.join(STATIC_DIR);

    tracing::info!(file = %file_name, "Building cheat sheet");
    let quarto = QuartoRunner::new(runner, &workdir);
    quarto.run(["--version"])?;
    quarto.run([
        "add".to_owned(),
        format!("{QUARTO_EXTENSION}@{QUARTO_EXTENSION_VERSION}"),
        "--no-prompt".to_owned(),
    ])?;
    quarto.run([
        "render".to_owned(),
        file_name,
        "--to".to_owned(),
        "cheat_sheet-pdf".to_owned(),
        "--output-dir".to_owned(),
        static_dir.display().to_string(),
        "-V".to_owned(),
        format!("version={}", options.version),
    ])?;
    quarto.run(["remove", QUARTO_EXTENSION, "--no-prompt"])?;

    clean_supplementary_files(&workdir)?;

    let pdf = static_dir.join(format!("{stem}.pdf"));
    if !pdf.is_file() {
        return Err(CheatsheetError::MissingOutput(pdf));
    }
    rasterize_first_page(runner, &pdf, &static_dir.join(&stem))?;

    let output = CheatsheetOutput {
        pdf: format!("{STATIC_DIR}/{stem}.pdf"),
        thumbnail: format!("{STATIC_DIR}/{stem}.png"),
    };
    tracing::info!(pdf = %pdf.display(), "Cheat sheet build finished");
    Ok(Some(output))
}

/// Remove the images the extension copies next to the source, and the
/// static folder if nothing else is left in it.
fn clean_supplementary_files(workdir: &Path) -> Result<(), CheatsheetError> {
    for file in SUPPLEMENTARY_FILES {
        let path = workdir.join(file);
        if path.is_file() {
            fs::remove_file(&path).map_err(|source| CheatsheetError::Io { path, source })?;
        }
    }
    let static_dir = workdir.join(STATIC_DIR);
    let is_empty = fs::read_dir(&static_dir).is_ok_and(|mut entries| entries.next().is_none());
    if is_empty {
        fs::remove_dir(&static_dir).map_err(|source| CheatsheetError::Io {
            path: static_dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Render the first PDF page to `<output_base>.png` at 500 DPI.
fn rasterize_first_page<R: ToolRunner + ?Sized>(runner: &R, pdf: &Path, output_base: &Path) -> Result<(), CheatsheetError> {
    let args: Vec<String> = ["-png", "-r", "500", "-f", "1", "-l", "1", "-singlefile"]
        .into_iter()
        .map(str::to_owned)
        .chain([pdf.display().to_string(), output_base.display().to_string()])
        .collect();
    let cwd: PathBuf = pdf.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    runner.run("pdftoppm", &args, &cwd)
}
