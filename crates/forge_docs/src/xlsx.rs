use std::collections::HashSet;
use std::path::{Path, PathBuf};

use forge_qa::{DocumentPlan, aggregate};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use thiserror::Error;
use tracing::{info, warn};

/// Fixed column layout of every sheet.
pub const HEADERS: [&str; 6] = [
    "ID",
    "Título",
    "Prioridade",
    "Descrição",
    "Passos",
    "Resultado Esperado",
];

/// Length a document stem is truncated to before it becomes a sheet title.
const TITLE_BASE_LEN: usize = 30;
/// Hard limit imposed by the spreadsheet engine.
const TITLE_MAX_LEN: usize = 31;

const HEADER_FILL: u32 = 0x4F81BD;

/// Longest string the engine accepts in a single cell.
pub const CELL_MAX_CHARS: usize = 32_767;

/// Description, steps and expected-result columns.
const WIDE_COLUMNS: [(u16, f64); 3] = [(3, 40.0), (4, 50.0), (5, 40.0)];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no sheets to render")]
    NoSheets,

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("failed to write workbook to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One sheet, ready to be written: title plus data rows under [`HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub title: String,
    pub rows: Vec<[String; 6]>,
}

/// Rows for one plan in aggregated order; missing fields are empty strings.
///
/// Cells longer than [`CELL_MAX_CHARS`] are truncated so one oversized
/// answer cannot fail the whole workbook.
pub fn scenario_rows(document: &str, plan: &DocumentPlan) -> Vec<[String; 6]> {
    aggregate(plan)
        .into_iter()
        .map(|s| {
            let mut row = [
                s.id.clone().unwrap_or_default(),
                s.title.clone().unwrap_or_default(),
                s.priority.clone().unwrap_or_default(),
                s.description.clone().unwrap_or_default(),
                s.steps_text(),
                s.expected_result.clone().unwrap_or_default(),
            ];
            for (col, cell) in row.iter_mut().enumerate() {
                fit_cell(cell, document, col);
            }
            row
        })
        .collect()
}

fn fit_cell(cell: &mut String, document: &str, col: usize) {
    let len = cell.chars().count();
    if len <= CELL_MAX_CHARS {
        return;
    }
    warn!(
        document,
        column = HEADERS[col],
        chars = len,
        limit = CELL_MAX_CHARS,
        "Cell text truncated"
    );
    if let Some((byte_idx, _)) = cell.char_indices().nth(CELL_MAX_CHARS) {
        cell.truncate(byte_idx);
    }
}

/// Pair each plan with a unique, engine-valid sheet title, in input order.
pub fn build_sheets(plans: &[(String, DocumentPlan)]) -> Vec<SheetData> {
    let mut used = HashSet::new();
    plans
        .iter()
        .enumerate()
        .map(|(idx, (name, plan))| SheetData {
            title: unique_title(name, idx + 1, &mut used),
            rows: scenario_rows(name, plan),
        })
        .collect()
}

/// Render all plans into an XLSX workbook, one sheet per document.
///
/// Returns the raw bytes of the xlsx file.
pub fn render_workbook(plans: &[(String, DocumentPlan)]) -> Result<Vec<u8>, RenderError> {
    if plans.is_empty() {
        return Err(RenderError::NoSheets);
    }

    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center);
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
        .set_align(FormatAlign::Top);

    for sheet in build_sheets(plans) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.title)?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col = col_idx as u16;
                if cell.is_empty() {
                    worksheet.write_blank(excel_row, col, &cell_format)?;
                } else {
                    worksheet.write_string_with_format(excel_row, col, cell, &cell_format)?;
                }
            }
        }

        for (col, width) in WIDE_COLUMNS {
            worksheet.set_column_width(col, width)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Render and write the workbook to `path`.
pub fn write_workbook(path: &Path, plans: &[(String, DocumentPlan)]) -> Result<(), RenderError> {
    info!(sheets = plans.len(), "Generating final workbook");
    let bytes = render_workbook(plans)?;
    std::fs::write(path, bytes).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Workbook written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Sheet titles
// ---------------------------------------------------------------------------

/// Replace characters the engine forbids, drop control characters and trim
/// apostrophes/whitespace from the ends, then truncate.
fn sanitize_title(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c: char| c == '\'' || c.is_whitespace());
    let truncated: String = trimmed.chars().take(TITLE_BASE_LEN).collect();
    truncated
        .trim_end_matches(|c: char| c == '\'' || c.is_whitespace())
        .to_string()
}

fn unique_title(name: &str, position: usize, used: &mut HashSet<String>) -> String {
    let mut base = sanitize_title(name);
    if base.is_empty() {
        base = format!("Documento {position}");
    }

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = TITLE_MAX_LEN - suffix.chars().count();
        let stem: String = base.chars().take(keep).collect();
        candidate = format!("{}{suffix}", stem.trim_end());
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}
