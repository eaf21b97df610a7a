// Document input (DOCX requirement text) and output (XLSX test matrix).

pub mod docx;
pub mod xlsx;

pub use docx::{DocxExtractor, ExtractError, RequirementExtractor};
pub use xlsx::{HEADERS, RenderError, SheetData, build_sheets, render_workbook, write_workbook};
