use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("no columns selected")]
    NoColumns,
}

pub type Result<T> = std::result::Result<T, ExportError>;
