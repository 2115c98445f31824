use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovviewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("minimum coverage must be within [0, 100], got {0}")]
    InvalidThreshold(f64),

    #[error("no coverage report loaded")]
    ReportNotLoaded,
}

pub type Result<T> = std::result::Result<T, CovviewError>;
