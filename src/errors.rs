use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("please upload a CSV file (got {name})")]
    UnsupportedExtension { name: String },

    #[error("file size must be less than 5MB ({size} bytes given)")]
    TooLarge { size: u64 },

    #[error("CSV file is empty")]
    Empty,

    #[error("error parsing CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("could not read upload")]
    Io(#[from] std::io::Error),
}
