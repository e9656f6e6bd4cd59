use shared::ParamError;
use thiserror::Error;

/// Problems with an island map string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("island map is empty")]
    Empty,

    #[error("invalid landscape code {code:?} at row {row}, column {col}")]
    InvalidCode { code: char, row: usize, col: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    UnevenRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("border cell at row {row}, column {col} is not water")]
    OpenBorder { row: usize, col: usize },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("location ({row}, {col}) is outside the island")]
    OutsideIsland { row: usize, col: usize },

    #[error("animals cannot be placed on water at ({row}, {col})")]
    Impassable { row: usize, col: usize },
}
