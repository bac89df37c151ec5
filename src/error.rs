#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse chart input: {0}")]
    Input(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("chart has no dataset")]
    EmptyChart,
    #[error("failed to rasterise chart: {0}")]
    Raster(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
