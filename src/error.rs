use thiserror::Error;

/// Main error type for fragpack
#[derive(Error, Debug)]
pub enum FragError {
    #[error("Fetch error: {0}\n\nTroubleshooting:\n- Check internet connection\n- Verify the URL is reachable (try it in a browser or with curl)\n- Try increasing connect_timeout_secs in config")]
    Fetch(String),

    #[error("Catalog validation error: {0}\n\nTroubleshooting:\n- Check the catalog JSON: every package needs id, label and a non-empty fragments array\n- Every fragment needs id and url\n- Run with RUST_LOG=debug for more details")]
    Validation(String),

    #[error("Load cancelled")]
    Cancelled,

    #[error("A package load is already in progress")]
    Busy,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Config error: {0}\n\nTroubleshooting:\n- Check config file: ~/.config/fragpack/config.toml\n- Set catalog url or assets base_url there, or pass --url / --base\n- Run with RUST_LOG=debug for more details")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FragError>;
