use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    #[error("Resolve error: {0}")]
    Resolve(#[from] crate::resolve::ResolveError),

    #[error("Select error: {0}")]
    Select(#[from] crate::select::SelectError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::fetch::FetchError;
    use crate::resolve::ResolveError;
    use crate::select::SelectError;

    #[test]
    fn test_module_errors_convert() {
        assert!(matches!(
            Error::from(CatalogError::EmptyCatalog("models")),
            Error::Catalog(_)
        ));
        assert!(matches!(
            Error::from(ResolveError::NotLoaded),
            Error::Resolve(ResolveError::NotLoaded)
        ));
        assert!(matches!(
            Error::from(SelectError::NotLoaded),
            Error::Select(SelectError::NotLoaded)
        ));
        assert!(matches!(
            Error::from(FetchError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream down".to_string(),
            }),
            Error::Fetch(_)
        ));
        assert!(matches!(
            Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
            Error::Io(_)
        ));
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(bad_json), Error::Json(_)));
    }

    #[test]
    fn test_display_names_the_failing_stage() {
        assert_eq!(
            Error::from(CatalogError::EmptyCatalog("models")).to_string(),
            "Catalog error: catalog build produced no usable models"
        );
        assert_eq!(
            Error::from(ResolveError::NotLoaded).to_string(),
            "Resolve error: no catalog loaded"
        );
        assert_eq!(
            Error::Config("missing data_dir".to_string()).to_string(),
            "Configuration error: missing data_dir"
        );
    }
}
