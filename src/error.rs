use thiserror::Error;

/// Failure reported by the store. The message is what the user sees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Erreur réseau : {0}")]
    Network(String),

    #[error("Erreur {status}")]
    Server { status: u16 },
}

impl StoreError {
    pub fn not_found() -> Self {
        StoreError::Server { status: 404 }
    }

    pub fn internal() -> Self {
        StoreError::Server { status: 500 }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found(),
            sqlx::Error::Io(e) => StoreError::Network(e.to_string()),
            sqlx::Error::Tls(e) => StoreError::Network(e.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Network(err.to_string())
            }
            _ => StoreError::internal(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Receipt storage failed: {}", err);
        StoreError::internal()
    }
}

/// Local input problems, caught before any store call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Veuillez sélectionner le bon format de fichier")]
    UnsupportedFileType,

    #[error("Montant invalide : {0}")]
    InvalidAmount(String),

    #[error("Date invalide : {0}")]
    InvalidDate(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// Anything the new bill form shows inline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_render_their_status() {
        assert_eq!(StoreError::not_found().to_string(), "Erreur 404");
        assert_eq!(StoreError::internal().to_string(), "Erreur 500");
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound), StoreError::not_found());
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Network(_)
        ));
    }

    #[test]
    fn form_errors_are_transparent() {
        let err = FormError::from(StoreError::internal());
        assert_eq!(err.to_string(), "Erreur 500");

        let err = FormError::from(ValidationError::UnsupportedFileType);
        assert_eq!(err.to_string(), "Veuillez sélectionner le bon format de fichier");
    }
}
