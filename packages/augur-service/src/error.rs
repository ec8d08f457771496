pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid fixture: {message}")]
	Validation { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Upstream service unreachable: {message}")]
	Transport { message: String },
	#[error("Generation failed: {message}")]
	Generation { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Vector index is disabled.")]
	VectorDisabled,
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl Error {
	/// Whether the same request may succeed if sent again unchanged.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<augur_storage::Error> for Error {
	fn from(err: augur_storage::Error) -> Self {
		match err {
			augur_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			err @ augur_storage::Error::CorruptRow { .. } => Self::Storage { message: err.to_string() },
			augur_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<augur_providers::Error> for Error {
	fn from(err: augur_providers::Error) -> Self {
		match err {
			augur_providers::Error::Transport { message } => Self::Transport { message },
			augur_providers::Error::Generation { message } => Self::Generation { message },
			other => Self::Provider { message: other.to_string() },
		}
	}
}
