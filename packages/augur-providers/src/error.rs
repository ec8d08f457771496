pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The service could not be reached, timed out, or answered with a non-success status.
	#[error("Transport error: {message}")]
	Transport { message: String },
	/// The service answered but reported a failure of its own.
	#[error("Generation error: {message}")]
	Generation { message: String },
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			return Self::InvalidResponse { message: err.to_string() };
		}
		if err.is_builder() {
			return Self::InvalidConfig { message: err.to_string() };
		}

		Self::Transport { message: err.to_string() }
	}
}
