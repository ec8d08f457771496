//! Evidence source adapters.
//!
//! Every adapter call is bounded by the evidence timeout and resolves to a [`Fetch`]. Failures are
//! logged here and never reach the caller as errors.

use std::{future::Future, time::Duration};

use augur_domain::{EvidenceFragment, Fixture, MatchRecord};

use crate::{
	MatchHistory, Result,
	vector::{Collection, VectorIndex},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
	Available(T),
	Unavailable,
}
impl<T> Fetch<T> {
	pub fn is_available(&self) -> bool {
		matches!(self, Self::Available(_))
	}

	pub fn into_option(self) -> Option<T> {
		match self {
			Self::Available(value) => Some(value),
			Self::Unavailable => None,
		}
	}
}

pub async fn fetch_similar(
	index: &dyn VectorIndex,
	collection: Collection,
	query: &str,
	limit: u32,
	timeout: Duration,
) -> Fetch<Vec<EvidenceFragment>> {
	let branch = collection.branch();

	if !index.is_enabled() {
		tracing::debug!(branch = branch.as_str(), "Vector index disabled; skipping evidence source.");

		return Fetch::Unavailable;
	}

	let hits = bounded(branch.as_str(), timeout, index.search(collection, query, limit)).await;

	match hits {
		Fetch::Available(hits) => Fetch::Available(
			hits.into_iter()
				.enumerate()
				.map(|(rank, hit)| {
					EvidenceFragment::new(branch, hit.document, u32::try_from(rank).unwrap_or(u32::MAX))
				})
				.collect(),
		),
		Fetch::Unavailable => Fetch::Unavailable,
	}
}

pub async fn fetch_head_to_head(
	matches: &dyn MatchHistory,
	fixture: &Fixture,
	timeout: Duration,
) -> Fetch<Vec<MatchRecord>> {
	bounded(
		"head_to_head",
		timeout,
		matches.matches_between(fixture.home.name.trim(), fixture.away.name.trim()),
	)
	.await
}

pub async fn fetch_team_matches(
	matches: &dyn MatchHistory,
	team: &str,
	timeout: Duration,
) -> Fetch<Vec<MatchRecord>> {
	bounded("form", timeout, matches.matches_for_team(team.trim())).await
}

async fn bounded<T, F>(source: &str, timeout: Duration, fut: F) -> Fetch<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(timeout, fut).await {
		Ok(Ok(value)) => Fetch::Available(value),
		Ok(Err(err)) => {
			tracing::warn!(branch = source, error = %err, "Evidence source failed.");

			Fetch::Unavailable
		},
		Err(_) => {
			tracing::warn!(
				branch = source,
				timeout_ms = timeout.as_millis() as u64,
				"Evidence source timed out."
			);

			Fetch::Unavailable
		},
	}
}
