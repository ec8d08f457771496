use std::time::Duration;

use augur_config::Retrieval;
use augur_domain::{
	Branch, EvidenceFragment, Fixture, Reachability, RetrievedContext,
	stats::{self, FORM_WINDOW},
};

use crate::{
	MatchHistory,
	evidence::{self, Fetch},
	vector::{Collection, VectorIndex},
};

pub fn match_history_query(fixture: &Fixture) -> String {
	format!(
		"matches between {} and {}, their results and performance patterns",
		fixture.home.name.trim(),
		fixture.away.name.trim()
	)
}

pub fn similar_predictions_query(fixture: &Fixture) -> String {
	format!(
		"predictions for {} vs {} or similar matchups in {}",
		fixture.home.name.trim(),
		fixture.away.name.trim(),
		fixture.league.trim()
	)
}

/// Runs all evidence branches concurrently and merges what came back.
///
/// Unreachable branches contribute nothing. The result is never an error; with no evidence at all
/// it renders the sentinel text.
pub async fn retrieve_context(
	matches: &dyn MatchHistory,
	index: &dyn VectorIndex,
	cfg: &Retrieval,
	fixture: &Fixture,
) -> RetrievedContext {
	let timeout = Duration::from_millis(cfg.source_timeout_ms);
	let history_query = match_history_query(fixture);
	let predictions_query = similar_predictions_query(fixture);
	let (history, head_to_head, (home_form, away_form), similar) = tokio::join!(
		evidence::fetch_similar(
			index,
			Collection::MatchHistory,
			&history_query,
			cfg.match_history_top_k,
			timeout,
		),
		evidence::fetch_head_to_head(matches, fixture, timeout),
		async {
			tokio::join!(
				evidence::fetch_team_matches(matches, &fixture.home.name, timeout),
				evidence::fetch_team_matches(matches, &fixture.away.name, timeout),
			)
		},
		evidence::fetch_similar(
			index,
			Collection::Predictions,
			&predictions_query,
			cfg.similar_predictions_top_k,
			timeout,
		),
	);
	let mut reachability = Reachability::default();
	let mut fragments = Vec::new();

	reachability.set(Branch::MatchHistory, history.is_available());
	reachability.set(Branch::HeadToHead, head_to_head.is_available());
	reachability.set(Branch::Form, home_form.is_available() || away_form.is_available());
	reachability.set(Branch::SimilarPredictions, similar.is_available());

	if let Fetch::Available(found) = history {
		fragments.extend(found);
	}
	if let Fetch::Available(records) = head_to_head {
		let summary =
			stats::compute_head_to_head(&records, &fixture.home.name, &fixture.away.name);

		if !summary.is_empty() {
			fragments.push(EvidenceFragment::new(Branch::HeadToHead, summary.render(), 0));
		}
	}

	for (rank, (team, fetched)) in
		[(&fixture.home.name, home_form), (&fixture.away.name, away_form)].into_iter().enumerate()
	{
		let Fetch::Available(records) = fetched else {
			continue;
		};
		let form = stats::compute_form(&records, team, FORM_WINDOW);

		if !form.is_empty() {
			fragments.push(EvidenceFragment::new(Branch::Form, form.render(), rank as u32));
		}
	}

	if let Fetch::Available(found) = similar {
		fragments.extend(found);
	}

	RetrievedContext::assemble(fragments, reachability, cfg.context_char_budget)
}
