use serde::{Deserialize, Serialize};

pub const SENTINEL_CONTEXT: &str = "No historical data available for these teams.";
/// Rendered when sources answered but nothing fit in the character budget.
pub const OVER_BUDGET_CONTEXT: &str =
	"Historical data exists for these teams but was too long to include.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	Vector,
	Relational,
}

/// One evidence query of the retrieval fan-out. Declaration order is the context priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
	MatchHistory,
	HeadToHead,
	Form,
	SimilarPredictions,
}
impl Branch {
	pub const PRIORITY: [Self; 4] =
		[Self::MatchHistory, Self::HeadToHead, Self::Form, Self::SimilarPredictions];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::MatchHistory => "match_history",
			Self::HeadToHead => "head_to_head",
			Self::Form => "form",
			Self::SimilarPredictions => "similar_predictions",
		}
	}

	pub fn source_kind(self) -> SourceKind {
		match self {
			Self::MatchHistory | Self::SimilarPredictions => SourceKind::Vector,
			Self::HeadToHead | Self::Form => SourceKind::Relational,
		}
	}

	pub fn header(self) -> &'static str {
		match self {
			Self::MatchHistory => "=== HISTORICAL MATCHES ===",
			Self::HeadToHead => "=== HEAD-TO-HEAD ===",
			Self::Form => "=== RECENT FORM ===",
			Self::SimilarPredictions => "=== SIMILAR PAST PREDICTIONS ===",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFragment {
	pub source_kind: SourceKind,
	pub branch: Branch,
	pub text: String,
	/// Zero is the best match within its branch.
	pub relevance_rank: u32,
}
impl EvidenceFragment {
	pub fn new(branch: Branch, text: impl Into<String>, relevance_rank: u32) -> Self {
		Self { source_kind: branch.source_kind(), branch, text: text.into(), relevance_rank }
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reachability {
	pub match_history: bool,
	pub head_to_head: bool,
	pub form: bool,
	pub similar_predictions: bool,
}
impl Reachability {
	pub fn get(&self, branch: Branch) -> bool {
		match branch {
			Branch::MatchHistory => self.match_history,
			Branch::HeadToHead => self.head_to_head,
			Branch::Form => self.form,
			Branch::SimilarPredictions => self.similar_predictions,
		}
	}

	pub fn set(&mut self, branch: Branch, reachable: bool) {
		match branch {
			Branch::MatchHistory => self.match_history = reachable,
			Branch::HeadToHead => self.head_to_head = reachable,
			Branch::Form => self.form = reachable,
			Branch::SimilarPredictions => self.similar_predictions = reachable,
		}
	}

	pub fn reachable(&self) -> Vec<Branch> {
		Branch::PRIORITY.into_iter().filter(|branch| self.get(*branch)).collect()
	}
}

/// Merged evidence for one fixture, ordered by branch priority and bounded in rendered length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
	pub fragments: Vec<EvidenceFragment>,
	pub reachability: Reachability,
	pub truncated: bool,
}
impl RetrievedContext {
	/// Orders `fragments` by branch priority then rank, and keeps as many as fit in
	/// `char_budget` characters of rendered text.
	///
	/// Whole fragments are dropped from the end. The first fragment that does not fit is cut back
	/// to its last sentence boundary when that leaves something; nothing after it is kept.
	pub fn assemble(
		mut fragments: Vec<EvidenceFragment>,
		reachability: Reachability,
		char_budget: usize,
	) -> Self {
		fragments.retain(|fragment| !fragment.text.trim().is_empty());
		fragments.sort_by_key(|fragment| (fragment.branch, fragment.relevance_rank));

		let mut kept: Vec<EvidenceFragment> = Vec::with_capacity(fragments.len());
		let mut truncated = false;

		for mut fragment in fragments {
			fragment.text = fragment.text.trim().to_string();

			kept.push(fragment);

			let rendered_len = render_fragments(&kept).chars().count();

			if rendered_len <= char_budget {
				continue;
			}

			truncated = true;

			let Some(mut last) = kept.pop() else {
				break;
			};
			let text_len = last.text.chars().count();
			let overhead = rendered_len - text_len;

			if let Some(room) = char_budget.checked_sub(overhead)
				&& let Some(cut) = cut_at_sentence(&last.text, room)
			{
				last.text = cut;

				kept.push(last);
			}

			break;
		}

		Self { fragments: kept, reachability, truncated }
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Branches that contributed at least one kept fragment, in priority order.
	pub fn contributing_branches(&self) -> Vec<Branch> {
		let mut branches = self.fragments.iter().map(|fragment| fragment.branch).collect::<Vec<_>>();

		branches.dedup();

		branches
	}

	pub fn render(&self) -> String {
		if self.is_empty() {
			let caveat = if self.truncated { OVER_BUDGET_CONTEXT } else { SENTINEL_CONTEXT };

			return caveat.to_string();
		}

		render_fragments(&self.fragments)
	}
}

fn render_fragments(fragments: &[EvidenceFragment]) -> String {
	let mut out = String::new();
	let mut current: Option<Branch> = None;

	for fragment in fragments {
		if current != Some(fragment.branch) {
			if current.is_some() {
				out.push_str("\n\n");
			}

			out.push_str(fragment.branch.header());

			current = Some(fragment.branch);
		}

		out.push('\n');
		out.push_str(&fragment.text);
	}

	out
}

/// Longest prefix of at most `max_chars` characters that ends on a sentence boundary.
fn cut_at_sentence(text: &str, max_chars: usize) -> Option<String> {
	let limit = text.char_indices().nth(max_chars).map(|(idx, _)| idx).unwrap_or(text.len());
	let window = &text[..limit];
	let mut boundary = None;
	let mut chars = window.char_indices().peekable();

	while let Some((idx, ch)) = chars.next() {
		let end = idx + ch.len_utf8();
		let closes_sentence = match ch {
			'\n' => true,
			'.' | '!' | '?' => match chars.peek() {
				Some((_, next)) => next.is_whitespace(),
				None => end == text.len() || text[end..].starts_with(char::is_whitespace),
			},
			_ => false,
		};

		if closes_sentence {
			boundary = Some(end);
		}
	}

	let cut = window[..boundary?].trim_end();

	if cut.is_empty() {
		return None;
	}

	Some(cut.to_string())
}
