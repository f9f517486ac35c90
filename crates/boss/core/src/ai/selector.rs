use super::types::Decision;

/// Picks the winning candidate.
///
/// # Determinism
///
/// Selection is a strict maximum over candidates in generation order, so on a
/// tie the first candidate generated wins. Given the same candidates the same
/// decision is selected every time.
pub struct DecisionSelector;

impl DecisionSelector {
    pub fn select(candidates: &[Decision]) -> Option<Decision> {
        let mut best: Option<&Decision> = None;

        tracing::debug!("DecisionSelector: Evaluating {} candidates", candidates.len());

        for candidate in candidates {
            tracing::debug!(
                "  {} {:?}: priority={:.2} point={}",
                candidate.kind,
                candidate.ability.as_ref().map(|a| a.as_str()),
                candidate.priority,
                candidate.target_point
            );

            // Strictly greater: on a tie the earlier candidate stays
            if best.is_none_or(|b| candidate.priority > b.priority) {
                best = Some(candidate);
            }
        }

        if let Some(best) = best {
            tracing::debug!(
                "DecisionSelector: Best = {} (priority={:.2})",
                best.kind,
                best.priority
            );
        }

        best.cloned()
    }
}
