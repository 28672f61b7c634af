//! Payment-to-completion reconciliation heuristics.
//!
//! Payout-generated aggregate payments carry a note of the shape
//!
//! ```text
//! Payment for Alice, Bob [id1,id2]
//! ```
//!
//! where the bracketed suffix lists the settled
//! [`ClientApp`](crate::ClientApp) ids. Since the `payment_id` join column on
//! the per-app audit rows became the authoritative link, this module only has
//! to cover legacy rows whose join is missing: locate the aggregate payment
//! by bracket id, then by the reconstructed single-row note, then by the
//! client name inside a comma-joined note.
//!
//! Name comparisons are NFKC-normalized and case-insensitive so legacy notes
//! typed by hand (odd spacing, composed accents) still match.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::payments::PartnerPayment;

const NOTE_PREFIX: &str = "Payment for ";

/// How an aggregate payment was matched to an app row during unmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Exact: the app id appears in the note's bracketed id list.
    BracketId,
    /// Legacy: the note equals the reconstructed "Payment for {app}, {client}".
    ReconstructedNote,
    /// Legacy, fuzziest: the client name appears in the comma-joined note.
    ClientName,
}

/// Normalizes a human name for comparison: NFKC, lowercased, whitespace
/// collapsed.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the canonical payout note: `Payment for <names> [<id1>,<id2>,...]`.
#[must_use]
pub fn payout_note(names: &[String], ids: &[Uuid]) -> String {
    let ids = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{NOTE_PREFIX}{} [{ids}]", names.join(", "))
}

/// Extracts the bracketed id list from a note, if present.
///
/// Tolerates stale entries: ids that fail to parse are skipped. Returns
/// `None` when there is no bracket suffix at all (legacy rows).
#[must_use]
pub fn note_ids(note: &str) -> Option<Vec<Uuid>> {
    let trimmed = note.trim_end();
    let open = trimmed.rfind('[')?;
    let inner = trimmed.strip_suffix(']')?.get(open + 1..)?;
    Some(
        inner
            .split(',')
            .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
            .collect(),
    )
}

/// Returns the note with any bracket suffix removed.
#[must_use]
pub fn note_without_ids(note: &str) -> &str {
    let trimmed = note.trim_end();
    match (trimmed.rfind('['), trimmed.ends_with(']')) {
        (Some(open), true) => trimmed[..open].trim_end(),
        _ => trimmed,
    }
}

/// Comma-separated names from the note body (bracket suffix and
/// "Payment for " prefix stripped).
#[must_use]
pub fn note_names(note: &str) -> Vec<String> {
    let body = note_without_ids(note);
    let body = body.strip_prefix(NOTE_PREFIX).unwrap_or(body);
    body.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Locates the aggregate payment settling `app_id`, walking the fallback
/// chain over the partner's payment list.
///
/// `app_name`/`client_name` feed the legacy name-based strategies. The first
/// strategy producing a match wins; within one strategy the first payment in
/// list order wins.
#[must_use]
pub fn match_settling_payment<'a>(
    payments: &'a [PartnerPayment],
    app_id: Uuid,
    app_name: &str,
    client_name: &str,
) -> Option<(&'a PartnerPayment, MatchStrategy)> {
    let with_note = |payment: &'a PartnerPayment| payment.note.as_deref().map(|n| (payment, n));

    // Preferred: exact id inside the bracket suffix.
    if let Some(found) = payments
        .iter()
        .filter_map(with_note)
        .find(|(_, note)| note_ids(note).is_some_and(|ids| ids.contains(&app_id)))
    {
        return Some((found.0, MatchStrategy::BracketId));
    }

    // Legacy single-row notes: "Payment for {app}, {client}".
    let reconstructed = normalize_name(&format!("{NOTE_PREFIX}{app_name}, {client_name}"));
    if let Some(found) = payments
        .iter()
        .filter_map(with_note)
        .find(|(_, note)| normalize_name(note_without_ids(note)) == reconstructed)
    {
        return Some((found.0, MatchStrategy::ReconstructedNote));
    }

    // Last resort: the client name somewhere in a comma-joined note.
    let target = normalize_name(client_name);
    if let Some(found) = payments.iter().filter_map(with_note).find(|(_, note)| {
        note_names(note)
            .iter()
            .any(|name| normalize_name(name) == target)
    }) {
        return Some((found.0, MatchStrategy::ClientName));
    }

    None
}

/// Rewrites a payout note after one settled row is removed from it.
///
/// Drops `app_id` from the bracket list and the first matching `name` from
/// the name list, regenerating the canonical shape. Notes without a bracket
/// suffix only lose the name.
#[must_use]
pub fn note_without_entry(note: &str, app_id: Uuid, name: &str) -> String {
    let mut names = note_names(note);
    let target = normalize_name(name);
    if let Some(pos) = names
        .iter()
        .position(|candidate| normalize_name(candidate) == target)
    {
        names.remove(pos);
    }

    match note_ids(note) {
        Some(ids) => {
            let remaining: Vec<Uuid> = ids.into_iter().filter(|id| *id != app_id).collect();
            payout_note(&names, &remaining)
        }
        None => format!("{NOTE_PREFIX}{}", names.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::MoneyCents;

    use super::*;

    fn payment(note: Option<&str>) -> PartnerPayment {
        PartnerPayment::new(
            Uuid::new_v4(),
            MoneyCents::new(625),
            note.map(ToString::to_string),
            Utc::now(),
        )
    }

    #[test]
    fn note_round_trip() {
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        let note = payout_note(&["Alice".to_string(), "Bob".to_string()], &ids);
        assert_eq!(note_ids(&note).unwrap(), ids);
        assert_eq!(note_without_ids(&note), "Payment for Alice, Bob");
        assert_eq!(note_names(&note), vec!["Alice", "Bob"]);
    }

    #[test]
    fn note_ids_absent_for_legacy_notes() {
        assert_eq!(note_ids("Payment for Alice, Bob"), None);
        assert_eq!(note_names("Payment for Alice, Bob"), vec!["Alice", "Bob"]);
    }

    #[test]
    fn note_ids_skips_stale_entries() {
        let id = Uuid::new_v4();
        let note = format!("Payment for X [{id},not-a-uuid]");
        assert_eq!(note_ids(&note).unwrap(), vec![id]);
    }

    #[test]
    fn bracket_match_preferred_over_names() {
        let app_id = Uuid::new_v4();
        let exact = payment(Some(&payout_note(&["Alice".to_string()], &[app_id])));
        let fuzzy = payment(Some("Payment for Alice"));
        let payments = [fuzzy, exact];

        let (found, strategy) =
            match_settling_payment(&payments, app_id, "MegaApp", "Alice").unwrap();
        assert_eq!(strategy, MatchStrategy::BracketId);
        assert_eq!(found.id, payments[1].id);
    }

    #[test]
    fn reconstructed_note_matches_legacy_rows() {
        let payments = [payment(Some("Payment for MegaApp, Alice"))];
        let (_, strategy) =
            match_settling_payment(&payments, Uuid::new_v4(), "MegaApp", "Alice").unwrap();
        assert_eq!(strategy, MatchStrategy::ReconstructedNote);
    }

    #[test]
    fn client_name_fallback_is_normalized() {
        let payments = [payment(Some("Payment for  Bob ,  ALICE  "))];
        let (_, strategy) =
            match_settling_payment(&payments, Uuid::new_v4(), "OtherApp", "alice").unwrap();
        assert_eq!(strategy, MatchStrategy::ClientName);
    }

    #[test]
    fn no_match_without_note() {
        let payments = [payment(None)];
        assert!(match_settling_payment(&payments, Uuid::new_v4(), "App", "Alice").is_none());
    }

    #[test]
    fn note_without_entry_drops_id_and_name() {
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        let note = payout_note(&["Alice".to_string(), "Bob".to_string()], &[drop, keep]);

        let rewritten = note_without_entry(&note, drop, "Alice");
        assert_eq!(rewritten, payout_note(&["Bob".to_string()], &[keep]));
    }

    #[test]
    fn note_without_entry_handles_legacy_shape() {
        let rewritten =
            note_without_entry("Payment for Alice, Bob", Uuid::new_v4(), "Bob");
        assert_eq!(rewritten, "Payment for Alice");
    }
}
