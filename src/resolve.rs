//! Reference resolution: extract a Drive file identifier from a
//! user-supplied reference string.
//!
//! Users paste whole sharing links
//! (`https://drive.google.com/file/d/<id>/view?usp=sharing`), bare file
//! IDs, or occasionally something that is neither. The resolver scans for
//! the longest contiguous run of identifier characters and accepts it only
//! above a minimum length, so short incidental URL fragments like `view`
//! or `usp` never match.

use crate::drive::RemoteId;

/// Minimum length of an identifier run. Drive file IDs are longer than
/// this; path segments and query keys are shorter.
pub const MIN_ID_LEN: usize = 25;

/// Extract a [`RemoteId`] from a reference string.
///
/// Scans for the longest contiguous run of `[A-Za-z0-9_-]`; the first run
/// wins a length tie. Returns `None` when no run reaches [`MIN_ID_LEN`];
/// that is a per-entry skip signal, not an error.
///
/// # Examples
///
/// ```
/// use songbook::resolve::resolve;
///
/// let link = "https://drive.google.com/file/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/view";
/// assert_eq!(
///     resolve(link).unwrap().as_str(),
///     "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms"
/// );
/// assert!(resolve("https://example.com/short").is_none());
/// ```
pub fn resolve(reference: &str) -> Option<RemoteId> {
    let bytes = reference.as_bytes();
    let mut best: Option<(usize, usize)> = None;
    let mut run_start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if is_id_char(b) {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            best = longer(best, (start, i - start));
        }
    }
    if let Some(start) = run_start {
        best = longer(best, (start, bytes.len() - start));
    }

    match best {
        Some((start, len)) if len >= MIN_ID_LEN => {
            // Runs are pure ASCII, so slicing at byte offsets is safe.
            Some(RemoteId::new(&reference[start..start + len]))
        }
        _ => None,
    }
}

fn is_id_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Keep the earlier run on a tie.
fn longer(best: Option<(usize, usize)>, candidate: (usize, usize)) -> Option<(usize, usize)> {
    match best {
        Some((_, len)) if len >= candidate.1 => best,
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

    #[rstest]
    #[case::sharing_url(
        "https://drive.google.com/file/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/view?usp=sharing"
    )]
    #[case::open_url("https://drive.google.com/open?id=1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")]
    #[case::bare_id("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")]
    fn extracts_the_embedded_id(#[case] reference: &str) {
        assert_eq!(resolve(reference).unwrap().as_str(), ID);
    }

    #[rstest]
    #[case::empty("")]
    #[case::plain_url("https://example.com/some/short/path?usp=sharing")]
    #[case::just_below_minimum("a1b2c3d4e5f6g7h8i9j0k1l2")] // 24 chars
    #[case::long_but_broken("a1b2c3d4e5f6.g7h8i9j0k1l2m3n4")]
    fn rejects_references_without_a_long_run(#[case] reference: &str) {
        assert!(resolve(reference).is_none());
    }

    #[test]
    fn exactly_minimum_length_is_accepted() {
        let id = "a1b2c3d4e5f6g7h8i9j0k1l2m"; // 25 chars
        assert_eq!(id.len(), MIN_ID_LEN);
        let reference = format!("https://host/d/{id}/view");
        assert_eq!(resolve(&reference).unwrap().as_str(), id);
    }

    #[test]
    fn hyphen_and_underscore_are_id_characters() {
        let id = "abc-DEF_123-ghi_456-jkl_789xx";
        let reference = format!("/d/{id}?usp=drive");
        assert_eq!(resolve(&reference).unwrap().as_str(), id);
    }

    #[test]
    fn longest_run_wins() {
        let short = "a".repeat(MIN_ID_LEN);
        let long = "b".repeat(MIN_ID_LEN + 5);
        let reference = format!("/{short}/{long}/");
        assert_eq!(resolve(&reference).unwrap().as_str(), long);
    }

    #[test]
    fn run_at_end_of_string_is_found() {
        let id = "z".repeat(MIN_ID_LEN);
        let reference = format!("id={id}");
        assert_eq!(resolve(&reference).unwrap().as_str(), id);
    }

    #[test]
    fn non_ascii_breaks_a_run() {
        let reference = format!("{}é{}", "a".repeat(13), "b".repeat(13));
        assert!(resolve(&reference).is_none());
    }
}
