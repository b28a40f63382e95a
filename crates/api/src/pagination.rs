// ABOUTME: Query-parameter coercion and slicing for the episode list.
// ABOUTME: Clamps limit to 1..=100 (default 10) and offset to >= 0 (default 0).

use std::num::IntErrorKind;

use crate::envelope::Pagination;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Coerces raw query values; never fails.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: coerce_limit(limit),
            offset: coerce_offset(offset),
        }
    }

    /// Returns the window's slice of `items` with its page metadata.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> (&'a [T], Pagination) {
        let total = items.len();
        let start = self.offset.min(total);
        let end = self.offset.saturating_add(self.limit).min(total);

        let pagination = Pagination {
            total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.offset.saturating_add(self.limit) < total,
        };
        (&items[start..end], pagination)
    }
}

/// Strict integer parse; out-of-range digit strings saturate.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    match raw?.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn coerce_limit(raw: Option<&str>) -> usize {
    match parse_int(raw) {
        None | Some(0) => DEFAULT_LIMIT,
        Some(n) if n < 0 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_LIMIT, |n| n.min(MAX_LIMIT)),
    }
}

fn coerce_offset(raw: Option<&str>) -> usize {
    match parse_int(raw) {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn limit_coercion() {
        let limit = |raw| PageRequest::from_params(raw, None).limit;
        assert_eq!(limit(None), 10);
        assert_eq!(limit(Some("")), 10);
        assert_eq!(limit(Some("abc")), 10);
        assert_eq!(limit(Some("0")), 10);
        assert_eq!(limit(Some("-5")), 1);
        assert_eq!(limit(Some("25")), 25);
        assert_eq!(limit(Some("100")), 100);
        assert_eq!(limit(Some("200")), 100);
        assert_eq!(limit(Some("99999999999999999999")), 100);
        assert_eq!(limit(Some("-99999999999999999999")), 1);
    }

    #[test]
    fn offset_coercion() {
        let offset = |raw| PageRequest::from_params(None, raw).offset;
        assert_eq!(offset(None), 0);
        assert_eq!(offset(Some("x")), 0);
        assert_eq!(offset(Some("-3")), 0);
        assert_eq!(offset(Some("7")), 7);
        assert_eq!(offset(Some("-99999999999999999999")), 0);
    }

    #[test]
    fn overflowing_offset_yields_empty_page() {
        let items = [1, 2, 3];
        let request = PageRequest::from_params(Some("5"), Some("99999999999999999999"));
        assert!(request.offset > items.len());

        let (page, meta) = request.apply(&items);
        assert!(page.is_empty());
        assert_eq!(meta.total, 3);
        assert!(!meta.has_more);
    }

    #[test]
    fn apply_slices_and_reports_has_more() {
        let items: Vec<u32> = (0..25).collect();

        let (page, meta) = PageRequest { limit: 10, offset: 0 }.apply(&items);
        assert_eq!(page, &items[0..10]);
        assert_eq!(
            meta,
            Pagination {
                total: 25,
                limit: 10,
                offset: 0,
                has_more: true
            }
        );

        let (page, meta) = PageRequest { limit: 10, offset: 20 }.apply(&items);
        assert_eq!(page, &items[20..25]);
        assert!(!meta.has_more);

        let (page, meta) = PageRequest { limit: 10, offset: 15 }.apply(&items[..25]);
        assert_eq!(page.len(), 10);
        assert!(!meta.has_more);
    }

    #[test]
    fn offset_past_end_is_empty_page() {
        let items = [1, 2, 3];
        let (page, meta) = PageRequest { limit: 10, offset: 50 }.apply(&items);
        assert!(page.is_empty());
        assert_eq!(meta.total, 3);
        assert!(!meta.has_more);
    }
}
