// ABOUTME: Normalizers for loosely-typed iTunes fields.
// ABOUTME: Explicit flags, keyword CSV lists, and strictly-positive episode/season numbers.

/// Outcome of reading an integer field such as `itunes:episode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    /// The field was missing or blank.
    Absent,
    /// The field held something other than an integer.
    Unparseable,
    /// An integer that is zero or negative.
    NotPositive(i64),
    /// A usable episode or season number.
    Positive(u32),
}

impl Ordinal {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Ordinal::Absent;
        }
        match s.parse::<i64>() {
            Ok(n) if n > 0 => u32::try_from(n)
                .map(Ordinal::Positive)
                .unwrap_or(Ordinal::Unparseable),
            Ok(n) => Ordinal::NotPositive(n),
            Err(_) => Ordinal::Unparseable,
        }
    }

    /// The number when it may populate an episode, else None.
    pub fn positive(self) -> Option<u32> {
        match self {
            Ordinal::Positive(n) => Some(n),
            _ => None,
        }
    }
}

/// True for case-insensitive "true" or "yes"; everything else is false.
pub fn is_explicit(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

/// Splits a comma-separated keyword list, trimming and dropping blanks.
/// None when nothing remains.
pub fn parse_keywords(raw: &str) -> Option<Vec<String>> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    if keywords.is_empty() {
        None
    } else {
        Some(keywords)
    }
}
