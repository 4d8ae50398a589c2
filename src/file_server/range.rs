//! `Range` header parsing. Only a single range in the `bytes` unit is
//! honored; anything else is served as the full representation.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
  pub start: usize,
  /// Inclusive; `None` runs to the end of the file.
  pub end: Option<usize>,
}

impl RangeRequest {
  pub fn end_position(&self, len: usize) -> usize {
    self.end.unwrap_or_else(|| len.saturating_sub(1))
  }

  pub fn content_length(&self, len: usize) -> usize {
    self.end_position(len).saturating_sub(self.start) + 1
  }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
  Valid(RangeRequest),
  /// Answer with 416.
  NotSatisfiable,
  /// Absent, malformed or unsupported: serve everything.
  None,
}

/// Parses `bytes=a-b`, `bytes=a-` and `bytes=-n` against a file of `len`
/// bytes.
pub fn parse_range_header(header: Option<&str>, len: usize) -> RangeParseResult {
  let Some(header) = header else {
    return RangeParseResult::None;
  };

  if len == 0 {
    return RangeParseResult::None;
  }

  let Some(ranges) = header.trim().strip_prefix("bytes=") else {
    return RangeParseResult::None;
  };

  if ranges.contains(',') {
    return RangeParseResult::None;
  }

  let Some((start, end)) = ranges.split_once('-') else {
    return RangeParseResult::None;
  };
  let (start, end) = (start.trim(), end.trim());

  if start.is_empty() {
    parse_suffix_range(end, len)
  } else {
    parse_bounded_range(start, end, len)
  }
}

fn parse_suffix_range(suffix: &str, len: usize) -> RangeParseResult {
  let Ok(suffix) = suffix.parse::<usize>() else {
    return RangeParseResult::None;
  };

  if suffix == 0 {
    return RangeParseResult::NotSatisfiable;
  }

  RangeParseResult::Valid(RangeRequest {
    start: len.saturating_sub(suffix),
    end: Some(len - 1),
  })
}

fn parse_bounded_range(start: &str, end: &str, len: usize) -> RangeParseResult {
  let Ok(start) = start.parse::<usize>() else {
    return RangeParseResult::None;
  };

  if start >= len {
    return RangeParseResult::NotSatisfiable;
  }

  let end = if end.is_empty() {
    None
  } else {
    let Ok(end) = end.parse::<usize>() else {
      return RangeParseResult::None;
    };
    if end < start {
      return RangeParseResult::None;
    }
    Some(end.min(len - 1))
  };

  RangeParseResult::Valid(RangeRequest { start, end })
}
