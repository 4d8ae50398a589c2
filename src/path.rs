//! Lexical handling of slash separated request paths.
//!
//! Nothing here touches a filesystem: `..` is resolved purely against the
//! preceding segment, and a rooted path can never climb above `/`.

/// Returns the shortest path equivalent to `path`.
///
/// Repeated slashes collapse, `.` segments are dropped and `..` removes the
/// segment before it. A rooted path stays rooted and `..` at its root is
/// discarded; an empty relative result becomes `.`.
pub fn clean(path: &str) -> String {
  let rooted = path.starts_with('/');
  let mut segments: Vec<&str> = Vec::new();

  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." => match segments.last() {
        Some(last) if *last != ".." => {
          segments.pop();
        }
        _ if rooted => {}
        _ => segments.push(".."),
      },
      segment => segments.push(segment),
    }
  }

  let joined = segments.join("/");
  if rooted {
    format!("/{joined}")
  } else if joined.is_empty() {
    ".".to_string()
  } else {
    joined
  }
}

/// Joins `rest` onto `base` and cleans the result.
pub fn join(base: &str, rest: &str) -> String {
  match (base.is_empty(), rest.is_empty()) {
    (true, true) => String::new(),
    (true, false) => clean(rest),
    (false, true) => clean(base),
    (false, false) => clean(&format!("{base}/{rest}")),
  }
}
