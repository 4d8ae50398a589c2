//! Turns an embedded file into an HTTP response: content type, validators,
//! conditional requests, byte ranges and `HEAD`.

pub mod range;

use std::{borrow::Cow, sync::Arc};

use axum::{
  body::{boxed, Bytes, Full},
  http::{
    header::{self, HeaderMap, HeaderValue},
    request, Method, StatusCode,
  },
  response::Response,
};
use chrono::{DateTime, Utc};
use mime_guess::mime;
use tracing::debug;

use crate::embedded::{EmbeddedFs, Entry, File};
use range::{parse_range_header, RangeParseResult};

pub struct FileServer<F> {
  fs: Arc<F>,
}

impl<F> Clone for FileServer<F> {
  fn clone(&self) -> Self {
    Self {
      fs: self.fs.clone(),
    }
  }
}

impl<F: EmbeddedFs> FileServer<F> {
  pub fn new(fs: Arc<F>) -> Self {
    Self { fs }
  }

  /// Serves the file at `path`. `headers` seeds the response headers;
  /// entries already present there (say a `Content-Type` or `ETag` set by a
  /// callback) win over the computed ones.
  pub fn serve(
    &self,
    request: &request::Parts,
    path: &str,
    mut headers: HeaderMap,
  ) -> Response {
    let file = match self.fs.open(path) {
      Ok(Entry::File(file)) => file,
      Ok(Entry::Dir) => {
        debug!("refusing to serve directory {path}");
        return respond(StatusCode::NOT_FOUND, headers, Bytes::new());
      }
      Err(err) => {
        debug!("file vanished before serving: {err}");
        return respond(StatusCode::NOT_FOUND, headers, Bytes::new());
      }
    };

    if !headers.contains_key(header::CONTENT_TYPE) {
      if let Ok(value) = HeaderValue::from_str(&content_type(file.path())) {
        headers.insert(header::CONTENT_TYPE, value);
      }
    }
    if !headers.contains_key(header::ETAG) {
      if let Ok(value) = HeaderValue::from_str(&etag(&file)) {
        headers.insert(header::ETAG, value);
      }
    }

    let modified = last_modified(&file);
    if let Some(modified) = modified {
      if let Ok(value) = HeaderValue::from_str(&format_http_date(modified)) {
        headers.insert(header::LAST_MODIFIED, value);
      }
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let validators = Validators {
      etag: headers
        .get(header::ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned),
      modified,
    };

    match validators.check(request) {
      Precondition::Failed => {
        return respond(StatusCode::PRECONDITION_FAILED, headers, Bytes::new());
      }
      Precondition::NotModified => {
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);
        if headers.contains_key(header::ETAG) {
          headers.remove(header::LAST_MODIFIED);
        }
        return respond(StatusCode::NOT_MODIFIED, headers, Bytes::new());
      }
      Precondition::Proceed => {}
    }

    let len = file.len();
    let range_header = if validators.if_range_holds(request) {
      request
        .headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
    } else {
      None
    };

    let (status, body) = match parse_range_header(range_header, len) {
      RangeParseResult::None => (StatusCode::OK, into_bytes(file.into_data())),
      RangeParseResult::NotSatisfiable => {
        headers.remove(header::CONTENT_TYPE);
        if let Ok(value) = HeaderValue::from_str(&format!("bytes */{len}")) {
          headers.insert(header::CONTENT_RANGE, value);
        }
        return respond(StatusCode::RANGE_NOT_SATISFIABLE, headers, Bytes::new());
      }
      RangeParseResult::Valid(range) => {
        let end = range.end_position(len);
        if let Ok(value) =
          HeaderValue::from_str(&format!("bytes {}-{end}/{len}", range.start))
        {
          headers.insert(header::CONTENT_RANGE, value);
        }
        let length = range.content_length(len);
        let body = into_bytes(file.into_data()).slice(range.start..range.start + length);
        (StatusCode::PARTIAL_CONTENT, body)
      }
    };

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

    if request.method == Method::HEAD {
      return respond(status, headers, Bytes::new());
    }
    respond(status, headers, body)
  }
}

pub(crate) fn respond(status: StatusCode, headers: HeaderMap, body: Bytes) -> Response {
  let mut response = Response::new(boxed(Full::from(body)));
  *response.status_mut() = status;
  *response.headers_mut() = headers;
  response
}

fn into_bytes(data: Cow<'static, [u8]>) -> Bytes {
  match data {
    Cow::Borrowed(data) => Bytes::from_static(data),
    Cow::Owned(data) => Bytes::from(data),
  }
}

fn content_type(path: &str) -> String {
  let guess = mime_guess::from_path(path).first_or_octet_stream();
  if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
    format!("{guess}; charset=utf-8")
  } else {
    guess.to_string()
  }
}

fn etag(file: &File) -> String {
  let hex: String = file.sha256()[..16]
    .iter()
    .map(|byte| format!("{byte:02x}"))
    .collect();
  format!("\"{hex}\"")
}

fn last_modified(file: &File) -> Option<DateTime<Utc>> {
  let secs = i64::try_from(file.last_modified()?).ok()?;
  if secs == 0 {
    return None;
  }
  DateTime::<Utc>::from_timestamp(secs, 0)
}

fn format_http_date(date: DateTime<Utc>) -> String {
  date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn parse_http_date(value: &HeaderValue) -> Option<DateTime<Utc>> {
  let value = value.to_str().ok()?;
  DateTime::parse_from_rfc2822(value)
    .ok()
    .map(|date| date.with_timezone(&Utc))
}

#[derive(Debug, PartialEq, Eq)]
enum Precondition {
  Proceed,
  NotModified,
  Failed,
}

struct Validators {
  etag: Option<String>,
  modified: Option<DateTime<Utc>>,
}

impl Validators {
  fn check(&self, request: &request::Parts) -> Precondition {
    let headers = &request.headers;

    if let Some(if_match) = header_str(headers, header::IF_MATCH) {
      if !etag_list_matches(if_match, self.etag.as_deref(), true) {
        return Precondition::Failed;
      }
    } else if let (Some(since), Some(modified)) = (
      headers.get(header::IF_UNMODIFIED_SINCE).and_then(parse_http_date),
      self.modified,
    ) {
      if modified > since {
        return Precondition::Failed;
      }
    }

    let cacheable = request.method == Method::GET || request.method == Method::HEAD;

    if let Some(if_none_match) = header_str(headers, header::IF_NONE_MATCH) {
      if etag_list_matches(if_none_match, self.etag.as_deref(), false) {
        return if cacheable {
          Precondition::NotModified
        } else {
          Precondition::Failed
        };
      }
    } else if let (true, Some(since), Some(modified)) = (
      cacheable,
      headers.get(header::IF_MODIFIED_SINCE).and_then(parse_http_date),
      self.modified,
    ) {
      if modified <= since {
        return Precondition::NotModified;
      }
    }

    Precondition::Proceed
  }

  /// Whether a `Range` header should be honored given `If-Range`.
  fn if_range_holds(&self, request: &request::Parts) -> bool {
    let Some(value) = request.headers.get(header::IF_RANGE) else {
      return true;
    };
    let Ok(text) = value.to_str() else {
      return false;
    };
    let text = text.trim();

    if text.starts_with('"') || text.starts_with("W/") {
      return match self.etag.as_deref() {
        Some(etag) => strong_eq(text, etag),
        None => false,
      };
    }

    match (parse_http_date(value), self.modified) {
      (Some(date), Some(modified)) => date == modified,
      _ => false,
    }
  }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
  headers.get(name).and_then(|value| value.to_str().ok())
}

fn etag_list_matches(list: &str, etag: Option<&str>, strong: bool) -> bool {
  let Some(etag) = etag else {
    return false;
  };
  list.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || if strong {
        strong_eq(candidate, etag)
      } else {
        weak_eq(candidate, etag)
      }
  })
}

fn strong_eq(a: &str, b: &str) -> bool {
  !a.starts_with("W/") && !b.starts_with("W/") && a == b
}

fn weak_eq(a: &str, b: &str) -> bool {
  a.trim_start_matches("W/") == b.trim_start_matches("W/")
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::Request;

  fn parts(method: Method, headers: &[(header::HeaderName, &str)]) -> request::Parts {
    let mut builder = Request::builder().method(method).uri("/static/a.txt");
    for (name, value) in headers {
      builder = builder.header(name, *value);
    }
    builder.body(()).unwrap().into_parts().0
  }

  fn validators() -> Validators {
    Validators {
      etag: Some("\"abc\"".to_string()),
      modified: DateTime::<Utc>::from_timestamp(1_700_000_000, 0),
    }
  }

  #[test]
  fn content_type_adds_charset_to_text() {
    assert_eq!(content_type("static/robots.txt"), "text/plain; charset=utf-8");
    assert_eq!(content_type("static/css/styles.css"), "text/css; charset=utf-8");
    assert_eq!(content_type("static/blob"), "application/octet-stream");
    assert_eq!(content_type("static/favicon.png"), "image/png");
  }

  #[test]
  fn http_dates_round_trip_through_headers() {
    let date = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    let formatted = format_http_date(date);
    assert_eq!(formatted, "Tue, 14 Nov 2023 22:13:20 GMT");
    let value = HeaderValue::from_str(&formatted).unwrap();
    assert_eq!(parse_http_date(&value), Some(date));
  }

  #[test]
  fn if_none_match_yields_not_modified() {
    let request = parts(Method::GET, &[(header::IF_NONE_MATCH, "\"zzz\", W/\"abc\"")]);
    assert_eq!(validators().check(&request), Precondition::NotModified);

    let request = parts(Method::GET, &[(header::IF_NONE_MATCH, "\"zzz\"")]);
    assert_eq!(validators().check(&request), Precondition::Proceed);
  }

  #[test]
  fn if_none_match_takes_precedence_over_if_modified_since() {
    let request = parts(
      Method::GET,
      &[
        (header::IF_NONE_MATCH, "\"zzz\""),
        (header::IF_MODIFIED_SINCE, "Wed, 15 Nov 2023 00:00:00 GMT"),
      ],
    );
    assert_eq!(validators().check(&request), Precondition::Proceed);
  }

  #[test]
  fn if_modified_since() {
    let request = parts(Method::GET, &[(header::IF_MODIFIED_SINCE, "Wed, 15 Nov 2023 00:00:00 GMT")]);
    assert_eq!(validators().check(&request), Precondition::NotModified);

    let request = parts(Method::GET, &[(header::IF_MODIFIED_SINCE, "Mon, 13 Nov 2023 00:00:00 GMT")]);
    assert_eq!(validators().check(&request), Precondition::Proceed);
  }

  #[test]
  fn if_match_uses_strong_comparison() {
    let request = parts(Method::GET, &[(header::IF_MATCH, "W/\"abc\"")]);
    assert_eq!(validators().check(&request), Precondition::Failed);

    let request = parts(Method::GET, &[(header::IF_MATCH, "\"abc\"")]);
    assert_eq!(validators().check(&request), Precondition::Proceed);

    let request = parts(Method::GET, &[(header::IF_MATCH, "*")]);
    assert_eq!(validators().check(&request), Precondition::Proceed);
  }

  #[test]
  fn if_unmodified_since() {
    let request = parts(Method::GET, &[(header::IF_UNMODIFIED_SINCE, "Mon, 13 Nov 2023 00:00:00 GMT")]);
    assert_eq!(validators().check(&request), Precondition::Failed);
  }

  #[test]
  fn if_range_matches_etag_or_date() {
    let request = parts(Method::GET, &[(header::IF_RANGE, "\"abc\"")]);
    assert!(validators().if_range_holds(&request));

    let request = parts(Method::GET, &[(header::IF_RANGE, "\"old\"")]);
    assert!(!validators().if_range_holds(&request));

    let request = parts(Method::GET, &[(header::IF_RANGE, "Tue, 14 Nov 2023 22:13:20 GMT")]);
    assert!(validators().if_range_holds(&request));

    assert!(validators().if_range_holds(&parts(Method::GET, &[])));
  }
}
