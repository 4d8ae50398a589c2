use axum::http::{
  header::{HeaderMap, HeaderName, HeaderValue},
  request, Method, Uri,
};

/// What a lookup callback gets to see: the incoming request, and the
/// headers of the response that is about to be written.
pub struct Context<'a> {
  request: &'a request::Parts,
  headers: &'a mut HeaderMap,
}

impl<'a> Context<'a> {
  pub(crate) fn new(request: &'a request::Parts, headers: &'a mut HeaderMap) -> Self {
    Self { request, headers }
  }

  pub fn method(&self) -> &Method {
    &self.request.method
  }

  pub fn uri(&self) -> &Uri {
    &self.request.uri
  }

  pub fn request_headers(&self) -> &HeaderMap {
    &self.request.headers
  }

  pub fn response_headers(&self) -> &HeaderMap {
    self.headers
  }

  /// Sets a response header, replacing any previous value.
  pub fn header(&mut self, name: HeaderName, value: HeaderValue) {
    self.headers.insert(name, value);
  }

  pub fn remove_header(&mut self, name: HeaderName) {
    self.headers.remove(name);
  }
}
