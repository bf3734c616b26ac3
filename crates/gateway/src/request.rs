use std::{fmt, path::Path};

use reqwest::{
    Method,
    multipart::{Form, Part},
};
use serde::Serialize;
use serde_json::Value;

use crate::GatewayError;

/// A replayable description of a call to the remote API.
///
/// Bodies are kept in an owned form so the same request can be dispatched again with a
/// refreshed credential.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: ApiPath,
    query: Vec<(String, String)>,
    body: RequestBody,
    retried: bool,
}

/// A path below the API base URL, kept as separate segments.
///
/// Fixed parts are split on `/`. Values added with [`ApiPath::segment`] always stay a
/// single segment, so a `/`, `?`, `#` or `%` inside them is percent-encoded on the wire
/// instead of changing which endpoint is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
    rendered: String,
}

impl ApiPath {
    /// A path from fixed segments separated by `/`.
    pub fn new(fixed: &str) -> Self {
        let mut path = Self {
            segments: Vec::new(),
            rendered: String::new(),
        };

        for segment in fixed.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment.to_string());
        }

        path
    }

    /// Appends one segment holding `value` verbatim.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.push(value.into());
        self
    }

    /// The segments, unescaped.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segments joined with `/`, unescaped. Used for matching and logging.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    fn push(&mut self, segment: String) {
        self.rendered.push('/');
        self.rendered.push_str(&segment);
        self.segments.push(segment);
    }
}

impl From<&str> for ApiPath {
    fn from(fixed: &str) -> Self {
        Self::new(fixed)
    }
}

impl From<String> for ApiPath {
    fn from(fixed: String) -> Self {
        Self::new(&fixed)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// The body of an [`ApiRequest`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// A `multipart/form-data` submission.
    Form(FormData),
}

impl ApiRequest {
    /// Creates a request without a body. The path is relative to the API base URL.
    pub fn new(method: Method, path: impl Into<ApiPath>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    /// A `GET` request.
    pub fn get(path: impl Into<ApiPath>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request.
    pub fn post(path: impl Into<ApiPath>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PUT` request.
    pub fn put(path: impl Into<ApiPath>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A `DELETE` request.
    pub fn delete(path: impl Into<ApiPath>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> crate::Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);

        Ok(self)
    }

    /// Sets a multipart form body.
    pub fn form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Marks the request as already retried. A `401 Unauthorized` answer is then returned
    /// to the caller instead of starting a credential refresh.
    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path relative to the API base URL, unescaped.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// The path segments, each escaped on its own when the URL is built.
    pub fn segments(&self) -> &[String] {
        self.path.segments()
    }

    /// The query parameters.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The request body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether the request has already been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// An ordered list of multipart fields.
///
/// Field order is preserved, and the same name may appear several times (for example one
/// `MaterialsFiles` part per uploaded file).
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

/// The value of a multipart field.
#[derive(Debug, Clone)]
pub enum FormValue {
    /// A text field.
    Text(String),
    /// A file part.
    File(FileUpload),
}

impl FormValue {
    /// The text of a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// The file of a file part.
    pub fn as_file(&self) -> Option<&FileUpload> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }
}

impl FormData {
    /// An empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    /// Appends a file part.
    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.push_file(name, file);
        self
    }

    /// Appends a text field in place.
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), FormValue::Text(value.into())));
    }

    /// Appends a text field in place when a value is present.
    pub fn push_text_opt(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push_text(name, value);
        }
    }

    /// Appends a file part in place.
    pub fn push_file(&mut self, name: impl Into<String>, file: FileUpload) {
        self.fields.push((name.into(), FormValue::File(file)));
    }

    /// The first value of the named field.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// All values of the named field, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// The fields, in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The field names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_multipart(&self) -> crate::Result<Form> {
        let mut form = Form::new();

        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File(file) => form.part(name.clone(), file.to_part()?),
            };
        }

        Ok(form)
    }
}

/// A file attached to a multipart form.
#[derive(Clone)]
pub struct FileUpload {
    file_name: String,
    mime: Option<String>,
    bytes: Vec<u8>,
}

impl FileUpload {
    /// A file with the given name and contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, naming the part after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(file_name, bytes))
    }

    /// Sets the content type of the part.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// The file name sent with the part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The content type, if one was set.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// The file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn to_part(&self) -> crate::Result<Part> {
        let part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());

        match &self.mime {
            Some(mime) => part
                .mime_str(mime)
                .map_err(|e| GatewayError::Encode(format!("invalid content type '{mime}': {e}"))),
            None => Ok(part),
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}
