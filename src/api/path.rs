// API path building.
// Turns a chain of namespace segments plus a method name into a request URL.

use url::form_urlencoded;

use crate::config::{Format, RequestConfig};

/// A scalar that can be sent as a query parameter value.
///
/// Booleans are sent as `1` and `0`, the way PHP-style APIs expect them.
pub trait QueryValue {
    fn to_query_value(&self) -> String;
}

impl QueryValue for bool {
    fn to_query_value(&self) -> String {
        let value = if *self { "1" } else { "0" };
        value.to_string()
    }
}

impl QueryValue for str {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_value(&self) -> String {
        (**self).to_query_value()
    }
}

macro_rules! display_query_value {
    ($($ty:ty),*) => {
        $(impl QueryValue for $ty {
            fn to_query_value(&self) -> String {
                self.to_string()
            }
        })*
    };
}

display_query_value!(char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Ordered query parameters passed to an API method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<(String, String)>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter. Later parameters keep their position.
    pub fn arg(mut self, name: impl Into<String>, value: impl QueryValue) -> Self {
        self.0.push((name.into(), value.to_query_value()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Form-urlencoded query string without the leading `?`.
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: QueryValue> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Args::new(), |args, (name, value)| args.arg(name, value))
    }
}

/// Accumulated namespace segments for one chain of accesses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
}

impl Endpoint {
    pub fn root() -> Self {
        Self::default()
    }

    /// A new endpoint one level deeper. `self` is left untouched.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_lowercase());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Method path, e.g. `videos/search.json`.
    ///
    /// With no segments the path starts with a bare `/`.
    pub fn method_path(&self, method: &str, format: Format) -> String {
        format!(
            "{}/{}.{}",
            self.segments.join("/"),
            method.to_lowercase(),
            format.extension()
        )
    }

    /// Full request URL for `method` under this endpoint.
    pub fn url(&self, config: &RequestConfig, method: &str, args: &Args) -> String {
        let mut url = format!(
            "http://{}/api/{}/{}",
            config.hostname,
            config.api_version,
            self.method_path(method, config.format)
        );

        if !args.is_empty() {
            url.push('?');
            url.push_str(&args.to_query());
        }

        url
    }
}
