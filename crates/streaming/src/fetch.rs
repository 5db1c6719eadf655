use std::rc::Rc;

/// Boxed future without a `Send` bound; everything here runs on the UI thread.
pub use futures_util::future::LocalBoxFuture;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    Status { url: String, status: u16 },
    /// The request never produced a response.
    Network { url: String, message: String },
    /// The body was not the JSON we expected.
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status { url, status } => write!(f, "GET {url} returned HTTP {status}"),
            FetchError::Network { url, message } => write!(f, "GET {url} failed: {message}"),
            FetchError::Decode { url, message } => {
                write!(f, "GET {url} returned invalid JSON: {message}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// HTTP GET returning a parsed JSON body.
///
/// The browser front-end implements this over `gloo-net`, native tools over
/// `reqwest`. Implementations must map non-2xx responses to
/// [`FetchError::Status`].
pub trait Fetch {
    fn get_json<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>>;
}

impl<T: Fetch + ?Sized> Fetch for Rc<T> {
    fn get_json<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>> {
        (**self).get_json(url)
    }
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::ScriptedFetch;

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    use serde_json::Value;

    use super::{Fetch, FetchError, LocalBoxFuture};

    #[derive(Debug, Clone)]
    enum Reply {
        Json(Value),
        Status(u16),
    }

    /// In-memory fetcher with per-URL replies, call counters and gates.
    ///
    /// Unknown URLs answer HTTP 404. A gated URL stays pending until its gate
    /// is opened, which lets tests interleave overlapping requests.
    #[derive(Debug, Default)]
    pub struct ScriptedFetch {
        replies: RefCell<BTreeMap<String, Reply>>,
        calls: RefCell<BTreeMap<String, usize>>,
        gates: RefCell<BTreeMap<String, Rc<Cell<bool>>>>,
    }

    impl ScriptedFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond_json(&self, url: impl Into<String>, body: Value) -> &Self {
            self.replies.borrow_mut().insert(url.into(), Reply::Json(body));
            self
        }

        pub fn respond_status(&self, url: impl Into<String>, status: u16) -> &Self {
            self.replies
                .borrow_mut()
                .insert(url.into(), Reply::Status(status));
            self
        }

        /// Holds responses for `url` until the returned flag is set to `true`.
        pub fn gate(&self, url: impl Into<String>) -> Rc<Cell<bool>> {
            let flag = Rc::new(Cell::new(false));
            self.gates.borrow_mut().insert(url.into(), flag.clone());
            flag
        }

        pub fn calls(&self, url: &str) -> usize {
            self.calls.borrow().get(url).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.calls.borrow().values().sum()
        }
    }

    struct Gate(Option<Rc<Cell<bool>>>);

    impl Future for Gate {
        type Output = ();

        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
            match &self.0 {
                Some(flag) if !flag.get() => Poll::Pending,
                _ => Poll::Ready(()),
            }
        }
    }

    impl Fetch for ScriptedFetch {
        fn get_json<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>> {
            *self.calls.borrow_mut().entry(url.to_string()).or_insert(0) += 1;
            let gate = Gate(self.gates.borrow().get(url).cloned());

            Box::pin(async move {
                gate.await;
                let reply = self.replies.borrow().get(url).cloned();
                match reply {
                    Some(Reply::Json(v)) => Ok(v),
                    Some(Reply::Status(status)) => Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    }),
                    None => Err(FetchError::Status {
                        url: url.to_string(),
                        status: 404,
                    }),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;
    use serde_json::{Value, json};

    use super::{Fetch, FetchError, LocalBoxFuture};

    struct Fixed(Value);

    impl Fetch for Fixed {
        fn get_json<'a>(&'a self, _url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>> {
            async move { Ok(self.0.clone()) }.boxed_local()
        }
    }

    #[test]
    fn boxed_local_futures_satisfy_fetch() {
        let fetch = std::rc::Rc::new(Fixed(json!({"ok": true})));
        let body = pollster::block_on(fetch.get_json("anything")).unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[test]
    fn status_error_names_the_url() {
        let err = FetchError::Status {
            url: "/static/x.json".into(),
            status: 404,
        };
        assert_eq!(err.url(), "/static/x.json");
        assert_eq!(err.to_string(), "GET /static/x.json returned HTTP 404");
    }
}
