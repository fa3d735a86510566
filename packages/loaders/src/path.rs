//! Resource path resolution
//!
//! A [`PathGenerator`] maps the argument of a dynamic loader to a concrete
//! resource path. Equal arguments must produce equal paths; the loader
//! relies on it for deduplication but cannot check it.

use std::fmt::Display;
use std::marker::PhantomData;

/// Maps a loader argument to a resource path
pub trait PathGenerator<P>: Send + Sync + 'static {
    /// Resolve the path for `param`, or explain why it cannot be built
    fn generate(&self, param: &P) -> Result<String, String>;
}

impl<P, F> PathGenerator<P> for F
where
    F: Fn(&P) -> String + Send + Sync + 'static,
{
    fn generate(&self, param: &P) -> Result<String, String> {
        Ok(self(param))
    }
}

/// Generator backed by a fallible closure, see [`try_path`]
pub struct FalliblePath<F, E> {
    generate: F,
    _error: PhantomData<fn() -> E>,
}

impl<P, F, E> PathGenerator<P> for FalliblePath<F, E>
where
    F: Fn(&P) -> Result<String, E> + Send + Sync + 'static,
    E: Display + 'static,
{
    fn generate(&self, param: &P) -> Result<String, String> {
        (self.generate)(param).map_err(|e| e.to_string())
    }
}

/// Wrap a fallible closure as a [`PathGenerator`]
///
/// ```
/// use prism_loaders::try_path;
///
/// let artist = try_path::<_, &str>(|id: &String| {
///     if id.is_empty() {
///         Err("artist id is empty")
///     } else {
///         Ok(format!("artist/{}", id))
///     }
/// });
/// # let _ = artist;
/// ```
pub fn try_path<F, E>(generate: F) -> FalliblePath<F, E> {
    FalliblePath {
        generate,
        _error: PhantomData,
    }
}

/// Check that a resolved path can be used as a loader path
///
/// Paths must be non-empty and free of whitespace, control characters and
/// query/fragment delimiters; parameters belong in `Params`.
pub fn validate_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("resolved path is empty".to_string());
    }
    if let Some(c) = path
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || *c == '?' || *c == '#')
    {
        return Err(format!("resolved path {:?} contains {:?}", path, c));
    }
    Ok(())
}
