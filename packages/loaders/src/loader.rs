//! Loader builders and loaders
//!
//! A [`LoaderBuilder`] is obtained from a
//! [`LoaderFactory`](crate::LoaderFactory) and fixes everything about a
//! loader except the per-call parameters: the path (literal or generated),
//! creation-time params, the HTTP method and the response shape.
//!
//! The response shape is part of the loader's type. A default loader
//! resolves to the response body; calling
//! [`with_headers`](LoaderBuilder::with_headers) yields a loader resolving to
//! the full [`ApiResponse`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::api::{ApiResponse, HttpMethod};
use crate::error::LoaderResult;
use crate::factory::LoaderFactory;
use crate::key::{merge_params, Params};
use crate::path::PathGenerator;

/// Selects what a loader resolves to
pub trait ResponseShape: Send + Sync + 'static {
    type Output: Send + 'static;

    fn shape(response: ApiResponse) -> Self::Output;
}

/// Resolve to the response body only
#[derive(Debug, Clone, Copy)]
pub struct Body;

impl ResponseShape for Body {
    type Output = Value;

    fn shape(response: ApiResponse) -> Value {
        response.body
    }
}

/// Resolve to `{ body, headers }`
#[derive(Debug, Clone, Copy)]
pub struct BodyAndHeaders;

impl ResponseShape for BodyAndHeaders {
    type Output = ApiResponse;

    fn shape(response: ApiResponse) -> ApiResponse {
        response
    }
}

/// Literal path source
pub struct StaticPath(pub(crate) String);

/// Generated path source
pub struct DynamicPath<P> {
    pub(crate) generator: Arc<dyn PathGenerator<P>>,
}

/// Configures a loader before it is built
#[must_use = "call .build() to obtain a loader"]
pub struct LoaderBuilder<S, R = Body> {
    factory: LoaderFactory,
    source: S,
    params: Params,
    method: HttpMethod,
    _shape: PhantomData<fn() -> R>,
}

impl<S> LoaderBuilder<S, Body> {
    pub(crate) fn new(factory: LoaderFactory, source: S) -> Self {
        Self {
            factory,
            source,
            params: Params::new(),
            method: HttpMethod::default(),
            _shape: PhantomData,
        }
    }
}

impl<S, R> LoaderBuilder<S, R> {
    /// Add creation-time params, sent on every call
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Add one creation-time param
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// HTTP method of every call (GET by default)
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Resolve to `{ body, headers }` instead of the body alone
    pub fn with_headers(self) -> LoaderBuilder<S, BodyAndHeaders> {
        LoaderBuilder {
            factory: self.factory,
            source: self.source,
            params: self.params,
            method: self.method,
            _shape: PhantomData,
        }
    }
}

impl<R: ResponseShape> LoaderBuilder<StaticPath, R> {
    pub fn build(self) -> StaticPathLoader<R> {
        StaticPathLoader {
            factory: self.factory,
            path: self.source.0,
            params: self.params,
            method: self.method,
            _shape: PhantomData,
        }
    }
}

impl<P: 'static, R: ResponseShape> LoaderBuilder<DynamicPath<P>, R> {
    pub fn build(self) -> DynamicPathLoader<P, R> {
        DynamicPathLoader {
            factory: self.factory,
            generator: self.source.generator,
            params: self.params,
            method: self.method,
            _shape: PhantomData,
        }
    }
}

/// Loader bound to a fixed path
pub struct StaticPathLoader<R = Body> {
    factory: LoaderFactory,
    path: String,
    params: Params,
    method: HttpMethod,
    _shape: PhantomData<fn() -> R>,
}

impl<R: ResponseShape> StaticPathLoader<R> {
    /// Fetch the resource with the creation-time params
    pub async fn load(&self) -> LoaderResult<R::Output> {
        self.load_with(Params::new()).await
    }

    /// Fetch the resource, overriding creation-time params with `params`
    pub async fn load_with(&self, params: Params) -> LoaderResult<R::Output> {
        let params = merge_params(&self.params, params);
        self.factory
            .load(Ok(self.path.clone()), self.method, params)
            .await
            .map(R::shape)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<R> Clone for StaticPathLoader<R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            path: self.path.clone(),
            params: self.params.clone(),
            method: self.method,
            _shape: PhantomData,
        }
    }
}

/// Loader whose path is generated from a per-call argument
pub struct DynamicPathLoader<P, R = Body> {
    factory: LoaderFactory,
    generator: Arc<dyn PathGenerator<P>>,
    params: Params,
    method: HttpMethod,
    _shape: PhantomData<fn() -> R>,
}

impl<P: 'static, R: ResponseShape> DynamicPathLoader<P, R> {
    /// Fetch the resource addressed by `param`
    pub async fn load(&self, param: &P) -> LoaderResult<R::Output> {
        self.load_with(param, Params::new()).await
    }

    /// Fetch the resource addressed by `param`, overriding creation-time
    /// params with `params`
    pub async fn load_with(&self, param: &P, params: Params) -> LoaderResult<R::Output> {
        let resolved = self.generator.generate(param);
        let params = merge_params(&self.params, params);
        self.factory
            .load(resolved, self.method, params)
            .await
            .map(R::shape)
    }
}

impl<P, R> Clone for DynamicPathLoader<P, R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            generator: Arc::clone(&self.generator),
            params: self.params.clone(),
            method: self.method,
            _shape: PhantomData,
        }
    }
}
