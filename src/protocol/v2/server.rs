//! tonic server for `envoy.service.auth.v2.Authorization`.
//!
//! Same shape as the service code tonic generates for v3 (`envoy-types`), so
//! both versions register on one `tonic::transport::Server`.

use std::convert::Infallible;
use std::sync::Arc;

use tonic::codegen::{Body, BoxFuture, Context, Poll, Service, StdError, http};
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic_prost::ProstCodec;

use super::pb::{CheckRequest, CheckResponse};

pub const SERVICE_NAME: &str = "envoy.service.auth.v2.Authorization";
const CHECK_PATH: &str = "/envoy.service.auth.v2.Authorization/Check";

#[tonic::async_trait]
pub trait Authorization: Send + Sync + 'static {
    async fn check(
        &self,
        request: tonic::Request<CheckRequest>,
    ) -> Result<tonic::Response<CheckResponse>, tonic::Status>;
}

#[derive(Debug)]
pub struct AuthorizationServer<T> {
    inner: Arc<T>,
    max_decoding_message_size: Option<usize>,
}

impl<T> AuthorizationServer<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
            max_decoding_message_size: None,
        }
    }

    /// Limit the size of a decoded request (tonic default: 4 MiB).
    pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
        self.max_decoding_message_size = Some(limit);
        self
    }
}

impl<T> Clone for AuthorizationServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_decoding_message_size: self.max_decoding_message_size,
        }
    }
}

struct CheckSvc<T>(Arc<T>);

impl<T: Authorization> UnaryService<CheckRequest> for CheckSvc<T> {
    type Response = CheckResponse;
    type Future = BoxFuture<tonic::Response<CheckResponse>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<CheckRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.check(request).await })
    }
}

impl<T, B> Service<http::Request<B>> for AuthorizationServer<T>
where
    T: Authorization,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        match req.uri().path() {
            CHECK_PATH => {
                let inner = Arc::clone(&self.inner);
                let max_decoding_message_size = self.max_decoding_message_size;
                Box::pin(async move {
                    let codec = ProstCodec::<CheckResponse, CheckRequest>::default();
                    let mut grpc = Grpc::new(codec)
                        .apply_max_message_size_config(max_decoding_message_size, None);
                    Ok(grpc.unary(CheckSvc(inner), req).await)
                })
            }
            _ => Box::pin(async move {
                let mut response = http::Response::new(tonic::body::Body::default());
                let headers = response.headers_mut();
                headers.insert(
                    tonic::Status::GRPC_STATUS,
                    (tonic::Code::Unimplemented as i32).into(),
                );
                headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }
}

impl<T> NamedService for AuthorizationServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}
