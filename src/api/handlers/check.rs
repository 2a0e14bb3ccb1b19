use std::marker::PhantomData;

use envoy_types::ext_authz::v3::pb::{
    Authorization as AuthorizationV3, CheckRequest as CheckRequestV3,
    CheckResponse as CheckResponseV3,
};
use tonic::{Request, Response, Status};

use crate::protocol::v2::pb::{CheckRequest as CheckRequestV2, CheckResponse as CheckResponseV2};
use crate::protocol::v2::server::Authorization as AuthorizationV2;
use crate::protocol::{V2, V3, WireProtocol};
use crate::state::AppState;

/// `envoy.service.auth.{v2,v3}.Authorization/Check`
///
/// Always answers with a complete check response of the same version `P`;
/// denials travel inside the message, never as a gRPC error.
#[derive(Debug)]
pub struct CheckHandler<P> {
    state: AppState,
    _protocol: PhantomData<fn() -> P>,
}

impl<P: WireProtocol> CheckHandler<P> {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            _protocol: PhantomData,
        }
    }

    pub fn respond(&self, message: P::CheckRequest) -> P::CheckResponse {
        let request = P::into_request(message);
        let outcome = self.state.check.check(&request);

        tracing::debug!(
            version = P::VERSION,
            id = %request.id,
            allowed = outcome.decision.is_allowed(),
            status = outcome.decision.status().as_u16(),
            "check completed"
        );

        P::from_decision(&outcome.decision)
    }
}

#[tonic::async_trait]
impl AuthorizationV3 for CheckHandler<V3> {
    async fn check(
        &self,
        request: Request<CheckRequestV3>,
    ) -> Result<Response<CheckResponseV3>, Status> {
        Ok(Response::new(self.respond(request.into_inner())))
    }
}

#[tonic::async_trait]
impl AuthorizationV2 for CheckHandler<V2> {
    async fn check(
        &self,
        request: Request<CheckRequestV2>,
    ) -> Result<Response<CheckResponseV2>, Status> {
        Ok(Response::new(self.respond(request.into_inner())))
    }
}
