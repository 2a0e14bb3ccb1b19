/*
 * Responsibility
 * - envoy.service.auth.v2 CheckRequest / CheckResponse (pb)
 * - v2 message ↔ 内部 Request / Decision の変換
 * - gRPC service (server) の登録口
 */
pub mod pb;
pub mod server;

use self::pb::check_response::HttpResponse;
use self::pb::{
    CheckRequest, CheckResponse, DeniedHttpResponse, HeaderValue, HeaderValueOption, HttpStatus,
    OkHttpResponse,
};
use super::{V2, WireProtocol, header_mutations, rpc_status, split_target};
use crate::services::authz::{Decision, Headers, Request};

impl WireProtocol for V2 {
    const VERSION: &'static str = "v2";

    type CheckRequest = CheckRequest;
    type CheckResponse = CheckResponse;

    fn into_request(message: CheckRequest) -> Request {
        let attributes = message.attributes.unwrap_or_default();
        let http = attributes
            .request
            .and_then(|request| request.http)
            .unwrap_or_default();
        let (path, query) = split_target(http.path, http.query);

        Request {
            id: http.id,
            context: attributes.context_extensions.into_iter().collect(),
            headers: http.headers.into_iter().collect::<Headers>(),
            method: http.method,
            scheme: http.scheme,
            host: http.host,
            path,
            query,
        }
    }

    fn from_decision(decision: &Decision) -> CheckResponse {
        let status = Some(rpc_status(decision));

        if decision.is_allowed() {
            let headers = header_mutations(decision.injected_headers())
                .map(|(key, value, append)| HeaderValueOption {
                    header: Some(HeaderValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    }),
                    append: Some(append),
                })
                .collect();

            CheckResponse {
                status,
                http_response: Some(HttpResponse::OkResponse(OkHttpResponse { headers })),
            }
        } else {
            CheckResponse {
                status,
                http_response: Some(HttpResponse::DeniedResponse(DeniedHttpResponse {
                    status: Some(HttpStatus {
                        code: i32::from(decision.status().as_u16()),
                    }),
                    ..Default::default()
                })),
            }
        }
    }
}
