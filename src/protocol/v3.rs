/*
 * Responsibility
 * - envoy.service.auth.v3 CheckRequest / CheckResponse (envoy-types の pb 型)
 * - v3 message ↔ 内部 Request / Decision の変換
 * - v2 との差分: header_map (raw_value), append_action
 */
use envoy_types::pb::envoy::config::core::v3::{
    HeaderValue, HeaderValueOption, header_value_option::HeaderAppendAction,
};
use envoy_types::pb::envoy::r#type::v3::HttpStatus;
use envoy_types::pb::envoy::service::auth::v3::{
    CheckRequest, CheckResponse, DeniedHttpResponse, OkHttpResponse, check_response::HttpResponse,
};

use super::{V3, WireProtocol, header_mutations, rpc_status, split_target};
use crate::services::authz::{Decision, Headers, Request};

// `header_map` entries carry either `value` or raw bytes in `raw_value`.
// Bytes that are not UTF-8 are kept (lossily) so the name still reaches the guard.
fn header_map_value(header: HeaderValue) -> (String, String) {
    if !header.value.is_empty() || header.raw_value.is_empty() {
        return (header.key, header.value);
    }
    let value = String::from_utf8_lossy(&header.raw_value).into_owned();
    (header.key, value)
}

impl WireProtocol for V3 {
    const VERSION: &'static str = "v3";

    type CheckRequest = CheckRequest;
    type CheckResponse = CheckResponse;

    fn into_request(message: CheckRequest) -> Request {
        let attributes = message.attributes.unwrap_or_default();
        let http = attributes
            .request
            .and_then(|request| request.http)
            .unwrap_or_default();
        let (path, query) = split_target(http.path, http.query);

        let mut headers: Headers = http.headers.into_iter().collect();
        let raw = http.header_map.map(|map| map.headers).unwrap_or_default();
        for (key, value) in raw.into_iter().map(header_map_value) {
            headers.append(key, value);
        }

        Request {
            id: http.id,
            context: attributes.context_extensions.into_iter().collect(),
            headers,
            method: http.method,
            scheme: http.scheme,
            host: http.host,
            path,
            query,
        }
    }

    fn from_decision(decision: &Decision) -> CheckResponse {
        let status = Some(rpc_status(decision));

        if !decision.is_allowed() {
            return CheckResponse {
                status,
                http_response: Some(HttpResponse::DeniedResponse(DeniedHttpResponse {
                    status: Some(HttpStatus {
                        code: i32::from(decision.status().as_u16()),
                    }),
                    ..Default::default()
                })),
                ..Default::default()
            };
        }

        let headers = header_mutations(decision.injected_headers())
            .map(|(key, value, append)| HeaderValueOption {
                header: Some(HeaderValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    ..Default::default()
                }),
                append_action: if append {
                    HeaderAppendAction::AppendIfExistsOrAdd as i32
                } else {
                    HeaderAppendAction::OverwriteIfExistsOrAdd as i32
                },
                ..Default::default()
            })
            .collect();

        CheckResponse {
            status,
            http_response: Some(HttpResponse::OkResponse(OkHttpResponse {
                headers,
                ..Default::default()
            })),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use envoy_types::pb::envoy::config::core::v3::HeaderMap;
    use envoy_types::pb::envoy::service::auth::v3::{AttributeContext, attribute_context};

    use super::*;

    fn message(http: attribute_context::HttpRequest) -> CheckRequest {
        CheckRequest {
            attributes: Some(AttributeContext {
                request: Some(attribute_context::Request {
                    http: Some(http),
                    ..Default::default()
                }),
                context_extensions: [("k1", "v1"), ("k2", "v2")]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Default::default()
            }),
        }
    }

    fn raw_header(key: &str, raw: &[u8]) -> HeaderValue {
        HeaderValue {
            key: key.to_string(),
            raw_value: raw.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn maps_message_into_request() {
        let request = V3::into_request(message(attribute_context::HttpRequest {
            id: "100".to_string(),
            method: "POST".to_string(),
            headers: [("user-agent".to_string(), "Foo".to_string())].into(),
            path: "/orders".to_string(),
            host: "shop.example.com".to_string(),
            scheme: "https".to_string(),
            query: "page=2".to_string(),
            ..Default::default()
        }));

        assert_eq!(request.id, "100");
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/orders");
        assert_eq!(request.query, "page=2");
        assert_eq!(request.context.len(), 2);
        assert_eq!(request.headers.get("User-Agent"), Some("Foo"));
    }

    #[test]
    fn empty_message_maps_to_empty_request() {
        assert_eq!(V3::into_request(CheckRequest::default()), Request::default());
    }

    #[test]
    fn header_map_values_are_merged() {
        let request = V3::into_request(message(attribute_context::HttpRequest {
            header_map: Some(HeaderMap {
                headers: vec![
                    raw_header("authorization", b"Bearer abc"),
                    HeaderValue {
                        key: "x-plain".to_string(),
                        value: "1".to_string(),
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        }));

        assert_eq!(request.headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(request.headers.get("x-plain"), Some("1"));
    }

    #[test]
    fn undecodable_raw_value_keeps_the_header_name() {
        let request = V3::into_request(message(attribute_context::HttpRequest {
            header_map: Some(HeaderMap {
                headers: vec![raw_header("request-user-id", &[0xff, 0xfe, b'1'])],
            }),
            ..Default::default()
        }));

        assert!(request.headers.contains("Request-User-Id"));
    }

    #[test]
    fn allow_uses_append_actions() {
        let headers: Headers = [
            ("Request-User-Id", "1"),
            ("Request-User-Authorities", "a"),
            ("Request-User-Authorities", "b"),
        ]
        .into_iter()
        .collect();

        let response = V3::from_decision(&Decision::allow_with(headers));

        assert_eq!(response.status.map(|s| s.code), Some(0));
        let Some(HttpResponse::OkResponse(ok)) = response.http_response else {
            panic!("expected ok response");
        };
        let actions: Vec<(String, String, i32)> = ok
            .headers
            .into_iter()
            .map(|option| {
                let header = option.header.unwrap_or_default();
                (header.key, header.value, option.append_action)
            })
            .collect();
        assert_eq!(
            actions,
            [
                ("Request-User-Id".to_string(), "1".to_string(), HeaderAppendAction::OverwriteIfExistsOrAdd as i32),
                ("Request-User-Authorities".to_string(), "a".to_string(), HeaderAppendAction::OverwriteIfExistsOrAdd as i32),
                ("Request-User-Authorities".to_string(), "b".to_string(), HeaderAppendAction::AppendIfExistsOrAdd as i32),
            ]
        );
    }

    #[test]
    fn internal_error_becomes_500() {
        let response = V3::from_decision(&Decision::deny(StatusCode::INTERNAL_SERVER_ERROR));

        assert_eq!(response.status.map(|s| s.code), Some(13));
        match response.http_response {
            Some(HttpResponse::DeniedResponse(denied)) => {
                assert_eq!(denied.status.map(|s| s.code), Some(500));
                assert!(denied.headers.is_empty());
            }
            other => panic!("expected denied response, got {other:?}"),
        }
    }
}
