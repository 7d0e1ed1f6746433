//! Shared gRPC utility helpers.

use std::time::Duration;

use tonic::Request;

use sso_core::RequestContext;
use sso_proto::v1 as pb;

use crate::storage::User;

const REQUEST_ID_HEADER: &str = "x-request-id";
const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Build the request context from call metadata.
///
/// Uses the caller's `x-request-id` when present and turns `grpc-timeout`
/// into a deadline.
pub fn request_context<T>(request: &Request<T>) -> RequestContext {
    let metadata = request.metadata();

    let request_id = metadata
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

    let ctx = RequestContext::new(request_id);
    match metadata
        .get(GRPC_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_grpc_timeout)
    {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    }
}

/// Parse a `grpc-timeout` value: up to 8 digits followed by a unit
/// (`H`, `M`, `S`, `m`, `u`, `n`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 || !value.is_ascii() {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

pub const fn to_timestamp(seconds: i64) -> prost_types::Timestamp {
    prost_types::Timestamp { seconds, nanos: 0 }
}

/// Storage id to wire id. Storage ids are always positive.
pub const fn id_to_wire(id: i64) -> u64 {
    id.unsigned_abs()
}

/// Wire id to storage id; `None` when no stored id can match.
pub fn id_from_wire(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

/// Convert a stored user to its wire form. The password hash never leaves.
pub fn user_to_proto(user: User) -> pb::User {
    pb::User {
        id: id_to_wire(user.id),
        email: user.email,
        email_confirmed: user.email_confirmed,
        display_name: user.display_name,
        phone: user.phone,
        phone_confirmed: user.phone_confirmed,
        telegram: user.telegram,
        telegram_confirmed: user.telegram_confirmed,
        avatar: user.avatar,
        created_at: Some(to_timestamp(user.created_at)),
        updated_at: Some(to_timestamp(user.updated_at)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_grpc_timeout_units() {
        assert_eq!(parse_grpc_timeout("2S"), Some(Duration::from_secs(2)));
        assert_eq!(parse_grpc_timeout("1H"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_grpc_timeout("3M"), Some(Duration::from_secs(180)));
        assert_eq!(parse_grpc_timeout("150m"), Some(Duration::from_millis(150)));
        assert_eq!(parse_grpc_timeout("10u"), Some(Duration::from_micros(10)));
        assert_eq!(parse_grpc_timeout("99n"), Some(Duration::from_nanos(99)));
    }

    #[test]
    fn rejects_malformed_grpc_timeout() {
        for value in ["", "S", "10", "10x", "-1S", "123456789S", "1.5S", "1é", "é"] {
            assert_eq!(parse_grpc_timeout(value), None, "{value:?}");
        }
    }

    #[test]
    fn request_id_comes_from_metadata() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("x-request-id", "abc-123".parse().unwrap());
        req.metadata_mut()
            .insert("grpc-timeout", "5S".parse().unwrap());

        let ctx = request_context(&req);
        assert_eq!(ctx.request_id(), "abc-123");
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn request_id_is_generated_when_absent() {
        let ctx = request_context(&Request::new(()));
        assert!(uuid::Uuid::parse_str(ctx.request_id()).is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn user_conversion_keeps_optional_fields() {
        let user = User {
            id: 5,
            email: "a@x.test".into(),
            password_hash: "hash".into(),
            email_confirmed: true,
            display_name: "A".into(),
            phone: None,
            phone_confirmed: false,
            telegram: Some("@alice_a".into()),
            telegram_confirmed: false,
            avatar: None,
            created_at: 100,
            updated_at: 200,
        };
        let pb = user_to_proto(user);
        assert_eq!(pb.id, 5);
        assert!(pb.phone.is_none());
        assert_eq!(pb.telegram.as_deref(), Some("@alice_a"));
        assert_eq!(pb.updated_at.unwrap().seconds, 200);
    }

    #[test]
    fn oversized_wire_id_has_no_storage_id() {
        assert_eq!(id_from_wire(u64::MAX), None);
        assert_eq!(id_from_wire(7), Some(7));
    }
}
