//! The `{ "data": ... }` success envelope.
//!
//! Every 2xx JSON body wraps its payload in [`DataResponse`], mirroring the
//! `{ "error", "code" }` shape that [`crate::error::AppError`] produces on
//! failure. Clients can therefore branch on the top-level key alone, and
//! list endpoints stay free to grow pagination fields next to `data`
//! without breaking the payload shape.

use serde::Serialize;

/// Success envelope wrapping a presence record, a friend list, a meeting,
/// or any other serializable payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_nests_under_data_key() {
        let body = DataResponse {
            data: vec![1_i64, 2, 3],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
