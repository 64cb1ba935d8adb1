//! Signed customer tracking links.
//!
//! A link has the form
//! `{base_url}/track/{order}?courier={courier}&exp={unix}&sig={hex}` with
//! the order and courier percent-encoded. The signature is
//! `HMAC-SHA256(secret, "{len}:{order},{len}:{courier},{exp}")`, each id
//! prefixed by its byte length so that no two (order, courier) pairs share
//! a message. Verification compares signatures in constant time and
//! rejects expired links.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{CourierId, OrderId, Timestamp};

use super::LinkError;

type HmacSha256 = Hmac<Sha256>;

/// Dedup key of an (order, courier) pairing.
pub fn pairing_key(order: &OrderId, courier: &CourierId) -> String {
    format!("{}-{}", order, courier)
}

/// A link ready to be sent to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingLink {
    pub order_id: OrderId,
    pub courier_id: CourierId,
    pub url: String,
    pub expires_at: Timestamp,
}

/// Issues and verifies tracking links.
pub struct TrackingLinkSigner {
    base_url: String,
    secret: Secret<String>,
    ttl_secs: i64,
}

impl TrackingLinkSigner {
    pub fn new(base_url: impl Into<String>, secret: Secret<String>, ttl_secs: i64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
            ttl_secs,
        }
    }

    /// Issues a link valid for the configured TTL.
    pub fn issue(&self, order: &OrderId, courier: &CourierId) -> TrackingLink {
        self.issue_at(order, courier, Timestamp::now())
    }

    /// Issues a link as if the current time were `now`.
    pub fn issue_at(&self, order: &OrderId, courier: &CourierId, now: Timestamp) -> TrackingLink {
        let expires_at = now.plus_secs(self.ttl_secs);
        let exp = expires_at.as_unix_secs();
        let sig = hex::encode(self.sign(order.as_str(), courier.as_str(), exp));
        let url = format!(
            "{}/track/{}?courier={}&exp={}&sig={}",
            self.base_url,
            urlencoding::encode(order.as_str()),
            urlencoding::encode(courier.as_str()),
            exp,
            sig
        );

        TrackingLink {
            order_id: order.clone(),
            courier_id: courier.clone(),
            url,
            expires_at,
        }
    }

    /// Verifies the query parameters of a tracking link.
    ///
    /// # Errors
    ///
    /// - `Malformed` - signature is not hex
    /// - `InvalidSignature` - signature does not match
    /// - `Expired` - `exp` lies in the past relative to `now`
    pub fn verify(
        &self,
        order: &OrderId,
        courier: &CourierId,
        exp: i64,
        signature: &str,
        now: Timestamp,
    ) -> Result<(), LinkError> {
        let provided = hex::decode(signature)
            .map_err(|_| LinkError::Malformed("signature is not hex".to_string()))?;
        let expected = self.sign(order.as_str(), courier.as_str(), exp);

        if !constant_time_compare(&expected, &provided) {
            return Err(LinkError::InvalidSignature);
        }
        if now.as_unix_secs() > exp {
            return Err(LinkError::Expired(exp));
        }
        Ok(())
    }

    fn sign(&self, order: &str, courier: &str, exp: i64) -> Vec<u8> {
        let message = signing_message(order, courier, exp);
        // new_from_slice only fails for fixed-size keys, HMAC takes any length
        let mut mac = match HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(message.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

fn signing_message(order: &str, courier: &str, exp: i64) -> String {
    format!(
        "{}:{},{}:{},{}",
        order.len(),
        order,
        courier.len(),
        courier,
        exp
    )
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TrackingLinkSigner {
        TrackingLinkSigner::new(
            "https://track.example.com/",
            Secret::new("link-secret".to_string()),
            3600,
        )
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .unwrap()
    }

    #[test]
    fn pairing_key_joins_with_dash() {
        assert_eq!(
            pairing_key(&OrderId::from("o1"), &CourierId::from("c9")),
            "o1-c9"
        );
    }

    #[test]
    fn issued_link_has_expected_shape() {
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let link = signer().issue_at(&OrderId::from("o1"), &CourierId::from("c1"), now);

        assert!(link
            .url
            .starts_with("https://track.example.com/track/o1?courier=c1&exp=1700003600&sig="));
        assert_eq!(link.expires_at.as_unix_secs(), 1_700_003_600);
    }

    #[test]
    fn issued_link_verifies() {
        let signer = signer();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let order = OrderId::from("o1");
        let courier = CourierId::from("c1");
        let link = signer.issue_at(&order, &courier, now);

        let sig = query_param(&link.url, "sig");
        assert!(signer.verify(&order, &courier, 1_700_003_600, sig, now).is_ok());
    }

    #[test]
    fn tampered_courier_fails_verification() {
        let signer = signer();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let order = OrderId::from("o1");
        let link = signer.issue_at(&order, &CourierId::from("c1"), now);
        let sig = query_param(&link.url, "sig");

        let result = signer.verify(&order, &CourierId::from("c2"), 1_700_003_600, sig, now);
        assert_eq!(result, Err(LinkError::InvalidSignature));
    }

    #[test]
    fn expired_link_is_rejected() {
        let signer = signer();
        let issued = Timestamp::from_unix_secs(1_700_000_000);
        let order = OrderId::from("o1");
        let courier = CourierId::from("c1");
        let link = signer.issue_at(&order, &courier, issued);
        let sig = query_param(&link.url, "sig");

        let later = Timestamp::from_unix_secs(1_700_003_601);
        let result = signer.verify(&order, &courier, 1_700_003_600, sig, later);
        assert_eq!(result, Err(LinkError::Expired(1_700_003_600)));
    }

    #[test]
    fn non_hex_signature_is_malformed() {
        let result = signer().verify(
            &OrderId::from("o1"),
            &CourierId::from("c1"),
            0,
            "zz-not-hex",
            Timestamp::from_unix_secs(0),
        );
        assert!(matches!(result, Err(LinkError::Malformed(_))));
    }

    #[test]
    fn ids_with_dots_do_not_share_a_signature() {
        let signer = signer();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let first = signer.issue_at(&OrderId::from("a.b"), &CourierId::from("c"), now);
        let second = signer.issue_at(&OrderId::from("a"), &CourierId::from("b.c"), now);

        assert_ne!(query_param(&first.url, "sig"), query_param(&second.url, "sig"));
        let sig = query_param(&first.url, "sig");
        let swapped =
            signer.verify(&OrderId::from("a"), &CourierId::from("b.c"), 1_700_003_600, sig, now);
        assert_eq!(swapped, Err(LinkError::InvalidSignature));
    }

    #[test]
    fn ids_are_percent_encoded_in_the_url() {
        let signer = signer();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let order = OrderId::from("pedido 7/b");
        let courier = CourierId::from("c1&exp=1");
        let link = signer.issue_at(&order, &courier, now);

        assert!(link.url.starts_with(
            "https://track.example.com/track/pedido%207%2Fb?courier=c1%26exp%3D1&exp=1700003600&"
        ));
        assert_eq!(query_param(&link.url, "exp"), "1700003600");
        let sig = query_param(&link.url, "sig");
        assert!(signer.verify(&order, &courier, 1_700_003_600, sig, now).is_ok());
    }
}
