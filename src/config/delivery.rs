//! Delivery tracking configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_SECRET_LEN: usize = 32;
const MIN_LINK_TTL_SECS: i64 = 60;
const MAX_LINK_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Base of the public tracking page, e.g. `https://track.example.com`
    pub tracking_base_url: String,

    /// HMAC key used to sign tracking links
    pub link_signing_secret: Secret<String>,

    /// Lifetime of issued tracking links in seconds
    #[serde(default = "default_link_ttl")]
    pub link_ttl_secs: i64,

    /// Buffered events per realtime channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl DeliveryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.tracking_base_url.starts_with("http://")
            && !self.tracking_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidTrackingUrl(
                self.tracking_base_url.clone(),
            ));
        }
        if self.link_signing_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ValidationError::SigningSecretTooShort(MIN_SECRET_LEN));
        }
        if !(MIN_LINK_TTL_SECS..=MAX_LINK_TTL_SECS).contains(&self.link_ttl_secs) {
            return Err(ValidationError::InvalidLinkTtl);
        }
        if self.channel_capacity == 0 || self.channel_capacity > 10_000 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

fn default_link_ttl() -> i64 {
    // 24 hours
    86_400
}

fn default_channel_capacity() -> usize {
    128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeliveryConfig {
        DeliveryConfig {
            tracking_base_url: "https://track.example.com".to_string(),
            link_signing_secret: Secret::new("x".repeat(MIN_SECRET_LEN)),
            link_ttl_secs: default_link_ttl(),
            channel_capacity: default_channel_capacity(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = DeliveryConfig {
            link_signing_secret: Secret::new("short".to_string()),
            ..config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SigningSecretTooShort(MIN_SECRET_LEN))
        );
    }

    #[test]
    fn test_ttl_bounds() {
        let too_short = DeliveryConfig {
            link_ttl_secs: 10,
            ..config()
        };
        let too_long = DeliveryConfig {
            link_ttl_secs: MAX_LINK_TTL_SECS + 1,
            ..config()
        };
        assert_eq!(too_short.validate(), Err(ValidationError::InvalidLinkTtl));
        assert_eq!(too_long.validate(), Err(ValidationError::InvalidLinkTtl));
    }
}
