//! ViaCEP-compatible postal lookup over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use expoquote_core::config::PostalConfig;
use expoquote_core::intake::{AddressFields, LookupError, LookupOutcome, PostalLookup};
use serde_json::Value;
use tracing::debug;

pub struct ViaCepLookup {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepLookup {
    pub fn new(config: &PostalConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LookupError::Unavailable(error.to_string()))?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub fn endpoint(&self, postal_code: &str) -> String {
        format!("{}/{postal_code}/json/", self.base_url)
    }
}

#[async_trait]
impl PostalLookup for ViaCepLookup {
    async fn lookup(&self, postal_code: &str) -> Result<LookupOutcome, LookupError> {
        let url = self.endpoint(postal_code);
        debug!(event_name = "intake.postal_lookup.request", url = %url, "querying postal service");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| LookupError::Unavailable(error.to_string()))?;

        // ViaCEP answers 400 for malformed codes; treat it as a miss.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(LookupOutcome::NotFound);
        }
        let response = response
            .error_for_status()
            .map_err(|error| LookupError::Unavailable(error.to_string()))?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|error| LookupError::Unavailable(error.to_string()))?;

        parse_payload(&payload)
    }
}

/// Maps a ViaCEP body. `erro` may arrive as `true` or `"true"`.
pub fn parse_payload(payload: &Value) -> Result<LookupOutcome, LookupError> {
    let not_found = match payload.get("erro") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
        _ => false,
    };
    if not_found {
        return Ok(LookupOutcome::NotFound);
    }

    let Some(object) = payload.as_object() else {
        return Err(LookupError::Unavailable("postal service returned a non-object body".into()));
    };
    let field = |key: &str| {
        object.get(key).and_then(Value::as_str).map(str::trim).unwrap_or_default().to_string()
    };

    Ok(LookupOutcome::Found(AddressFields {
        street: field("logradouro"),
        city: field("localidade"),
        state: field("uf"),
    }))
}

#[cfg(test)]
mod tests {
    use expoquote_core::config::PostalConfig;
    use expoquote_core::intake::{AddressFields, LookupOutcome};
    use serde_json::json;

    use super::{parse_payload, ViaCepLookup};

    #[test]
    fn found_payload_maps_address_fields() {
        let payload = json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP"
        });

        assert_eq!(
            parse_payload(&payload).expect("parsed"),
            LookupOutcome::Found(AddressFields {
                street: "Praça da Sé".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            })
        );
    }

    #[test]
    fn erro_flag_is_a_soft_miss_in_both_encodings() {
        assert_eq!(parse_payload(&json!({"erro": true})).expect("bool"), LookupOutcome::NotFound);
        assert_eq!(
            parse_payload(&json!({"erro": "true"})).expect("string"),
            LookupOutcome::NotFound
        );
    }

    #[test]
    fn non_object_body_is_unavailable() {
        assert!(parse_payload(&json!(["unexpected"])).is_err());
    }

    #[test]
    fn endpoint_follows_viacep_layout() {
        let lookup = ViaCepLookup::new(&PostalConfig {
            base_url: "https://viacep.com.br/ws/".to_string(),
            timeout_secs: 5,
        })
        .expect("client");

        assert_eq!(lookup.endpoint("01001000"), "https://viacep.com.br/ws/01001000/json/");
    }
}
