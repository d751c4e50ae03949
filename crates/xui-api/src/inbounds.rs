// Inbound client operations
//
// Every mutating call targets an inbound; callers may pass one explicitly,
// otherwise the configured default applies. The panel has no lookup by
// external id, so `client_by_tg_id` filters the inbound's settings locally.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::{ApiResponse, Method, XuiClient};
use crate::error::Error;
use crate::models::{ClientPatch, ClientRecord, InboundSettings, settings_payload, tg_id_from_value};

const INBOUNDS_ENDPOINT: &str = "panel/api/inbounds/";

/// Parse an inbound identifier into the integer the panel expects.
fn inbound_number(inbound: &str) -> Result<i64, Error> {
    inbound
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInbound(inbound.to_owned()))
}

impl XuiClient {
    /// Fetch the raw inbound (including its encoded `settings`).
    ///
    /// `GET panel/api/inbounds/get/{inbound}`
    pub async fn list_clients(&self, inbound: Option<&str>) -> Result<ApiResponse, Error> {
        let inbound = self.resolve_inbound(inbound);
        self.perform(Method::Get, &format!("{INBOUNDS_ENDPOINT}get/{inbound}"), None)
            .await
    }

    /// Find the client whose `tgId` equals `tg_id`.
    ///
    /// Returns `Ok(None)` when nothing matches, when the inbound could not
    /// be fetched, or when its `settings` fail to decode. The first match
    /// wins if the panel holds duplicates.
    pub async fn client_by_tg_id(
        &self,
        tg_id: i64,
        inbound: Option<&str>,
    ) -> Result<Option<ClientRecord>, Error> {
        let response = self.list_clients(inbound).await?;

        let Some(raw) = response
            .body()
            .and_then(|b| b.pointer("/obj/settings"))
            .and_then(Value::as_str)
        else {
            debug!(tg_id, "inbound settings unavailable; treating as not found");
            return Ok(None);
        };

        let found = InboundSettings::decode(raw)
            .clients
            .into_iter()
            .find(|c| c.get("tgId").and_then(tg_id_from_value) == Some(tg_id))
            .and_then(|c| serde_json::from_value(c).ok());
        Ok(found)
    }

    /// Traffic counters for one client.
    ///
    /// `GET panel/api/inbounds/getClientTrafficsById/{uuid}`
    pub async fn traffic_by_uuid(&self, uuid: &str) -> Result<ApiResponse, Error> {
        self.perform(
            Method::Get,
            &format!("{INBOUNDS_ENDPOINT}getClientTrafficsById/{uuid}"),
            None,
        )
        .await
    }

    /// Update an existing client; only the patch's supplied fields are sent.
    ///
    /// `POST panel/api/inbounds/updateClient/{uuid}`
    pub async fn update_client(
        &self,
        patch: &ClientPatch,
        inbound: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let inbound = inbound_number(self.resolve_inbound(inbound))?;
        let payload = settings_payload(inbound, patch)?;
        self.perform(
            Method::Post,
            &format!("{INBOUNDS_ENDPOINT}updateClient/{}", patch.uuid),
            Some(&payload),
        )
        .await
    }

    /// Add a client, filling unset fields with defaults.
    ///
    /// `POST panel/api/inbounds/addClient`
    pub async fn add_client(
        &self,
        patch: ClientPatch,
        inbound: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let inbound = inbound_number(self.resolve_inbound(inbound))?;
        let payload = settings_payload(inbound, &patch.into_record())?;
        self.perform(
            Method::Post,
            &format!("{INBOUNDS_ENDPOINT}addClient"),
            Some(&payload),
        )
        .await
    }

    /// Remove a client from an inbound.
    ///
    /// `POST panel/api/inbounds/deleteClient/{uuid}`
    pub async fn delete_client(
        &self,
        uuid: &str,
        inbound: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let inbound = inbound_number(self.resolve_inbound(inbound))?;
        self.perform(
            Method::Post,
            &format!("{INBOUNDS_ENDPOINT}deleteClient/{uuid}"),
            Some(&json!({ "id": inbound })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_ids_must_be_integers() {
        assert!(matches!(inbound_number("2"), Ok(2)));
        assert!(matches!(inbound_number(" 17 "), Ok(17)));
        assert!(matches!(inbound_number("two"), Err(Error::InvalidInbound(ref s)) if s == "two"));
    }
}
