// ── Controller façade ──
//
// Typed domain reads and the prefix-list push on top of one logged-in
// `SessionClient`. Every call is a single request awaited in sequence.

use serde_json::Value;
use tracing::{debug, info, warn};
use vmanage_api::{PutResponse, SessionClient, normalize, normalize_or_empty};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{DeviceAssociation, NgfwRule, ParcelSummary, PrefixObject};
use crate::prefix::{PrefixEntry, PrefixListUpdate};
use crate::record::{Record, records};

// ── Endpoints ───────────────────────────────────────────────────────

const DEVICES: &str = "/device";
const POLICY_GROUPS: &str = "/v1/policy-group";
const POLICY_OBJECT_PROFILES: &str = "/v1/feature-profile/sdwan/policy-object";
const AAR_PROFILES: &str = "/v1/feature-profile/sdwan/application-priority";
const NGFW_PROFILES: &str = "/v1/feature-profile/sdwan/embedded-security";
const DATA_PREFIX_PARCEL: &str = "security-data-ip-prefix";

/// Path of a data-prefix parcel collection, or of one parcel when
/// `parcel_id` is given.
pub fn prefix_parcel_path(profile_id: &str, parcel_id: Option<&str>) -> String {
    match parcel_id {
        Some(parcel) => format!("{POLICY_OBJECT_PROFILES}/{profile_id}/{DATA_PREFIX_PARCEL}/{parcel}"),
        None => format!("{POLICY_OBJECT_PROFILES}/{profile_id}/{DATA_PREFIX_PARCEL}"),
    }
}

/// An authenticated connection to one controller.
pub struct Controller {
    config: ControllerConfig,
    client: SessionClient,
}

impl Controller {
    /// Log in and return a ready controller.
    pub async fn connect(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        debug!(url = %config.url, tls = ?config.tls, "connecting to controller");

        let client =
            SessionClient::connect(config.url.as_str(), &config.credentials, &transport).await?;
        info!(url = %config.url, "authenticated");

        Ok(Self { config, client })
    }

    /// Wrap an already logged-in session.
    pub fn from_session(config: ControllerConfig, client: SessionClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionClient {
        &self.client
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get(&self, path: &str) -> Result<Value, CoreError> {
        self.client
            .get(path)
            .await
            .map_err(|e| CoreError::from(e).at_endpoint(path))
    }

    /// GET a list endpoint; an unexpected shape is an error.
    async fn list(&self, path: &str) -> Result<Vec<Record>, CoreError> {
        let body = self.get(path).await?;
        let items = normalize(body).map_err(|e| CoreError::from(e).at_endpoint(path))?;
        debug!(path, count = items.len(), "listed");
        Ok(records(items))
    }

    /// GET a list endpoint; an unexpected shape reads as empty.
    async fn list_lenient(&self, path: &str) -> Result<Vec<Record>, CoreError> {
        let body = self.get(path).await?;
        Ok(records(normalize_or_empty(body)))
    }

    /// GET a single-object endpoint.
    async fn object(&self, path: &str) -> Result<Record, CoreError> {
        match self.get(path).await? {
            Value::Object(map) => Ok(Record::from(map)),
            other => Err(CoreError::UnexpectedShape {
                endpoint: path.to_owned(),
                preview: preview(&other),
            }),
        }
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn devices(&self) -> Result<Vec<Record>, CoreError> {
        self.list(DEVICES).await
    }

    // ── Policy groups ────────────────────────────────────────────────

    pub async fn policy_groups(&self) -> Result<Vec<Record>, CoreError> {
        self.list(POLICY_GROUPS).await
    }

    /// Devices associated with one policy group.
    pub async fn policy_group_devices(&self, group_id: &str) -> Result<Vec<Record>, CoreError> {
        self.list_lenient(&format!("{POLICY_GROUPS}/{group_id}/device/associate"))
            .await
    }

    /// Association cell for a policy group. Never fails: lookup errors
    /// become [`DeviceAssociation::Error`].
    pub async fn device_association(&self, group_id: &str) -> DeviceAssociation {
        if group_id.is_empty() {
            return DeviceAssociation::Devices(Vec::new());
        }
        match self.policy_group_devices(group_id).await {
            Ok(devices) => DeviceAssociation::from_records(&devices),
            Err(e) => {
                warn!(group_id, error = %e, "failed to read device associations");
                DeviceAssociation::Error(e.to_string())
            }
        }
    }

    // ── Data-prefix objects ──────────────────────────────────────────

    pub async fn policy_object_profiles(&self) -> Result<Vec<Record>, CoreError> {
        self.list(POLICY_OBJECT_PROFILES).await
    }

    /// Every data-prefix parcel of every policy-object profile, numbered
    /// from 1 in profile then parcel order.
    pub async fn prefix_objects(&self) -> Result<Vec<PrefixObject>, CoreError> {
        let profiles = self.policy_object_profiles().await?;
        let mut objects = Vec::new();

        for profile in &profiles {
            let profile_id = profile.str("profileId", "");
            if profile_id.is_empty() {
                debug!("skipping policy-object profile without profileId");
                continue;
            }
            let parcels = self
                .list_lenient(&prefix_parcel_path(&profile_id, None))
                .await?;
            for parcel in parcels {
                objects.push(PrefixObject::from_parcel(objects.len() + 1, &profile_id, parcel));
            }
        }

        Ok(objects)
    }

    /// Re-read one data-prefix parcel.
    pub async fn prefix_object(&self, profile_id: &str, parcel_id: &str) -> Result<Record, CoreError> {
        self.object(&prefix_parcel_path(profile_id, Some(parcel_id)))
            .await
    }

    /// Replace a data-prefix parcel's entry list.
    ///
    /// A non-2xx answer is not an error: the response comes back with its
    /// status and body for the caller to report.
    pub async fn push_prefix_update(
        &self,
        profile_id: &str,
        parcel_id: &str,
        name: &str,
        entries: &[PrefixEntry],
    ) -> Result<PutResponse, CoreError> {
        let path = prefix_parcel_path(profile_id, Some(parcel_id));
        let payload = PrefixListUpdate::new(name, entries);
        info!(name, parcel_id, count = entries.len(), "pushing prefix list");
        Ok(self.client.put(&path, &payload).await?)
    }

    // ── Application-aware routing ────────────────────────────────────

    pub async fn aar_profiles(&self) -> Result<Vec<Record>, CoreError> {
        self.list(&format!("{AAR_PROFILES}?referenceCount=true"))
            .await
    }

    /// Parcels (with sub-parcels) associated with an AAR profile.
    pub async fn aar_parcels(&self, profile_id: &str) -> Result<Vec<ParcelSummary>, CoreError> {
        if profile_id.is_empty() {
            return Err(CoreError::NotFound {
                entity_type: "AAR profile".into(),
                identifier: "(no profileId)".into(),
            });
        }
        let profile = self.object(&format!("{AAR_PROFILES}/{profile_id}")).await?;
        Ok(profile
            .records_at(&["associatedProfileParcels"])
            .iter()
            .map(ParcelSummary::from)
            .collect())
    }

    // ── NGFW ─────────────────────────────────────────────────────────

    pub async fn ngfw_profiles(&self) -> Result<Vec<Record>, CoreError> {
        self.list(NGFW_PROFILES).await
    }

    pub async fn ngfw_parcels(&self, profile_id: &str) -> Result<Vec<Record>, CoreError> {
        self.list(&format!("{NGFW_PROFILES}/{profile_id}/unified/ngfirewall"))
            .await
    }

    /// Name of a policy object, or `ref_id` itself when it can't be read.
    pub async fn friendly_name(&self, ref_id: &str) -> String {
        match self.get(&format!("{POLICY_OBJECT_PROFILES}/{ref_id}")).await {
            Ok(Value::Object(map)) => Record::from(map).str("name", ref_id),
            Ok(_) => ref_id.to_owned(),
            Err(e) => {
                debug!(ref_id, error = %e, "policy object lookup failed");
                ref_id.to_owned()
            }
        }
    }

    /// Replace list reference ids in `rules` with friendly names.
    pub async fn resolve_list_names(&self, rules: &mut [NgfwRule]) {
        for rule in rules {
            for list_ref in rule.list_refs_mut() {
                list_ref.name = Some(self.friendly_name(&list_ref.id).await);
            }
        }
    }
}

fn preview(value: &Value) -> String {
    let rendered = value.to_string();
    rendered.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_parcel_paths() {
        assert_eq!(
            prefix_parcel_path("prof-1", None),
            "/v1/feature-profile/sdwan/policy-object/prof-1/security-data-ip-prefix"
        );
        assert_eq!(
            prefix_parcel_path("prof-1", Some("parcel-9")),
            "/v1/feature-profile/sdwan/policy-object/prof-1/security-data-ip-prefix/parcel-9"
        );
    }
}
