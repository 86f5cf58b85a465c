//! VPSie request and response models.
//!
//! Records decode tolerantly: a key missing from a response, or sent as
//! `null`, leaves the field at its default, matching how the provider omits
//! empty values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vpsie_core::envelope::null_as_default;
use vpsie_core::form::FormParams;

/// A purchasable VPS plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Offer {
    /// Offer identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// vCPU count.
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: u32,
    /// RAM in MiB.
    #[serde(deserialize_with = "null_as_default")]
    pub ram: u32,
    /// SSD size in GiB.
    #[serde(deserialize_with = "null_as_default")]
    pub ssd: u32,
    /// Monthly traffic allowance.
    #[serde(deserialize_with = "null_as_default")]
    pub traffic: u64,
    /// Price in the account currency.
    #[serde(deserialize_with = "null_as_default")]
    pub price: u64,
}

/// A datacenter a VPS can be placed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Datacenter {
    /// Datacenter identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Display name.
    #[serde(rename = "dc_name", deserialize_with = "null_as_default")]
    pub name: String,
    /// State or region.
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// Country.
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
}

/// An operating system image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Image {
    /// Image identifier, used as `os_id` when creating a VPS.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Display name.
    #[serde(rename = "image_name", deserialize_with = "null_as_default")]
    pub name: String,
    /// Distribution family.
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
}

/// A provisioned virtual private server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Vps {
    /// VPS identifier.
    #[serde(rename = "vpsie_id", deserialize_with = "null_as_default")]
    pub id: String,
    /// Hostname.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// RAM in MiB.
    #[serde(deserialize_with = "null_as_default")]
    pub ram: u32,
    /// SSD size in GiB.
    #[serde(deserialize_with = "null_as_default")]
    pub ssd: u32,
    /// vCPU count.
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: u32,
    /// Bandwidth allowance (the provider spells the key `bandwith`).
    #[serde(rename = "bandwith", deserialize_with = "null_as_default")]
    pub bandwidth: u64,
    /// Free-form note.
    #[serde(deserialize_with = "null_as_default")]
    pub note: String,
    /// Initial root password, present right after creation.
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    /// Operating system slug.
    #[serde(deserialize_with = "null_as_default")]
    pub os_slug: String,
    /// Distribution name.
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: String,
    /// Region name.
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    /// Public IPv4 address.
    #[serde(deserialize_with = "null_as_default")]
    pub ipv4: String,
    /// Public IPv6 address.
    #[serde(deserialize_with = "null_as_default")]
    pub ipv6: String,
    /// Private network address.
    #[serde(deserialize_with = "null_as_default")]
    pub private_ip: String,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    /// Power/provisioning status.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Identifier of the process handling the last action.
    #[serde(deserialize_with = "null_as_default")]
    pub process_id: String,
}

/// Result of an asynchronous VPS action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActionResponse {
    /// Action name.
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    /// Action status.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Identifier of the process handling the action.
    #[serde(deserialize_with = "null_as_default")]
    pub process_id: String,
}

/// Result of a password reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordResponse {
    /// Action metadata.
    #[serde(flatten)]
    pub action: ActionResponse,
    /// The new root password.
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
}

/// Result of a backup request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupResponse {
    /// Action metadata.
    #[serde(flatten)]
    pub action: ActionResponse,
    /// Name given to the backup.
    #[serde(default, rename = "backupname", deserialize_with = "null_as_default")]
    pub backup_name: String,
}

/// Result of a snapshot request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotResponse {
    /// Action metadata.
    #[serde(flatten)]
    pub action: ActionResponse,
    /// Name given to the snapshot.
    #[serde(default, rename = "snapname", deserialize_with = "null_as_default")]
    pub snapshot_name: String,
}

/// Result of a rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebuildResponse {
    /// Action metadata.
    #[serde(flatten)]
    pub action: ActionResponse,
    /// Identifier of the rebuilt VPS.
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_vpsie_id: String,
}

/// Resource usage series for one VPS. All series share the `time` axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatisticsGraph {
    /// CPU usage samples.
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: Vec<f32>,
    /// RAM usage samples.
    #[serde(deserialize_with = "null_as_default")]
    pub ram: Vec<f32>,
    /// Disk bytes read.
    #[serde(rename = "diskread", deserialize_with = "null_as_default")]
    pub disk_read: Vec<i64>,
    /// Disk bytes written.
    #[serde(rename = "diskwrite", deserialize_with = "null_as_default")]
    pub disk_write: Vec<i64>,
    /// Network bytes received.
    #[serde(rename = "netin", deserialize_with = "null_as_default")]
    pub net_in: Vec<i64>,
    /// Network bytes sent.
    #[serde(rename = "netout", deserialize_with = "null_as_default")]
    pub net_out: Vec<i64>,
    /// Sample timestamps as reported by the provider.
    #[serde(deserialize_with = "null_as_default")]
    pub time: Vec<String>,
}

/// Parameters for creating a VPS.
///
/// The four identifiers are always sent. Optional flags are sent only when
/// they differ from the provider's default: `ipv6`, `autobackup` and
/// `private_ip` only when set to `true`, `ipv4` only when set to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateVpsRequest {
    /// Hostname for the new VPS.
    pub hostname: String,
    /// Offer (plan) identifier.
    pub offer_id: String,
    /// Datacenter identifier.
    pub datacenter_id: String,
    /// Image identifier.
    pub os_id: String,
    /// Request an IPv6 address.
    pub ipv6: Option<bool>,
    /// Enable automatic backups.
    pub autobackup: Option<bool>,
    /// Request a public IPv4 address (on by default at the provider).
    pub ipv4: Option<bool>,
    /// Attach a private network address.
    pub private_ip: Option<bool>,
    /// Free-form note.
    pub note: Option<String>,
}

impl CreateVpsRequest {
    /// Create a request with the required fields.
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        offer_id: impl Into<String>,
        datacenter_id: impl Into<String>,
        os_id: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            offer_id: offer_id.into(),
            datacenter_id: datacenter_id.into(),
            os_id: os_id.into(),
            ..Self::default()
        }
    }

    /// Set the IPv6 flag.
    #[must_use]
    pub const fn with_ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = Some(enabled);
        self
    }

    /// Set the automatic backup flag.
    #[must_use]
    pub const fn with_autobackup(mut self, enabled: bool) -> Self {
        self.autobackup = Some(enabled);
        self
    }

    /// Set the IPv4 flag.
    #[must_use]
    pub const fn with_ipv4(mut self, enabled: bool) -> Self {
        self.ipv4 = Some(enabled);
        self
    }

    /// Set the private IP flag.
    #[must_use]
    pub const fn with_private_ip(mut self, enabled: bool) -> Self {
        self.private_ip = Some(enabled);
        self
    }

    /// Set a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Convert the request into form fields.
    #[must_use]
    pub fn to_form(&self) -> FormParams {
        let mut form = FormParams::new();
        form.push("hostname", &self.hostname);
        form.push("offer_id", &self.offer_id);
        form.push("datacenter_id", &self.datacenter_id);
        form.push("os_id", &self.os_id);
        form.push_flag("ipv6", self.ipv6, true);
        form.push_flag("autobackup", self.autobackup, true);
        form.push_flag("ipv4", self.ipv4, false);
        form.push_flag("private_ip", self.private_ip, true);
        form.push_opt("note", self.note.as_deref());
        form
    }
}

/// Target size for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    /// vCPU count.
    pub cpu: u32,
    /// SSD size in GiB.
    pub ssd: u32,
    /// RAM in MiB.
    pub ram: u32,
}

impl ResizeRequest {
    /// Convert the request into form fields.
    #[must_use]
    pub fn to_form(&self) -> FormParams {
        FormParams::new()
            .with("cpu", self.cpu)
            .with("ssd", self.ssd)
            .with("ram", self.ram)
    }
}

/// Parameters for a backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupRequest {
    /// Backup name.
    pub name: String,
    /// Optional note stored with the backup.
    pub note: Option<String>,
}

impl BackupRequest {
    /// Create a backup request with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Convert the request into form fields.
    #[must_use]
    pub fn to_form(&self) -> FormParams {
        let mut form = FormParams::new().with("backupname", &self.name);
        form.push_opt("backupnote", self.note.as_deref());
        form
    }
}

/// Parameters for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// Snapshot name.
    pub name: String,
    /// Optional note stored with the snapshot.
    pub note: Option<String>,
}

impl SnapshotRequest {
    /// Create a snapshot request with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Convert the request into form fields.
    #[must_use]
    pub fn to_form(&self) -> FormParams {
        let mut form = FormParams::new().with("snapname", &self.name);
        form.push_opt("snapnote", self.note.as_deref());
        form
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OffersPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DatacentersPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub datacenters: Vec<Datacenter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ImagesPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct VpsListPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub vpsies: Vec<Vps>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatusPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatisticsPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub graph: StatisticsGraph,
}
