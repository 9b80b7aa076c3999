//! Vault seal status display.

use crate::error::Result;
use vaultctl_common::term;
use vaultctl_vault::{SealStatusResponse, VaultClient, VaultConfig};

/// Labelled rows describing a seal status, in display order.
#[must_use]
pub fn seal_status_rows(resp: &SealStatusResponse) -> Vec<(&'static str, String)> {
    let mut rows = Vec::with_capacity(6);
    let status = if resp.sealed {
        "sealed"
    } else {
        rows.push(("Cluster name", resp.cluster_name.clone()));
        rows.push(("Cluster ID", resp.cluster_id.clone()));
        "unsealed"
    };

    rows.push(("Seal status", status.to_string()));
    rows.push(("Key threshold/shares", format!("{}/{}", resp.t, resp.n)));
    rows.push(("Progress", format!("{}/{}", resp.progress, resp.t)));
    rows.push(("Version", resp.version.clone()));
    rows
}

/// Print a seal status as key/value rows.
pub fn print_seal_status(resp: &SealStatusResponse) {
    for (label, value) in seal_status_rows(resp) {
        term::print_kv(label, value);
    }
}

/// Fetch and print the seal status of the Vault server at `address`.
///
/// # Errors
///
/// Returns an error if the address is invalid or the request fails.
pub async fn show_vault_status(address: &str) -> Result<()> {
    let client = VaultClient::new(VaultConfig::new(address))?;
    let status = client.seal_status().await?;
    print_seal_status(&status);
    Ok(())
}
