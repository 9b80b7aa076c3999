//! Test fixtures with sample data.

use serde_json::{Value, json};

/// A contexts file with two contexts covering renames and decoding.
pub const SAMPLE_CONTEXTS_HCL: &str = r#"
context "dev" {
  secret "database" {
    path = "secret/data/dev/db"

    key "username" {}

    key "password" {
      export_name = "DB_PASSWORD"
    }
  }

  secret "tls" {
    path = "secret/data/dev/tls"

    key "ca_cert" {
      export_name   = "CA_CERT"
      base64_decode = true
    }
  }
}

context "prod" {
  secret "database" {
    path = "secret/data/prod/db"

    key "password" {
      export_name = "DB_PASSWORD"
    }
  }
}
"#;

/// A cluster configuration with one addressed and one server-only cluster.
pub const SAMPLE_CONFIG_HCL: &str = r#"
cluster "prod" {
  address = "https://vault.prod.example.com:8200"
  servers = ["https://vault-0.prod.example.com:8200", "https://vault-1.prod.example.com:8200"]
}

cluster "staging" {
  servers = ["https://vault-0.staging.example.com:8200"]
}
"#;

/// DER header bytes of a real certificate followed by filler.
pub const SAMPLE_DER_PREFIX: &[u8] = &[
    0x30, 0x82, 0x03, 0x0b, 0x30, 0x82, 0x01, 0xf3, 0xa0, 0x03, 0x02, 0x01, 0x02, 0x02, 0x14,
    0x1d, 0x7c, 0x2a, 0x53, 0x44, 0x6e, 0x10, 0x9b, 0x5e, 0x22, 0x71, 0x0f, 0xa8, 0x3c, 0x90,
];

/// Build a KV v2 read response around the given fields.
#[must_use]
pub fn kv_v2_response(fields: Value) -> Value {
    json!({
        "request_id": "0f6bc5e1-5c7f-4d1e-8f38-7b0f1f6f0a11",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": fields,
            "metadata": {
                "created_time": "2024-05-01T12:00:00.000000Z",
                "deletion_time": "",
                "destroyed": false,
                "version": 1
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// Vault's body for a 403 response.
#[must_use]
pub fn permission_denied_body() -> Value {
    json!({ "errors": ["1 error occurred:\n\t* permission denied\n\n"] })
}
