use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The logical SQL server a pool lives on. Only read, to learn where new pools must be placed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub location: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub properties: Option<ServerProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProperties {
    #[serde(default)]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_read_from_server() {
        let server: Server = serde_json::from_str(
            r#"{
                "id": "/subscriptions/s/resourceGroups/group1/providers/Microsoft.Sql/servers/server1",
                "name": "server1",
                "location": "Japan East",
                "kind": "v12.0",
                "properties": {
                    "fullyQualifiedDomainName": "server1.database.windows.net",
                    "version": "12.0",
                    "state": "Ready",
                    "administratorLogin": "dummylogin"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(server.location, "Japan East");
        assert_eq!(
            server.properties.unwrap().fully_qualified_domain_name.as_deref(),
            Some("server1.database.windows.net")
        );
    }

    #[test]
    fn server_without_location_is_rejected() {
        assert!(serde_json::from_str::<Server>(r#"{ "name": "server1" }"#).is_err());
    }
}
