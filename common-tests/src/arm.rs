use azsql_common::constants::SQL_API_VERSION;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const SUBSCRIPTION_ID: &str = "00000000-1111-2222-3333-444444444444";
pub const RESOURCE_GROUP: &str = "group1";
pub const SERVER: &str = "server1";
pub const LOCATION: &str = "Japan East";
pub const ACCESS_TOKEN: &str = "test-token";

pub fn server_path(resource_group: &str, server: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/{resource_group}/providers/Microsoft.Sql/servers/{server}"
    )
}

pub fn elastic_pool_path(resource_group: &str, server: &str, pool: &str) -> String {
    format!("{}/elasticPools/{pool}", server_path(resource_group, server))
}

/// A pool as the service answers it
pub fn elastic_pool_json(pool: &str, sku: Value, properties: Value) -> Value {
    json!({
        "id": elastic_pool_path(RESOURCE_GROUP, SERVER, pool),
        "name": pool,
        "type": "Microsoft.Sql/servers/elasticPools",
        "location": LOCATION,
        "kind": "pool",
        "sku": sku,
        "properties": properties,
    })
}

pub fn error_json(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// A management API with [`SERVER`] in [`RESOURCE_GROUP`], located in [`LOCATION`]
pub async fn mocked_arm_server() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(server_path(RESOURCE_GROUP, SERVER)))
        .and(query_param("api-version", SQL_API_VERSION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": server_path(RESOURCE_GROUP, SERVER),
            "name": SERVER,
            "type": "Microsoft.Sql/servers",
            "location": LOCATION,
            "kind": "v12.0",
            "properties": {
                "fullyQualifiedDomainName": format!("{SERVER}.database.windows.net"),
                "version": "12.0",
                "state": "Ready"
            }
        })))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Answer lookups of `pool` with `404 ResourceNotFound`, expecting exactly `times` of them
pub async fn mount_pool_not_found(mock_server: &MockServer, pool: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(elastic_pool_path(RESOURCE_GROUP, SERVER, pool)))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_json(
            "ResourceNotFound",
            &format!(
                "The Resource 'Microsoft.Sql/servers/{SERVER}/elasticPools/{pool}' under resource group '{RESOURCE_GROUP}' was not found."
            ),
        )))
        .expect(times)
        .mount(mock_server)
        .await;
}

/// Answer lookups of `pool` with an existing standard pool
pub async fn mount_existing_pool(mock_server: &MockServer, pool: &str) {
    Mock::given(method("GET"))
        .and(path(elastic_pool_path(RESOURCE_GROUP, SERVER, pool)))
        .respond_with(ResponseTemplate::new(200).set_body_json(elastic_pool_json(
            pool,
            json!({ "name": "StandardPool", "tier": "Standard", "capacity": 50 }),
            json!({ "state": "Ready", "maxSizeBytes": 53687091200i64, "zoneRedundant": false }),
        )))
        .mount(mock_server)
        .await;
}
