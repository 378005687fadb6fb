use azsql::create::CreatePoolError;
use azsql_common::{models::error::ApiError, tags::InvalidTag};
use azsql_common_tests::arm::{
    elastic_pool_json, elastic_pool_path, error_json, mocked_arm_server, mount_existing_pool,
    mount_pool_not_found, LOCATION, RESOURCE_GROUP, SERVER,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::azsql_command;

fn create_pool<'a>(pool: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    let mut argv = vec![
        "elastic-pool",
        "create",
        "--resource-group",
        RESOURCE_GROUP,
        "--server",
        SERVER,
        "--name",
        pool,
    ];
    argv.extend_from_slice(extra);
    argv
}

async fn mount_put(server: &MockServer, pool: &str, body: serde_json::Value, times: u64) {
    Mock::given(method("PUT"))
        .and(path(elastic_pool_path(RESOURCE_GROUP, SERVER, pool)))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(elastic_pool_json(
            pool,
            json!({ "name": "StandardPool", "tier": "Standard", "capacity": 100 }),
            json!({ "state": "Ready", "maxSizeBytes": 1073741824i64 }),
        )))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn creates_a_standard_dtu_pool() {
    let server = mocked_arm_server().await;
    mount_pool_not_found(&server, "pool1", 1).await;
    mount_put(
        &server,
        "pool1",
        json!({
            "location": LOCATION,
            "sku": { "name": "StandardPool", "tier": "Standard", "capacity": 100 },
            "properties": { "maxSizeBytes": 1073741824i64 }
        }),
        1,
    )
    .await;

    azsql_command(
        &server.uri(),
        &create_pool(
            "pool1",
            &["--edition", "Standard", "--dtu", "100", "--storage-mb", "1024"],
        ),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn existing_pool_is_a_conflict() {
    let server = mocked_arm_server().await;
    mount_existing_pool(&server, "pool1").await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = azsql_command(&server.uri(), &create_pool("pool1", &["--dtu", "100"]))
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err.downcast_ref::<CreatePoolError>(),
        Some(CreatePoolError::AlreadyExists { .. })
    ));
    assert_eq!(
        err.to_string(),
        "The elastic pool 'pool1' already exists in server 'server1'."
    );
}

#[tokio::test]
async fn creates_a_vcore_pool_with_tags_and_zone_redundancy() {
    let server = mocked_arm_server().await;
    mount_pool_not_found(&server, "pool2", 1).await;
    mount_put(
        &server,
        "pool2",
        json!({
            "location": LOCATION,
            "tags": { "env": "dev", "team": "data" },
            "sku": { "name": "GP_Gen5", "tier": "GeneralPurpose", "capacity": 4 },
            "properties": { "zoneRedundant": true }
        }),
        1,
    )
    .await;

    azsql_command(
        &server.uri(),
        &create_pool(
            "pool2",
            &[
                "--vcore",
                "4",
                "--requested-sku-name",
                "GP_Gen5",
                "--edition",
                "GeneralPurpose",
                "--tag",
                "team=data",
                "--tag",
                "env=dev",
                "--zone-redundant",
            ],
        ),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn as_job_still_creates_the_pool() {
    let server = mocked_arm_server().await;
    mount_pool_not_found(&server, "pool3", 1).await;
    mount_put(
        &server,
        "pool3",
        json!({
            "location": LOCATION,
            "properties": { "zoneRedundant": false }
        }),
        1,
    )
    .await;

    azsql_command(
        &server.uri(),
        &create_pool("pool3", &["--zone-redundant", "false", "--as-job"]),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn invalid_tags_make_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = azsql_command(
        &server.uri(),
        &create_pool("pool1", &["--tag", "env=dev", "--tag", "env=prod"]),
    )
    .await
    .err()
    .unwrap();

    assert_eq!(
        err.downcast_ref::<InvalidTag>(),
        Some(&InvalidTag::DuplicateKey("env".to_string()))
    );
}

#[tokio::test]
async fn lookup_failures_other_than_not_found_are_propagated() {
    let server = mocked_arm_server().await;
    Mock::given(method("GET"))
        .and(path(elastic_pool_path(RESOURCE_GROUP, SERVER, "pool1")))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(error_json("AuthorizationFailed", "denied")),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = azsql_command(&server.uri(), &create_pool("pool1", &[]))
        .await
        .err()
        .unwrap();
    let api_error = err.downcast_ref::<ApiError>().unwrap();

    assert_eq!(api_error.code, "AuthorizationFailed");
    assert_eq!(api_error.status_code, 403);
}
