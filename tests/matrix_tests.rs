//! Risk matrix loading and rendering tests

mod common;

use common::{band_json, catalog_routes, rams_against, Route, StubServer};
use predicates::prelude::*;

#[test]
fn test_matrix_show_renders_bands_and_grid() {
    let server = StubServer::start(catalog_routes());

    rams_against(&server)
        .args(["matrix", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOW"))
        .stdout(predicate::str::contains("MED"))
        .stdout(predicate::str::contains("HIGH"))
        .stdout(predicate::str::contains("16-25"))
        .stdout(predicate::str::contains("Likelihood 5"));
}

#[test]
fn test_matrix_with_gap_fails_catalog_load() {
    let mut routes = catalog_routes();
    routes.retain(|route| route.path != "/api/risk-matrix");
    // 6..9 uncovered
    routes.push(Route::json(
        "GET",
        "/api/risk-matrix",
        serde_json::json!({"risk_categories": [
            band_json("LOW", 1, 5),
            band_json("HIGH", 10, 25),
        ]}),
    ));
    let server = StubServer::start(routes);

    rams_against(&server)
        .args(["matrix", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no band covering score 6"));
}

#[test]
fn test_matrix_with_overlap_fails_catalog_load() {
    let mut routes = catalog_routes();
    routes.retain(|route| route.path != "/api/risk-matrix");
    routes.push(Route::json(
        "GET",
        "/api/risk-matrix",
        serde_json::json!({"risk_categories": [
            band_json("LOW", 1, 10),
            band_json("HIGH", 10, 25),
        ]}),
    ));
    let server = StubServer::start(routes);

    rams_against(&server)
        .args(["matrix", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap at score 10"));
}

#[test]
fn test_catalog_load_fails_wholesale_when_one_fetch_fails() {
    let mut routes = catalog_routes();
    routes.retain(|route| route.path != "/api/catalog/controls");
    routes.push(Route::error(
        "GET",
        "/api/catalog/controls",
        500,
        "catalog unavailable",
    ));
    let server = StubServer::start(routes);

    rams_against(&server)
        .args(["matrix", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("control catalog"));
}

#[test]
fn test_matrix_show_json_output() {
    let server = StubServer::start(catalog_routes());

    rams_against(&server)
        .args(["matrix", "show", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"MED\""))
        .stdout(predicate::str::contains("\"min_score\": 6"));
}
