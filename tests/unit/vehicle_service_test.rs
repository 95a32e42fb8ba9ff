//! VehicleService against a fake `/api/Movimientos` backend.

#[path = "../common/mod.rs"]
mod common;

use chrono::{Duration, Local, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sigepark::error::ApiError;
use sigepark::types::{Dwell, VehicleCategory};
use sigepark::vehicles::VehicleService;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Json;
use warp::Filter;

fn service(config: &sigepark::config::Config) -> VehicleService {
    VehicleService::new(common::client(config))
}

#[tokio::test]
async fn test_list_inside_normalizes_records() {
    let entered = (Local::now() - Duration::minutes(90)).with_timezone(&Utc);
    let iso = entered.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let routes = warp::get()
        .and(warp::path!("api" / "Movimientos" / "lista-dentro"))
        .and(common::tunnel())
        .map(move || {
            warp::reply::json(&json!([
                { "id": 7, "placa": "ABC12", "fechaEntradaUtcIso": iso },
                { "id": 8, "placa": "XYZB", "fechaEntrada": null, "tipo": null },
                { "id": 9, "placa": "QWE45", "tipo": "Moto" }
            ]))
        });
    let config = common::serve(routes);

    let vehicles = service(&config).list_inside().await.unwrap();
    assert_eq!(vehicles.len(), 3);

    assert_eq!(vehicles[0].plate, "ABC12");
    assert_eq!(vehicles[0].movement_id, Some(7));
    assert_eq!(vehicles[0].category, VehicleCategory::Car);
    let dwell = vehicles[0].dwell.unwrap();
    // Sub-second precision is dropped on the wire, which can only add time.
    assert!(
        dwell == Dwell { hours: 1, minutes: 30 } || dwell == Dwell { hours: 1, minutes: 31 },
        "unexpected dwell {:?}",
        dwell
    );

    assert_eq!(vehicles[1].category, VehicleCategory::Motorcycle);
    assert_eq!(vehicles[1].dwell, None);
    assert_eq!(vehicles[2].category, VehicleCategory::Motorcycle);
}

#[tokio::test]
async fn test_list_inside_null_body_is_empty() {
    let routes = warp::path!("api" / "Movimientos" / "lista-dentro")
        .and(common::tunnel())
        .map(|| warp::reply::json(&Value::Null));
    let config = common::serve(routes);

    let vehicles = service(&config).list_inside().await.unwrap();
    assert!(vehicles.is_empty());
}

#[tokio::test]
async fn test_list_inside_surfaces_errors() {
    let routes = warp::path!("api" / "Movimientos" / "lista-dentro")
        .and(common::tunnel())
        .map(|| warp::reply::with_status("caído", StatusCode::SERVICE_UNAVAILABLE));
    let config = common::serve(routes);

    let err = service(&config).list_inside().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

    let err = service(&common::unreachable()).list_inside().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_list_inside_malformed_body_is_decode_error() {
    let routes = warp::path!("api" / "Movimientos" / "lista-dentro")
        .and(common::tunnel())
        .map(|| "<html>interstitial</html>");
    let config = common::serve(routes);

    let err = service(&config).list_inside().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{:?}", err);
}

#[tokio::test]
async fn test_status_decodes_tariffs_and_encodes_plate() {
    let routes = warp::get()
        .and(warp::path!("api" / "Movimientos" / "status" / String))
        .and(common::tunnel())
        .map(|plate: String| {
            // warp hands over the raw segment, still percent-encoded.
            assert!(plate == "AB%20C12" || plate == "AB C12", "{}", plate);
            warp::reply::json(&json!({
                "existe": false,
                "status": "Fuera",
                "valido": true,
                "error": null,
                "tarifas": [
                    { "parkTarId": 1, "parkTarNomb": "Carro hora" },
                    { "parkTarId": 2, "parkTarNomb": "Moto hora" }
                ]
            }))
        });
    let config = common::serve(routes);

    let status = service(&config).status("AB C12").await.unwrap();
    assert!(!status.is_inside());
    assert!(status.valid);
    assert_eq!(status.error_message(), None);
    assert_eq!(status.tariffs.len(), 2);
    assert_eq!(status.tariffs[1].id, 2);
    assert_eq!(status.tariffs[1].name, "Moto hora");
}

#[tokio::test]
async fn test_status_not_found_is_status_error() {
    let routes = warp::path!("api" / "Movimientos" / "status" / String)
        .and(common::tunnel())
        .map(|_plate: String| warp::reply::with_status("", StatusCode::NOT_FOUND));
    let config = common::serve(routes);

    let err = service(&config).status("ABC12").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "Error: 404 Not Found");
}

#[tokio::test]
async fn test_register_entry_posts_plate_and_tariff() {
    let routes = warp::post()
        .and(warp::path!("api" / "Movimientos" / "nuevo"))
        .and(common::tunnel())
        .and(warp::body::json())
        .map(|body: Value| {
            assert_eq!(body, json!({ "placa": "ABC12", "tarifaId": 3 }));
            warp::reply::json(&json!({
                "success": true,
                "ticket": 1042,
                "placa": "ABC12",
                "tipoVehiculo": "Carro",
                "fechaEntrada": "2024-05-01T08:00:00"
            }))
        });
    let config = common::serve(routes);

    let ticket = service(&config).register_entry("ABC12", 3).await.unwrap();
    assert_eq!(ticket.ticket, 1042);
    assert_eq!(ticket.plate, "ABC12");
    assert_eq!(ticket.vehicle_type, "Carro");
}

#[tokio::test]
async fn test_register_entry_refused_by_server() {
    let routes = warp::path!("api" / "Movimientos" / "nuevo")
        .and(common::tunnel())
        .map(|| warp::reply::json(&json!({ "success": false })));
    let config = common::serve(routes);

    let err = service(&config).register_entry("ABC12", 3).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)), "{:?}", err);
}

#[tokio::test]
async fn test_register_exit_sends_amounts_as_numbers() {
    let routes = warp::post()
        .and(warp::path!("api" / "Movimientos" / "salida"))
        .and(common::tunnel())
        .and(warp::body::json())
        .map(|body: Value| {
            assert_eq!(body["placa"], "ABC12");
            assert_eq!(body["pago"].as_f64(), Some(10000.0));
            assert_eq!(body["monto"].as_f64(), Some(5000.0));
            warp::reply::json(&true)
        });
    let config = common::serve(routes);

    service(&config)
        .register_exit("ABC12", Decimal::new(10000, 0), Decimal::new(5000, 0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_register_exit_failure_status() {
    let routes = warp::path!("api" / "Movimientos" / "salida")
        .and(common::tunnel())
        .map(|| warp::reply::with_status("", StatusCode::BAD_REQUEST));
    let config = common::serve(routes);

    let err = service(&config)
        .register_exit("ABC12", Decimal::new(1, 0), Decimal::new(1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}

fn roster_and_amount() -> BoxedFilter<(Json,)> {
    let roster = warp::path!("api" / "Movimientos" / "lista-dentro").map(|| {
        warp::reply::json(&json!([
            { "id": 7, "placa": "abc12" },
            { "id": 8, "placa": "XYZB" }
        ]))
    });
    let amount = warp::path!("api" / "Movimientos" / "calcular" / i64).map(|id: i64| {
        assert_eq!(id, 7);
        warp::reply::json(&json!({ "monto": 6500 }))
    });
    common::tunnel().and(roster.or(amount).unify()).boxed()
}

#[tokio::test]
async fn test_compute_amount_resolves_movement_id_case_insensitively() {
    let config = common::serve(roster_and_amount());

    let amount = service(&config).compute_amount("ABC12").await.unwrap();
    assert_eq!(amount, Decimal::new(6500, 0));
}

#[tokio::test]
async fn test_compute_amount_for_plate_not_inside() {
    let config = common::serve(roster_and_amount());

    let err = service(&config).compute_amount("NOPE1").await.unwrap_err();
    assert!(matches!(err, ApiError::NotInside(ref p) if p == "NOPE1"), "{:?}", err);
}

#[tokio::test]
async fn test_entry_timestamp_from_roster() {
    let routes = warp::path!("api" / "Movimientos" / "lista-dentro")
        .and(common::tunnel())
        .map(|| {
            warp::reply::json(&json!([
                { "id": 7, "placa": "ABC12", "cfechaEntradaUtc": "2024-05-01T13:00:00Z" },
                { "id": 8, "placa": "XYZB" }
            ]))
        });
    let config = common::serve(routes);
    let vehicles = service(&config);

    let entered = vehicles.entry_timestamp("abc12").await.unwrap().unwrap();
    assert_eq!(
        entered.with_timezone(&Utc).to_rfc3339(),
        "2024-05-01T13:00:00+00:00"
    );
    assert_eq!(vehicles.entry_timestamp("XYZB").await.unwrap(), None);
    assert_eq!(vehicles.entry_timestamp("NOPE1").await.unwrap(), None);
}
