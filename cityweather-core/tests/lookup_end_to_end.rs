use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use cityweather_core::{
    HttpGateway, JsonCodec, ProviderError, RequestLifecycleController, ResponseViewModel,
    SubmitOutcome, WeatherProvider, WeatherRecord, WeatherRequest, service,
};
use tokio::net::TcpListener;

#[derive(Debug)]
struct FixedProvider;

#[async_trait]
impl WeatherProvider for FixedProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, ProviderError> {
        if request.city != "Tokyo" {
            return Err(ProviderError::NotFound(request.city.clone()));
        }

        Ok(WeatherRecord {
            city: "Tokyo".into(),
            country: "Japan".into(),
            temperature: "24.0°C".into(),
            condition: "Sunny".into(),
            humidity: "45%".into(),
            wind_speed: "7.2 km/h".into(),
            last_updated: "2024-06-01 12:30".into(),
        })
    }
}

async fn start_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, service::router(Arc::new(FixedProvider))).await.unwrap();
    });
    format!("http://{addr}")
}

fn controller_for(base_url: &str) -> RequestLifecycleController {
    let gateway = HttpGateway::new(base_url, Duration::from_secs(5)).unwrap();
    RequestLifecycleController::new(Arc::new(gateway), Arc::new(JsonCodec))
}

#[tokio::test]
async fn lookup_resolves_to_weather_record() {
    let base_url = start_service().await;
    let mut controller = controller_for(&base_url);

    controller.update_query_text("  Tokyo  ");
    assert!(matches!(controller.submit(), SubmitOutcome::Dispatched(_)));
    assert_eq!(controller.query_text(), "");

    let view = controller.next_completion().await.cloned().expect("lookup resolves");
    let ResponseViewModel::WeatherRecord(record) = view else {
        panic!("expected weather record, got {view:?}");
    };
    assert_eq!(record.city, "Tokyo");
    assert_eq!(record.country, "Japan");
    assert_eq!(record.last_updated, "2024-06-01 12:30");
}

#[tokio::test]
async fn unknown_city_surfaces_service_message() {
    let base_url = start_service().await;
    let mut controller = controller_for(&base_url);

    controller.update_query_text("Atlantis");
    controller.submit();

    let view = controller.next_completion().await.cloned();
    assert_eq!(view, Some(ResponseViewModel::ErrorMessage("City \"Atlantis\" not found".into())));
}

#[tokio::test]
async fn unreachable_service_surfaces_unavailable() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut controller = controller_for(&format!("http://{addr}"));
    controller.update_query_text("Tokyo");
    controller.submit();

    let view = controller.next_completion().await.cloned();
    assert_eq!(view, Some(ResponseViewModel::ErrorMessage("Weather service unavailable".into())));
}
