use crate::service::PlateCheck;
use crate::websocket;
use log::info;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

/// `GET /ws/plate-check` upgrades into a plate check session;
/// `GET /metrics` returns the operator counters.
pub fn routes(
    service: Arc<PlateCheck>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_service = warp::any().map(move || service.clone());

    let plate_check = warp::path!("ws" / "plate-check")
        .and(warp::ws())
        .and(with_service.clone())
        .map(|ws: warp::ws::Ws, service: Arc<PlateCheck>| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, service))
        });

    let metrics = warp::get()
        .and(warp::path!("metrics"))
        .and(with_service)
        .map(|service: Arc<PlateCheck>| warp::reply::json(&service.metrics().snapshot()));

    plate_check.or(metrics)
}

/// Serves the routes on `addr` until `shutdown` resolves.
pub async fn run<S>(addr: SocketAddr, service: Arc<PlateCheck>, shutdown: S) -> Result<(), warp::Error>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) =
        warp::serve(routes(service)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    info!("Listening on {}", bound);
    server.await;
    Ok(())
}
