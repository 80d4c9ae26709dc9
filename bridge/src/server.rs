use std::future::Future;

use tokio::net::TcpListener;

use crate::capi::CapiClient;
use crate::config::Config;
use crate::router;
use crate::time::SystemTime;

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let capi = CapiClient::new(&config);
    let export_prometheus = config.export_prometheus;

    let app = router::router(SystemTime {}, capi, config, export_prometheus);

    tracing::info!("listening on {:?}", listener.local_addr().unwrap());
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .unwrap()
}
