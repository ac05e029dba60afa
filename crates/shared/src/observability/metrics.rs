//! Prometheus 指标
//!
//! 指标名集中定义在此处，业务代码只调用 `record_*` 函数。
//! 未安装 recorder（如单元测试或 `metrics_enabled = false`）时所有记录均为空操作。

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const LOGIN_ATTEMPTS_TOTAL: &str = "auth_login_attempts_total";
pub const LOGIN_DURATION: &str = "auth_login_duration_seconds";
pub const TOKEN_VALIDATIONS_TOTAL: &str = "auth_token_validations_total";

/// 指标导出服务的任务句柄
pub struct MetricsHandle {
    _server: tokio::task::JoinHandle<()>,
}

/// 安装 Prometheus recorder 并在 `metrics_port` 上暴露 `/metrics`
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server = serve_metrics(addr, handle).await?;

    Ok(MetricsHandle { _server: server })
}

fn describe_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    metrics::describe_histogram!(HTTP_REQUEST_DURATION, "HTTP request duration in seconds");
    metrics::describe_counter!(LOGIN_ATTEMPTS_TOTAL, "Login attempts by outcome");
    metrics::describe_histogram!(
        LOGIN_DURATION,
        "Login duration in seconds, including key derivation"
    );
    metrics::describe_counter!(TOKEN_VALIDATIONS_TOTAL, "Bearer token validations by outcome");
}

async fn serve_metrics(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    }))
}

/// 记录 HTTP 请求
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, &labels).record(duration_secs);
}

/// 记录登录尝试
///
/// outcome 取值：success / invalid_credentials / inactive / error
pub fn record_login_attempt(outcome: &'static str, duration_secs: f64) {
    metrics::counter!(LOGIN_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
    metrics::histogram!(LOGIN_DURATION, "outcome" => outcome).record(duration_secs);
}

/// 记录 Bearer Token 校验结果（valid / missing / expired / invalid）
pub fn record_token_validation(outcome: &'static str) {
    metrics::counter!(TOKEN_VALIDATIONS_TOTAL, "outcome" => outcome).increment(1);
}
