use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use redis::{AsyncCommands, RedisResult};
use serde::Serialize;
use sysinfo::System;

use crate::{constants::START_TIME, repositories::stats::StatsRepository, AppState};

// Health probes hit the database and Redis, so responses are reused for
// a few seconds to keep aggressive monitors cheap.
const HEALTH_CACHE_SECS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct HostInfo {
    os: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    started_at: String,
    database: String,
    cache: String,
    version: String,
    host: HostInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> =
    Lazy::new(|| RwLock::new(HealthCheckResponse::default()));

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now = Utc::now();
    let uptime = now.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let host = HostInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!(
            "{:.2} GB",
            sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0
        ),
    };

    let database = match state.stats_handler.stats_repo.check_connection().await {
        Ok(_) => "OK",
        Err(_) => "Unavailable",
    };

    let cache = if let Some(redis) = &state.redis_client {
        match redis.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = conn.ping().await;
                match result {
                    Ok(pong) if pong == "PONG" => "OK",
                    _ => "Unavailable",
                }
            }
            Err(_) => "Unavailable",
        }
    } else {
        "Not configured"
    };

    HealthCheckResponse {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now.to_rfc3339(),
        started_at: START_TIME.to_rfc3339(),
        database: database.to_string(),
        cache: cache.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        host,
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > HEALTH_CACHE_SECS {
        let response = build_health_response(&state).await;

        if let Ok(mut cache) = CACHED_STATUS.write() {
            *cache = response.clone();
            LAST_CHECK.store(now, Ordering::Relaxed);
        }

        HttpResponse::Ok().json(response)
    } else {
        match CACHED_STATUS.read() {
            Ok(response) => HttpResponse::Ok().json(response.clone()),
            Err(e) => {
                tracing::warn!("Health check cache lock poisoned: {}", e);
                let response = build_health_response(&state).await;
                HttpResponse::Ok().json(response)
            }
        }
    }
}
