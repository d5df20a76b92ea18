//! Administrative API for the collector.
//!
//! This module provides HTTP endpoints for maintaining the attacker
//! registry that drives ground-truth labeling: marking source
//! addresses as attackers and clearing all marks. Both are safe to
//! call at any time, including before the first poll.

use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;

use crate::core::AttackerRegistry;
use crate::models::Config;

pub struct ApiState {
    pub attackers: Arc<AttackerRegistry>,
    pub config: Arc<Config>,
}

/// API configuration function for Actix-web
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(web::resource("/health").route(web::get().to(health_check)))
            .service(
                web::resource("/attackers")
                    .route(web::post().to(mark_attackers))
                    .route(web::delete().to(clear_attackers)),
            ),
    );
}

/// Health check endpoint response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Mark attackers request
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkAttackersRequest {
    pub addresses: Vec<String>,
}

/// Mark attackers response
#[derive(Serialize)]
struct MarkAttackersResponse {
    marked: usize,
}

/// Clear attackers response
#[derive(Serialize)]
struct ClearAttackersResponse {
    cleared: usize,
}

/// Validation error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Mark a list of source addresses as attackers.
///
/// The whole payload is validated before the registry is touched, so a
/// rejected request leaves the registry unchanged.
pub async fn mark_attackers(
    state: web::Data<ApiState>,
    req: web::Json<MarkAttackersRequest>,
) -> impl Responder {
    let mut addresses = Vec::with_capacity(req.addresses.len());
    for raw in &req.addresses {
        match raw.parse::<IpAddr>() {
            Ok(address) => addresses.push(address),
            Err(_) => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: format!("invalid address: {}", raw),
                })
            }
        }
    }

    let marked = state.attackers.mark_all(addresses).await;
    info!("Marked {} new attacker address(es)", marked);

    HttpResponse::Ok().json(MarkAttackersResponse { marked })
}

/// Clear all attacker marks.
pub async fn clear_attackers(state: web::Data<ApiState>) -> impl Responder {
    let cleared = state.attackers.clear().await;
    info!("Cleared {} attacker address(es)", cleared);

    HttpResponse::Ok().json(ClearAttackersResponse { cleared })
}
