use axum::Json;

use crate::serializers::verba_health::{Banner, Health};

pub async fn index() -> Json<Banner> {
    Json(Banner {
        message: "Grammar Checker API is running!".into(),
    })
}

pub async fn health() -> Json<Health> {
    Json(Health {
        ok: true,
        service: "verba".into(),
    })
}
