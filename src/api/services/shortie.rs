use std::sync::Arc;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::errors::ShortieError;
use crate::services::ShortieService;

/// `POST /shortie` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShortieRequest {
    pub url: String,
    /// unix 秒，0 或缺省表示永不过期
    #[serde(default)]
    pub expiration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortieResponse {
    pub short_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub struct ShortieApi;

impl ShortieApi {
    pub async fn create(
        service: web::Data<Arc<ShortieService>>,
        body: web::Json<CreateShortieRequest>,
    ) -> impl Responder {
        let request = body.into_inner();
        trace!("Create request for url: {}", request.url);

        match service.create(&request.url, request.expiration).await {
            Ok(created) => HttpResponse::Ok().json(CreateShortieResponse {
                short_url: created.short_url,
            }),
            Err(e) => Self::error_response(&e),
        }
    }

    pub async fn redirect(
        service: web::Data<Arc<ShortieService>>,
        path: web::Path<String>,
    ) -> impl Responder {
        let id = path.into_inner();

        match service.resolve(&id).await {
            Ok(Some(url)) => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", url))
                .finish(),
            Ok(None) => {
                debug!("Shortie not found: {}", id);
                Self::not_found_response()
            }
            Err(e) => Self::error_response(&e),
        }
    }

    pub async fn delete(
        service: web::Data<Arc<ShortieService>>,
        path: web::Path<String>,
    ) -> impl Responder {
        match service.delete(&path.into_inner()).await {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(e) => Self::error_response(&e),
        }
    }

    pub async fn stats(
        service: web::Data<Arc<ShortieService>>,
        path: web::Path<String>,
    ) -> impl Responder {
        match service.stats(&path.into_inner()).await {
            Ok(stats) => HttpResponse::Ok().json(stats),
            Err(e) => Self::error_response(&e),
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Not Found")
    }

    fn error_response(err: &ShortieError) -> HttpResponse {
        error!("Request failed: [{}] {}", err.code(), err);
        HttpResponse::InternalServerError().json(ErrorBody {
            error: err.message().to_string(),
        })
    }
}

/// 请求体不是合法 JSON 时返回 400，响应体与其它错误一致
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected create body: {}", err);
    let response = HttpResponse::BadRequest().json(ErrorBody {
        error: err.to_string(),
    });
    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn shortie_routes() -> actix_web::Scope {
    web::scope("/shortie")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("", web::post().to(ShortieApi::create))
        .route("/{id}", web::get().to(ShortieApi::redirect))
        .route("/{id}", web::delete().to(ShortieApi::delete))
        .route("/{id}/stats", web::get().to(ShortieApi::stats))
}
