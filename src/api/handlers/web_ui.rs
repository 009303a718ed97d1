use crate::api::handlers::files::PathQuery;
use crate::build_info::{BUILD_VERSION, GIT_SHA};
use crate::components::directory_table::DirectoryView;
use crate::components::layout::Layout;
use crate::config::ServerConfig;
use crate::core::listing::list_directory;
use crate::error::ServerError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use dioxus::prelude::*;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Directory listing page.
pub async fn index(
    config: web::Data<ServerConfig>,
    query: web::Query<PathQuery>,
) -> Result<HttpResponse, ServerError> {
    let page = list_directory(&config.root, &config.name, &query.p)
        .await
        .map_err(|e| {
            tracing::warn!("Listing {:?} failed: {}", query.p, e);
            e
        })?;

    let title = format!("{} // {}", config.name, page.directory_name);
    let share_name = config.name.clone();
    let directory_path = page.directory_path.clone();

    let html = dioxus_ssr::render_element(rsx! {
        Layout {
            title: title,
            share_name: share_name,
            directory_path: directory_path,
            build_version: BUILD_VERSION.to_string(),
            git_sha: GIT_SHA.to_string(),

            DirectoryView { page: page }
        }
    });

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header(("Cache-Control", "no-store"))
        .body(format!("<!DOCTYPE html><html lang=\"en\">{}</html>", html)))
}

fn handle_static_asset(req: &HttpRequest, content: &[u8], content_type: &str) -> HttpResponse {
    let etag = format!("\"{}\"", GIT_SHA);

    if let Some(if_none_match) = req.headers().get("If-None-Match") {
        if if_none_match.as_bytes() == etag.as_bytes() {
            return HttpResponse::NotModified().finish();
        }
    }

    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(("ETag", etag))
        .insert_header(("Cache-Control", "public, max-age=3600"))
        .body(content.to_vec())
}

pub async fn serve_static_asset(req: HttpRequest) -> impl Responder {
    let path = req.path().trim_start_matches("/static/");

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            handle_static_asset(&req, &content.data, mime.as_ref())
        }
        None => HttpResponse::NotFound().body("Asset not found"),
    }
}

pub async fn robots_txt() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain")
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .body("User-agent: *\nDisallow: /")
}

pub async fn serve_favicon() -> impl Responder {
    HttpResponse::Ok()
        .content_type("image/svg+xml")
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .body(r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32">
  <rect width="32" height="32" rx="6" fill="#1d2b3a"/>
  <path d="M5 10h9l2 3h11v12H5z" fill="#f4b942"/>
  <circle cx="24" cy="9" r="4" fill="#3ddc84"/>
</svg>"##)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes;
    use crate::infrastructure::registry::{ClientRegistry, DeliveryMode};
    use crate::utils::security::RootPath;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use std::net::{IpAddr, Ipv4Addr};

    fn config_for(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            root: RootPath::from_dir(dir).unwrap(),
            name: "Team Share".into(),
            delivery: DeliveryMode::Blocking,
            client_buffer: 1,
        }
    }

    #[actix_web::test]
    async fn index_lists_the_root() {
        let share = tempfile::tempdir().unwrap();
        std::fs::create_dir(share.path().join("docs")).unwrap();
        std::fs::write(share.path().join("report final.pdf"), b"pdf").unwrap();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(config_for(share.path())))
                .app_data(web::Data::new(ClientRegistry::default()))
                .configure(routes),
        )
        .await;

        let resp =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8(actix_test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("Team Share"));
        assert!(body.contains("docs"));
        assert!(body.contains("report final.pdf"));
        assert!(body.contains("/getfile?p=report+final.pdf"));
    }

    #[actix_web::test]
    async fn index_rejects_traversal() {
        let share = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(config_for(share.path())))
                .configure(routes),
        )
        .await;

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/?p=../../").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_paths_are_not_found() {
        let share = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(config_for(share.path())))
                .configure(routes),
        )
        .await;

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/nope").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn static_assets_honour_etags() {
        let app = actix_test::init_service(App::new().configure(routes)).await;

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/static/js/app.js").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let etag = resp.headers().get("ETag").unwrap().clone();

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/static/js/app.js")
                .insert_header(("If-None-Match", etag))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }
}
