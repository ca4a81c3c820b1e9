use actix_web::HttpRequest;
use actix_web::HttpResponse;

/// Catch-all handler standing in for the content origin.
///
/// By the time this runs, the protection middleware has already allowed the
/// request through, so it answers 200 unconditionally. It echoes the request
/// path in the body, which lets the integration tests assert that allowed
/// requests reach the origin side unmodified.
pub async fn pass_through(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body(req.path().to_string())
}
