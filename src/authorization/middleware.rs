use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::http::header::HeaderValue;
use actix_web::web::Data;
use actix_web::HttpResponse;
use actix_web_lab::middleware::Next;

use crate::authorization::authorize;
use crate::authorization::Decision;
use crate::domain::ProtectionConfig;

/// The viewer-request hook: runs the authorization engine on every inbound
/// request, before any handler (i.e. before anything that stands in for cache
/// or origin).
///
/// `Allow` -> the request continues down the chain untouched (no header, path
/// or method rewriting). `Deny` -> short-circuit with a 401 carrying the
/// `WWW-Authenticate` challenge, which browsers turn into a native credential
/// prompt.
///
/// For more details on the mechanism, refer to the documentation for
/// `actix_web_lab::middleware::from_fn`.
///
/// This is also the outermost fail-open boundary for the hook itself: faults
/// that can only occur here (the config snapshot missing from app data, a
/// challenge header value actix refuses) are logged and converted to
/// pass-through, matching the engine's own policy -- a bug in the protection
/// layer must degrade to "off", never to an outage or a spurious rejection.
pub async fn enforce_folder_protection(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let Some(protection) = req.app_data::<Data<ProtectionConfig>>() else {
        tracing::error!("protection config missing from app data; failing open");
        return next.call(req).await;
    };

    // non-UTF-8 header bytes cannot possibly parse as valid credentials, so
    // they are folded into "header absent" (-> challenge if protected)
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match authorize(req.path(), authorization, protection) {
        Decision::Allow => next.call(req).await,
        Decision::Deny(challenge) => {
            let challenge_value = match HeaderValue::from_str(&challenge.www_authenticate()) {
                Ok(value) => value,
                Err(e) => {
                    tracing::error!(error = %e, "could not build challenge header; failing open");
                    return next.call(req).await;
                }
            };
            let mut response = HttpResponse::Unauthorized().finish();
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge_value);
            let err = anyhow::anyhow!("Valid credentials are required to access this folder.");
            Err(InternalError::from_response(err, response).into())
        }
    }
}
