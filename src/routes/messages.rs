use crate::errors::ApiError;
use crate::models::{Message, PalindromeCheck};
use crate::store::MessageStore;
use crate::utils::is_palindrome;
use actix_web::{HttpResponse, web};

/// Ids must be ASCII digits only; anything else is rejected before the
/// store is touched.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest("Invalid message id".into()));
    }
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid message id".into()))
}

pub async fn list_messages(store: web::Data<dyn MessageStore>) -> Result<HttpResponse, ApiError> {
    let messages = store.list_all().await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn create_message(
    store: web::Data<dyn MessageStore>,
    body: web::Json<Message>,
) -> Result<HttpResponse, ApiError> {
    let mut msg = body.into_inner();
    store.create(&mut msg).await?;
    log::debug!("created message id={}", msg.id);
    Ok(HttpResponse::Created().json(msg))
}

pub async fn get_message(
    store: web::Data<dyn MessageStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let msg = store.read(id).await?;
    Ok(HttpResponse::Ok().json(msg))
}

pub async fn palindrome_check(
    store: web::Data<dyn MessageStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let msg = store.read(id).await?;
    let palindrome = is_palindrome(&msg.text);
    Ok(HttpResponse::Ok().json(PalindromeCheck {
        message: msg,
        palindrome,
    }))
}

pub async fn update_message(
    store: web::Data<dyn MessageStore>,
    path: web::Path<String>,
    body: web::Json<Message>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let mut msg = body.into_inner();
    msg.id = id;
    store.update(&msg).await?;
    Ok(HttpResponse::Ok().json(msg))
}

pub async fn delete_message(
    store: web::Data<dyn MessageStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    store.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "result": "success" })))
}
