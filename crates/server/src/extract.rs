//! Extractors whose rejections come back in the response envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::ServerError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct ApiPath<T>(pub T);

/// Query string, with repeated keys collected into `Vec` fields.
#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(ServerError))]
pub struct ApiQuery<T>(pub T);
