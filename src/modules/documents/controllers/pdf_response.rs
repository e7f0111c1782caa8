use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::HttpResponse;

use crate::modules::documents::services::RenderedDocument;

/// `application/pdf` download response
pub fn pdf_response(document: RenderedDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(document.bytes)
}
