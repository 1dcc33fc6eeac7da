//! Catalogue handlers. Reads are public; writes require an administrator.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Error, Product, ProductDraft, ProductDraftParts};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::state::HttpState;

/// Public representation of a catalogue product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    pub stock: i32,
}

impl From<&Product> for ProductBody {
    fn from(product: &Product) -> Self {
        let draft = product.draft();
        Self {
            id: product.id(),
            name: draft.name().to_owned(),
            description: draft.description().map(str::to_owned),
            brand: draft.brand().map(str::to_owned),
            size: draft.size().map(str::to_owned),
            color: draft.color().map(str::to_owned),
            material: draft.material().map(str::to_owned),
            price_cents: draft.price_cents(),
            stock: draft.stock(),
        }
    }
}

/// Write shape shared by create and full update.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft, Error> {
        ProductDraft::new(ProductDraftParts {
            name: self.name,
            description: self.description,
            brand: self.brand,
            size: self.size,
            color: self.color,
            material: self.material,
            price_cents: self.price_cents,
            stock: self.stock,
        })
        .map_err(|e| Error::invalid_request(e.to_string()))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Substring matched case-insensitively against name, brand, and
    /// description.
    pub q: String,
}

/// List the whole catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    security(()),
    responses((status = 200, description = "All products", body = [ProductBody]))
)]
#[get("")]
pub async fn list_products(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let products = state.products.list().await?;
    let bodies: Vec<ProductBody> = products.iter().map(ProductBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Search the catalogue by substring.
#[utoipa::path(
    get,
    path = "/api/v1/products/search",
    tag = "products",
    security(()),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = [ProductBody]),
        (status = 400, description = "Missing or empty query", body = Error)
    )
)]
#[get("/search")]
pub async fn search_products(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    let needle = query.q.trim();
    if needle.is_empty() {
        return Err(Error::invalid_request("search query must not be empty"));
    }
    let products = state.products.search(needle).await?;
    let bodies: Vec<ProductBody> = products.iter().map(ProductBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "products",
    security(()),
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "The requested product", body = ProductBody),
        (status = 404, description = "No such product", body = Error)
    )
)]
#[get("/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let product = state
        .products
        .find_by_id(id.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("product not found"))?;
    Ok(HttpResponse::Ok().json(ProductBody::from(&product)))
}

/// Add a product to the catalogue. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductBody),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error)
    )
)]
#[post("")]
pub async fn create_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    body: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let draft = body.into_inner().into_draft()?;
    let product = state.products.create(draft).await?;
    Ok(HttpResponse::Created().json(ProductBody::from(&product)))
}

/// Replace a product's attributes. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product identifier")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "The updated product", body = ProductBody),
        (status = 400, description = "Validation failed", body = Error),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such product", body = Error)
    )
)]
#[put("/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let draft = body.into_inner().into_draft()?;
    let product = state
        .products
        .update(id.into_inner(), draft)
        .await?
        .ok_or_else(|| Error::not_found("product not found"))?;
    Ok(HttpResponse::Ok().json(ProductBody::from(&product)))
}

/// Remove a product from the catalogue. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Caller is not an administrator", body = Error),
        (status = 404, description = "No such product", body = Error)
    )
)]
#[delete("/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    if state.products.delete(id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("product not found"))
    }
}

#[cfg(test)]
mod tests {
    //! Body-to-draft conversion behaviour.

    use super::*;

    fn request(name: &str, price_cents: i64, stock: i32) -> ProductRequest {
        ProductRequest {
            name: name.to_owned(),
            description: None,
            brand: None,
            size: None,
            color: None,
            material: None,
            price_cents,
            stock,
        }
    }

    #[test]
    fn valid_bodies_become_drafts() {
        let draft = request("Alloy rim 18\"", 210_00, 6)
            .into_draft()
            .expect("valid draft");
        assert_eq!(draft.name(), "Alloy rim 18\"");
        assert_eq!(draft.price_cents(), 210_00);
    }

    #[test]
    fn invalid_bodies_map_to_invalid_request() {
        let err = request("", 100, 1).into_draft().expect_err("should fail");
        assert_eq!(err.code, crate::domain::ErrorCode::InvalidRequest);
        assert_eq!(err.message, "product name must not be empty");
    }

    #[test]
    fn product_body_round_trips_optional_fields() {
        let draft = ProductDraft::new(ProductDraftParts {
            name: "Spoke set".to_owned(),
            brand: Some("Akront".to_owned()),
            price_cents: 45_00,
            stock: 12,
            ..ProductDraftParts::default()
        })
        .expect("valid draft");
        let body = ProductBody::from(&Product::new(Uuid::new_v4(), draft));
        assert_eq!(body.brand.as_deref(), Some("Akront"));
        assert!(body.material.is_none());
    }
}
