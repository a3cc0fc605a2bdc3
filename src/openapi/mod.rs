use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AYA Portal API",
        version = "0.1.0",
        description = r#"
# AYA Portal API

Backend of the AYA client portal.

- **Records**: dispatch (`mode=drives`) and loss (`mode=loss`) records
- **Financial**: purchase records and the financial dashboard
- **Auth**: portal sign-in and password change
- **Progress**: completed course lessons per user
- **Courses**: aggregated listing from the video platform

## Authentication

Every `/api` route except `/api/auth/login` requires the token returned by login:

```
Authorization: Bearer <token>
```

## Errors

Failures are JSON with an `error` string:

```json
{ "error": "cliente inválido: 'ACME'", "request_id": "…", "timestamp": "2024-01-01T00:00:00Z" }
```

`GET /api/records?mode=drives` without `start` and `end` answers
`400 { "rows": [], "error": "…" }`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "records", description = "Dispatch and loss records"),
        (name = "financial", description = "Purchase records and dashboard"),
        (name = "auth", description = "Sign-in and password change"),
        (name = "progress", description = "Course progress"),
        (name = "courses", description = "Video platform catalog")
    ),
    paths(
        crate::handlers::records::list_records,
        crate::handlers::records::create_record,
        crate::handlers::records::update_record,
        crate::handlers::records::delete_record,

        crate::handlers::financial::list_compras,
        crate::handlers::financial::create_compra,
        crate::handlers::financial::update_compra,
        crate::handlers::financial::delete_compra,
        crate::handlers::financial::dashboard,

        crate::handlers::auth::login,
        crate::handlers::auth::change_password,

        crate::handlers::progress::mark_progress,
        crate::handlers::progress::reset_progress,

        crate::handlers::courses::catalog,
    ),
    components(
        schemas(
            crate::entities::acionamento::Model,
            crate::entities::perda::Model,
            crate::entities::compra::Model,
            crate::services::records::RecordMode,
            crate::normalize::Cliente,
            crate::normalize::FormaPagamento,
            crate::normalize::StatusPagamento,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
